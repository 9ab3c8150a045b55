//! # Tokenizer Vocabulary
//!
//! [`TokenizerVocab`] bundles everything segmentation needs, validated
//! once at construction and read-only thereafter.

use crate::{
    PMResult,
    PiecemealError,
    normalize::{AddedToken, AddedTokens, NormalizerConfig},
    types::{PMHashMap, TokenType},
    vocab::{MergeRules, ModelConfig, SpecialTokenNames, SpecialTokens, WordVocab},
};

/// A complete, validated tokenizer vocabulary.
///
/// Contains:
/// * `model` - the segmentation algorithm and its parameters,
/// * `words` - the ``{ String <-> T }`` vocabulary,
/// * `merges` - the BPE merge table (empty for `WordPiece`),
/// * `specials` - the resolved special tokens,
/// * `added` - literal tokens matched before normalization,
/// * `normalizer` - the text normalization config.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenizerVocab<T: TokenType> {
    model: ModelConfig,
    words: WordVocab<T>,
    continuation: PMHashMap<String, T>,
    merges: MergeRules<T>,
    specials: SpecialTokens<T>,
    special_names: SpecialTokenNames,
    added: AddedTokens<T>,
    normalizer: NormalizerConfig,
}

impl<T: TokenType> TokenizerVocab<T> {
    /// Assemble and validate a vocabulary.
    ///
    /// ## Arguments
    /// * `model` - the segmentation model config.
    /// * `words` - the word vocabulary.
    /// * `merge_pairs` - ordered BPE merges; must be empty for `WordPiece`.
    /// * `special_names` - the special token names; each must be in `words`.
    /// * `added` - added tokens; each must be in `words`. Special tokens
    ///   are always matched as added tokens, whether listed or not.
    /// * `normalizer` - the normalizer config.
    ///
    /// ## Returns
    /// The vocabulary, or [`PiecemealError::CorruptVocabulary`].
    pub fn new(
        model: ModelConfig,
        words: WordVocab<T>,
        merge_pairs: &[(String, String)],
        special_names: SpecialTokenNames,
        added: Vec<AddedToken<T>>,
        normalizer: NormalizerConfig,
    ) -> PMResult<Self> {
        if words.is_empty() {
            return Err(PiecemealError::corrupt("empty vocabulary"));
        }

        let merges = match &model {
            ModelConfig::WordPiece(cfg) => {
                if !merge_pairs.is_empty() {
                    return Err(PiecemealError::corrupt(
                        "a WordPiece vocabulary must not carry merge rules",
                    ));
                }
                if cfg.max_input_chars_per_word == 0 {
                    return Err(PiecemealError::corrupt(
                        "max_input_chars_per_word must be positive",
                    ));
                }
                MergeRules::default()
            }
            ModelConfig::Bpe(_) => MergeRules::from_string_pairs(
                merge_pairs,
                &words,
                model.continuing_subword_prefix(),
            )?,
        };

        let specials = SpecialTokens::resolve(&special_names, &words)?;

        let mut added = added;
        for token in &added {
            if words.id_to_token(token.id) != Some(token.content.as_str()) {
                return Err(PiecemealError::corrupt(format!(
                    "added token {:?} does not match vocabulary id {}",
                    token.content, token.id
                )));
            }
        }
        for special in specials.iter() {
            if !added.iter().any(|t| t.content == special.content) {
                added.push(AddedToken {
                    content: special.content.clone(),
                    id: special.id,
                    normalized: false,
                });
            }
        }
        let added = AddedTokens::new(added)?;

        let continuation = match model.continuing_subword_prefix() {
            Some(prefix) => words.continuation_map(prefix),
            None => PMHashMap::default(),
        };

        log::debug!(
            "vocabulary: model={model}, {} entries, {} merges, {} added tokens",
            words.len(),
            merges.len(),
            added.len()
        );

        Ok(Self {
            model,
            words,
            continuation,
            merges,
            specials,
            special_names,
            added,
            normalizer,
        })
    }

    /// The segmentation model config.
    pub fn model(&self) -> &ModelConfig {
        &self.model
    }

    /// The word vocabulary.
    pub fn words(&self) -> &WordVocab<T> {
        &self.words
    }

    /// The merge table.
    pub fn merges(&self) -> &MergeRules<T> {
        &self.merges
    }

    /// The resolved special tokens.
    pub fn specials(&self) -> &SpecialTokens<T> {
        &self.specials
    }

    /// The special token names.
    pub fn special_names(&self) -> &SpecialTokenNames {
        &self.special_names
    }

    /// The added token matcher.
    pub fn added_tokens(&self) -> &AddedTokens<T> {
        &self.added
    }

    /// The normalizer config.
    pub fn normalizer_config(&self) -> &NormalizerConfig {
        &self.normalizer
    }

    /// The number of entries.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.words.len()
    }

    /// Look up a token string.
    pub fn lookup(
        &self,
        token: &str,
    ) -> Option<T> {
        self.words.lookup(token)
    }

    /// Look up a token string, falling back to the unknown id.
    pub fn lookup_or_unknown(
        &self,
        token: &str,
    ) -> T {
        self.lookup(token)
            .unwrap_or_else(|| self.specials.unknown_id())
    }

    /// Look up a continuation piece by its unprefixed text.
    ///
    /// ``lookup_continuation("ing")`` finds ``"##ing"``.
    pub fn lookup_continuation(
        &self,
        suffix: &str,
    ) -> Option<T> {
        self.continuation.get(suffix).copied()
    }

    /// Look up the token string of an id.
    pub fn id_to_token(
        &self,
        id: T,
    ) -> Option<&str> {
        self.words.id_to_token(id)
    }

    /// Does the vocabulary contain this token string?
    pub fn contains(
        &self,
        token: &str,
    ) -> bool {
        self.words.contains(token)
    }
}
