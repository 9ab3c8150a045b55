//! # Special Tokens
//!
//! The reserved vocabulary entries which frame, pad, and stand in for
//! sequences: unknown, padding, start (`[CLS]`), end (`[SEP]`), and an
//! optional mask token.

use serde::{Deserialize, Serialize};

use crate::{
    PMResult,
    PiecemealError,
    types::TokenType,
    vocab::WordVocab,
};

/// The names of the special tokens, as they appear in a vocabulary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SpecialTokenNames {
    /// The unknown token, e.g. `[UNK]`.
    pub unknown: String,

    /// The padding token, e.g. `[PAD]`.
    pub padding: String,

    /// The sequence start token, e.g. `[CLS]`.
    pub start: String,

    /// The sequence end token, e.g. `[SEP]`.
    pub end: String,

    /// The mask token, e.g. `[MASK]`, if the vocabulary has one.
    pub mask: Option<String>,
}

impl Default for SpecialTokenNames {
    fn default() -> Self {
        Self::bert()
    }
}

impl SpecialTokenNames {
    /// The BERT special token names.
    pub fn bert() -> Self {
        Self {
            unknown: "[UNK]".to_string(),
            padding: "[PAD]".to_string(),
            start: "[CLS]".to_string(),
            end: "[SEP]".to_string(),
            mask: None,
        }
    }

    /// The RoBERTa-style special token names.
    pub fn roberta() -> Self {
        Self {
            unknown: "<unk>".to_string(),
            padding: "<pad>".to_string(),
            start: "<s>".to_string(),
            end: "</s>".to_string(),
            mask: None,
        }
    }

    /// Set the mask token name.
    pub fn with_mask<S: Into<String>>(
        mut self,
        mask: Option<S>,
    ) -> Self {
        self.mask = mask.map(Into::into);
        self
    }

    /// Iterate over `(role, name)` pairs for all configured names.
    pub fn named_roles(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("unknown", Some(self.unknown.as_str())),
            ("padding", Some(self.padding.as_str())),
            ("start", Some(self.start.as_str())),
            ("end", Some(self.end.as_str())),
            ("mask", self.mask.as_deref()),
        ]
        .into_iter()
        .filter_map(|(role, name)| name.map(|n| (role, n)))
    }
}

/// A special token resolved against a vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialToken<T: TokenType> {
    /// The token string.
    pub content: String,

    /// The token id.
    pub id: T,
}

/// The resolved special token block of a vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpecialTokens<T: TokenType> {
    unknown: SpecialToken<T>,
    padding: SpecialToken<T>,
    start: SpecialToken<T>,
    end: SpecialToken<T>,
    mask: Option<SpecialToken<T>>,
}

impl<T: TokenType> SpecialTokens<T> {
    /// Resolve special token names against a vocabulary.
    ///
    /// ## Arguments
    /// * `names` - the special token names.
    /// * `vocab` - the vocabulary which must contain every named token.
    ///
    /// ## Returns
    /// The resolved block, or [`PiecemealError::CorruptVocabulary`] if
    /// a named token is missing, or two roles resolve to the same id
    /// (padding aside, which may alias any other role).
    pub fn resolve(
        names: &SpecialTokenNames,
        vocab: &WordVocab<T>,
    ) -> PMResult<Self> {
        let resolve_one = |role: &str, name: &str| -> PMResult<SpecialToken<T>> {
            if name.is_empty() {
                return Err(PiecemealError::corrupt(format!(
                    "special token block has an empty {role} token"
                )));
            }
            match vocab.lookup(name) {
                Some(id) => Ok(SpecialToken {
                    content: name.to_string(),
                    id,
                }),
                None => Err(PiecemealError::corrupt(format!(
                    "vocabulary does not contain {role} token {name:?}"
                ))),
            }
        };

        let unknown = resolve_one("unknown", &names.unknown)?;
        let padding = resolve_one("padding", &names.padding)?;
        let start = resolve_one("start", &names.start)?;
        let end = resolve_one("end", &names.end)?;
        let mask = names
            .mask
            .as_deref()
            .map(|name| resolve_one("mask", name))
            .transpose()?;

        let framing = [("unknown", &unknown), ("start", &start), ("end", &end)];
        for (i, (a_role, a)) in framing.iter().enumerate() {
            for (b_role, b) in &framing[i + 1..] {
                if a.id == b.id {
                    return Err(PiecemealError::corrupt(format!(
                        "special tokens {a_role} and {b_role} share id {}",
                        a.id
                    )));
                }
            }
        }

        Ok(Self {
            unknown,
            padding,
            start,
            end,
            mask,
        })
    }

    /// The unknown token.
    pub fn unknown(&self) -> &SpecialToken<T> {
        &self.unknown
    }

    /// The padding token.
    pub fn padding(&self) -> &SpecialToken<T> {
        &self.padding
    }

    /// The sequence start token.
    pub fn start(&self) -> &SpecialToken<T> {
        &self.start
    }

    /// The sequence end token.
    pub fn end(&self) -> &SpecialToken<T> {
        &self.end
    }

    /// The mask token, if any.
    pub fn mask(&self) -> Option<&SpecialToken<T>> {
        self.mask.as_ref()
    }

    /// The unknown token id.
    pub fn unknown_id(&self) -> T {
        self.unknown.id
    }

    /// The padding token id.
    pub fn padding_id(&self) -> T {
        self.padding.id
    }

    /// Iterate over all special tokens.
    pub fn iter(&self) -> impl Iterator<Item = &SpecialToken<T>> {
        [&self.unknown, &self.padding, &self.start, &self.end]
            .into_iter()
            .chain(self.mask.as_ref())
    }

    /// Is this id one of the special tokens?
    pub fn is_special(
        &self,
        id: T,
    ) -> bool {
        self.iter().any(|s| s.id == id)
    }
}
