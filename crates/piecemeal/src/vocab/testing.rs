//! # Vocabulary Test Utilities

use crate::{
    TokenType,
    normalize::NormalizerConfig,
    vocab::{BpeConfig, ModelConfig, SpecialTokenNames, TokenizerVocab, WordVocab},
};

/// The tokens of [`build_test_wordpiece_vocab`], in id order.
pub const TEST_WORDPIECE_TOKENS: &[&str] = &[
    "[UNK]", "[PAD]", "[CLS]", "[SEP]", "play", "##ing", "##ed", "the", "cat", "sat", "on", "mat",
    "hello", "world", ".", ",", "!", "'", "un", "##aff", "##able", "t", "[MASK]",
];

/// Build a small BERT-style uncased `WordPiece` vocabulary.
///
/// `"playing"` encodes to ``[CLS] play ##ing [SEP]`` = ``[2, 4, 5, 3]``.
pub fn build_test_wordpiece_vocab<T: TokenType>() -> TokenizerVocab<T> {
    build_wordpiece_vocab(TEST_WORDPIECE_TOKENS, NormalizerConfig::bert_uncased())
        .expect("test vocab is valid")
}

/// Build a BERT-style `WordPiece` vocabulary from a token list.
pub fn build_wordpiece_vocab<T: TokenType>(
    tokens: &[&str],
    normalizer: NormalizerConfig,
) -> crate::PMResult<TokenizerVocab<T>> {
    let names = if tokens.contains(&"[MASK]") {
        SpecialTokenNames::bert().with_mask(Some("[MASK]"))
    } else {
        SpecialTokenNames::bert()
    };
    TokenizerVocab::new(
        ModelConfig::default(),
        WordVocab::from_tokens(tokens.iter().copied())?,
        &[],
        names,
        vec![],
        normalizer,
    )
}

/// Build a small RoBERTa-named, codepoint BPE vocabulary.
///
/// Merges: ``l o``, ``lo w``, ``e r``, ``low er``, ``n e``, ``ne w``.
pub fn build_test_bpe_vocab<T: TokenType>() -> TokenizerVocab<T> {
    let tokens = [
        "<unk>", "<pad>", "<s>", "</s>", "l", "o", "w", "e", "r", "n", "s", "t", "lo", "low", "er",
        "lower", "ne", "new",
    ];
    let merges: Vec<(String, String)> = [
        ("l", "o"),
        ("lo", "w"),
        ("e", "r"),
        ("low", "er"),
        ("n", "e"),
        ("ne", "w"),
    ]
    .iter()
    .map(|(a, b)| (a.to_string(), b.to_string()))
    .collect();

    TokenizerVocab::new(
        ModelConfig::Bpe(BpeConfig::default()),
        WordVocab::from_tokens(tokens).expect("test vocab is valid"),
        &merges,
        SpecialTokenNames::roberta(),
        vec![],
        NormalizerConfig::passthrough(),
    )
    .expect("test vocab is valid")
}
