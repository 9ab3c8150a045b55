//! # BERT ``vocab.txt`` Loader
//!
//! One token per line; the id of a token is its line number.

use std::{
    fs::File,
    io::{self, BufRead, BufReader},
    path::Path,
};

use crate::{
    PMResult,
    PiecemealError,
    normalize::NormalizerConfig,
    vocab::{ModelConfig, SpecialTokenNames, io::VocabArtifact},
};

/// The conventional BERT mask token name.
pub const BERT_MASK_TOKEN: &str = "[MASK]";

/// Options for reading a ``vocab.txt`` file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VocabTxtOptions {
    /// Lowercase and strip accents from input text (uncased models).
    pub lowercase: bool,

    /// The special token names.
    pub special_tokens: SpecialTokenNames,
}

impl Default for VocabTxtOptions {
    fn default() -> Self {
        Self {
            lowercase: true,
            special_tokens: SpecialTokenNames::bert(),
        }
    }
}

impl VocabTxtOptions {
    /// Set `lowercase`.
    pub fn with_lowercase(
        self,
        lowercase: bool,
    ) -> Self {
        Self { lowercase, ..self }
    }

    /// Set the special token names.
    pub fn with_special_tokens(
        self,
        special_tokens: SpecialTokenNames,
    ) -> Self {
        Self {
            special_tokens,
            ..self
        }
    }
}

/// Read a ``vocab.txt`` into a [`VocabArtifact`].
///
/// ## Arguments
/// * `reader` - the file contents.
/// * `options` - casing and special token names.
///
/// ## Returns
/// The artifact; or [`PiecemealError::CorruptVocabulary`] on an empty
/// line before the end of the file.
pub fn read_vocab_txt<R: BufRead>(
    reader: R,
    options: &VocabTxtOptions,
) -> PMResult<VocabArtifact> {
    let mut vocab: Vec<(String, usize)> = Vec::new();
    let mut blank_at: Option<usize> = None;

    for (idx, line) in reader.lines().enumerate() {
        let line = line.map_err(|e| match e.kind() {
            io::ErrorKind::InvalidData => {
                PiecemealError::corrupt(format!("vocab.txt line {} is not valid UTF-8", idx + 1))
            }
            _ => e.into(),
        })?;
        let token = line.trim_end_matches(['\r', '\n']);
        if token.is_empty() {
            blank_at.get_or_insert(idx);
            continue;
        }
        if let Some(blank) = blank_at {
            return Err(PiecemealError::corrupt(format!(
                "vocab.txt has an empty line at line {}",
                blank + 1
            )));
        }
        vocab.push((token.to_string(), idx));
    }

    let mut special_tokens = options.special_tokens.clone();
    if special_tokens.mask.is_none() && vocab.iter().any(|(t, _)| t == BERT_MASK_TOKEN) {
        special_tokens.mask = Some(BERT_MASK_TOKEN.to_string());
    }

    let normalizer = if options.lowercase {
        NormalizerConfig::bert_uncased()
    } else {
        NormalizerConfig::bert_cased()
    };

    Ok(VocabArtifact {
        model: ModelConfig::default(),
        special_tokens,
        vocab,
        merges: Vec::new(),
        normalizer,
        added_tokens: Vec::new(),
    })
}

/// Read a ``vocab.txt`` file into a [`VocabArtifact`].
pub fn load_vocab_txt_path<P: AsRef<Path>>(
    path: P,
    options: &VocabTxtOptions,
) -> PMResult<VocabArtifact> {
    read_vocab_txt(BufReader::new(File::open(path)?), options)
}
