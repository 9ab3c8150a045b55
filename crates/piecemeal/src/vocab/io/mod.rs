//! # Vocabulary IO
//!
//! ## Loading A Vocab
//!
//! ```rust,no_run
//! use piecemeal::{
//!     PMResult,
//!     vocab::{TokenizerVocab, io::load_vocabulary},
//! };
//!
//! fn example() -> PMResult<TokenizerVocab<u32>> {
//!     load_vocabulary("bert-base-uncased/tokenizer.json")
//! }
//! ```
//!
//! Three formats are understood:
//! * [`VocabFormat::Native`] - the [`VocabArtifact`] JSON form,
//! * [`VocabFormat::VocabTxt`] - BERT ``vocab.txt``,
//! * [`VocabFormat::TokenizerJson`] - Hugging Face ``tokenizer.json``.

mod artifact;
mod tokenizer_json;
mod vocab_txt;

use std::{fs, path::Path};

#[doc(inline)]
pub use artifact::*;
#[doc(inline)]
pub use tokenizer_json::*;
#[doc(inline)]
pub use vocab_txt::*;

use crate::{
    PMResult,
    PiecemealError,
    types::TokenType,
    vocab::TokenizerVocab,
};

/// On-disk vocabulary formats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, strum::Display, strum::EnumString)]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum VocabFormat {
    /// Detect from the file name and contents.
    #[default]
    Auto,

    /// Native [`VocabArtifact`] JSON.
    Native,

    /// BERT ``vocab.txt``.
    VocabTxt,

    /// Hugging Face ``tokenizer.json``.
    TokenizerJson,
}

impl VocabFormat {
    /// Resolve [`VocabFormat::Auto`] for a file.
    ///
    /// ``*.txt`` files are ``vocab.txt``; JSON with a top-level
    /// ``"version"`` key is ``tokenizer.json``; other JSON is native.
    pub fn detect(
        self,
        path: &Path,
        contents: &str,
    ) -> Self {
        if self != Self::Auto {
            return self;
        }
        if path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
        {
            return Self::VocabTxt;
        }
        match serde_json::from_str::<serde_json::Value>(contents) {
            Ok(serde_json::Value::Object(map)) if map.contains_key("version") => {
                Self::TokenizerJson
            }
            Ok(_) => Self::Native,
            Err(_) if !contents.trim_start().starts_with('{') => Self::VocabTxt,
            Err(_) => Self::Native,
        }
    }
}

/// Read a vocabulary artifact from a path, in the given format.
///
/// ## Arguments
/// * `path` - the file.
/// * `format` - the format, or [`VocabFormat::Auto`].
/// * `txt_options` - options used when the format is ``vocab.txt``.
pub fn load_artifact<P: AsRef<Path>>(
    path: P,
    format: VocabFormat,
    txt_options: &VocabTxtOptions,
) -> PMResult<VocabArtifact> {
    let path = path.as_ref();
    let contents = String::from_utf8(fs::read(path)?).map_err(|e| {
        PiecemealError::corrupt(format!("{}: not valid UTF-8: {e}", path.display()))
    })?;
    let format = format.detect(path, &contents);
    log::debug!("loading {format} vocabulary from {}", path.display());

    match format {
        VocabFormat::VocabTxt => read_vocab_txt(contents.as_bytes(), txt_options),
        VocabFormat::TokenizerJson => tokenizer_json_from_str(&contents),
        VocabFormat::Native | VocabFormat::Auto => VocabArtifact::from_json_str(&contents),
    }
}

/// Load and validate a vocabulary, detecting its format.
///
/// ## Returns
/// The vocabulary, or [`PiecemealError::CorruptVocabulary`] if the
/// artifact fails validation.
pub fn load_vocabulary<T: TokenType, P: AsRef<Path>>(path: P) -> PMResult<TokenizerVocab<T>> {
    load_vocabulary_with(path, VocabFormat::Auto, &VocabTxtOptions::default())
}

/// Load and validate a vocabulary with an explicit format.
pub fn load_vocabulary_with<T: TokenType, P: AsRef<Path>>(
    path: P,
    format: VocabFormat,
    txt_options: &VocabTxtOptions,
) -> PMResult<TokenizerVocab<T>> {
    let path = path.as_ref();
    let vocab = load_artifact(path, format, txt_options)?
        .into_vocab()
        .map_err(|e| match e {
            PiecemealError::CorruptVocabulary(msg) => {
                PiecemealError::CorruptVocabulary(format!("{}: {msg}", path.display()))
            }
            e => e,
        })?;
    log::info!(
        "loaded vocabulary {} ({} entries, {})",
        path.display(),
        vocab.len(),
        vocab.model()
    );
    Ok(vocab)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write(
        dir: &tempdir::TempDir,
        name: &str,
        contents: &str,
    ) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = fs::File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn test_format_parse() {
        assert_eq!("auto".parse::<VocabFormat>().unwrap(), VocabFormat::Auto);
        assert_eq!(
            "vocab-txt".parse::<VocabFormat>().unwrap(),
            VocabFormat::VocabTxt
        );
        assert_eq!(
            "Tokenizer-JSON".parse::<VocabFormat>().unwrap(),
            VocabFormat::TokenizerJson
        );
        assert_eq!(VocabFormat::Native.to_string(), "native");
    }

    #[test]
    fn test_detect() {
        let auto = VocabFormat::Auto;
        assert_eq!(
            auto.detect(Path::new("vocab.txt"), "[PAD]\n"),
            VocabFormat::VocabTxt
        );
        assert_eq!(
            auto.detect(Path::new("tokenizer.json"), r#"{"version": "1.0"}"#),
            VocabFormat::TokenizerJson
        );
        assert_eq!(
            auto.detect(Path::new("vocab.json"), r#"{"vocab": []}"#),
            VocabFormat::Native
        );
        assert_eq!(
            auto.detect(Path::new("vocab"), "[PAD]\n[UNK]\n"),
            VocabFormat::VocabTxt
        );
        assert_eq!(
            VocabFormat::Native.detect(Path::new("vocab.txt"), ""),
            VocabFormat::Native
        );
    }

    #[test]
    fn test_load_vocabulary() {
        let dir = tempdir::TempDir::new("piecemeal").unwrap();
        let path = write(&dir, "vocab.txt", "[UNK]\n[PAD]\n[CLS]\n[SEP]\nplay\n##ing\n");

        let vocab: TokenizerVocab<u32> = load_vocabulary(&path).unwrap();
        assert_eq!(vocab.len(), 6);
        assert_eq!(vocab.lookup("##ing"), Some(5));
    }

    #[test]
    fn test_load_corrupt_vocabulary() {
        let dir = tempdir::TempDir::new("piecemeal").unwrap();
        let path = write(
            &dir,
            "vocab.json",
            r#"{"vocab": [["[UNK]", 0], ["[PAD]", 1], ["[CLS]", 1], ["[SEP]", 3]]}"#,
        );

        let err = load_vocabulary::<u32, _>(&path).unwrap_err();
        assert!(matches!(err, PiecemealError::CorruptVocabulary(_)));
    }

    #[test]
    fn test_load_invalid_utf8() {
        let dir = tempdir::TempDir::new("piecemeal").unwrap();
        let path = dir.path().join("vocab.txt");
        fs::write(&path, [b'[', b'U', b'N', b'K', b']', b'\n', 0xFF, 0xFE, b'\n']).unwrap();

        for format in [VocabFormat::Auto, VocabFormat::VocabTxt, VocabFormat::Native] {
            let err =
                load_vocabulary_with::<u32, _>(&path, format, &VocabTxtOptions::default())
                    .unwrap_err();
            match err {
                PiecemealError::CorruptVocabulary(msg) => assert!(msg.contains("vocab.txt")),
                err => panic!("{format}: {err:?}"),
            }
        }
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_vocabulary::<u32, _>("/nonexistent/vocab.txt").unwrap_err();
        assert!(matches!(err, PiecemealError::Io(_)));
    }
}
