use std::sync::Arc;

use piecemeal::{
    Tokenizer,
    TokenizerOptions,
    TokenizerVocab,
    VocabFormat,
    cache::CacheOptions,
    load_vocabulary_with,
    segmenters::SegmenterSelector,
    vocab::io::VocabTxtOptions,
};

/// Vocabulary selection arg group.
#[derive(clap::Args, Debug)]
pub struct VocabArgs {
    /// Vocabulary file: ``vocab.txt``, ``tokenizer.json``, or native JSON.
    #[arg(long)]
    vocab: String,

    /// Vocabulary file format.
    #[arg(long, default_value = "auto")]
    format: VocabFormat,

    /// Keep case and accents when reading a ``vocab.txt``.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    cased: bool,
}

impl VocabArgs {
    /// Load and validate the vocabulary.
    pub fn load_vocab(&self) -> Result<Arc<TokenizerVocab<u32>>, Box<dyn std::error::Error>> {
        let txt_options = VocabTxtOptions::default().with_lowercase(!self.cased);
        let vocab = load_vocabulary_with(&self.vocab, self.format, &txt_options)?;
        Ok(Arc::new(vocab))
    }
}

/// Tokenizer construction arg group.
#[derive(clap::Args, Debug)]
pub struct TokenizerArgs {
    #[command(flatten)]
    vocab: VocabArgs,

    /// Segmenter override; defaults to the vocabulary's model.
    #[arg(long, default_value = "model")]
    segmenter: SegmenterSelector,

    /// Encode batches on the calling thread only.
    #[arg(long, action = clap::ArgAction::SetTrue)]
    serial: bool,

    /// Cache this many content encodings; 0 disables the cache.
    #[arg(long, default_value_t = 0)]
    cache_entries: usize,
}

impl TokenizerArgs {
    /// The tokenizer options these args select.
    pub fn options(&self) -> Result<TokenizerOptions, Box<dyn std::error::Error>> {
        let cache = match self.cache_entries {
            0 => None,
            n => Some(CacheOptions::new(n, CacheOptions::default().max_bytes())?),
        };
        Ok(TokenizerOptions::default()
            .with_parallel(!self.serial)
            .with_cache(cache)
            .with_segmenter(self.segmenter))
    }

    /// Load the vocabulary, and build the tokenizer.
    pub fn load_tokenizer(&self) -> Result<Arc<Tokenizer<u32>>, Box<dyn std::error::Error>> {
        let vocab = self.vocab.load_vocab()?;
        self.options()?.build(vocab).map_err(Into::into)
    }
}
