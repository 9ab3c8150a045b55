//! # Serving Messages
//!
//! The JSON wire types of the serving adapter.

use serde::{Deserialize, Serialize};

use crate::{
    PiecemealError,
    TokenType,
    encoders::{EncodeOptions, EncodedBatch, PaddingStrategy},
    tokenizer::TextInput,
};

/// A padding override: a flag, or a strategy name.
///
/// `true` means [`PaddingStrategy::Longest`]; `false` means
/// [`PaddingStrategy::DoNotPad`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PaddingRequest {
    /// Pad to the longest row, or not at all.
    Flag(bool),

    /// An explicit strategy.
    Strategy(PaddingStrategy),
}

impl PaddingRequest {
    /// The requested strategy.
    pub fn strategy(self) -> PaddingStrategy {
        match self {
            Self::Flag(true) => PaddingStrategy::Longest,
            Self::Flag(false) => PaddingStrategy::DoNotPad,
            Self::Strategy(strategy) => strategy,
        }
    }
}

/// A tokenize request: text plus optional per-request overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TokenizeRequest {
    /// One text, or a batch.
    pub text: TextInput,

    /// Override framing with special tokens.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub add_special_tokens: Option<bool>,

    /// Override truncation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncation: Option<bool>,

    /// Override the maximum row length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<usize>,

    /// Override padding.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<PaddingRequest>,

    /// Include per-token byte offsets in the response.
    #[serde(default)]
    pub return_offsets: bool,
}

impl TokenizeRequest {
    /// A request for `text` with no overrides.
    pub fn new<I: Into<TextInput>>(text: I) -> Self {
        Self {
            text: text.into(),
            add_special_tokens: None,
            truncation: None,
            max_length: None,
            padding: None,
            return_offsets: false,
        }
    }

    /// Apply this request's overrides to the serving defaults.
    pub fn apply(
        &self,
        base: EncodeOptions,
    ) -> EncodeOptions {
        let mut options = base;
        if let Some(add_special_tokens) = self.add_special_tokens {
            options.set_add_special_tokens(add_special_tokens);
        }
        if let Some(truncation) = self.truncation {
            options.set_truncation(truncation);
        }
        if let Some(max_length) = self.max_length {
            options.set_max_length(max_length);
        }
        if let Some(padding) = self.padding {
            options.set_padding(padding.strategy());
        }
        options
    }
}

/// Per-row response values: flat for a single text, nested for a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Rows<V> {
    /// The value of a single-text request.
    Flat(V),

    /// One value per text of a batch request.
    Nested(Vec<V>),
}

impl<V: Default> Rows<V> {
    /// Shape row values to match the request.
    pub fn shape(
        single: bool,
        rows: Vec<V>,
    ) -> Self {
        if single {
            Self::Flat(rows.into_iter().next().unwrap_or_default())
        } else {
            Self::Nested(rows)
        }
    }
}

/// A successful tokenize response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenizeResponse<T> {
    /// The token ids.
    pub input_ids: Rows<Vec<T>>,

    /// 1 for real tokens, 0 for padding.
    pub attention_mask: Rows<Vec<u8>>,

    /// Segment ids.
    pub token_type_ids: Rows<Vec<u8>>,

    /// ``[start, end)`` byte offsets into the input, when requested.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offsets: Option<Rows<Vec<[usize; 2]>>>,
}

impl<T: TokenType> TokenizeResponse<T> {
    /// Build a response from an encoded batch.
    ///
    /// ## Arguments
    /// * `batch` - the encoded rows.
    /// * `single` - the request was a single text.
    /// * `with_offsets` - include offsets.
    pub fn from_batch(
        batch: EncodedBatch<T>,
        single: bool,
        with_offsets: bool,
    ) -> Self {
        let rows = batch.into_rows();
        let offsets = with_offsets.then(|| {
            Rows::shape(
                single,
                rows.iter()
                    .map(|r| r.offsets.iter().map(|o| [o.start, o.end]).collect())
                    .collect(),
            )
        });

        let mut input_ids = Vec::with_capacity(rows.len());
        let mut attention_mask = Vec::with_capacity(rows.len());
        let mut token_type_ids = Vec::with_capacity(rows.len());
        for row in rows {
            input_ids.push(row.ids);
            attention_mask.push(row.attention_mask);
            token_type_ids.push(row.token_type_ids);
        }

        Self {
            input_ids: Rows::shape(single, input_ids),
            attention_mask: Rows::shape(single, attention_mask),
            token_type_ids: Rows::shape(single, token_type_ids),
            offsets,
        }
    }
}

/// The error classes of the serving adapter.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ErrorKind {
    /// The payload did not parse as a request.
    MalformedRequest,

    /// The request's options conflict.
    Configuration,

    /// An input exceeded the byte ceiling.
    InputTooLarge,

    /// Too many calls in flight.
    Overloaded,

    /// Anything else.
    Internal,
}

impl ErrorKind {
    /// The HTTP-style status code for this kind.
    pub fn status(self) -> u16 {
        match self {
            Self::MalformedRequest | Self::Configuration => 400,
            Self::InputTooLarge => 413,
            Self::Overloaded => 503,
            Self::Internal => 500,
        }
    }
}

impl From<&PiecemealError> for ErrorKind {
    fn from(err: &PiecemealError) -> Self {
        match err {
            PiecemealError::Json(_) => Self::MalformedRequest,
            PiecemealError::Configuration(_) => Self::Configuration,
            PiecemealError::InputTooLarge { .. } => Self::InputTooLarge,
            PiecemealError::Overloaded { .. } => Self::Overloaded,
            PiecemealError::CorruptVocabulary(_)
            | PiecemealError::TokenOutOfRange { .. }
            | PiecemealError::IncompleteDecode { .. }
            | PiecemealError::Io(_) => Self::Internal,
        }
    }
}

/// An error response body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// The HTTP-style status code.
    pub status: u16,

    /// The error class.
    pub kind: ErrorKind,

    /// A human readable message.
    pub message: String,
}

impl From<&PiecemealError> for ErrorResponse {
    fn from(err: &PiecemealError) -> Self {
        let kind = ErrorKind::from(err);
        Self {
            status: kind.status(),
            kind,
            message: err.to_string(),
        }
    }
}
