//! # Error Types

/// Errors from piecemeal operations.
#[derive(Debug, thiserror::Error)]
pub enum PiecemealError {
    /// A vocabulary artifact failed structural validation.
    ///
    /// Fatal at load time; a partially loaded vocabulary is never used.
    #[error("corrupt vocabulary: {0}")]
    CorruptVocabulary(String),

    /// A single input exceeded the configured byte ceiling.
    #[error("input {index} is {size} bytes; the limit is {limit} bytes")]
    InputTooLarge {
        /// The position of the input in its batch.
        index: usize,
        /// The input size, in bytes.
        size: usize,
        /// The configured limit, in bytes.
        limit: usize,
    },

    /// Contradictory or unusable options.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Token value out of range for the target type.
    #[error("token value {value} out of range for the token type")]
    TokenOutOfRange {
        /// The value which did not fit.
        value: usize,
    },

    /// Decoding did not consume all tokens.
    #[error("incomplete decode: {remaining} remaining tokens")]
    IncompleteDecode {
        /// The number of remaining tokens.
        remaining: usize,
    },

    /// Too many calls are already in flight.
    #[error("overloaded: {in_flight} calls in flight, limit is {limit}")]
    Overloaded {
        /// Calls in flight when the call was rejected.
        in_flight: usize,
        /// The configured admission limit.
        limit: usize,
    },

    /// I/O error.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization error.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl PiecemealError {
    /// Build a [`PiecemealError::CorruptVocabulary`] from any message.
    pub fn corrupt<S: Into<String>>(msg: S) -> Self {
        Self::CorruptVocabulary(msg.into())
    }

    /// Build a [`PiecemealError::Configuration`] from any message.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Configuration(msg.into())
    }
}

/// Result type for piecemeal operations.
pub type PMResult<T> = core::result::Result<T, PiecemealError>;
