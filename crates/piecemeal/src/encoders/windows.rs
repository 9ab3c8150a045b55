//! # Stride Windows
//!
//! Splits one long content encoding into successive framed windows that
//! overlap by `stride` content tokens, for inputs longer than the model's
//! maximum sequence length.

use crate::{
    PMResult,
    PiecemealError,
    TokenType,
    encoders::{DEFAULT_MAX_INPUT_BYTES, EncodedExample, post_process::frame_range},
    vocab::SpecialTokens,
};

/// Window layout options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowOptions {
    /// The window length, inclusive of special tokens.
    pub max_length: usize,

    /// Content tokens shared by consecutive windows.
    pub stride: usize,

    /// Frame each window with the start and end tokens.
    pub add_special_tokens: bool,

    /// Reject inputs larger than this many bytes.
    pub max_input_bytes: Option<usize>,
}

impl WindowOptions {
    /// Create window options, framed with special tokens.
    pub fn new(
        max_length: usize,
        stride: usize,
    ) -> Self {
        Self {
            max_length,
            stride,
            add_special_tokens: true,
            max_input_bytes: Some(DEFAULT_MAX_INPUT_BYTES),
        }
    }

    /// Set whether windows are framed, and return the options.
    pub fn with_add_special_tokens(
        mut self,
        add_special_tokens: bool,
    ) -> Self {
        self.add_special_tokens = add_special_tokens;
        self
    }

    /// Set the per-input byte ceiling, and return the options.
    pub fn with_max_input_bytes<L>(
        mut self,
        max_input_bytes: L,
    ) -> Self
    where
        L: Into<Option<usize>>,
    {
        self.max_input_bytes = max_input_bytes.into();
        self
    }

    /// The content tokens per window.
    ///
    /// ## Returns
    /// A [`PiecemealError::Configuration`] if no window can advance.
    pub fn content_budget(&self) -> PMResult<usize> {
        let framing = if self.add_special_tokens { 2 } else { 0 };
        let budget = self.max_length.saturating_sub(framing);
        if budget == 0 {
            return Err(PiecemealError::config(format!(
                "max_length {} leaves no room for content",
                self.max_length
            )));
        }
        if self.stride >= budget {
            return Err(PiecemealError::config(format!(
                "stride {} must be less than the window content length {budget}",
                self.stride
            )));
        }
        Ok(budget)
    }
}

/// Split a raw content encoding into framed windows.
///
/// Always yields at least one window; an empty input yields one
/// window of framing only.
pub fn split_windows<T: TokenType>(
    specials: &SpecialTokens<T>,
    content: &EncodedExample<T>,
    options: &WindowOptions,
) -> PMResult<Vec<EncodedExample<T>>> {
    let budget = options.content_budget()?;
    let step = budget - options.stride;

    let mut windows = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + budget).min(content.len());
        windows.push(frame_range(
            specials,
            content,
            start..end,
            options.add_special_tokens,
        ));
        if end == content.len() {
            break;
        }
        start += step;
    }
    Ok(windows)
}
