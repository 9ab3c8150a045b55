//! # Segmenter Selector

use std::sync::Arc;

use crate::{
    PMResult,
    PiecemealError,
    TokenType,
    segmenters::{BpeSegmenter, SpanSegmenter, WordPieceSegmenter},
    vocab::ModelConfig,
};

/// A factory for fresh [`SpanSegmenter`] instances.
pub type SegmenterBuilder<T> = Arc<dyn Fn() -> Box<dyn SpanSegmenter<T>> + Send + Sync>;

/// Policy enum for selecting a [`SpanSegmenter`].
#[derive(
    Default,
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    serde::Serialize,
    serde::Deserialize,
    strum::EnumString,
    strum::Display
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
#[non_exhaustive]
pub enum SegmenterSelector {
    /// Follow the vocabulary's [`ModelConfig`].
    #[default]
    Model,

    /// Use the [`WordPieceSegmenter`].
    WordPiece,

    /// Use the [`BpeSegmenter`].
    Bpe,
}

impl SegmenterSelector {
    /// Resolve the selector against a model config.
    ///
    /// ## Returns
    /// [`SegmenterSelector::WordPiece`] or [`SegmenterSelector::Bpe`]; or a
    /// [`PiecemealError::Configuration`] if the selector names a segmenter
    /// other than the one the model declares.
    pub fn resolve(
        self,
        model: &ModelConfig,
    ) -> PMResult<Self> {
        match (self, model) {
            (Self::Model | Self::WordPiece, ModelConfig::WordPiece(_)) => Ok(Self::WordPiece),
            (Self::Model | Self::Bpe, ModelConfig::Bpe(_)) => Ok(Self::Bpe),
            (selector, model) => Err(PiecemealError::config(format!(
                "segmenter {selector} cannot run a {model} vocabulary"
            ))),
        }
    }

    /// Get a builder for the configured [`SpanSegmenter`].
    ///
    /// ## Returns
    /// The builder; or a [`PiecemealError::Configuration`] when the
    /// selector contradicts the model.
    pub fn segmenter_builder<T: TokenType>(
        self,
        model: &ModelConfig,
    ) -> PMResult<SegmenterBuilder<T>> {
        self.resolve(model)?;
        Ok(model_segmenter_builder(model))
    }
}

/// Get a builder for the [`SpanSegmenter`] a model declares.
pub fn model_segmenter_builder<T: TokenType>(model: &ModelConfig) -> SegmenterBuilder<T> {
    match model {
        ModelConfig::WordPiece(_) => Arc::new(|| Box::new(WordPieceSegmenter)),
        ModelConfig::Bpe(_) => Arc::new(|| Box::new(BpeSegmenter::<T>::default())),
    }
}
