//! # `TokenDecoder` Result Types

use core::fmt::Debug;

use crate::{PMResult, PiecemealError};

/// The result of decoding tokens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodeResult<V>
where
    V: Debug,
{
    /// The count of tokens left undecoded, if any.
    pub remaining: Option<usize>,

    /// The decoded value.
    pub value: V,
}

impl<V> DecodeResult<V>
where
    V: Debug,
{
    /// Construct a new result.
    pub fn new(
        value: V,
        remaining: Option<usize>,
    ) -> Self {
        let remaining = remaining.filter(|&r| r > 0);
        Self { value, remaining }
    }

    /// Try to unwrap the result, returning an error if the decoding is incomplete.
    pub fn try_result(self) -> PMResult<V> {
        match self.remaining {
            Some(remaining) => Err(PiecemealError::IncompleteDecode { remaining }),
            None => Ok(self.value),
        }
    }

    /// Returns `true` if the decoding is complete.
    pub fn is_complete(&self) -> bool {
        self.remaining.is_none()
    }

    /// Convert the result using a conversion function.
    pub fn convert<F, U>(
        self,
        f: F,
    ) -> DecodeResult<U>
    where
        F: FnOnce(V) -> U,
        U: Debug,
    {
        DecodeResult {
            remaining: self.remaining,
            value: f(self.value),
        }
    }
}

/// The result of decoding a batch of token sequences.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchDecodeResult<V>
where
    V: Debug,
{
    /// The per-item results.
    pub results: Vec<DecodeResult<V>>,
}

impl<V: Debug> From<Vec<DecodeResult<V>>> for BatchDecodeResult<V> {
    fn from(results: Vec<DecodeResult<V>>) -> Self {
        Self { results }
    }
}

impl<V: Debug> BatchDecodeResult<V> {
    /// Is the decoding complete for all items?
    pub fn is_complete(&self) -> bool {
        self.results.iter().all(|r| r.is_complete())
    }

    /// Try to unwrap the results, returning an error if any decoding is incomplete.
    pub fn try_results(self) -> PMResult<Vec<V>> {
        self.results.into_iter().map(|r| r.try_result()).collect()
    }
}
