//! # Serving Adapter
//!
//! Bridges request payloads to a shared [`Tokenizer`]; the transport
//! (routing, sockets) belongs to the host process.

use core::num::NonZeroUsize;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::{
    PMResult,
    PiecemealError,
    TokenType,
    encoders::{EncodeOptions, PaddingStrategy},
    serving::{
        AdmissionGate,
        ErrorResponse,
        TokenizeRequest,
        TokenizeResponse,
        default_admission_limit,
    },
    tokenizer::Tokenizer,
};

/// Options for a [`ServingAdapter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServingOptions {
    /// Encode options applied before per-request overrides.
    pub encode: EncodeOptions,

    /// Maximum concurrent calls; the default scales with parallelism.
    pub max_in_flight: Option<NonZeroUsize>,
}

impl Default for ServingOptions {
    fn default() -> Self {
        Self {
            encode: EncodeOptions::default().with_padding(PaddingStrategy::Longest),
            max_in_flight: None,
        }
    }
}

impl ServingOptions {
    /// Set the base encode options, and return the options.
    pub fn with_encode(
        mut self,
        encode: EncodeOptions,
    ) -> Self {
        self.encode = encode;
        self
    }

    /// Set the in-flight limit, and return the options.
    pub fn with_max_in_flight<L>(
        mut self,
        max_in_flight: L,
    ) -> Self
    where
        L: Into<Option<NonZeroUsize>>,
    {
        self.max_in_flight = max_in_flight.into();
        self
    }

    /// The effective in-flight limit.
    pub fn effective_max_in_flight(&self) -> NonZeroUsize {
        self.max_in_flight.unwrap_or_else(default_admission_limit)
    }
}

/// A serialized response: a status code and a JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServingResponse {
    /// The HTTP-style status code.
    pub status: u16,

    /// The JSON body.
    pub body: Vec<u8>,
}

impl ServingResponse {
    /// Is this a success response?
    pub fn is_success(&self) -> bool {
        self.status == 200
    }

    fn from_error(err: &PiecemealError) -> Self {
        let body = ErrorResponse::from(err);
        let status = body.status;
        match serde_json::to_vec(&body) {
            Ok(body) => Self { status, body },
            Err(_) => Self {
                status,
                body: err.to_string().into_bytes(),
            },
        }
    }
}

/// A request-level front end over a shared [`Tokenizer`].
#[derive(Debug)]
pub struct ServingAdapter<T: TokenType> {
    tokenizer: Arc<Tokenizer<T>>,
    options: ServingOptions,
    gate: AdmissionGate,
}

impl<T: TokenType> ServingAdapter<T> {
    /// Create an adapter.
    pub fn new(
        tokenizer: Arc<Tokenizer<T>>,
        options: ServingOptions,
    ) -> Self {
        let gate = AdmissionGate::new(options.effective_max_in_flight());
        log::info!(
            "serving adapter: max_in_flight={}, encode={:?}",
            gate.limit(),
            options.encode
        );
        Self {
            tokenizer,
            options,
            gate,
        }
    }

    /// The shared tokenizer.
    pub fn tokenizer(&self) -> &Arc<Tokenizer<T>> {
        &self.tokenizer
    }

    /// The adapter options.
    pub fn options(&self) -> &ServingOptions {
        &self.options
    }

    /// The admission gate.
    pub fn admission(&self) -> &AdmissionGate {
        &self.gate
    }

    /// Handle a parsed request.
    #[cfg_attr(feature = "tracing", tracing::instrument(skip(self, request)))]
    pub fn handle(
        &self,
        request: &TokenizeRequest,
    ) -> PMResult<TokenizeResponse<T>> {
        let _permit = self.gate.try_acquire()?;

        let options = request.apply(self.options.encode);
        let batch = self.tokenizer.encode_input(&request.text, &options)?;

        Ok(TokenizeResponse::from_batch(
            batch,
            request.text.is_single(),
            request.return_offsets,
        ))
    }
}

impl<T: TokenType + Serialize> ServingAdapter<T> {
    /// Handle a raw JSON payload.
    ///
    /// Never fails: every error maps to a status and an [`ErrorResponse`] body.
    pub fn handle_json(
        &self,
        payload: &[u8],
    ) -> ServingResponse {
        let result = serde_json::from_slice::<TokenizeRequest>(payload)
            .map_err(PiecemealError::from)
            .and_then(|request| self.handle(&request))
            .and_then(|response| serde_json::to_vec(&response).map_err(PiecemealError::from));

        match result {
            Ok(body) => ServingResponse { status: 200, body },
            Err(err) => {
                log::debug!("request failed: {err}");
                ServingResponse::from_error(&err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        serving::{ErrorKind, Rows},
        vocab::testing::build_test_wordpiece_vocab,
    };

    fn adapter(options: ServingOptions) -> ServingAdapter<u32> {
        let tokenizer = Tokenizer::from_vocab(Arc::new(build_test_wordpiece_vocab()));
        ServingAdapter::new(tokenizer, options)
    }

    fn json(resp: &ServingResponse) -> serde_json::Value {
        serde_json::from_slice(&resp.body).unwrap()
    }

    #[test]
    fn test_single_and_batch() {
        let adapter = adapter(ServingOptions::default());

        let resp = adapter.handle_json(br#"{"text": "playing"}"#);
        assert!(resp.is_success());
        assert_eq!(json(&resp)["input_ids"], serde_json::json!([2, 4, 5, 3]));

        let resp = adapter.handle_json(br#"{"text": ["playing", "xyz"]}"#);
        assert_eq!(resp.status, 200);
        assert_eq!(
            json(&resp),
            serde_json::json!({
                "input_ids": [[2, 4, 5, 3], [2, 0, 3, 1]],
                "attention_mask": [[1, 1, 1, 1], [1, 1, 1, 0]],
                "token_type_ids": [[0, 0, 0, 0], [0, 0, 0, 0]],
            })
        );

        let resp = adapter.handle_json(br#"{"text": []}"#);
        assert_eq!(json(&resp)["input_ids"], serde_json::json!([]));
    }

    #[test]
    fn test_overrides_and_offsets() {
        let adapter = adapter(ServingOptions::default());
        let mut req = TokenizeRequest::new("the cat sat");
        req.max_length = Some(3);
        req.return_offsets = true;
        let resp = adapter.handle(&req).unwrap();
        assert_eq!(resp.input_ids, Rows::Flat(vec![2, 7, 3]));
        assert_eq!(resp.offsets, Some(Rows::Flat(vec![[0, 0], [0, 3], [0, 0]])));
    }

    #[test]
    fn test_error_statuses() {
        let adapter = adapter(
            ServingOptions::default()
                .with_encode(EncodeOptions::default().with_max_input_bytes(8)),
        );

        let cases: [(&[u8], u16, ErrorKind); 4] = [
            (b"not json", 400, ErrorKind::MalformedRequest),
            (br#"{"texts": "x"}"#, 400, ErrorKind::MalformedRequest),
            (br#"{"text": "x", "max_length": 0}"#, 400, ErrorKind::Configuration),
            (br#"{"text": ["ok", "far too long"]}"#, 413, ErrorKind::InputTooLarge),
        ];
        for (payload, status, kind) in cases {
            let resp = adapter.handle_json(payload);
            assert_eq!(resp.status, status);
            let body: ErrorResponse = serde_json::from_slice(&resp.body).unwrap();
            assert_eq!(body.kind, kind);
            assert_eq!(body.status, status);
        }
    }

    #[test]
    fn test_overloaded() {
        let adapter = adapter(ServingOptions::default().with_max_in_flight(NonZeroUsize::new(1)));
        assert_eq!(adapter.admission().limit(), 1);

        let held = adapter.admission().try_acquire().unwrap();
        let resp = adapter.handle_json(br#"{"text": "x"}"#);
        assert_eq!(resp.status, 503);
        drop(held);

        assert!(adapter.handle_json(br#"{"text": "x"}"#).is_success());
        assert_eq!(adapter.admission().in_flight(), 0);
    }

    #[test]
    fn test_concurrent_calls() {
        let adapter = Arc::new(adapter(ServingOptions::default()));
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let adapter = adapter.clone();
                std::thread::spawn(move || {
                    let req = TokenizeRequest::new(vec!["playing".to_string(); 8]);
                    for _ in 0..50 {
                        match adapter.handle(&req) {
                            Ok(resp) => {
                                assert_eq!(resp.input_ids, Rows::Nested(vec![vec![2, 4, 5, 3]; 8]))
                            }
                            Err(PiecemealError::Overloaded { .. }) => {}
                            Err(err) => panic!("unexpected: {err}"),
                        }
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
    }
}
