//! # Serving Adapter
//!
//! [`ServingAdapter`] accepts `{"text": string | [string], ...overrides}`
//! payloads, encodes them with a shared [`Tokenizer`](crate::tokenizer::Tokenizer),
//! and answers with `input_ids`, `attention_mask`, `token_type_ids`, and
//! optional `offsets`: flat for a single text, nested for a batch.
//!
//! Errors map to statuses:
//! * malformed payload, configuration error - 400,
//! * input too large - 413,
//! * overloaded ([`AdmissionGate`]) - 503,
//! * anything else - 500.

mod adapter;
mod admission;
mod messages;

#[doc(inline)]
pub use adapter::*;
#[doc(inline)]
pub use admission::*;
#[doc(inline)]
pub use messages::*;
