//! # Encoder Test Utilities

use std::sync::Arc;

use crate::{
    PiecemealError,
    TokenType,
    decoders::{PieceDecoder, TokenDecoder},
    encoders::{
        DEFAULT_MAX_INPUT_BYTES,
        EncodeOptions,
        PaddingStrategy,
        TokenEncoder,
        WindowOptions,
    },
    types::static_is_send_sync_check,
};

/// Sample texts shared by the common encoder tests.
pub const COMMON_SAMPLES: &[&str] = &[
    "the cat sat on the mat.",
    "hello, world!",
    "",
    "playing unaffable lower new",
];

/// Common [`TokenEncoder`] tests.
///
/// Checks, for any encoder:
/// * batch rows match single encodes, in order,
/// * padding yields a rectangular batch,
/// * decoding is complete, and recovers `WordPiece` samples exactly,
/// * every entry point rejects oversized inputs.
pub fn common_encoder_tests<T: TokenType, E: TokenEncoder<T>>(encoder: &E) {
    static_is_send_sync_check(encoder);

    let samples: Vec<String> = COMMON_SAMPLES.iter().map(|s| s.to_string()).collect();
    let options = EncodeOptions::default();

    let batch = encoder.try_encode_batch(&samples, &options).unwrap();
    assert_eq!(batch.len(), samples.len());
    for (text, row) in samples.iter().zip(batch.iter()) {
        let single = encoder
            .try_encode_batch(core::slice::from_ref(text), &options)
            .unwrap();
        assert_eq!(&single.rows[0], row);
        assert_eq!(row.ids.len(), row.offsets.len());
        assert_eq!(row.ids.len(), row.attention_mask.len());
    }

    let padded = encoder
        .try_encode_batch(&samples, &options.with_padding(PaddingStrategy::Longest))
        .unwrap();
    assert!(padded.is_rectangular());
    for (row, padded_row) in batch.iter().zip(padded.iter()) {
        assert_eq!(padded_row.real_len(), row.len());
        assert_eq!(&padded_row.ids[..row.len()], &row.ids[..]);
    }

    let decoder = PieceDecoder::new(Arc::clone(encoder.vocab()));
    static_is_send_sync_check(&decoder);
    let decoded = decoder
        .try_decode_to_string(&batch.rows[0].ids)
        .unwrap()
        .try_result()
        .unwrap();
    if !encoder.vocab().model().is_bpe() {
        assert_eq!(decoded, "the cat sat on the mat.");
    }

    let empty = encoder.try_encode_batch(&[], &options).unwrap();
    assert!(empty.is_empty());

    oversized_input_tests(encoder);
}

/// Check that every public encode entry point rejects an input over the
/// default byte ceiling with [`PiecemealError::InputTooLarge`].
pub fn oversized_input_tests<T: TokenType, E: TokenEncoder<T>>(encoder: &E) {
    let size = DEFAULT_MAX_INPUT_BYTES + 20;
    let big = "a".repeat(size);
    let too_large = |result: Result<(), PiecemealError>, index: usize| match result {
        Err(PiecemealError::InputTooLarge {
            index: i,
            size: s,
            limit,
        }) => {
            assert_eq!((i, s, limit), (index, size, DEFAULT_MAX_INPUT_BYTES));
        }
        other => panic!("expected InputTooLarge, got {other:?}"),
    };

    too_large(encoder.try_encode(&big).map(|_| ()), 0);

    let batch = vec!["the cat".to_string(), big.clone()];
    too_large(encoder.try_encode_examples(&batch).map(|_| ()), 1);
    too_large(
        encoder
            .try_encode_batch(&batch, &EncodeOptions::default())
            .map(|_| ()),
        1,
    );
    too_large(
        encoder
            .try_encode_windows(&big, &WindowOptions::new(512, 128))
            .map(|_| ()),
        0,
    );
}
