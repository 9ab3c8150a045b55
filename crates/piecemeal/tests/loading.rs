#![allow(missing_docs)]

use std::{fs, path::Path, sync::Arc};

use piecemeal::{
    PiecemealError,
    Tokenizer,
    TokenizerVocab,
    VocabFormat,
    decoders::TokenDecoder,
    encode_batch,
    encoders::{EncodeOptions, TokenEncoder},
    load_vocabulary,
    load_vocabulary_with,
    vocab::io::{VocabTxtOptions, save_vocabulary_path},
};
use tempdir::TempDir;

const VOCAB_TXT: &str = "[UNK]\n[PAD]\n[CLS]\n[SEP]\nplay\n##ing\n##ed\nthe\ncat\n";

const TOKENIZER_JSON: &str = r###"{
    "version": "1.0",
    "added_tokens": [
        {"id": 0, "content": "[UNK]", "normalized": false, "special": true},
        {"id": 1, "content": "[PAD]", "normalized": false, "special": true},
        {"id": 2, "content": "[CLS]", "normalized": false, "special": true},
        {"id": 3, "content": "[SEP]", "normalized": false, "special": true}
    ],
    "normalizer": {"type": "BertNormalizer", "clean_text": true, "handle_chinese_chars": true, "strip_accents": null, "lowercase": true},
    "pre_tokenizer": {"type": "BertPreTokenizer"},
    "model": {
        "type": "WordPiece",
        "unk_token": "[UNK]",
        "continuing_subword_prefix": "##",
        "vocab": {"[UNK]": 0, "[PAD]": 1, "[CLS]": 2, "[SEP]": 3, "play": 4, "##ing": 5, "##ed": 6, "the": 7, "cat": 8}
    }
}"###;

fn write(
    dir: &Path,
    name: &str,
    contents: &str,
) -> std::path::PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn check_known_rows(vocab: TokenizerVocab<u32>) {
    let vocab = Arc::new(vocab);
    let batch = encode_batch(
        vocab.clone(),
        &["playing".to_string(), "xyz".to_string()],
        &EncodeOptions::default(),
    )
    .unwrap();
    assert_eq!(batch.rows[0].ids, vec![2, 4, 5, 3]);
    assert_eq!(batch.rows[1].ids, vec![2, 0, 3]);

    let empty = encode_batch(vocab, &[], &EncodeOptions::default()).unwrap();
    assert_eq!(empty.len(), 0);
}

#[test]
fn test_load_vocab_txt() {
    let dir = TempDir::new("piecemeal").unwrap();
    let path = write(dir.path(), "vocab.txt", VOCAB_TXT);
    let vocab: TokenizerVocab<u32> = load_vocabulary(&path).unwrap();
    assert_eq!(vocab.len(), 9);
    check_known_rows(vocab);
}

#[test]
fn test_load_tokenizer_json() {
    let dir = TempDir::new("piecemeal").unwrap();
    let path = write(dir.path(), "tokenizer.json", TOKENIZER_JSON);
    let vocab: TokenizerVocab<u32> = load_vocabulary(&path).unwrap();
    check_known_rows(vocab);
}

#[test]
fn test_native_artifact_round_trip() {
    let dir = TempDir::new("piecemeal").unwrap();
    let txt = write(dir.path(), "vocab.txt", VOCAB_TXT);
    let vocab: TokenizerVocab<u32> = load_vocabulary(&txt).unwrap();

    let native = dir.path().join("vocab.json");
    save_vocabulary_path(&vocab, &native).unwrap();
    let reloaded: TokenizerVocab<u32> =
        load_vocabulary_with(&native, VocabFormat::Native, &VocabTxtOptions::default()).unwrap();

    assert_eq!(reloaded.len(), vocab.len());
    assert_eq!(reloaded.model(), vocab.model());
    assert_eq!(reloaded.specials(), vocab.specials());
    assert_eq!(reloaded.normalizer_config(), vocab.normalizer_config());
    check_known_rows(reloaded);
}

#[test]
fn test_cased_vocab_txt() {
    let dir = TempDir::new("piecemeal").unwrap();
    let path = write(dir.path(), "vocab.txt", VOCAB_TXT);
    let vocab: TokenizerVocab<u32> = load_vocabulary_with(
        &path,
        VocabFormat::VocabTxt,
        &VocabTxtOptions::default().with_lowercase(false),
    )
    .unwrap();

    let tokenizer = Tokenizer::from_vocab(Arc::new(vocab));
    assert_eq!(tokenizer.try_encode("The cat").unwrap().ids, vec![0, 8]);
}

#[test]
fn test_decode_loaded() {
    let dir = TempDir::new("piecemeal").unwrap();
    let path = write(dir.path(), "vocab.txt", VOCAB_TXT);
    let tokenizer = Tokenizer::from_vocab(Arc::new(load_vocabulary::<u32, _>(&path).unwrap()));

    let text = tokenizer
        .try_decode_to_string(&[2, 7, 8, 4, 6, 3])
        .unwrap()
        .try_result()
        .unwrap();
    assert_eq!(text, "the cat played");
}

#[test]
fn test_corrupt_vocabularies() {
    let dir = TempDir::new("piecemeal").unwrap();

    let duplicate_id = write(
        dir.path(),
        "dup.json",
        r#"{"vocab": [["[UNK]", 0], ["[PAD]", 1], ["[CLS]", 2], ["[SEP]", 3], ["a", 3]]}"#,
    );
    let gap = write(dir.path(), "gap.txt", "[UNK]\n[PAD]\n\n[CLS]\n[SEP]\n");
    let missing_special = write(dir.path(), "missing.txt", "[UNK]\n[PAD]\n[CLS]\n");
    let not_json = write(dir.path(), "bad.json", "{\"vocab\": [");

    for path in [duplicate_id, gap, missing_special, not_json] {
        let result = load_vocabulary::<u32, _>(&path);
        assert!(
            matches!(result, Err(PiecemealError::CorruptVocabulary(_))),
            "{}: {result:?}",
            path.display()
        );
    }

    let not_utf8 = dir.path().join("vocab.txt");
    fs::write(&not_utf8, [0xFF, 0xFE]).unwrap();
    let result = load_vocabulary::<u32, _>(&not_utf8);
    assert!(
        matches!(result, Err(PiecemealError::CorruptVocabulary(_))),
        "{result:?}"
    );

    let missing = load_vocabulary::<u32, _>(dir.path().join("nope.txt"));
    assert!(matches!(missing, Err(PiecemealError::Io(_))));
}
