//! # Character Classes
//!
//! BERT-style character predicates over Unicode general categories.

use unicode_general_category::{GeneralCategory, get_general_category};

/// Is `c` whitespace, for splitting purposes?
///
/// `\t`, `\n`, `\r`, and the Unicode space separators (`Zs`).
pub fn is_whitespace(c: char) -> bool {
    match c {
        ' ' | '\t' | '\n' | '\r' => true,
        _ => get_general_category(c) == GeneralCategory::SpaceSeparator,
    }
}

/// Is `c` a control character to be dropped by text cleaning?
///
/// `\t`, `\n`, and `\r` are whitespace, not control.
pub fn is_control(c: char) -> bool {
    match c {
        '\t' | '\n' | '\r' => false,
        _ => matches!(
            get_general_category(c),
            GeneralCategory::Control
                | GeneralCategory::Format
                | GeneralCategory::Unassigned
                | GeneralCategory::PrivateUse
        ),
    }
}

/// Is `c` punctuation?
///
/// All non-alphanumeric printable ASCII counts, so `$`, `+`, `^`
/// and friends split words even though Unicode files them as symbols.
pub fn is_punctuation(c: char) -> bool {
    let cp = c as u32;
    if (33..=47).contains(&cp)
        || (58..=64).contains(&cp)
        || (91..=96).contains(&cp)
        || (123..=126).contains(&cp)
    {
        return true;
    }
    matches!(
        get_general_category(c),
        GeneralCategory::ConnectorPunctuation
            | GeneralCategory::DashPunctuation
            | GeneralCategory::OpenPunctuation
            | GeneralCategory::ClosePunctuation
            | GeneralCategory::InitialPunctuation
            | GeneralCategory::FinalPunctuation
            | GeneralCategory::OtherPunctuation
    )
}

/// Is `c` a CJK ideograph?
///
/// This covers the CJK Unified Ideographs blocks and their extensions,
/// and the compatibility ideographs. Hangul, Hiragana and Katakana are
/// not included; those scripts separate words with spaces.
pub fn is_cjk(c: char) -> bool {
    matches!(
        c as u32,
        0x4E00..=0x9FFF
            | 0x3400..=0x4DBF
            | 0x20000..=0x2A6DF
            | 0x2A700..=0x2B73F
            | 0x2B740..=0x2B81F
            | 0x2B820..=0x2CEAF
            | 0xF900..=0xFAFF
            | 0x2F800..=0x2FA1F
    )
}

/// Is `c` a nonspacing combining mark (`Mn`)?
pub fn is_nonspacing_mark(c: char) -> bool {
    get_general_category(c) == GeneralCategory::NonspacingMark
}
