//! # Added Token Matching
//!
//! Added tokens are literal strings (such as `[CLS]` or `[MASK]`)
//! matched against raw text before normalization; matches bypass
//! normalization and segmentation and map directly to their id.

use core::ops::Range;

use aho_corasick::{AhoCorasick, Input, MatchKind};

use crate::{
    PMResult,
    PiecemealError,
    types::TokenType,
};

/// A literal token matched before normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddedToken<T: TokenType> {
    /// The literal text.
    pub content: String,

    /// The token id.
    pub id: T,

    /// Match ASCII case-insensitively.
    pub normalized: bool,
}

/// A segment of raw text, as split by [`AddedTokens::split`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextSegment<T: TokenType> {
    /// Ordinary text, to be normalized and segmented.
    Text(Range<usize>),

    /// An added token match.
    Added {
        /// The matched byte range.
        range: Range<usize>,
        /// The token id.
        id: T,
    },
}

#[derive(Debug, Clone)]
struct Matcher<T: TokenType> {
    automaton: AhoCorasick,
    ids: Vec<T>,
}

impl<T: TokenType> Matcher<T> {
    fn build(
        tokens: &[&AddedToken<T>],
        case_insensitive: bool,
    ) -> PMResult<Option<Self>> {
        if tokens.is_empty() {
            return Ok(None);
        }
        let automaton = AhoCorasick::builder()
            .match_kind(MatchKind::LeftmostLongest)
            .ascii_case_insensitive(case_insensitive)
            .build(tokens.iter().map(|t| t.content.as_str()))
            .map_err(|e| PiecemealError::corrupt(format!("added tokens: {e}")))?;
        Ok(Some(Self {
            automaton,
            ids: tokens.iter().map(|t| t.id).collect(),
        }))
    }

    fn find(
        &self,
        text: &str,
        from: usize,
    ) -> Option<(Range<usize>, T)> {
        self.automaton
            .find(Input::new(text).span(from..text.len()))
            .map(|m| (m.range(), self.ids[m.pattern().as_usize()]))
    }
}

/// Leftmost-longest matcher over a set of [`AddedToken`]s.
#[derive(Debug, Clone, Default)]
pub struct AddedTokens<T: TokenType> {
    tokens: Vec<AddedToken<T>>,
    exact: Option<Matcher<T>>,
    folded: Option<Matcher<T>>,
}

impl<T: TokenType> PartialEq for AddedTokens<T> {
    fn eq(
        &self,
        other: &Self,
    ) -> bool {
        self.tokens == other.tokens
    }
}

impl<T: TokenType> AddedTokens<T> {
    /// Build a matcher.
    ///
    /// ## Returns
    /// The matcher, or [`PiecemealError::CorruptVocabulary`] on an empty
    /// or repeated literal.
    pub fn new(tokens: Vec<AddedToken<T>>) -> PMResult<Self> {
        for (idx, token) in tokens.iter().enumerate() {
            if token.content.is_empty() {
                return Err(PiecemealError::corrupt("empty added token"));
            }
            if tokens[..idx].iter().any(|t| t.content == token.content) {
                return Err(PiecemealError::corrupt(format!(
                    "duplicate added token {:?}",
                    token.content
                )));
            }
        }

        let (folded, exact): (Vec<&AddedToken<T>>, Vec<&AddedToken<T>>) =
            tokens.iter().partition(|t| t.normalized);

        Ok(Self {
            exact: Matcher::build(&exact, false)?,
            folded: Matcher::build(&folded, true)?,
            tokens,
        })
    }

    /// The added tokens.
    pub fn tokens(&self) -> &[AddedToken<T>] {
        &self.tokens
    }

    /// The number of added tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Are there no added tokens?
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Find the leftmost-longest match at or after `from`.
    pub fn find_at(
        &self,
        text: &str,
        from: usize,
    ) -> Option<(Range<usize>, T)> {
        let a = self.exact.as_ref().and_then(|m| m.find(text, from));
        let b = self.folded.as_ref().and_then(|m| m.find(text, from));
        match (a, b) {
            (Some(a), Some(b)) => {
                let a_first = a.0.start < b.0.start
                    || (a.0.start == b.0.start && a.0.end >= b.0.end);
                Some(if a_first { a } else { b })
            }
            (a, b) => a.or(b),
        }
    }

    /// Split raw text into ordinary text and added token matches.
    pub fn split<'a>(
        &'a self,
        text: &'a str,
    ) -> impl Iterator<Item = TextSegment<T>> + 'a {
        let mut pos = 0;
        let mut pending: Option<TextSegment<T>> = None;
        core::iter::from_fn(move || {
            if let Some(seg) = pending.take() {
                return Some(seg);
            }
            if pos >= text.len() {
                return None;
            }
            match self.find_at(text, pos) {
                Some((range, id)) => {
                    let before = pos..range.start;
                    pos = range.end;
                    let added = TextSegment::Added { range, id };
                    if before.is_empty() {
                        Some(added)
                    } else {
                        pending = Some(added);
                        Some(TextSegment::Text(before))
                    }
                }
                None => {
                    let rest = pos..text.len();
                    pos = text.len();
                    Some(TextSegment::Text(rest))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn added(
        content: &str,
        id: u32,
        normalized: bool,
    ) -> AddedToken<u32> {
        AddedToken {
            content: content.to_string(),
            id,
            normalized,
        }
    }

    fn matcher() -> AddedTokens<u32> {
        AddedTokens::new(vec![
            added("[CLS]", 2, false),
            added("[MASK]", 4, false),
            added("<special>", 7, true),
            added("<special-long>", 8, true),
        ])
        .unwrap()
    }

    #[test]
    fn test_split() {
        let m = matcher();
        let text = "a [MASK] b[CLS]";
        let segs: Vec<_> = m.split(text).collect();
        assert_eq!(
            segs,
            vec![
                TextSegment::Text(0..2),
                TextSegment::Added { range: 2..8, id: 4 },
                TextSegment::Text(8..10),
                TextSegment::Added {
                    range: 10..15,
                    id: 2
                },
            ]
        );
    }

    #[test]
    fn test_case_sensitivity() {
        let m = matcher();
        // Exact tokens are case-sensitive.
        assert_eq!(m.find_at("[cls]", 0), None);
        // Normalized tokens are not.
        assert_eq!(m.find_at("x<SPECIAL>", 0), Some((1..10, 7)));
    }

    #[test]
    fn test_longest_wins() {
        let m = matcher();
        assert_eq!(m.find_at("<special-long>", 0), Some((0..14, 8)));
    }

    #[test]
    fn test_no_tokens() {
        let m: AddedTokens<u32> = AddedTokens::new(vec![]).unwrap();
        assert!(m.is_empty());
        let segs: Vec<_> = m.split("abc").collect();
        assert_eq!(segs, vec![TextSegment::Text(0..3)]);
        assert_eq!(m.split("").count(), 0);
    }

    #[test]
    fn test_duplicate() {
        let err = AddedTokens::new(vec![added("x", 1, false), added("x", 2, true)]).unwrap_err();
        assert!(matches!(err, PiecemealError::CorruptVocabulary(_)));
    }
}
