//! # Ranked Merge Table ``{ (T, T) -> (rank, T) }``

use crate::{
    PMResult,
    PiecemealError,
    types::{PMHashMap, Pair, TokenType, hash_map_with_capacity},
    vocab::WordVocab,
};

/// A single resolved merge rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeRule<T: TokenType> {
    /// Priority; lower merges first.
    pub rank: u32,

    /// The id of the merged symbol.
    pub merged: T,
}

/// The BPE merge table.
///
/// Maps an adjacent pair of symbol ids to its rank and merged id.
/// Every referenced id is present in the owning vocabulary.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeRules<T: TokenType> {
    rules: PMHashMap<Pair<T>, MergeRule<T>>,
}

impl<T: TokenType> MergeRules<T> {
    /// Resolve an ordered list of string merge pairs against a vocabulary.
    ///
    /// The rank of a pair is its position in `pairs`.
    /// The merged symbol is ``left + right``, with the continuation
    /// prefix stripped from `right` when it carries one.
    ///
    /// ## Arguments
    /// * `pairs` - the `(left, right)` merge pairs, highest priority first.
    /// * `vocab` - the vocabulary which must contain every symbol.
    /// * `continuing_subword_prefix` - the continuation marker, if any.
    ///
    /// ## Returns
    /// The table, or [`PiecemealError::CorruptVocabulary`] if a symbol
    /// or merge result is missing from `vocab`, or a pair repeats.
    pub fn from_string_pairs(
        pairs: &[(String, String)],
        vocab: &WordVocab<T>,
        continuing_subword_prefix: Option<&str>,
    ) -> PMResult<Self> {
        let mut rules: PMHashMap<Pair<T>, MergeRule<T>> = hash_map_with_capacity(pairs.len());

        let resolve = |rank: usize, symbol: &str| -> PMResult<T> {
            vocab.lookup(symbol).ok_or_else(|| {
                PiecemealError::corrupt(format!(
                    "merge {rank} references {symbol:?}, which is not in the vocabulary"
                ))
            })
        };

        for (rank, (left, right)) in pairs.iter().enumerate() {
            let rank_u32 = u32::try_from(rank)
                .map_err(|_| PiecemealError::corrupt("too many merge rules"))?;

            let l = resolve(rank, left)?;
            let r = resolve(rank, right)?;

            let tail = continuing_subword_prefix
                .and_then(|prefix| right.strip_prefix(prefix))
                .unwrap_or(right);
            let merged = resolve(rank, &format!("{left}{tail}"))?;

            let rule = MergeRule {
                rank: rank_u32,
                merged,
            };
            if rules.insert((l, r), rule).is_some() {
                return Err(PiecemealError::corrupt(format!(
                    "merge {rank} repeats the pair ({left:?}, {right:?})"
                )));
            }
        }

        rules.shrink_to_fit();
        Ok(Self { rules })
    }

    /// The number of rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Is the table empty?
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Look up the rule for an adjacent pair.
    pub fn lookup(
        &self,
        left: T,
        right: T,
    ) -> Option<MergeRule<T>> {
        self.rules.get(&(left, right)).copied()
    }

    /// Iterate over `(pair, rule)` entries in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&Pair<T>, &MergeRule<T>)> {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
        items
            .iter()
            .map(|(a, b)| (a.to_string(), b.to_string()))
            .collect()
    }

    #[test]
    fn test_from_string_pairs() {
        let vocab: WordVocab<u32> =
            WordVocab::from_tokens(["<unk>", "l", "o", "w", "lo", "low"]).unwrap();
        let rules =
            MergeRules::from_string_pairs(&pairs(&[("l", "o"), ("lo", "w")]), &vocab, None)
                .unwrap();

        assert_eq!(rules.len(), 2);
        assert_eq!(rules.lookup(1, 2), Some(MergeRule { rank: 0, merged: 4 }));
        assert_eq!(rules.lookup(4, 3), Some(MergeRule { rank: 1, merged: 5 }));
        assert_eq!(rules.lookup(2, 1), None);
    }

    #[test]
    fn test_continuation_prefix() {
        let vocab: WordVocab<u32> = WordVocab::from_tokens(["a", "##b", "ab"]).unwrap();
        let rules =
            MergeRules::from_string_pairs(&pairs(&[("a", "##b")]), &vocab, Some("##")).unwrap();
        assert_eq!(rules.lookup(0, 1).unwrap().merged, 2);
    }

    #[test]
    fn test_missing_symbol() {
        let vocab: WordVocab<u32> = WordVocab::from_tokens(["l", "o"]).unwrap();
        let err = MergeRules::from_string_pairs(&pairs(&[("l", "o")]), &vocab, None).unwrap_err();
        assert!(matches!(err, PiecemealError::CorruptVocabulary(_)));
    }

    #[test]
    fn test_duplicate_pair() {
        let vocab: WordVocab<u32> = WordVocab::from_tokens(["l", "o", "lo"]).unwrap();
        let err =
            MergeRules::from_string_pairs(&pairs(&[("l", "o"), ("l", "o")]), &vocab, None)
                .unwrap_err();
        assert!(matches!(err, PiecemealError::CorruptVocabulary(_)));
    }
}
