//! # Word Map ``{ String <-> T }`` Vocabulary

use crate::{
    PMResult,
    PiecemealError,
    types::{PMHashMap, TokenType, hash_map_with_capacity, try_token_from_usize},
};

/// A bidirectional ``{ String <-> T }`` vocabulary.
///
/// Ids are contiguous; ``tokens[id]`` is the string for ``id``.
#[derive(Debug, Clone, PartialEq)]
pub struct WordVocab<T: TokenType> {
    token_ids: PMHashMap<String, T>,
    tokens: Vec<String>,
}

impl<T: TokenType> WordVocab<T> {
    /// Build a vocabulary from tokens listed in id order.
    ///
    /// ## Arguments
    /// * `tokens` - token strings; the position of each is its id.
    ///
    /// ## Returns
    /// The vocabulary, or [`PiecemealError::CorruptVocabulary`] on
    /// a duplicate or empty token string.
    pub fn from_tokens<I, S>(tokens: I) -> PMResult<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::from_entries(
            tokens
                .into_iter()
                .enumerate()
                .map(|(id, token)| (token.into(), id)),
        )
    }

    /// Build a vocabulary from `(token, id)` entries in any order.
    ///
    /// ## Arguments
    /// * `entries` - the `(token, id)` pairs.
    ///
    /// ## Returns
    /// The vocabulary, or [`PiecemealError::CorruptVocabulary`] if:
    /// * a token string or id appears twice,
    /// * a token string is empty,
    /// * the ids are not contiguous from zero,
    /// * an id does not fit in `T`.
    pub fn from_entries<I>(entries: I) -> PMResult<Self>
    where
        I: IntoIterator<Item = (String, usize)>,
    {
        let entries: Vec<(String, usize)> = entries.into_iter().collect();

        let mut slots: Vec<Option<String>> = vec![None; entries.len()];
        let mut token_ids: PMHashMap<String, T> = hash_map_with_capacity(entries.len());

        for (token, id) in entries {
            if token.is_empty() {
                return Err(PiecemealError::corrupt(format!(
                    "empty token string for id {id}"
                )));
            }
            if id >= slots.len() {
                return Err(PiecemealError::corrupt(format!(
                    "ids are not contiguous: id {id} in a vocabulary of {} entries",
                    slots.len()
                )));
            }
            let value: T = try_token_from_usize(id)
                .map_err(|_| PiecemealError::corrupt(format!("id {id} overflows the token type")))?;

            if slots[id].is_some() {
                return Err(PiecemealError::corrupt(format!("duplicate id {id}")));
            }
            if token_ids.insert(token.clone(), value).is_some() {
                return Err(PiecemealError::corrupt(format!(
                    "duplicate token string {token:?}"
                )));
            }
            slots[id] = Some(token);
        }

        // Every slot is filled: n distinct ids, all below n.
        let tokens = slots.into_iter().flatten().collect();

        Ok(Self { token_ids, tokens })
    }

    /// Append a new token with the next id.
    ///
    /// ## Returns
    /// The new id; or the existing id if the token is already present.
    pub fn push(
        &mut self,
        token: &str,
    ) -> PMResult<T> {
        if let Some(id) = self.lookup(token) {
            return Ok(id);
        }
        if token.is_empty() {
            return Err(PiecemealError::corrupt("empty token string"));
        }
        let id: T = try_token_from_usize(self.tokens.len())?;
        self.token_ids.insert(token.to_string(), id);
        self.tokens.push(token.to_string());
        Ok(id)
    }

    /// The number of entries.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Is the vocabulary empty?
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// The highest id, if any.
    pub fn max_token(&self) -> Option<T> {
        self.len().checked_sub(1).and_then(T::from_usize)
    }

    /// Look up the id of a token string.
    pub fn lookup(
        &self,
        token: &str,
    ) -> Option<T> {
        self.token_ids.get(token).copied()
    }

    /// Does the vocabulary contain this token string?
    pub fn contains(
        &self,
        token: &str,
    ) -> bool {
        self.token_ids.contains_key(token)
    }

    /// Look up the token string of an id.
    pub fn id_to_token(
        &self,
        id: T,
    ) -> Option<&str> {
        id.to_usize()
            .and_then(|idx| self.tokens.get(idx))
            .map(String::as_str)
    }

    /// Iterate over `(token, id)` pairs in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, T)> + '_ {
        self.tokens
            .iter()
            .enumerate()
            .filter_map(|(idx, token)| T::from_usize(idx).map(|id| (token.as_str(), id)))
    }

    /// Build the continuation map for a subword prefix.
    ///
    /// Maps ``"ing" -> id("##ing")`` for every entry which starts with
    /// `prefix` and is longer than it; so that continuation lookups
    /// never allocate a prefixed key.
    pub fn continuation_map(
        &self,
        prefix: &str,
    ) -> PMHashMap<String, T> {
        if prefix.is_empty() {
            return PMHashMap::default();
        }
        self.iter()
            .filter_map(|(token, id)| {
                token
                    .strip_prefix(prefix)
                    .filter(|rest| !rest.is_empty())
                    .map(|rest| (rest.to_string(), id))
            })
            .collect()
    }
}
