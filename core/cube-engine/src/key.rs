//! FILENAME: core/cube-engine/src/key.rs
//! Combination keys - the identity of one row in a report cube.
//!
//! A key is the sorted list of (dimension, value) pairs a row was grouped by.
//! Inside the engine it is compared and hashed as a value; on the wire it is
//! rendered as `name:value^name:value^` with names in ascending order, which is
//! the format the presentation layer already indexes rows by.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize, Serializer};
use smallvec::SmallVec;

use crate::error::{CubeError, CubeResult};

/// Separates a dimension name from its value.
pub const PAIR_SEPARATOR: char = ':';

/// Terminates every pair, including the last one.
pub const PAIR_TERMINATOR: char = '^';

/// Report cubes rarely pivot on more than a handful of dimensions.
type PairVec = SmallVec<[(String, String); 4]>;

fn is_reserved(c: char) -> bool {
    c == PAIR_SEPARATOR || c == PAIR_TERMINATOR
}

/// Checks that a dimension name can be encoded unambiguously.
pub fn validate_dimension_name(name: &str) -> CubeResult<()> {
    if name.is_empty() {
        return Err(CubeError::EmptyDimensionName);
    }
    if name.contains(is_reserved) {
        return Err(CubeError::ReservedInName(name.to_string()));
    }
    Ok(())
}

/// Checks that a dimension value can be encoded unambiguously.
pub fn validate_dimension_value(dimension: &str, value: &str) -> CubeResult<()> {
    if value.contains(is_reserved) {
        return Err(CubeError::ReservedInValue {
            dimension: dimension.to_string(),
            value: value.to_string(),
        });
    }
    Ok(())
}

// ============================================================================
// COMBINATION KEY
// ============================================================================

/// Canonical identifier for one tuple of dimension values.
///
/// Pairs are always held sorted by dimension name, so two keys built from the
/// same pairs in any order compare and hash equal.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CombinationKey {
    pairs: PairVec,
}

impl CombinationKey {
    /// Builds a key from (dimension, value) pairs in any order.
    ///
    /// Fails if a name or value contains `:` or `^`, if a name is empty, or if
    /// the same dimension is given twice.
    pub fn new<I, N, V>(pairs: I) -> CubeResult<Self>
    where
        I: IntoIterator<Item = (N, V)>,
        N: Into<String>,
        V: Into<String>,
    {
        let mut collected: PairVec = SmallVec::new();
        for (name, value) in pairs {
            let name = name.into();
            let value = value.into();
            validate_dimension_name(&name)?;
            validate_dimension_value(&name, &value)?;
            collected.push((name, value));
        }

        collected.sort_by(|a, b| a.0.cmp(&b.0));
        if let Some(window) = collected.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(CubeError::DuplicateDimension(window[0].0.clone()));
        }

        Ok(CombinationKey { pairs: collected })
    }

    /// The key of a cube pivoted on no dimensions at all.
    pub fn empty() -> Self {
        CombinationKey::default()
    }

    /// Assembles a key from pairs the caller has already validated and sorted.
    pub(crate) fn from_sorted(pairs: PairVec) -> Self {
        debug_assert!(pairs.windows(2).all(|w| w[0].0 < w[1].0));
        CombinationKey { pairs }
    }

    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    pub fn get(&self, dimension: &str) -> Option<&str> {
        self.pairs
            .binary_search_by(|(name, _)| name.as_str().cmp(dimension))
            .ok()
            .map(|idx| self.pairs[idx].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Wire form: `name:value^` per pair, names ascending.
    pub fn encode(&self) -> String {
        let capacity = self
            .pairs
            .iter()
            .map(|(n, v)| n.len() + v.len() + 2)
            .sum();
        let mut out = String::with_capacity(capacity);
        for (name, value) in &self.pairs {
            out.push_str(name);
            out.push(PAIR_SEPARATOR);
            out.push_str(value);
            out.push(PAIR_TERMINATOR);
        }
        out
    }

    /// Parses the wire form back into a key. The empty string is the empty key.
    pub fn decode(key: &str) -> CubeResult<Self> {
        if key.is_empty() {
            return Ok(CombinationKey::empty());
        }

        let body = key.strip_suffix(PAIR_TERMINATOR).ok_or_else(|| CubeError::MalformedKey {
            key: key.to_string(),
            reason: format!("missing trailing '{}'", PAIR_TERMINATOR),
        })?;

        let mut pairs = Vec::new();
        for segment in body.split(PAIR_TERMINATOR) {
            let (name, value) =
                segment
                    .split_once(PAIR_SEPARATOR)
                    .ok_or_else(|| CubeError::MalformedKey {
                        key: key.to_string(),
                        reason: format!("segment '{}' has no '{}'", segment, PAIR_SEPARATOR),
                    })?;
            pairs.push((name, value));
        }

        CombinationKey::new(pairs)
    }
}

impl fmt::Display for CombinationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for CombinationKey {
    type Err = CubeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CombinationKey::decode(s)
    }
}

// Serialized as the encoded string so keys can be JSON object keys.
impl Serialize for CombinationKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct KeyVisitor;

impl<'de> Visitor<'de> for KeyVisitor {
    type Value = CombinationKey;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an encoded combination key such as \"team:a^\"")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        CombinationKey::decode(v).map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for CombinationKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_str(KeyVisitor)
    }
}
