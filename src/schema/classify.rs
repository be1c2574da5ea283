use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use super::StorageType;

/// Static column-name → storage-type lookup.
///
/// Names are matched against the *base* sanitized identifier (before any
/// collision suffix). Anything not listed is `Text`; the data itself is
/// never sniffed.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, Clone, Default)]
#[serde(default)]
pub struct TypeTable {
    pub real: BTreeSet<String>,
    pub integer: BTreeSet<String>,
}

impl TypeTable {
    pub fn new<R, I>(real: R, integer: I) -> Self
    where
        R: IntoIterator,
        R::Item: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        Self {
            real: real.into_iter().map(Into::into).collect(),
            integer: integer.into_iter().map(Into::into).collect(),
        }
    }

    /// Classification used by the world-cities dataset.
    pub fn world_cities() -> Self {
        Self::new(["latitude", "longitude", "popularity"], ["population"])
    }

    pub fn classify(&self, base_name: &str) -> StorageType {
        if self.real.contains(base_name) {
            StorageType::Real
        } else if self.integer.contains(base_name) {
            StorageType::Integer
        } else {
            StorageType::Text
        }
    }

    /// Names listed as both real and integer. Real wins for these.
    pub fn overlapping(&self) -> Vec<&str> {
        self.real
            .intersection(&self.integer)
            .map(String::as_str)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn world_cities_table() {
        let t = TypeTable::world_cities();
        assert_eq!(t.classify("latitude"), StorageType::Real);
        assert_eq!(t.classify("popularity"), StorageType::Real);
        assert_eq!(t.classify("population"), StorageType::Integer);
        assert_eq!(t.classify("name_en"), StorageType::Text);
        assert_eq!(t.classify("population_2"), StorageType::Text);
    }

    #[test]
    fn empty_table_is_all_text() {
        let t = TypeTable::default();
        assert_eq!(t.classify("latitude"), StorageType::Text);
    }

    #[test]
    fn overlap_prefers_real() {
        let t = TypeTable::new(["score"], ["score", "rank"]);
        assert_eq!(t.overlapping(), vec!["score"]);
        assert_eq!(t.classify("score"), StorageType::Real);
        assert_eq!(t.classify("rank"), StorageType::Integer);
    }

    #[test]
    fn deserializes_partial_yaml() {
        let t: TypeTable = serde_yaml::from_str("integer: [year]\n").unwrap();
        assert!(t.real.is_empty());
        assert_eq!(t.classify("year"), StorageType::Integer);
    }
}
