//! Name-correction aliases
//!
//! Maps a finisher name exactly as it appears in race results to the
//! canonical full name of a member. Keys are matched case-insensitively.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Trim + lowercase, the comparison form for every name in the crate
pub fn normalize_name(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Correction table: race name (normalized) -> canonical member name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NameCorrections {
    entries: HashMap<String, String>,
}

impl NameCorrections {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from `(race_name, member_name)` pairs; blank pairs are skipped
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut corrections = Self::new();
        for (race_name, member_name) in pairs {
            corrections.insert(race_name.as_ref(), member_name.as_ref());
        }
        corrections
    }

    /// Returns false when either side is blank and nothing was stored
    pub fn insert(&mut self, race_name: &str, member_name: &str) -> bool {
        let key = normalize_name(race_name);
        let value = member_name.trim();
        if key.is_empty() || value.is_empty() {
            return false;
        }
        self.entries.insert(key, value.to_string());
        true
    }

    /// Canonical member name for an already-normalized finisher name
    pub fn lookup(&self, normalized_name: &str) -> Option<&str> {
        self.entries.get(normalized_name).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_name() {
        assert_eq!(normalize_name("  Jeff DAVIS "), "jeff davis");
        assert_eq!(normalize_name(""), "");
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let corrections = NameCorrections::from_pairs([("Jeff Davis", "Jeffrey Davis")]);
        assert_eq!(corrections.lookup("jeff davis"), Some("Jeffrey Davis"));
        assert_eq!(corrections.lookup(&normalize_name("JEFF DAVIS ")), Some("Jeffrey Davis"));
        assert_eq!(corrections.lookup("jeffrey davis"), None);
    }

    #[test]
    fn test_blank_pairs_are_skipped() {
        let mut corrections = NameCorrections::new();
        assert!(!corrections.insert("  ", "Jeffrey Davis"));
        assert!(!corrections.insert("Jeff Davis", ""));
        assert!(corrections.is_empty());
        assert!(corrections.insert("Bob Wilson", " Robert Wilson "));
        assert_eq!(corrections.lookup("bob wilson"), Some("Robert Wilson"));
        assert_eq!(corrections.len(), 1);
    }
}
