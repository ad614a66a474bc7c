//! Skill Normalizer: canonicalizes free-text skill tokens into the shared vocabulary.
//!
//! The same table must be applied to corpus skills at training time and to
//! extracted skills at query time, otherwise vectorization and gap comparison
//! silently diverge.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use anyhow::{Context, Result};
use serde::de::{Deserializer, MapAccess, Visitor};
use serde::Deserialize;

use crate::matching::MatchError;

/// Built-in alias table, used when no `ALIAS_TABLE_PATH` is configured.
const BUILTIN_ALIASES: &str = include_str!("../../data/aliases.json");

/// Read-only alias → canonical skill table.
///
/// Keys are stored in surface form (see [`surface_form`]). Many aliases may map
/// to the same canonical skill, but a canonical skill never maps onward to a
/// different one, which keeps [`AliasTable::normalize`] idempotent.
#[derive(Debug, Clone, Default)]
pub struct AliasTable {
    aliases: HashMap<String, String>,
}

impl AliasTable {
    pub fn builtin() -> Result<Self, MatchError> {
        Self::from_json(BUILTIN_ALIASES)
    }

    /// Loads a JSON object of `alias: canonical` pairs from disk.
    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read alias table at {}", path.display()))?;
        Ok(Self::from_json(&json)?)
    }

    pub fn from_json(json: &str) -> Result<Self, MatchError> {
        let raw: AliasPairs =
            serde_json::from_str(json).map_err(|e| MatchError::InvalidAliasTable(e.to_string()))?;
        Self::from_pairs(raw.0)
    }

    /// Builds a table from raw pairs, folding keys and values into surface form.
    ///
    /// Rejects empty entries, keys that fold onto conflicting canonicals, and
    /// chains where a canonical value is itself an alias for something else.
    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, MatchError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut aliases: HashMap<String, String> = HashMap::new();

        for (key, value) in pairs {
            let key = surface_form(key.as_ref());
            let value = surface_form(value.as_ref());
            if key.is_empty() || value.is_empty() {
                return Err(MatchError::InvalidAliasTable(
                    "alias keys and canonical values must be non-empty".to_string(),
                ));
            }
            match aliases.get(&key) {
                Some(existing) if *existing != value => {
                    return Err(MatchError::InvalidAliasTable(format!(
                        "alias '{key}' maps to both '{existing}' and '{value}'"
                    )));
                }
                _ => {
                    aliases.insert(key, value);
                }
            }
        }

        for value in aliases.values() {
            if let Some(next) = aliases.get(value) {
                if next != value {
                    return Err(MatchError::InvalidAliasTable(format!(
                        "canonical skill '{value}' is itself an alias for '{next}'"
                    )));
                }
            }
        }

        Ok(Self { aliases })
    }

    pub fn len(&self) -> usize {
        self.aliases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aliases.is_empty()
    }

    /// Iterates `(alias, canonical)` pairs in arbitrary order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.aliases.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Canonicalizes a single raw skill. Unmapped skills pass through in surface form.
    pub fn normalize_skill(&self, raw: &str) -> String {
        let surface = surface_form(raw);
        match self.aliases.get(&surface) {
            Some(canonical) => canonical.clone(),
            None => surface,
        }
    }

    /// Order-preserving, one output per input.
    pub fn normalize<S: AsRef<str>>(&self, raw: &[S]) -> Vec<String> {
        raw.iter().map(|s| self.normalize_skill(s.as_ref())).collect()
    }
}

/// Object entries in file order with repeated keys kept, so duplicates reach
/// the conflict check in [`AliasTable::from_pairs`].
struct AliasPairs(Vec<(String, String)>);

impl<'de> Deserialize<'de> for AliasPairs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct PairsVisitor;

        impl<'de> Visitor<'de> for PairsVisitor {
            type Value = AliasPairs;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a JSON object mapping aliases to canonical skills")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<AliasPairs, A::Error> {
                let mut pairs = Vec::with_capacity(map.size_hint().unwrap_or(0));
                while let Some(entry) = map.next_entry::<String, String>()? {
                    pairs.push(entry);
                }
                Ok(AliasPairs(pairs))
            }
        }

        deserializer.deserialize_map(PairsVisitor)
    }
}

/// Lowercase, underscores to spaces, whitespace collapsed and trimmed.
pub fn surface_form(raw: &str) -> String {
    raw.to_lowercase()
        .replace('_', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> AliasTable {
        AliasTable::builtin().unwrap()
    }

    #[test]
    fn test_builtin_table_loads() {
        let aliases = table();
        assert!(!aliases.is_empty());
        assert_eq!(aliases.normalize_skill("ml"), "machine learning");
    }

    #[test]
    fn test_unknown_skill_passes_through() {
        assert_eq!(table().normalize(&["xyzzy123"]), vec!["xyzzy123".to_string()]);
    }

    #[test]
    fn test_casing_and_underscores_are_folded() {
        let aliases = table();
        assert_eq!(aliases.normalize_skill("  Machine_Learning "), "machine learning");
        assert_eq!(aliases.normalize_skill("NLP"), "natural language processing");
        assert_eq!(aliases.normalize_skill("rest   apis"), "rest api");
    }

    #[test]
    fn test_mixed_case_keys_are_reachable() {
        // Keys like "MLOps" are folded at load time, so lowercase input hits them.
        let aliases = table();
        assert_eq!(aliases.normalize_skill("mlops"), "ml ops");
        assert_eq!(aliases.normalize_skill("Object oriented programming"), "oop");
    }

    #[test]
    fn test_normalize_preserves_order_and_length() {
        let out = table().normalize(&["py", "unknown thing", "js"]);
        assert_eq!(out, vec!["python", "unknown thing", "javascript"]);
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let aliases = table();
        let input = vec![
            "ML", "Deep_Learning", "pytorch", "xyzzy123", "  React.js ", "C Plus Plus", "LLM",
        ];
        let once = aliases.normalize(&input);
        let twice = aliases.normalize(&once);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_every_alias_key_resolves_to_its_canonical() {
        let aliases = table();
        for (key, canonical) in aliases.iter() {
            assert_eq!(aliases.normalize(&[key]), vec![canonical.to_string()]);
        }
    }

    #[test]
    fn test_conflicting_keys_rejected() {
        let err = AliasTable::from_pairs([("ML", "machine learning"), ("ml", "meta learning")])
            .unwrap_err();
        assert!(matches!(err, MatchError::InvalidAliasTable(_)));
    }

    #[test]
    fn test_chained_alias_rejected() {
        let err = AliasTable::from_pairs([("a", "b"), ("b", "c")]).unwrap_err();
        assert!(matches!(err, MatchError::InvalidAliasTable(_)));
    }

    #[test]
    fn test_self_mapping_is_allowed() {
        let aliases = AliasTable::from_pairs([("react", "react"), ("react js", "react")]).unwrap();
        assert_eq!(aliases.normalize_skill("React JS"), "react");
    }

    #[test]
    fn test_repeated_json_key_with_new_value_rejected() {
        let err = AliasTable::from_json(r#"{"ml": "machine learning", "ml": "meta learning"}"#)
            .unwrap_err();
        assert!(matches!(err, MatchError::InvalidAliasTable(_)));
    }

    #[test]
    fn test_repeated_json_key_with_same_value_allowed() {
        let aliases =
            AliasTable::from_json(r#"{"ml": "machine learning", "ML": "machine learning"}"#)
                .unwrap();
        assert_eq!(aliases.len(), 1);
    }

    #[test]
    fn test_malformed_json_rejected() {
        assert!(AliasTable::from_json("[1, 2]").is_err());
    }
}
