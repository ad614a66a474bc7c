//! Gap Analyzer: skills historically tied to a `(role, domain)` that the user lacks.
//!
//! Independent of the classifier: it reads only the normalized corpus.

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::corpus::TrainingRecord;
use crate::matching::normalizer::AliasTable;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GapResult {
    pub user_skills: BTreeSet<String>,
    pub required_skills: BTreeSet<String>,
    pub gap_skills: BTreeSet<String>,
}

impl GapResult {
    /// False when the corpus holds no record for the requested pair, which is
    /// distinct from a perfect match (required non-empty, gap empty).
    pub fn has_reference_data(&self) -> bool {
        !self.required_skills.is_empty()
    }
}

/// Required-skill sets keyed by case-folded `(role, domain)`, built once from
/// the corpus and read-only afterwards.
#[derive(Debug, Clone, Default)]
pub struct GapAnalyzer {
    required: HashMap<(String, String), BTreeSet<String>>,
}

impl GapAnalyzer {
    pub fn new(records: &[TrainingRecord]) -> Self {
        let mut required: HashMap<(String, String), BTreeSet<String>> = HashMap::new();
        for record in records {
            required
                .entry(fold_key(&record.role, &record.domain))
                .or_default()
                .extend(record.skills.iter().cloned());
        }
        Self { required }
    }

    /// Union of skills across records whose role and domain match after
    /// trimming and case folding. No match yields empty required and gap sets,
    /// not an error.
    pub fn gap<S: AsRef<str>>(
        &self,
        aliases: &AliasTable,
        user_skills: &[S],
        role: &str,
        domain: &str,
    ) -> GapResult {
        let user_skills: BTreeSet<String> = aliases.normalize(user_skills).into_iter().collect();

        let Some(required_skills) = self.required.get(&fold_key(role, domain)).cloned() else {
            return GapResult {
                user_skills,
                ..GapResult::default()
            };
        };

        let gap_skills = required_skills.difference(&user_skills).cloned().collect();
        GapResult {
            user_skills,
            required_skills,
            gap_skills,
        }
    }

    pub fn pair_count(&self) -> usize {
        self.required.len()
    }
}

/// Trimmed and lowercased, so lookups agree with `LabelSpace::encode` on padding.
fn fold_key(role: &str, domain: &str) -> (String, String) {
    (role.trim().to_lowercase(), domain.trim().to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(skills: &[&str], role: &str, domain: &str) -> TrainingRecord {
        TrainingRecord {
            skills: skills.iter().map(|s| s.to_string()).collect(),
            role: role.to_string(),
            domain: domain.to_string(),
        }
    }

    fn analyzer() -> GapAnalyzer {
        GapAnalyzer::new(&[
            record(&["python", "sql"], "Data Analyst", "Finance"),
            record(&["excel", "sql"], "Data Analyst", "Finance"),
            record(&["java"], "Software Engineer", "Retail"),
        ])
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_gap_is_required_minus_user() {
        let result = analyzer().gap(&AliasTable::default(), &["python"], "Data Analyst", "Finance");
        assert_eq!(result.user_skills, set(&["python"]));
        assert_eq!(result.required_skills, set(&["excel", "python", "sql"]));
        assert_eq!(result.gap_skills, set(&["excel", "sql"]));
        assert!(result.gap_skills.is_subset(&result.required_skills));
        assert!(result.gap_skills.is_disjoint(&result.user_skills));
    }

    #[test]
    fn test_role_and_domain_match_case_insensitively() {
        let result = analyzer().gap(&AliasTable::default(), &["java"], "software engineer", "RETAIL");
        assert!(result.has_reference_data());
        assert!(result.gap_skills.is_empty());
    }

    #[test]
    fn test_padded_role_and_domain_still_match() {
        let result = analyzer().gap(&AliasTable::default(), &["python"], " Data Analyst ", "Finance ");
        assert!(result.has_reference_data());
        assert_eq!(result.gap_skills, set(&["excel", "sql"]));
    }

    #[test]
    fn test_no_matching_records_is_not_an_error() {
        let result = analyzer().gap(&AliasTable::default(), &["python"], "Astronaut", "Space");
        assert_eq!(result.user_skills, set(&["python"]));
        assert!(result.required_skills.is_empty());
        assert!(result.gap_skills.is_empty());
        assert!(!result.has_reference_data());
    }

    #[test]
    fn test_user_skills_are_normalized() {
        let aliases = AliasTable::from_pairs([("py", "python")]).unwrap();
        let result = analyzer().gap(&aliases, &["PY", "SQL"], "Data Analyst", "Finance");
        assert_eq!(result.user_skills, set(&["python", "sql"]));
        assert_eq!(result.gap_skills, set(&["excel"]));
    }

    #[test]
    fn test_pairs_are_grouped() {
        assert_eq!(analyzer().pair_count(), 2);
    }
}
