//! Skill Catalog: the known-skill list and the exact matcher built from it.
//!
//! Single-token skills match on word boundaries; multi-token skills match as
//! substrings of the whitespace-normalized, lowercased document text.

use std::collections::BTreeSet;
use std::path::Path;

use regex::Regex;
use serde::Deserialize;
use tracing::info;

use crate::extraction::CatalogError;

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    skills: Vec<String>,
}

#[derive(Debug, Clone)]
enum SkillPattern {
    Word(Regex),
    Phrase(String),
}

#[derive(Debug, Clone)]
struct SkillMatcher {
    skill: String,
    pattern: SkillPattern,
}

/// Read-only after load. Patterns are compiled once here.
#[derive(Debug, Clone, Default)]
pub struct SkillCatalog {
    matchers: Vec<SkillMatcher>,
}

impl SkillCatalog {
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let json = std::fs::read_to_string(path)?;
        let catalog = Self::from_json(&json)?;
        info!(
            "Skill catalog loaded from {}: {} skills",
            path.display(),
            catalog.len()
        );
        Ok(catalog)
    }

    /// Parses `{"skills": [...]}`. A missing `skills` field yields an empty catalog.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_json::from_str(json)?;
        Self::from_skills(file.skills)
    }

    pub fn from_skills<I, S>(skills: I) -> Result<Self, CatalogError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let unique: BTreeSet<String> = skills.into_iter().map(Into::into).collect();
        let mut matchers = Vec::with_capacity(unique.len());

        for skill in unique {
            let normalized = normalize_skill(&skill);
            if normalized.is_empty() {
                continue;
            }
            let pattern = if normalized.contains(' ') {
                SkillPattern::Phrase(normalized)
            } else {
                let regex = Regex::new(&format!(r"\b{}\b", regex::escape(&normalized)))
                    .map_err(|source| CatalogError::Pattern {
                        skill: skill.clone(),
                        source,
                    })?;
                SkillPattern::Word(regex)
            };
            matchers.push(SkillMatcher { skill, pattern });
        }

        Ok(Self { matchers })
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Catalog skills found in `text`, as written in the catalog,
    /// sorted and de-duplicated.
    pub fn extract(&self, text: &str) -> Vec<String> {
        let text = normalize_text(text);
        self.matchers
            .iter()
            .filter(|m| match &m.pattern {
                SkillPattern::Word(regex) => regex.is_match(&text),
                SkillPattern::Phrase(phrase) => text.contains(phrase.as_str()),
            })
            .map(|m| m.skill.clone())
            .collect()
    }
}

/// Pipes become spaces, whitespace collapses, then trim and lowercase.
pub fn normalize_text(text: &str) -> String {
    text.replace('|', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

fn normalize_skill(skill: &str) -> String {
    skill
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}
