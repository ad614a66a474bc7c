//! Feature Vectorizer: word n-gram TF-IDF over space-joined canonical skills.
//!
//! `TfidfVectorizer::fit` produces an immutable `FeatureSpace`; only a fitted
//! space can transform, so "transform before fit" is unrepresentable.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::OnceLock;

use regex::Regex;

/// Tokens are runs of two or more word characters.
fn token_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\b\w\w+\b").expect("token pattern is a valid regex"))
}

/// Sparse feature vector with entries sorted by feature index.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SparseVector {
    entries: Vec<(usize, f64)>,
}

impl SparseVector {
    /// Builds a vector from `(index, value)` pairs. Zero values are dropped.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (usize, f64)>) -> Self {
        let mut entries: Vec<(usize, f64)> = pairs.into_iter().filter(|(_, v)| *v != 0.0).collect();
        entries.sort_by_key(|(i, _)| *i);
        entries.dedup_by_key(|(i, _)| *i);
        Self { entries }
    }

    pub fn get(&self, index: usize) -> f64 {
        self.entries
            .binary_search_by_key(&index, |(i, _)| *i)
            .map(|pos| self.entries[pos].1)
            .unwrap_or(0.0)
    }

    pub fn entries(&self) -> &[(usize, f64)] {
        &self.entries
    }

    pub fn nnz(&self) -> usize {
        self.entries.len()
    }

    #[cfg(test)]
    pub fn is_zero(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn norm(&self) -> f64 {
        self.entries.iter().map(|(_, v)| v * v).sum::<f64>().sqrt()
    }
}

/// Vectorizer parameters. Defaults to unigrams through trigrams.
#[derive(Debug, Clone)]
pub struct TfidfVectorizer {
    pub min_n: usize,
    pub max_n: usize,
}

impl Default for TfidfVectorizer {
    fn default() -> Self {
        Self { min_n: 1, max_n: 3 }
    }
}

impl TfidfVectorizer {
    /// Fits vocabulary and smoothed IDF weights on the training documents.
    ///
    /// `idf(t) = ln((1 + N) / (1 + df(t))) + 1`; vocabulary indices follow
    /// lexicographic term order.
    pub fn fit<D: AsRef<str>>(&self, documents: &[D]) -> FeatureSpace {
        let mut document_frequency: BTreeMap<String, usize> = BTreeMap::new();

        for doc in documents {
            let unique: HashSet<String> = analyze(doc.as_ref(), self.min_n, self.max_n)
                .into_iter()
                .collect();
            for term in unique {
                *document_frequency.entry(term).or_insert(0) += 1;
            }
        }

        let n_documents = documents.len() as f64;
        let mut vocabulary = HashMap::with_capacity(document_frequency.len());
        let mut idf = Vec::with_capacity(document_frequency.len());
        for (index, (term, df)) in document_frequency.into_iter().enumerate() {
            idf.push(((1.0 + n_documents) / (1.0 + df as f64)).ln() + 1.0);
            vocabulary.insert(term, index);
        }

        FeatureSpace {
            vocabulary,
            idf,
            min_n: self.min_n,
            max_n: self.max_n,
        }
    }
}

/// Fitted, read-only vocabulary and IDF weights.
#[derive(Debug, Clone)]
pub struct FeatureSpace {
    vocabulary: HashMap<String, usize>,
    idf: Vec<f64>,
    min_n: usize,
    max_n: usize,
}

impl FeatureSpace {
    pub fn dimension(&self) -> usize {
        self.idf.len()
    }

    #[cfg(test)]
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.vocabulary.get(term).copied()
    }

    /// Transforms a canonical skill list. Unseen n-grams are ignored, so an
    /// entirely out-of-vocabulary list yields the zero vector.
    pub fn transform<S: AsRef<str>>(&self, skills: &[S]) -> SparseVector {
        self.transform_document(&skills_document(skills))
    }

    /// Raw counts × IDF, then L2-normalized.
    pub fn transform_document(&self, document: &str) -> SparseVector {
        let mut counts: BTreeMap<usize, f64> = BTreeMap::new();
        for term in analyze(document, self.min_n, self.max_n) {
            if let Some(&index) = self.vocabulary.get(&term) {
                *counts.entry(index).or_insert(0.0) += 1.0;
            }
        }

        let weighted = SparseVector::from_pairs(
            counts
                .into_iter()
                .map(|(index, tf)| (index, tf * self.idf[index])),
        );

        let norm = weighted.norm();
        if norm == 0.0 {
            return weighted;
        }
        SparseVector::from_pairs(weighted.entries().iter().map(|&(i, v)| (i, v / norm)))
    }
}

/// Serializes a skill list into the single document the vectorizer sees.
pub fn skills_document<S: AsRef<str>>(skills: &[S]) -> String {
    skills
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercases, tokenizes, and emits word n-grams of every order in `min_n..=max_n`.
fn analyze(document: &str, min_n: usize, max_n: usize) -> Vec<String> {
    let lower = document.to_lowercase();
    let tokens: Vec<&str> = token_pattern()
        .find_iter(&lower)
        .map(|m| m.as_str())
        .collect();

    let mut terms = Vec::new();
    for n in min_n.max(1)..=max_n {
        if n > tokens.len() {
            break;
        }
        terms.extend(tokens.windows(n).map(|window| window.join(" ")));
    }
    terms
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Vec<String> {
        vec![
            "python sql".to_string(),
            "python machine learning".to_string(),
            "java spring boot".to_string(),
        ]
    }

    #[test]
    fn test_analyze_emits_unigrams_through_trigrams() {
        let terms = analyze("machine learning python", 1, 3);
        assert_eq!(
            terms,
            vec![
                "machine",
                "learning",
                "python",
                "machine learning",
                "learning python",
                "machine learning python",
            ]
        );
    }

    #[test]
    fn test_analyze_drops_single_character_tokens() {
        // "c++" tokenizes to "c", which is shorter than the minimum token length.
        assert_eq!(analyze("c++ go", 1, 1), vec!["go"]);
    }

    #[test]
    fn test_vocabulary_is_lexicographic() {
        let space = TfidfVectorizer::default().fit(&corpus());
        let boot = space.index_of("boot").unwrap();
        let java = space.index_of("java").unwrap();
        let sql = space.index_of("sql").unwrap();
        assert!(boot < java && java < sql);
    }

    #[test]
    fn test_smoothed_idf_values() {
        let space = TfidfVectorizer::default().fit(&corpus());
        // "python" appears in 2 of 3 documents.
        let python = space.index_of("python").unwrap();
        let expected = (4.0_f64 / 3.0).ln() + 1.0;
        assert!((space.idf[python] - expected).abs() < 1e-12);
    }

    #[test]
    fn test_transform_is_unit_norm() {
        let space = TfidfVectorizer::default().fit(&corpus());
        let v = space.transform(&["python", "sql"]);
        assert!((v.norm() - 1.0).abs() < 1e-9);
        assert!(v.get(space.index_of("python sql").unwrap()) > 0.0);
    }

    #[test]
    fn test_rarer_terms_weigh_more() {
        let space = TfidfVectorizer::default().fit(&corpus());
        let v = space.transform(&["python", "sql"]);
        let python = v.get(space.index_of("python").unwrap());
        let sql = v.get(space.index_of("sql").unwrap());
        assert!(sql > python);
    }

    #[test]
    fn test_out_of_vocabulary_yields_zero_vector() {
        let space = TfidfVectorizer::default().fit(&corpus());
        assert!(space.transform(&["xyzzy123"]).is_zero());
        assert!(space.transform::<&str>(&[]).is_zero());
    }

    #[test]
    fn test_sparse_vector_lookup() {
        let v = SparseVector::from_pairs([(7, 0.5), (2, 0.25), (4, 0.0)]);
        assert_eq!(v.nnz(), 2);
        assert_eq!(v.get(2), 0.25);
        assert_eq!(v.get(4), 0.0);
        assert_eq!(v.entries()[0].0, 2);
    }
}
