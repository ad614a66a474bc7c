//! Matching Service: the inference surface over one immutable set of trained artifacts.
//!
//! Built once at startup and shared as `Arc<MatchingService>`; no method takes
//! `&mut self`, so concurrent requests need no locking.

use tracing::{debug, info};

use crate::corpus::TrainingRecord;
use crate::matching::gap::{GapAnalyzer, GapResult};
use crate::matching::labels::RoleDomain;
use crate::matching::normalizer::AliasTable;
use crate::matching::ranker::{top_n, Prediction};
use crate::matching::trainer::{train, TrainedArtifacts, TrainingOptions, TrainingSummary};
use crate::matching::MatchError;

pub struct MatchingService {
    aliases: AliasTable,
    artifacts: TrainedArtifacts,
    gaps: GapAnalyzer,
}

impl MatchingService {
    pub fn new(aliases: AliasTable, artifacts: TrainedArtifacts, gaps: GapAnalyzer) -> Self {
        Self {
            aliases,
            artifacts,
            gaps,
        }
    }

    /// Trains on `records` (already normalized with `aliases`) and wraps the result.
    pub fn train(
        aliases: AliasTable,
        records: &[TrainingRecord],
        options: &TrainingOptions,
    ) -> Result<Self, MatchError> {
        let artifacts = train(records, options)?;
        let gaps = GapAnalyzer::new(records);
        info!("Gap index covers {} (role, domain) pairs", gaps.pair_count());
        Ok(Self::new(aliases, artifacts, gaps))
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn summary(&self) -> &TrainingSummary {
        &self.artifacts.summary
    }

    pub fn labels(&self) -> impl Iterator<Item = (usize, &RoleDomain)> {
        self.artifacts.label_space.iter()
    }

    pub fn normalize<S: AsRef<str>>(&self, skills: &[S]) -> Vec<String> {
        self.aliases.normalize(skills)
    }

    /// Up to `top_n` `(role, domain, confidence)` triples, confidence descending.
    pub fn predict_top_roles_domains<S: AsRef<str>>(
        &self,
        user_skills: &[S],
        top_n_labels: usize,
    ) -> Result<Vec<Prediction>, MatchError> {
        let probabilities = self.probabilities(user_skills);
        top_n(&probabilities, &self.artifacts.label_space, top_n_labels)
    }

    /// Confidence for one specific pair. Fails with `UnknownLabel` if the pair
    /// was never seen in training.
    pub fn confidence_for<S: AsRef<str>>(
        &self,
        user_skills: &[S],
        role: &str,
        domain: &str,
    ) -> Result<f64, MatchError> {
        let id = self.artifacts.label_space.encode(role, domain)?;
        let probabilities = self.probabilities(user_skills);
        Ok(probabilities.get(id).copied().unwrap_or(0.0).clamp(0.0, 1.0))
    }

    pub fn get_gap_skills<S: AsRef<str>>(
        &self,
        user_skills: &[S],
        role: &str,
        domain: &str,
    ) -> GapResult {
        self.gaps.gap(&self.aliases, user_skills, role, domain)
    }

    fn probabilities<S: AsRef<str>>(&self, user_skills: &[S]) -> Vec<f64> {
        let normalized = self.aliases.normalize(user_skills);
        let features = self.artifacts.feature_space.transform(&normalized);
        debug!(
            "Query of {} skills activates {} features",
            normalized.len(),
            features.nnz()
        );
        self.artifacts.model.predict_proba(&features)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::matching::forest::Classifier;
    use crate::matching::labels::LabelSpace;
    use crate::matching::vectorizer::{SparseVector, TfidfVectorizer};

    fn record(skills: &[&str], role: &str, domain: &str) -> TrainingRecord {
        TrainingRecord {
            skills: skills.iter().map(|s| s.to_string()).collect(),
            role: role.to_string(),
            domain: domain.to_string(),
        }
    }

    pub(crate) fn scenario_corpus() -> Vec<TrainingRecord> {
        vec![
            record(&["python", "sql"], "Data Analyst", "Finance"),
            record(&["java", "spring boot", "microservices"], "Backend Engineer", "Retail"),
            record(&["docker", "kubernetes", "terraform"], "DevOps Engineer", "Cloud Computing"),
            record(&["excel", "tableau", "power bi"], "BI Developer", "Marketing"),
            record(&["opencv", "cnn", "image processing"], "Computer Vision Engineer", "Healthcare"),
        ]
    }

    pub(crate) fn scenario_service() -> MatchingService {
        let options = TrainingOptions {
            n_estimators: 60,
            ..TrainingOptions::default()
        };
        MatchingService::train(AliasTable::builtin().unwrap(), &scenario_corpus(), &options)
            .unwrap()
    }

    fn set(items: &[&str]) -> BTreeSet<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_exact_profile_ranks_its_own_label_first() {
        let service = scenario_service();
        let top = service.predict_top_roles_domains(&["python", "sql"], 1).unwrap();
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].role, "Data Analyst");
        assert_eq!(top[0].domain, "Finance");

        let all = service.predict_top_roles_domains(&["python", "sql"], 5).unwrap();
        assert!(all[1..].iter().all(|p| p.confidence <= top[0].confidence));
    }

    #[test]
    fn test_gap_against_scenario_record() {
        let gap = scenario_service().get_gap_skills(&["python"], "Data Analyst", "Finance");
        assert_eq!(gap.user_skills, set(&["python"]));
        assert_eq!(gap.required_skills, set(&["python", "sql"]));
        assert_eq!(gap.gap_skills, set(&["sql"]));
    }

    #[test]
    fn test_prediction_is_deterministic() {
        let service = scenario_service();
        let skills = ["Docker", "k8s", "python"];
        assert_eq!(
            service.predict_top_roles_domains(&skills, 5).unwrap(),
            service.predict_top_roles_domains(&skills, 5).unwrap()
        );
    }

    #[test]
    fn test_result_length_is_min_of_n_and_labels() {
        let service = scenario_service();
        assert_eq!(service.predict_top_roles_domains(&["python"], 3).unwrap().len(), 3);
        assert_eq!(service.predict_top_roles_domains(&["python"], 50).unwrap().len(), 5);
    }

    #[test]
    fn test_out_of_vocabulary_skills_still_predict() {
        let service = scenario_service();
        let result = service.predict_top_roles_domains(&["xyzzy123"], 5).unwrap();
        assert_eq!(result.len(), 5);
        let total: f64 = result.iter().map(|p| p.confidence).sum();
        assert!((total - 1.0).abs() < 1e-9);
        for pair in result.windows(2) {
            assert!(pair[0].confidence >= pair[1].confidence);
        }
    }

    #[test]
    fn test_confidence_for_known_and_unknown_pairs() {
        let service = scenario_service();
        let top = service.predict_top_roles_domains(&["python", "sql"], 1).unwrap();
        let confidence = service
            .confidence_for(&["python", "sql"], "Data Analyst", "Finance")
            .unwrap();
        assert_eq!(confidence, top[0].confidence);

        let err = service
            .confidence_for(&["python"], "Astronaut", "Space")
            .unwrap_err();
        assert!(matches!(err, MatchError::UnknownLabel { .. }));
    }

    #[test]
    fn test_gap_without_reference_data() {
        let gap = scenario_service().get_gap_skills(&["python"], "Astronaut", "Space");
        assert!(gap.required_skills.is_empty());
        assert!(gap.gap_skills.is_empty());
    }

    #[test]
    fn test_unknown_skill_normalizes_unchanged() {
        assert_eq!(scenario_service().normalize(&["xyzzy123"]), vec!["xyzzy123"]);
    }

    /// Fixed probability table, for exercising ranking without a forest.
    struct FixedClassifier(Vec<f64>);

    impl Classifier for FixedClassifier {
        fn n_classes(&self) -> usize {
            self.0.len()
        }

        fn predict_proba(&self, _features: &SparseVector) -> Vec<f64> {
            self.0.clone()
        }
    }

    #[test]
    fn test_service_with_substituted_classifier() {
        let records = scenario_corpus();
        let label_space = LabelSpace::fit(
            records
                .iter()
                .map(|r| (r.role.as_str(), r.domain.as_str())),
        );
        let feature_space = TfidfVectorizer::default().fit(&["python sql"]);
        let summary = TrainingSummary {
            records: records.len(),
            labels: label_space.len(),
            vocabulary_size: feature_space.dimension(),
            n_trees: 0,
            train_size: records.len(),
            test_size: 0,
            evaluation: None,
            trained_in_ms: 0,
        };
        let artifacts = TrainedArtifacts {
            feature_space,
            label_space,
            model: Box::new(FixedClassifier(vec![0.1, 0.3, 0.3, 0.2, 0.1])),
            summary,
        };
        let service = MatchingService::new(
            AliasTable::default(),
            artifacts,
            GapAnalyzer::new(&records),
        );

        let result = service.predict_top_roles_domains(&["anything"], 3).unwrap();
        let ids: Vec<usize> = result
            .iter()
            .map(|p| {
                service
                    .labels()
                    .find(|(_, l)| l.role == p.role && l.domain == p.domain)
                    .map(|(id, _)| id)
                    .unwrap()
            })
            .collect();
        // Ties at 0.3 resolve by ascending id.
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
