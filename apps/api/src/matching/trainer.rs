//! Training entry point: builds the immutable `TrainedArtifacts` once at startup.
//!
//! Pipeline: label space → vectorizer fit → optional held-out evaluation →
//! serving forest fit on the full corpus.

use std::time::Instant;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use tracing::info;

use crate::corpus::TrainingRecord;
use crate::matching::evaluation::{classification_report, EvaluationReport};
use crate::matching::forest::{Classifier, ForestParams, RandomForest};
use crate::matching::labels::LabelSpace;
use crate::matching::vectorizer::{skills_document, FeatureSpace, SparseVector, TfidfVectorizer};
use crate::matching::MatchError;

#[derive(Debug, Clone)]
pub struct TrainingOptions {
    pub n_estimators: usize,
    pub seed: u64,
    /// Fraction held out for the diagnostic evaluation, in `[0, 1)`.
    pub test_fraction: f64,
    pub evaluate: bool,
}

impl Default for TrainingOptions {
    fn default() -> Self {
        Self {
            n_estimators: 150,
            seed: 42,
            test_fraction: 0.2,
            evaluate: true,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct TrainingSummary {
    pub records: usize,
    pub labels: usize,
    pub vocabulary_size: usize,
    pub n_trees: usize,
    pub train_size: usize,
    pub test_size: usize,
    pub evaluation: Option<EvaluationReport>,
    pub trained_in_ms: u64,
}

/// The fitted vectorizer, label space and model. Never mutated after
/// construction; shared read-only across requests.
pub struct TrainedArtifacts {
    pub feature_space: FeatureSpace,
    pub label_space: LabelSpace,
    pub model: Box<dyn Classifier>,
    pub summary: TrainingSummary,
}

/// Trains on the full corpus. Fails with `EmptyCorpus` or
/// `InsufficientLabels` before any fitting happens.
pub fn train(
    records: &[TrainingRecord],
    options: &TrainingOptions,
) -> Result<TrainedArtifacts, MatchError> {
    if records.is_empty() {
        return Err(MatchError::EmptyCorpus);
    }

    let started = Instant::now();

    let label_space = LabelSpace::fit(
        records
            .iter()
            .map(|r| (r.role.as_str(), r.domain.as_str())),
    );
    if label_space.len() < 2 {
        return Err(MatchError::InsufficientLabels {
            found: label_space.len(),
        });
    }

    let documents: Vec<String> = records.iter().map(|r| skills_document(&r.skills)).collect();
    let feature_space = TfidfVectorizer::default().fit(&documents);
    let x: Vec<SparseVector> = documents
        .iter()
        .map(|d| feature_space.transform_document(d))
        .collect();
    let y = records
        .iter()
        .map(|r| label_space.encode(&r.role, &r.domain))
        .collect::<Result<Vec<_>, _>>()?;

    info!(
        "Training forest: {} records, {} labels, {} features",
        records.len(),
        label_space.len(),
        feature_space.dimension()
    );

    let params = ForestParams {
        n_estimators: options.n_estimators,
        seed: options.seed,
    };

    let (train_size, test_size, evaluation) = if options.evaluate && options.test_fraction > 0.0 {
        let (train_idx, test_idx) = train_test_split(records.len(), options.test_fraction, options.seed);
        let report = evaluate_holdout(&x, &y, &train_idx, &test_idx, &label_space, &feature_space, &params)?;
        (train_idx.len(), test_idx.len(), report)
    } else {
        (records.len(), 0, None)
    };

    let model = RandomForest::fit(&x, &y, label_space.len(), feature_space.dimension(), &params)?;
    let trained_in_ms = started.elapsed().as_millis() as u64;
    info!(
        "Serving forest ready: {} trees, {} nodes, {}ms",
        model.n_trees(),
        model.total_nodes(),
        trained_in_ms
    );

    let summary = TrainingSummary {
        records: records.len(),
        labels: label_space.len(),
        vocabulary_size: feature_space.dimension(),
        n_trees: model.n_trees(),
        train_size,
        test_size,
        evaluation,
        trained_in_ms,
    };

    Ok(TrainedArtifacts {
        feature_space,
        label_space,
        model: Box::new(model),
        summary,
    })
}

/// Shuffles `0..n` with `seed` and holds out `ceil(test_fraction * n)` indices,
/// always leaving at least one for training.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    indices.shuffle(&mut StdRng::seed_from_u64(seed));

    let n_test = ((test_fraction * n as f64).ceil() as usize).min(n.saturating_sub(1));
    let train = indices.split_off(n_test);
    (train, indices)
}

fn evaluate_holdout(
    x: &[SparseVector],
    y: &[usize],
    train_idx: &[usize],
    test_idx: &[usize],
    labels: &LabelSpace,
    features: &FeatureSpace,
    params: &ForestParams,
) -> Result<Option<EvaluationReport>, MatchError> {
    if test_idx.is_empty() {
        return Ok(None);
    }

    let x_train: Vec<SparseVector> = train_idx.iter().map(|&i| x[i].clone()).collect();
    let y_train: Vec<usize> = train_idx.iter().map(|&i| y[i]).collect();
    let model = RandomForest::fit(&x_train, &y_train, labels.len(), features.dimension(), params)?;

    let y_test: Vec<usize> = test_idx.iter().map(|&i| y[i]).collect();
    let y_pred: Vec<usize> = test_idx.iter().map(|&i| model.predict(&x[i])).collect();
    let report = classification_report(&y_test, &y_pred, labels)?;

    info!(
        "Held-out evaluation: {} rows, accuracy {:.3}, macro F1 {:.3}",
        report.test_size, report.accuracy, report.macro_f1
    );
    for m in &report.labels {
        info!(
            "  {} || {}: precision {:.2} recall {:.2} f1 {:.2} support {}",
            m.role, m.domain, m.precision, m.recall, m.f1, m.support
        );
    }

    Ok(Some(report))
}
