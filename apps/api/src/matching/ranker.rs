//! Ranker: top-N label selection over a probability vector.

use serde::{Deserialize, Serialize};

use crate::matching::labels::LabelSpace;
use crate::matching::MatchError;

/// One ranked `(role, domain, confidence)` triple.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub role: String,
    pub domain: String,
    pub confidence: f64,
}

impl Prediction {
    /// Whole-number match percentage, truncated.
    pub fn match_percent(&self) -> u32 {
        (self.confidence * 100.0).floor() as u32
    }
}

/// Selects the `n` most probable labels, confidence descending.
///
/// Exactly equal probabilities are ordered by ascending label id. When `n`
/// exceeds the number of labels, every label is returned.
pub fn top_n(
    probabilities: &[f64],
    labels: &LabelSpace,
    n: usize,
) -> Result<Vec<Prediction>, MatchError> {
    let mut order: Vec<usize> = (0..probabilities.len()).collect();
    order.sort_by(|&a, &b| {
        probabilities[b]
            .total_cmp(&probabilities[a])
            .then_with(|| a.cmp(&b))
    });

    order
        .into_iter()
        .take(n)
        .map(|id| {
            let label = labels.decode(id)?;
            Ok(Prediction {
                role: label.role.clone(),
                domain: label.domain.clone(),
                confidence: probabilities[id].clamp(0.0, 1.0),
            })
        })
        .collect()
}
