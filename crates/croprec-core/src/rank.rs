//! Top-N ranking of a class probability distribution.

use std::cmp::Ordering;

use crate::{PredictionError, Recommendation};

/// Pick the `n` most probable classes, highest first.
///
/// `probabilities[i]` names `labels[i]`. Equal probabilities keep label index
/// order. Scores are reported as percentages of the full distribution, clamped
/// to `[0, 100]`; the truncated subset is not re-normalized.
pub fn rank_top_n(
    probabilities: &[f64],
    labels: &[String],
    n: usize,
) -> Result<Vec<Recommendation>, PredictionError> {
    if probabilities.len() != labels.len() {
        return Err(PredictionError::OutputLength {
            expected: labels.len(),
            actual: probabilities.len(),
        });
    }

    let mut order: Vec<usize> = (0..probabilities.len()).collect();
    // Stable sort: ties stay in ascending index order.
    order.sort_by(|&a, &b| {
        probabilities[b]
            .partial_cmp(&probabilities[a])
            .unwrap_or(Ordering::Equal)
    });

    Ok(order
        .into_iter()
        .take(n.min(labels.len()))
        .map(|i| {
            let percent = (probabilities[i] * 100.0).clamp(0.0, 100.0);
            Recommendation::new(labels[i].clone(), percent)
        })
        .collect())
}
