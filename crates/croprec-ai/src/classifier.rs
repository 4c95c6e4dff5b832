//! Probabilistic classifiers.
//!
//! Every variant implements [`Classifier`]: a fixed-length normalized input
//! vector in, one non-negative score per class out, index-aligned with the
//! artifact's [`LabelIndex`](crate::LabelIndex).

use croprec_core::PredictionError;

use crate::SchemaError;

/// A model that maps one normalized feature vector to a class distribution.
pub trait Classifier: Send + Sync {
    /// Short name of the model family, as written in artifact files.
    fn kind(&self) -> &'static str;

    /// Input vector length.
    fn n_features(&self) -> usize;

    /// Output distribution length.
    fn n_classes(&self) -> usize;

    /// Class probabilities for a single input of length [`n_features`](Self::n_features).
    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, PredictionError>;
}

impl std::fmt::Debug for dyn Classifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Classifier")
            .field("kind", &self.kind())
            .field("n_features", &self.n_features())
            .field("n_classes", &self.n_classes())
            .finish()
    }
}

// ── Softmax linear ──

/// Multinomial logistic regression: `softmax(W·x + b)`.
#[derive(Debug, Clone)]
pub struct SoftmaxLinear {
    coefficients: Vec<Vec<f64>>,
    intercepts: Vec<f64>,
    n_features: usize,
}

impl SoftmaxLinear {
    pub fn new(coefficients: Vec<Vec<f64>>, intercepts: Vec<f64>) -> Result<Self, SchemaError> {
        let n_features = check_matrix("classifier.coefficients", &coefficients)?;
        check_vector("classifier.intercepts", &intercepts, coefficients.len())?;
        Ok(Self {
            coefficients,
            intercepts,
            n_features,
        })
    }
}

impl Classifier for SoftmaxLinear {
    fn kind(&self) -> &'static str {
        "softmax_linear"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.coefficients.len()
    }

    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, PredictionError> {
        check_input(x, self.n_features)?;
        let logits: Vec<f64> = self
            .coefficients
            .iter()
            .zip(&self.intercepts)
            .map(|(row, b)| dot(row, x) + b)
            .collect();
        softmax(&logits)
    }
}

// ── Gaussian naive Bayes ──

/// Gaussian naive Bayes over independent per-feature normals.
#[derive(Debug, Clone)]
pub struct GaussianNb {
    log_prior: Vec<f64>,
    theta: Vec<Vec<f64>>,
    var: Vec<Vec<f64>>,
    /// `-0.5 * Σ log(2π var)` per class.
    log_norm: Vec<f64>,
    n_features: usize,
}

impl GaussianNb {
    pub fn new(
        class_prior: Vec<f64>,
        theta: Vec<Vec<f64>>,
        var: Vec<Vec<f64>>,
    ) -> Result<Self, SchemaError> {
        let n_features = check_matrix("classifier.theta", &theta)?;
        check_vector("classifier.class_prior", &class_prior, theta.len())?;
        check_matrix("classifier.var", &var)?;
        if var.len() != theta.len() {
            return Err(SchemaError::dimension("classifier.var rows", theta.len(), var.len()));
        }
        if var.iter().any(|row| row.len() != n_features) {
            return Err(SchemaError::Invalid(
                "classifier.var and classifier.theta differ in shape".into(),
            ));
        }
        if var.iter().flatten().any(|&v| v <= 0.0) {
            return Err(SchemaError::Invalid("classifier.var must be positive".into()));
        }
        if class_prior.iter().any(|&p| p <= 0.0) {
            return Err(SchemaError::Invalid(
                "classifier.class_prior must be positive".into(),
            ));
        }

        let log_prior = class_prior.iter().map(|p| p.ln()).collect();
        let log_norm = var
            .iter()
            .map(|row| {
                -0.5 * row
                    .iter()
                    .map(|v| (2.0 * std::f64::consts::PI * v).ln())
                    .sum::<f64>()
            })
            .collect();

        Ok(Self {
            log_prior,
            theta,
            var,
            log_norm,
            n_features,
        })
    }
}

impl Classifier for GaussianNb {
    fn kind(&self) -> &'static str {
        "gaussian_nb"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.theta.len()
    }

    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, PredictionError> {
        check_input(x, self.n_features)?;
        let jll: Vec<f64> = (0..self.theta.len())
            .map(|c| {
                let sq: f64 = x
                    .iter()
                    .zip(&self.theta[c])
                    .zip(&self.var[c])
                    .map(|((xi, t), v)| (xi - t) * (xi - t) / v)
                    .sum();
                self.log_prior[c] + self.log_norm[c] - 0.5 * sq
            })
            .collect();
        softmax(&jll)
    }
}

// ── Nearest centroid ──

/// Softmax over cosine similarity to one unit-length centroid per class.
#[derive(Debug, Clone)]
pub struct NearestCentroid {
    centroids: Vec<Vec<f64>>,
    temperature: f64,
    n_features: usize,
}

impl NearestCentroid {
    pub fn new(centroids: Vec<Vec<f64>>, temperature: f64) -> Result<Self, SchemaError> {
        let n_features = check_matrix("classifier.centroids", &centroids)?;
        if !(temperature.is_finite() && temperature > 0.0) {
            return Err(SchemaError::Invalid(
                "classifier.temperature must be a positive number".into(),
            ));
        }

        let mut normalized = Vec::with_capacity(centroids.len());
        for (i, mut c) in centroids.into_iter().enumerate() {
            if !normalize(&mut c) {
                return Err(SchemaError::Invalid(format!(
                    "classifier.centroids[{i}] is a zero vector"
                )));
            }
            normalized.push(c);
        }

        Ok(Self {
            centroids: normalized,
            temperature,
            n_features,
        })
    }
}

impl Classifier for NearestCentroid {
    fn kind(&self) -> &'static str {
        "nearest_centroid"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.centroids.len()
    }

    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, PredictionError> {
        check_input(x, self.n_features)?;
        let mut unit = x.to_vec();
        // A zero input has no direction: every class scores 0 and ties.
        normalize(&mut unit);
        let scores: Vec<f64> = self
            .centroids
            .iter()
            .map(|c| dot(&unit, c) / self.temperature)
            .collect();
        softmax(&scores)
    }
}

// ── Shared helpers ──

pub(crate) fn check_input(x: &[f64], expected: usize) -> Result<(), PredictionError> {
    if x.len() != expected {
        return Err(PredictionError::ShapeMismatch {
            expected,
            actual: x.len(),
        });
    }
    ensure_finite(x)
}

pub(crate) fn ensure_finite(values: &[f64]) -> Result<(), PredictionError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(PredictionError::NonFinite { index }),
        None => Ok(()),
    }
}

/// Check a non-empty, rectangular, finite matrix and return its width.
pub(crate) fn check_matrix(what: &str, rows: &[Vec<f64>]) -> Result<usize, SchemaError> {
    let width = rows
        .first()
        .map(|r| r.len())
        .ok_or_else(|| SchemaError::Invalid(format!("{what} is empty")))?;
    if width == 0 {
        return Err(SchemaError::Invalid(format!("{what} has no columns")));
    }
    for (i, row) in rows.iter().enumerate() {
        check_vector(&format!("{what}[{i}]"), row, width)?;
    }
    Ok(width)
}

pub(crate) fn check_vector(what: &str, values: &[f64], expected: usize) -> Result<(), SchemaError> {
    if values.len() != expected {
        return Err(SchemaError::dimension(what, expected, values.len()));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err(SchemaError::Invalid(format!("{what} contains a non-finite value")));
    }
    Ok(())
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Numerically stable softmax.
fn softmax(scores: &[f64]) -> Result<Vec<f64>, PredictionError> {
    ensure_finite(scores)?;
    let max = scores.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = scores.iter().map(|s| (s - max).exp()).collect();
    let sum: f64 = exps.iter().sum();
    Ok(exps.into_iter().map(|e| e / sum).collect())
}

/// L2-normalize in place. Returns false (leaving `v` untouched) for a zero vector.
fn normalize(v: &mut [f64]) -> bool {
    let norm: f64 = v.iter().map(|x| x * x).sum::<f64>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_distribution(p: &[f64]) {
        assert!(p.iter().all(|&v| (0.0..=1.0).contains(&v)), "{p:?}");
        let sum: f64 = p.iter().sum();
        assert!((sum - 1.0).abs() < 1e-9, "sum {sum}");
    }

    // ── Softmax linear ──

    #[test]
    fn softmax_linear_prefers_largest_logit() {
        let clf = SoftmaxLinear::new(
            vec![vec![1.0, 0.0], vec![0.0, 1.0], vec![-1.0, -1.0]],
            vec![0.0, 0.0, 0.0],
        )
        .unwrap();
        assert_eq!(clf.n_features(), 2);
        assert_eq!(clf.n_classes(), 3);

        let p = clf.predict_proba(&[2.0, 0.5]).unwrap();
        assert_distribution(&p);
        assert!(p[0] > p[1] && p[1] > p[2], "{p:?}");
    }

    #[test]
    fn softmax_linear_equal_logits_are_uniform() {
        let clf = SoftmaxLinear::new(vec![vec![0.0], vec![0.0]], vec![1.0, 1.0]).unwrap();
        assert_eq!(clf.predict_proba(&[3.0]).unwrap(), vec![0.5, 0.5]);
    }

    #[test]
    fn softmax_linear_survives_huge_logits() {
        let clf = SoftmaxLinear::new(vec![vec![1000.0], vec![-1000.0]], vec![0.0, 0.0]).unwrap();
        let p = clf.predict_proba(&[1.0]).unwrap();
        assert_eq!(p, vec![1.0, 0.0]);
    }

    #[test]
    fn softmax_linear_rejects_ragged_rows() {
        let err = SoftmaxLinear::new(vec![vec![1.0, 0.0], vec![1.0]], vec![0.0, 0.0]).unwrap_err();
        assert!(matches!(err, SchemaError::Dimension { .. }));
    }

    #[test]
    fn softmax_linear_rejects_intercept_mismatch() {
        let err = SoftmaxLinear::new(vec![vec![1.0], vec![1.0]], vec![0.0]).unwrap_err();
        assert!(matches!(
            err,
            SchemaError::Dimension {
                expected: 2,
                found: 1,
                ..
            }
        ));
    }

    #[test]
    fn rejects_wrong_input_length() {
        let clf = SoftmaxLinear::new(vec![vec![1.0, 0.0]], vec![0.0]).unwrap();
        assert_eq!(
            clf.predict_proba(&[1.0]).unwrap_err(),
            PredictionError::ShapeMismatch {
                expected: 2,
                actual: 1
            }
        );
    }

    #[test]
    fn rejects_non_finite_input() {
        let clf = SoftmaxLinear::new(vec![vec![1.0, 0.0]], vec![0.0]).unwrap();
        assert_eq!(
            clf.predict_proba(&[1.0, f64::NAN]).unwrap_err(),
            PredictionError::NonFinite { index: 1 }
        );
    }

    // ── Gaussian naive Bayes ──

    fn two_class_nb() -> GaussianNb {
        GaussianNb::new(
            vec![0.5, 0.5],
            vec![vec![-1.0, -1.0], vec![1.0, 1.0]],
            vec![vec![0.25, 0.25], vec![0.25, 0.25]],
        )
        .unwrap()
    }

    #[test]
    fn gaussian_nb_picks_closer_mean() {
        let clf = two_class_nb();
        let p = clf.predict_proba(&[0.9, 1.2]).unwrap();
        assert_distribution(&p);
        assert!(p[1] > 0.99, "{p:?}");
    }

    #[test]
    fn gaussian_nb_midpoint_is_even() {
        let clf = two_class_nb();
        let p = clf.predict_proba(&[0.0, 0.0]).unwrap();
        assert!((p[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn gaussian_nb_prior_breaks_midpoint() {
        let clf = GaussianNb::new(
            vec![0.8, 0.2],
            vec![vec![-1.0], vec![1.0]],
            vec![vec![1.0], vec![1.0]],
        )
        .unwrap();
        let p = clf.predict_proba(&[0.0]).unwrap();
        assert!((p[0] - 0.8).abs() < 1e-12, "{p:?}");
    }

    #[test]
    fn gaussian_nb_far_input_still_normalizes() {
        // Joint log-likelihoods around -1e6 must not underflow to 0/0.
        let p = two_class_nb().predict_proba(&[500.0, 500.0]).unwrap();
        assert_distribution(&p);
    }

    #[test]
    fn gaussian_nb_rejects_zero_variance() {
        let err = GaussianNb::new(
            vec![0.5, 0.5],
            vec![vec![0.0], vec![1.0]],
            vec![vec![0.0], vec![1.0]],
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "classifier.var must be positive");
    }

    #[test]
    fn gaussian_nb_rejects_shape_mismatch() {
        let err = GaussianNb::new(
            vec![0.5, 0.5],
            vec![vec![0.0, 0.0], vec![1.0, 1.0]],
            vec![vec![1.0], vec![1.0]],
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::Invalid(_)));
    }

    // ── Nearest centroid ──

    #[test]
    fn nearest_centroid_picks_most_similar() {
        let clf = NearestCentroid::new(
            vec![vec![1.0, 0.0, 0.0], vec![0.0, 2.0, 0.0], vec![0.0, 0.0, 5.0]],
            0.1,
        )
        .unwrap();
        let p = clf.predict_proba(&[0.1, 0.95, 0.05]).unwrap();
        assert_distribution(&p);
        assert!(p[1] > p[0] && p[1] > p[2], "{p:?}");
    }

    #[test]
    fn nearest_centroid_zero_input_is_uniform() {
        let clf = NearestCentroid::new(vec![vec![1.0, 0.0], vec![0.0, 1.0]], 1.0).unwrap();
        assert_eq!(clf.predict_proba(&[0.0, 0.0]).unwrap(), vec![0.5, 0.5]);
    }

    #[test]
    fn nearest_centroid_rejects_zero_centroid() {
        let err = NearestCentroid::new(vec![vec![1.0, 0.0], vec![0.0, 0.0]], 1.0).unwrap_err();
        assert_eq!(err.to_string(), "classifier.centroids[1] is a zero vector");
    }

    #[test]
    fn nearest_centroid_rejects_bad_temperature() {
        assert!(NearestCentroid::new(vec![vec![1.0]], 0.0).is_err());
        assert!(NearestCentroid::new(vec![vec![1.0]], f64::INFINITY).is_err());
    }

    #[test]
    fn check_matrix_rejects_empty() {
        assert!(check_matrix("m", &[]).is_err());
        assert!(check_matrix("m", &[vec![]]).is_err());
    }
}
