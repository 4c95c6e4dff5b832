//! Persisted model artifact format.
//!
//! An artifact is a single JSON document holding plain numeric parameters:
//! the scaler, the classifier, the label index and (optionally) the feature
//! ordering. Decoding it never runs code. Structural validation (dimensions,
//! duplicates, finiteness) happens when the bundle is turned into a live
//! model, not here.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::default_feature_names;

/// The only artifact layout this build understands.
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ArtifactBundle {
    pub format_version: u32,
    /// Canonical input ordering. Absent or empty means [`DEFAULT_FEATURE_NAMES`](crate::DEFAULT_FEATURE_NAMES).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_names: Option<Vec<String>>,
    pub labels: Vec<String>,
    pub scaler: ScalerSpec,
    pub classifier: ClassifierSpec,
    #[serde(default)]
    pub metadata: ArtifactMetadata,
}

impl ArtifactBundle {
    pub fn feature_names_or_default(&self) -> Vec<String> {
        match &self.feature_names {
            Some(names) if !names.is_empty() => names.clone(),
            _ => default_feature_names(),
        }
    }
}

/// Per-feature affine normalization fit at training time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScalerSpec {
    /// `(x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// `x * scale + min`
    MinMax { scale: Vec<f64>, min: Vec<f64> },
}

impl ScalerSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Standard { .. } => "standard",
            Self::MinMax { .. } => "min_max",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClassifierSpec {
    /// Multinomial logistic regression: `softmax(W·x + b)`.
    SoftmaxLinear {
        /// One row per class, one column per feature.
        coefficients: Vec<Vec<f64>>,
        intercepts: Vec<f64>,
    },
    /// Gaussian naive Bayes.
    GaussianNb {
        class_prior: Vec<f64>,
        /// Per-class feature means.
        theta: Vec<Vec<f64>>,
        /// Per-class feature variances.
        var: Vec<Vec<f64>>,
    },
    /// Softmax over cosine similarity to one centroid per class.
    NearestCentroid {
        centroids: Vec<Vec<f64>>,
        #[serde(default = "default_temperature")]
        temperature: f64,
    },
    /// Averaged leaf distributions of a decision-tree ensemble.
    RandomForest { trees: Vec<TreeSpec> },
    /// External ONNX graph, path relative to the artifact file.
    Onnx { path: PathBuf },
}

fn default_temperature() -> f64 {
    1.0
}

impl ClassifierSpec {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SoftmaxLinear { .. } => "softmax_linear",
            Self::GaussianNb { .. } => "gaussian_nb",
            Self::NearestCentroid { .. } => "nearest_centroid",
            Self::RandomForest { .. } => "random_forest",
            Self::Onnx { .. } => "onnx",
        }
    }
}

/// One decision tree as parallel node arrays.
///
/// Node 0 is the root. A node is a leaf when both child indices are `-1`; for
/// split nodes, samples with `x[feature] <= threshold` go left.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TreeSpec {
    pub children_left: Vec<i64>,
    pub children_right: Vec<i64>,
    pub feature: Vec<i64>,
    pub threshold: Vec<f64>,
    /// Per-node class weights (counts or fractions).
    pub value: Vec<Vec<f64>>,
}

/// Descriptive fields that never affect inference.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArtifactMetadata {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trained_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accuracy: Option<f64>,
}
