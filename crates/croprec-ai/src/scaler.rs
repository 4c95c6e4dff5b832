//! Per-feature affine normalization applied before classification.

use croprec_core::{PredictionError, ScalerSpec};

use crate::SchemaError;
use crate::classifier::{check_input, ensure_finite};

/// Validated scaler. Parameter vectors always have one entry per feature.
#[derive(Debug, Clone, PartialEq)]
pub enum Scaler {
    /// `(x - mean) / scale`
    Standard { mean: Vec<f64>, scale: Vec<f64> },
    /// `x * scale + min`
    MinMax { scale: Vec<f64>, min: Vec<f64> },
}

impl Scaler {
    /// Build a scaler for `n_features` inputs from its persisted form.
    pub fn from_spec(spec: &ScalerSpec, n_features: usize) -> Result<Self, SchemaError> {
        match spec {
            ScalerSpec::Standard { mean, scale } => {
                check_params("scaler.mean", mean, n_features)?;
                check_params("scaler.scale", scale, n_features)?;
                if let Some(i) = scale.iter().position(|&s| s == 0.0) {
                    return Err(SchemaError::Invalid(format!(
                        "scaler.scale[{i}] is zero"
                    )));
                }
                Ok(Self::Standard {
                    mean: mean.clone(),
                    scale: scale.clone(),
                })
            }
            ScalerSpec::MinMax { scale, min } => {
                check_params("scaler.scale", scale, n_features)?;
                check_params("scaler.min", min, n_features)?;
                Ok(Self::MinMax {
                    scale: scale.clone(),
                    min: min.clone(),
                })
            }
        }
    }

    /// A scaler that leaves `n_features` inputs unchanged.
    pub fn identity(n_features: usize) -> Self {
        Self::Standard {
            mean: vec![0.0; n_features],
            scale: vec![1.0; n_features],
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Standard { .. } => "standard",
            Self::MinMax { .. } => "min_max",
        }
    }

    pub fn n_features(&self) -> usize {
        match self {
            Self::Standard { mean, .. } => mean.len(),
            Self::MinMax { min, .. } => min.len(),
        }
    }

    /// Normalize one raw feature vector.
    pub fn transform(&self, x: &[f64]) -> Result<Vec<f64>, PredictionError> {
        check_input(x, self.n_features())?;
        let out: Vec<f64> = match self {
            Self::Standard { mean, scale } => x
                .iter()
                .zip(mean)
                .zip(scale)
                .map(|((v, m), s)| (v - m) / s)
                .collect(),
            Self::MinMax { scale, min } => x
                .iter()
                .zip(scale)
                .zip(min)
                .map(|((v, s), m)| v * s + m)
                .collect(),
        };
        ensure_finite(&out)?;
        Ok(out)
    }
}

fn check_params(what: &str, values: &[f64], n_features: usize) -> Result<(), SchemaError> {
    if values.len() != n_features {
        return Err(SchemaError::dimension(what, n_features, values.len()));
    }
    if let Some(i) = values.iter().position(|v| !v.is_finite()) {
        return Err(SchemaError::Invalid(format!("{what}[{i}] is not finite")));
    }
    Ok(())
}
