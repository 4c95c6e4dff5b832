use std::fmt;

use thiserror::Error;

/// Pipeline stage a failure was raised from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Build,
    Scale,
    Classify,
    Rank,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Build => "build",
            Self::Scale => "scale",
            Self::Classify => "classify",
            Self::Rank => "rank",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failure inside the scaler or classifier.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PredictionError {
    #[error("expected {expected} input values, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("classifier produced {actual} scores for {expected} labels")]
    OutputLength { expected: usize, actual: usize },

    #[error("non-finite value at index {index}")]
    NonFinite { index: usize },

    #[error("negative probability {value} at index {index}")]
    Negative { index: usize, value: f64 },

    #[error("{0}")]
    Backend(String),
}

/// Errors returned by a recommendation call.
///
/// `MissingFeatures`, `InvalidFeatureType` and `InvalidTopN` are caused by the
/// request and are safe to report back verbatim. Everything else is a server
/// side failure.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecommendError {
    #[error("model artifact is not loaded")]
    NotLoaded,

    #[error("missing features: {}", .0.join(", "))]
    MissingFeatures(Vec<String>),

    #[error("feature '{0}' is not a number")]
    InvalidFeatureType(String),

    #[error("top_n must be at least 1")]
    InvalidTopN,

    #[error("prediction failed during {stage}: {source}")]
    Prediction {
        stage: Stage,
        #[source]
        source: PredictionError,
    },
}

/// Message returned to callers in place of server-side error detail.
pub const INTERNAL_ERROR_MESSAGE: &str = "internal error while generating recommendations";

impl RecommendError {
    pub fn prediction(stage: Stage, source: PredictionError) -> Self {
        Self::Prediction { stage, source }
    }

    /// True when the request itself was at fault.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::MissingFeatures(_) | Self::InvalidFeatureType(_) | Self::InvalidTopN
        )
    }

    /// Text that may be shown to an external caller.
    ///
    /// Server-side failures are redacted to [`INTERNAL_ERROR_MESSAGE`]; log the
    /// full error instead.
    pub fn public_message(&self) -> String {
        if self.is_client_error() {
            self.to_string()
        } else {
            INTERNAL_ERROR_MESSAGE.to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_features_lists_every_name() {
        let err = RecommendError::MissingFeatures(vec!["ph".into(), "rainfall".into()]);
        assert_eq!(err.to_string(), "missing features: ph, rainfall");
        assert!(err.is_client_error());
    }

    #[test]
    fn prediction_error_carries_stage() {
        let err = RecommendError::prediction(
            Stage::Scale,
            PredictionError::ShapeMismatch {
                expected: 7,
                actual: 6,
            },
        );
        assert_eq!(
            err.to_string(),
            "prediction failed during scale: expected 7 input values, got 6"
        );
        assert!(!err.is_client_error());
    }

    #[test]
    fn server_errors_are_redacted() {
        let err = RecommendError::prediction(
            Stage::Classify,
            PredictionError::Backend("onnx session exploded at 0x7f".into()),
        );
        assert_eq!(err.public_message(), INTERNAL_ERROR_MESSAGE);
        assert_eq!(RecommendError::NotLoaded.public_message(), INTERNAL_ERROR_MESSAGE);
    }

    #[test]
    fn client_errors_are_reported_verbatim() {
        let err = RecommendError::InvalidFeatureType("ph".into());
        assert_eq!(err.public_message(), "feature 'ph' is not a number");
    }
}
