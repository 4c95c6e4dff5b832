use std::path::PathBuf;

use croprec_ai::ModelArtifact;
use serde::Serialize;

/// Readiness report for the serving layer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Health {
    /// `"ok"` once an artifact is loaded, `"unavailable"` before.
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub features: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classifier: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,
}

impl Health {
    pub fn ready(artifact: &ModelArtifact, source: Option<PathBuf>) -> Self {
        Self {
            status: "ok",
            labels: Some(artifact.labels().len()),
            features: Some(artifact.feature_names().to_vec()),
            classifier: Some(artifact.classifier().kind()),
            model: artifact.metadata().model_name.clone(),
            source,
        }
    }

    pub fn unavailable() -> Self {
        Self {
            status: "unavailable",
            labels: None,
            features: None,
            classifier: None,
            model: None,
            source: None,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
