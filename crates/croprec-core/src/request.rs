//! Request and response types shared between the pipeline and its callers.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Feature ordering used when an artifact does not carry its own.
pub const DEFAULT_FEATURE_NAMES: [&str; 7] =
    ["N", "P", "K", "temperature", "humidity", "ph", "rainfall"];

/// Number of recommendations returned when a request does not ask for a count.
pub const DEFAULT_TOP_N: usize = 5;

pub fn default_feature_names() -> Vec<String> {
    DEFAULT_FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
}

/// A named feature mapping plus an optional result count.
///
/// Deserializes from a flat JSON object: `top_n` is picked out and every other
/// key becomes a feature. Values are kept as JSON so that type problems are
/// reported per feature by [`build_feature_vector`](crate::build_feature_vector).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_n: Option<usize>,
    #[serde(flatten)]
    pub features: Map<String, Value>,
}

impl FeatureRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_feature(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.features.insert(name.into(), value.into());
        self
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = Some(top_n);
        self
    }
}

/// One ranked crop with its probability expressed as a percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub crop: String,
    pub probability: f64,
}

impl Recommendation {
    pub fn new(crop: impl Into<String>, probability: f64) -> Self {
        Self {
            crop: crop.into(),
            probability,
        }
    }
}
