use std::sync::Arc;

use croprec_core::{
    DEFAULT_TOP_N, FeatureRequest, PredictionError, Recommendation, RecommendError, Stage,
    build_feature_vector, rank_top_n,
};
use croprec_store::ArtifactStore;
use tracing::{debug, error};

use crate::Health;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommenderConfig {
    /// Result count used when a request does not specify `top_n`.
    pub default_top_n: usize,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            default_top_n: DEFAULT_TOP_N,
        }
    }
}

/// Request-scoped recommendation over whatever artifact the store currently
/// publishes.
///
/// Stateless between calls and safe to share across threads.
pub struct Recommender {
    store: Arc<ArtifactStore>,
    config: RecommenderConfig,
}

impl Recommender {
    pub fn new(store: Arc<ArtifactStore>) -> Self {
        Self::with_config(store, RecommenderConfig::default())
    }

    pub fn with_config(store: Arc<ArtifactStore>, config: RecommenderConfig) -> Self {
        Self { store, config }
    }

    pub fn store(&self) -> &Arc<ArtifactStore> {
        &self.store
    }

    /// Rank crops for one feature request.
    ///
    /// Returns `min(top_n, classes)` recommendations, most probable first.
    pub fn recommend(
        &self,
        request: &FeatureRequest,
    ) -> Result<Vec<Recommendation>, RecommendError> {
        match self.run(request) {
            Ok(recs) => {
                debug!(
                    top = recs.first().map(|r| r.crop.as_str()).unwrap_or("-"),
                    count = recs.len(),
                    "recommendation complete"
                );
                Ok(recs)
            }
            Err(Failure { stage, error }) => {
                let stage = stage.map(|s| s.as_str()).unwrap_or("-");
                if error.is_client_error() {
                    debug!(stage, error = %error, "rejected recommendation request");
                } else {
                    error!(stage, error = %error, "recommendation failed");
                }
                Err(error)
            }
        }
    }

    fn run(&self, request: &FeatureRequest) -> Result<Vec<Recommendation>, Failure> {
        let top_n = match request.top_n {
            Some(0) => return Err(RecommendError::InvalidTopN.into()),
            Some(n) => n,
            None => self.config.default_top_n,
        };

        // One snapshot per request: a concurrent reload cannot mix artifacts.
        let artifact = self
            .store
            .current()
            .map_err(|_| RecommendError::NotLoaded)?;

        let raw = build_feature_vector(&request.features, artifact.feature_names())
            .map_err(|e| Failure::at(Stage::Build, e))?;
        let scaled = artifact
            .scaler()
            .transform(&raw)
            .map_err(|e| Failure::prediction(Stage::Scale, e))?;
        let probabilities = artifact
            .classify(&scaled)
            .map_err(|e| Failure::prediction(Stage::Classify, e))?;

        rank_top_n(&probabilities, artifact.labels().as_slice(), top_n)
            .map_err(|e| Failure::prediction(Stage::Rank, e))
    }

    /// Readiness report: `ok` once an artifact is published.
    pub fn health(&self) -> Health {
        match self.store.snapshot() {
            Some((artifact, source)) => Health::ready(&artifact, source),
            None => Health::unavailable(),
        }
    }
}

/// A rejected request and the pipeline stage that rejected it. Failures
/// before the pipeline starts (bad `top_n`, no artifact) carry no stage.
#[derive(Debug)]
struct Failure {
    stage: Option<Stage>,
    error: RecommendError,
}

impl Failure {
    fn at(stage: Stage, error: RecommendError) -> Self {
        Self {
            stage: Some(stage),
            error,
        }
    }

    fn prediction(stage: Stage, source: PredictionError) -> Self {
        Self::at(stage, RecommendError::prediction(stage, source))
    }
}

impl From<RecommendError> for Failure {
    fn from(error: RecommendError) -> Self {
        Self { stage: None, error }
    }
}
