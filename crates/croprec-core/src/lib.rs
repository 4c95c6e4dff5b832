//! Core types for croprec: request/response shapes, the persisted artifact
//! schema, feature vector assembly and top-N ranking.

pub mod error;
pub mod features;
pub mod rank;
pub mod request;
pub mod schema;

pub use error::{INTERNAL_ERROR_MESSAGE, PredictionError, RecommendError, Stage};
pub use features::build_feature_vector;
pub use rank::rank_top_n;
pub use request::{
    DEFAULT_FEATURE_NAMES, DEFAULT_TOP_N, FeatureRequest, Recommendation, default_feature_names,
};
pub use schema::{
    ArtifactBundle, ArtifactMetadata, ClassifierSpec, FORMAT_VERSION, ScalerSpec, TreeSpec,
};
