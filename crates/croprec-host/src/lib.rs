//! Recommendation pipeline: feature vector → scaler → classifier → top-N.

mod health;
mod pipeline;

pub use health::Health;
pub use pipeline::{Recommender, RecommenderConfig};
