//! Artifact store: reads model artifacts from disk and publishes them to
//! concurrent readers.

mod error;
mod store;

pub use error::ArtifactError;
pub use store::{ArtifactStore, read_artifact};
