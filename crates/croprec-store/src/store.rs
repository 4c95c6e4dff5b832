//! Process-wide holder of the current model artifact.
//!
//! Readers take an `Arc` snapshot of the published artifact and keep it for
//! as long as they need; a later `load` swaps the pointer without touching
//! artifacts already handed out. The write lock is only held for the swap,
//! after the new artifact has been fully read and validated.

use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};

use croprec_ai::ModelArtifact;
use croprec_core::ArtifactBundle;
use tracing::{info, warn};

use crate::ArtifactError;

struct Published {
    artifact: Arc<ModelArtifact>,
    source: Option<PathBuf>,
}

#[derive(Default)]
pub struct ArtifactStore {
    current: RwLock<Option<Published>>,
}

impl ArtifactStore {
    /// An empty store. [`current`](Self::current) fails until a load succeeds.
    pub fn new() -> Self {
        Self::default()
    }

    /// A store already holding an in-memory artifact.
    pub fn with_artifact(artifact: ModelArtifact) -> Self {
        let store = Self::new();
        store.publish(Arc::new(artifact), None);
        store
    }

    /// Read, decode and validate the artifact at `path`, then publish it.
    ///
    /// On failure the previously published artifact, if any, stays current.
    pub fn load(&self, path: &Path) -> Result<Arc<ModelArtifact>, ArtifactError> {
        let artifact = match read_artifact(path) {
            Ok(artifact) => Arc::new(artifact),
            Err(e) => {
                if self.is_loaded() {
                    warn!(
                        path = %path.display(),
                        error = %e,
                        "artifact reload failed, keeping current artifact"
                    );
                }
                return Err(e);
            }
        };

        info!(
            path = %path.display(),
            features = artifact.feature_names().len(),
            labels = artifact.labels().len(),
            scaler = artifact.scaler().kind(),
            classifier = artifact.classifier().kind(),
            model = artifact.metadata().model_name.as_deref().unwrap_or("-"),
            "loaded model artifact"
        );
        self.publish(Arc::clone(&artifact), Some(path.to_path_buf()));
        Ok(artifact)
    }

    /// The published artifact.
    pub fn current(&self) -> Result<Arc<ModelArtifact>, ArtifactError> {
        self.read_slot(|slot| slot.map(|p| Arc::clone(&p.artifact)))
            .ok_or(ArtifactError::NotLoaded)
    }

    pub fn is_loaded(&self) -> bool {
        self.read_slot(|slot| slot.is_some())
    }

    /// Path the current artifact was loaded from (`None` for in-memory artifacts).
    pub fn source(&self) -> Option<PathBuf> {
        self.read_slot(|slot| slot.and_then(|p| p.source.clone()))
    }

    /// The published artifact together with the path it came from, read under
    /// one lock, so both always describe the same load.
    pub fn snapshot(&self) -> Option<(Arc<ModelArtifact>, Option<PathBuf>)> {
        self.read_slot(|slot| slot.map(|p| (Arc::clone(&p.artifact), p.source.clone())))
    }

    fn publish(&self, artifact: Arc<ModelArtifact>, source: Option<PathBuf>) {
        // The slot only ever holds a complete value, so a poisoned lock is still usable.
        let mut slot = self.current.write().unwrap_or_else(PoisonError::into_inner);
        *slot = Some(Published { artifact, source });
    }

    fn read_slot<T>(&self, f: impl FnOnce(Option<&Published>) -> T) -> T {
        let slot = self.current.read().unwrap_or_else(PoisonError::into_inner);
        f(slot.as_ref())
    }
}

/// Read and validate an artifact file without publishing it.
pub fn read_artifact(path: &Path) -> Result<ModelArtifact, ArtifactError> {
    if !path.exists() {
        return Err(ArtifactError::NotFound(path.to_path_buf()));
    }

    let text = std::fs::read_to_string(path).map_err(|source| match source.kind() {
        std::io::ErrorKind::NotFound => ArtifactError::NotFound(path.to_path_buf()),
        std::io::ErrorKind::InvalidData => corrupt(path, "file is not valid UTF-8"),
        _ => ArtifactError::Io {
            path: path.to_path_buf(),
            source,
        },
    })?;

    let bundle: ArtifactBundle = serde_json::from_str(&text).map_err(|e| corrupt(path, e))?;

    let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
    ModelArtifact::from_bundle(bundle, base_dir).map_err(|e| corrupt(path, e))
}

fn corrupt(path: &Path, reason: impl ToString) -> ArtifactError {
    ArtifactError::Corrupt {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
