//! ONNX Runtime backed classifier.
//!
//! The graph takes one `[1, n_features]` f32 tensor and produces class
//! probabilities as `[1, n_classes]`. Probabilities are read from the last
//! output: sklearn-onnx exports with `zipmap=False` emit the label first and
//! the probability tensor second.

use std::path::Path;
use std::sync::Mutex;

use croprec_core::PredictionError;
use ort::session::Session;
use ort::value::Tensor;
use tracing::info;

use crate::classifier::check_input;
use crate::{Classifier, SchemaError};

pub struct OnnxClassifier {
    session: Mutex<Session>,
    n_features: usize,
    n_classes: usize,
}

impl OnnxClassifier {
    /// Load an ONNX classifier expected to map `n_features` inputs to `n_classes` scores.
    pub fn load(path: &Path, n_features: usize, n_classes: usize) -> Result<Self, SchemaError> {
        if !path.exists() {
            return Err(SchemaError::Invalid(format!(
                "onnx model not found at {}",
                path.display()
            )));
        }

        let session = Session::builder()?.commit_from_file(path)?;

        let outputs = session.outputs();
        let declared = outputs
            .last()
            .and_then(|output| infer_dim(output.dtype()));
        if let Some(dim) = declared
            && dim != n_classes
        {
            return Err(SchemaError::dimension("onnx output classes", n_classes, dim));
        }

        info!(model = %path.display(), n_features, n_classes, "loaded onnx classifier");
        Ok(Self {
            session: Mutex::new(session),
            n_features,
            n_classes,
        })
    }
}

impl Classifier for OnnxClassifier {
    fn kind(&self) -> &'static str {
        "onnx"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, PredictionError> {
        check_input(x, self.n_features)?;

        let input: Vec<f32> = x.iter().map(|&v| v as f32).collect();
        let shape = [1i64, self.n_features as i64];
        let tensor = Tensor::from_array((shape, input.into_boxed_slice())).map_err(backend)?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| PredictionError::Backend("onnx session lock poisoned".into()))?;
        let outputs = session.run(ort::inputs![tensor]).map_err(backend)?;

        let last = outputs.len().checked_sub(1).ok_or_else(|| {
            PredictionError::Backend("onnx model produced no outputs".into())
        })?;
        let (_, data) = outputs[last].try_extract_tensor::<f32>().map_err(backend)?;

        Ok(data.iter().map(|&p| p as f64).collect())
    }
}

fn backend(e: ort::Error) -> PredictionError {
    PredictionError::Backend(format!("onnx runtime: {e}"))
}

/// Last dimension of a tensor output, when the graph declares it statically.
fn infer_dim(output_type: &ort::value::ValueType) -> Option<usize> {
    match output_type {
        ort::value::ValueType::Tensor { shape, .. } => shape
            .last()
            .and_then(|&d| if d > 0 { Some(d as usize) } else { None }),
        _ => None,
    }
}
