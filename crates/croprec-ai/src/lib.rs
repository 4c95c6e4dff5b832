//! Model runtime: feature scaling, probabilistic classifiers and the validated
//! in-memory model artifact. ONNX-backed classifiers are available with the
//! `onnx` feature.

mod artifact;
mod classifier;
mod error;
mod forest;
mod labels;
mod scaler;

#[cfg(feature = "onnx")]
mod onnx;

pub use artifact::ModelArtifact;
pub use classifier::{Classifier, GaussianNb, NearestCentroid, SoftmaxLinear};
pub use error::SchemaError;
pub use forest::RandomForest;
pub use labels::LabelIndex;
pub use scaler::Scaler;

#[cfg(feature = "onnx")]
pub use onnx::OnnxClassifier;
