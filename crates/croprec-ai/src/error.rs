use thiserror::Error;

/// A decoded artifact that cannot be turned into a usable model.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("unsupported format_version {found}, expected {expected}")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("label index is empty")]
    EmptyLabels,

    #[error("duplicate {what} '{name}'")]
    Duplicate { what: &'static str, name: String },

    #[error("{what}: expected {expected} values, found {found}")]
    Dimension {
        what: String,
        expected: usize,
        found: usize,
    },

    #[error("{0}")]
    Invalid(String),

    #[error("onnx classifiers require croprec to be built with the `onnx` feature")]
    OnnxUnavailable,

    #[cfg(feature = "onnx")]
    #[error("onnx runtime: {0}")]
    Onnx(#[from] ort::Error),
}

impl SchemaError {
    pub(crate) fn dimension(what: impl Into<String>, expected: usize, found: usize) -> Self {
        Self::Dimension {
            what: what.into(),
            expected,
            found,
        }
    }
}
