//! The validated, immutable model bundle used for inference.

use std::collections::HashSet;
use std::path::Path;

use croprec_core::{
    ArtifactBundle, ArtifactMetadata, ClassifierSpec, FORMAT_VERSION, PredictionError,
};

use crate::classifier::ensure_finite;
use crate::{
    Classifier, GaussianNb, LabelIndex, NearestCentroid, RandomForest, Scaler, SchemaError,
    SoftmaxLinear,
};

/// Classifier, scaler, label index and feature ordering, checked against each
/// other.
///
/// Once built the artifact is never mutated. The scaler and classifier both
/// take exactly `feature_names().len()` inputs, and the classifier produces
/// exactly `labels().len()` scores.
#[derive(Debug)]
pub struct ModelArtifact {
    feature_names: Vec<String>,
    scaler: Scaler,
    classifier: Box<dyn Classifier>,
    labels: LabelIndex,
    metadata: ArtifactMetadata,
}

impl ModelArtifact {
    /// Assemble an artifact from parts, checking that their shapes agree.
    pub fn new(
        feature_names: Vec<String>,
        scaler: Scaler,
        classifier: Box<dyn Classifier>,
        labels: LabelIndex,
        metadata: ArtifactMetadata,
    ) -> Result<Self, SchemaError> {
        check_feature_names(&feature_names)?;
        let n_features = feature_names.len();
        if scaler.n_features() != n_features {
            return Err(SchemaError::dimension(
                "scaler features",
                n_features,
                scaler.n_features(),
            ));
        }
        if classifier.n_features() != n_features {
            return Err(SchemaError::dimension(
                "classifier features",
                n_features,
                classifier.n_features(),
            ));
        }
        if classifier.n_classes() != labels.len() {
            return Err(SchemaError::dimension(
                "classifier classes",
                labels.len(),
                classifier.n_classes(),
            ));
        }

        Ok(Self {
            feature_names,
            scaler,
            classifier,
            labels,
            metadata,
        })
    }

    /// Build an artifact from a decoded bundle.
    ///
    /// `base_dir` resolves relative paths inside the bundle (ONNX graphs).
    pub fn from_bundle(bundle: ArtifactBundle, base_dir: &Path) -> Result<Self, SchemaError> {
        if bundle.format_version != FORMAT_VERSION {
            return Err(SchemaError::UnsupportedVersion {
                found: bundle.format_version,
                expected: FORMAT_VERSION,
            });
        }

        let feature_names = bundle.feature_names_or_default();
        check_feature_names(&feature_names)?;
        let n_features = feature_names.len();

        let labels = LabelIndex::new(bundle.labels)?;
        let scaler = Scaler::from_spec(&bundle.scaler, n_features)?;
        let classifier = build_classifier(bundle.classifier, n_features, labels.len(), base_dir)?;

        Self::new(feature_names, scaler, classifier, labels, bundle.metadata)
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn scaler(&self) -> &Scaler {
        &self.scaler
    }

    pub fn classifier(&self) -> &dyn Classifier {
        self.classifier.as_ref()
    }

    pub fn labels(&self) -> &LabelIndex {
        &self.labels
    }

    pub fn metadata(&self) -> &ArtifactMetadata {
        &self.metadata
    }

    /// Run the classifier on a normalized vector and check its output.
    ///
    /// The distribution must have one finite, non-negative score per label.
    /// Scores are not required to sum to exactly 1.
    pub fn classify(&self, scaled: &[f64]) -> Result<Vec<f64>, PredictionError> {
        let probabilities = self.classifier.predict_proba(scaled)?;
        if probabilities.len() != self.labels.len() {
            return Err(PredictionError::OutputLength {
                expected: self.labels.len(),
                actual: probabilities.len(),
            });
        }
        ensure_finite(&probabilities)?;
        if let Some((index, &value)) = probabilities.iter().enumerate().find(|(_, p)| **p < 0.0) {
            return Err(PredictionError::Negative { index, value });
        }
        Ok(probabilities)
    }
}

fn check_feature_names(names: &[String]) -> Result<(), SchemaError> {
    if names.is_empty() {
        return Err(SchemaError::Invalid("feature ordering is empty".into()));
    }
    let mut seen = HashSet::with_capacity(names.len());
    for name in names {
        if name.trim().is_empty() {
            return Err(SchemaError::Invalid(
                "feature ordering contains a blank name".into(),
            ));
        }
        if !seen.insert(name.as_str()) {
            return Err(SchemaError::Duplicate {
                what: "feature",
                name: name.clone(),
            });
        }
    }
    Ok(())
}

#[cfg_attr(not(feature = "onnx"), allow(unused_variables))]
fn build_classifier(
    spec: ClassifierSpec,
    n_features: usize,
    n_classes: usize,
    base_dir: &Path,
) -> Result<Box<dyn Classifier>, SchemaError> {
    Ok(match spec {
        ClassifierSpec::SoftmaxLinear {
            coefficients,
            intercepts,
        } => Box::new(SoftmaxLinear::new(coefficients, intercepts)?),
        ClassifierSpec::GaussianNb {
            class_prior,
            theta,
            var,
        } => Box::new(GaussianNb::new(class_prior, theta, var)?),
        ClassifierSpec::NearestCentroid {
            centroids,
            temperature,
        } => Box::new(NearestCentroid::new(centroids, temperature)?),
        ClassifierSpec::RandomForest { trees } => {
            Box::new(RandomForest::new(&trees, n_features, n_classes)?)
        }
        #[cfg(feature = "onnx")]
        ClassifierSpec::Onnx { path } => Box::new(crate::OnnxClassifier::load(
            &base_dir.join(path),
            n_features,
            n_classes,
        )?),
        #[cfg(not(feature = "onnx"))]
        ClassifierSpec::Onnx { .. } => return Err(SchemaError::OnnxUnavailable),
    })
}
