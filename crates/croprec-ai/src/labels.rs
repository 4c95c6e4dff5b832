//! Ordered class labels.
//!
//! Classifier output index `i` names label `i`. The index is fixed when the
//! artifact is built and never reordered.

use std::collections::HashSet;

use crate::SchemaError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelIndex {
    labels: Vec<String>,
}

impl LabelIndex {
    /// Build a label index, rejecting empty, blank or duplicate labels.
    pub fn new(labels: Vec<String>) -> Result<Self, SchemaError> {
        if labels.is_empty() {
            return Err(SchemaError::EmptyLabels);
        }

        let mut seen = HashSet::with_capacity(labels.len());
        for label in &labels {
            if label.trim().is_empty() {
                return Err(SchemaError::Invalid("label index contains a blank label".into()));
            }
            if !seen.insert(label.as_str()) {
                return Err(SchemaError::Duplicate {
                    what: "label",
                    name: label.clone(),
                });
            }
        }

        Ok(Self { labels })
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.labels.get(index).map(|s| s.as_str())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.labels
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = &str> {
        self.labels.iter().map(|s| s.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index(names: &[&str]) -> Result<LabelIndex, SchemaError> {
        LabelIndex::new(names.iter().map(|s| s.to_string()).collect())
    }

    #[test]
    fn keeps_order() {
        let labels = index(&["rice", "maize", "wheat"]).unwrap();
        assert_eq!(labels.len(), 3);
        assert_eq!(labels.get(1), Some("maize"));
        assert_eq!(labels.get(3), None);
        assert_eq!(labels.iter().collect::<Vec<_>>(), vec!["rice", "maize", "wheat"]);
    }

    #[test]
    fn rejects_empty() {
        assert!(matches!(index(&[]), Err(SchemaError::EmptyLabels)));
    }

    #[test]
    fn rejects_duplicates() {
        let err = index(&["rice", "maize", "rice"]).unwrap_err();
        assert!(
            matches!(err, SchemaError::Duplicate { what: "label", ref name } if name == "rice")
        );
    }

    #[test]
    fn rejects_blank() {
        assert!(matches!(index(&["rice", "  "]), Err(SchemaError::Invalid(_))));
    }
}
