//! Decision-tree ensemble classifier.
//!
//! Trees arrive as parallel node arrays (`children_left`, `children_right`,
//! `feature`, `threshold`, `value`) and are rebuilt into explicit nodes on
//! load. Structure is checked up front so prediction can walk a tree without
//! bounds or cycle checks.

use croprec_core::{PredictionError, TreeSpec};

use crate::Classifier;
use crate::SchemaError;
use crate::classifier::check_input;

const LEAF: i64 = -1;

#[derive(Debug, Clone)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Normalized class distribution.
    Leaf(Vec<f64>),
}

#[derive(Debug, Clone)]
struct Tree {
    nodes: Vec<Node>,
}

impl Tree {
    fn from_spec(
        spec: &TreeSpec,
        t: usize,
        n_features: usize,
        n_classes: usize,
    ) -> Result<Self, SchemaError> {
        let n = spec.children_left.len();
        if n == 0 {
            return Err(SchemaError::Invalid(format!("trees[{t}] has no nodes")));
        }
        for (what, len) in [
            ("children_right", spec.children_right.len()),
            ("feature", spec.feature.len()),
            ("threshold", spec.threshold.len()),
            ("value", spec.value.len()),
        ] {
            if len != n {
                return Err(SchemaError::dimension(format!("trees[{t}].{what}"), n, len));
            }
        }

        let child = |raw: i64| -> Result<usize, SchemaError> {
            usize::try_from(raw)
                .ok()
                .filter(|&c| c < n)
                .ok_or_else(|| {
                    SchemaError::Invalid(format!("trees[{t}] has child index {raw} out of range"))
                })
        };

        let mut nodes = Vec::with_capacity(n);
        for i in 0..n {
            let (l, r) = (spec.children_left[i], spec.children_right[i]);
            let node = if l == LEAF && r == LEAF {
                Node::Leaf(leaf_distribution(&spec.value[i], t, i, n_classes)?)
            } else {
                let feature = usize::try_from(spec.feature[i])
                    .ok()
                    .filter(|&f| f < n_features)
                    .ok_or_else(|| {
                        SchemaError::Invalid(format!(
                            "trees[{t}] node {i} splits on unknown feature {}",
                            spec.feature[i]
                        ))
                    })?;
                let threshold = spec.threshold[i];
                if !threshold.is_finite() {
                    return Err(SchemaError::Invalid(format!(
                        "trees[{t}] node {i} has a non-finite threshold"
                    )));
                }
                Node::Split {
                    feature,
                    threshold,
                    left: child(l)?,
                    right: child(r)?,
                }
            };
            nodes.push(node);
        }

        let tree = Self { nodes };
        tree.check_acyclic(t)?;
        Ok(tree)
    }

    /// Every node reachable from the root must be reached exactly once.
    fn check_acyclic(&self, t: usize) -> Result<(), SchemaError> {
        let mut visited = vec![false; self.nodes.len()];
        let mut stack = vec![0usize];
        while let Some(i) = stack.pop() {
            if std::mem::replace(&mut visited[i], true) {
                return Err(SchemaError::Invalid(format!(
                    "trees[{t}] is not a tree: node {i} is reachable twice"
                )));
            }
            if let Node::Split { left, right, .. } = self.nodes[i] {
                stack.push(left);
                stack.push(right);
            }
        }
        Ok(())
    }

    fn leaf_for(&self, x: &[f64]) -> &[f64] {
        let mut i = 0;
        loop {
            match &self.nodes[i] {
                Node::Leaf(dist) => return dist,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    i = if x[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

fn leaf_distribution(
    weights: &[f64],
    t: usize,
    i: usize,
    n_classes: usize,
) -> Result<Vec<f64>, SchemaError> {
    if weights.len() != n_classes {
        return Err(SchemaError::dimension(
            format!("trees[{t}].value[{i}]"),
            n_classes,
            weights.len(),
        ));
    }
    if weights.iter().any(|w| !w.is_finite() || *w < 0.0) {
        return Err(SchemaError::Invalid(format!(
            "trees[{t}] leaf {i} has a negative or non-finite weight"
        )));
    }
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return Err(SchemaError::Invalid(format!("trees[{t}] leaf {i} is empty")));
    }
    Ok(weights.iter().map(|w| w / total).collect())
}

/// Mean of per-tree leaf distributions.
#[derive(Debug, Clone)]
pub struct RandomForest {
    trees: Vec<Tree>,
    n_features: usize,
    n_classes: usize,
}

impl RandomForest {
    pub fn new(
        trees: &[TreeSpec],
        n_features: usize,
        n_classes: usize,
    ) -> Result<Self, SchemaError> {
        if trees.is_empty() {
            return Err(SchemaError::Invalid("classifier.trees is empty".into()));
        }
        let trees = trees
            .iter()
            .enumerate()
            .map(|(t, spec)| Tree::from_spec(spec, t, n_features, n_classes))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self {
            trees,
            n_features,
            n_classes,
        })
    }
}

impl Classifier for RandomForest {
    fn kind(&self) -> &'static str {
        "random_forest"
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn n_classes(&self) -> usize {
        self.n_classes
    }

    fn predict_proba(&self, x: &[f64]) -> Result<Vec<f64>, PredictionError> {
        check_input(x, self.n_features)?;
        let mut out = vec![0.0; self.n_classes];
        for tree in &self.trees {
            for (acc, p) in out.iter_mut().zip(tree.leaf_for(x)) {
                *acc += p;
            }
        }
        let n = self.trees.len() as f64;
        for p in &mut out {
            *p /= n;
        }
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Stump on feature `f`: `x[f] <= thr` → class 0, else class 1.
    fn stump(f: i64, thr: f64) -> TreeSpec {
        TreeSpec {
            children_left: vec![1, -1, -1],
            children_right: vec![2, -1, -1],
            feature: vec![f, -2, -2],
            threshold: vec![thr, -2.0, -2.0],
            value: vec![vec![5.0, 5.0], vec![4.0, 0.0], vec![1.0, 3.0]],
        }
    }

    #[test]
    fn single_stump_routes_by_threshold() {
        let forest = RandomForest::new(&[stump(0, 0.5)], 2, 2).unwrap();
        assert_eq!(forest.predict_proba(&[0.5, 9.0]).unwrap(), vec![1.0, 0.0]);
        assert_eq!(forest.predict_proba(&[0.6, 9.0]).unwrap(), vec![0.25, 0.75]);
    }

    #[test]
    fn forest_averages_trees() {
        let forest = RandomForest::new(&[stump(0, 0.0), stump(1, 0.0)], 2, 2).unwrap();
        // Tree 0 goes left (class 0 certain), tree 1 goes right (0.25 / 0.75).
        let p = forest.predict_proba(&[-1.0, 1.0]).unwrap();
        assert_eq!(p, vec![0.625, 0.375]);
    }

    #[test]
    fn leaf_only_tree() {
        let spec = TreeSpec {
            children_left: vec![-1],
            children_right: vec![-1],
            feature: vec![-2],
            threshold: vec![-2.0],
            value: vec![vec![1.0, 1.0, 2.0]],
        };
        let forest = RandomForest::new(&[spec], 7, 3).unwrap();
        assert_eq!(forest.predict_proba(&[0.0; 7]).unwrap(), vec![0.25, 0.25, 0.5]);
    }

    #[test]
    fn rejects_cycle() {
        let mut spec = stump(0, 0.5);
        // Node 2 becomes a split pointing back at the root.
        spec.children_left[2] = 0;
        spec.children_right[2] = 1;
        spec.feature[2] = 0;
        spec.threshold[2] = 0.0;
        let err = RandomForest::new(&[spec], 2, 2).unwrap_err();
        assert!(err.to_string().contains("reachable twice"), "{err}");
    }

    #[test]
    fn rejects_out_of_range_child() {
        let mut spec = stump(0, 0.5);
        spec.children_right[0] = 7;
        let err = RandomForest::new(&[spec], 2, 2).unwrap_err();
        assert!(err.to_string().contains("out of range"), "{err}");
    }

    #[test]
    fn rejects_unknown_feature() {
        let err = RandomForest::new(&[stump(3, 0.5)], 2, 2).unwrap_err();
        assert!(err.to_string().contains("unknown feature 3"), "{err}");
    }

    #[test]
    fn rejects_class_count_mismatch() {
        let err = RandomForest::new(&[stump(0, 0.5)], 2, 3).unwrap_err();
        assert!(matches!(err, SchemaError::Dimension { expected: 3, found: 2, .. }));
    }

    #[test]
    fn rejects_ragged_arrays() {
        let mut spec = stump(0, 0.5);
        spec.threshold.pop();
        assert!(matches!(
            RandomForest::new(&[spec], 2, 2),
            Err(SchemaError::Dimension { .. })
        ));
    }

    #[test]
    fn rejects_empty_leaf() {
        let mut spec = stump(0, 0.5);
        spec.value[1] = vec![0.0, 0.0];
        assert!(RandomForest::new(&[spec], 2, 2).is_err());
    }

    #[test]
    fn rejects_empty_forest() {
        assert!(RandomForest::new(&[], 2, 2).is_err());
    }
}
