use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::features::FeaturePoint;
use crate::types::Shape;

/// Compares two sampled pool features.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Split {
    pub idx1: u32,
    pub idx2: u32,
    pub threshold: f32,
}

/// A complete binary regression tree stored as an implicit heap: the children
/// of split `i` are nodes `2i + 1` and `2i + 2`, and node indices past the
/// last split address `leaves`.
#[derive(Debug, Clone, Serialize)]
pub struct RegressionTree {
    splits: Vec<Split>,
    leaves: Vec<Shape>,
}

impl RegressionTree {
    pub fn new(splits: Vec<Split>, leaves: Vec<Shape>) -> Result<Self> {
        if leaves.len() != splits.len() + 1 {
            return Err(Error::InvalidModel(format!(
                "tree with {} splits needs {} leaves, got {}",
                splits.len(),
                splits.len() + 1,
                leaves.len()
            )));
        }
        Ok(Self { splits, leaves })
    }

    pub fn splits(&self) -> &[Split] {
        &self.splits
    }

    pub fn leaves(&self) -> &[Shape] {
        &self.leaves
    }

    /// Walk from the root to a leaf. A split goes left when
    /// `values[idx1] - values[idx2] > threshold`.
    pub fn leaf(&self, values: &[f32]) -> &Shape {
        let mut node = 0;
        while node < self.splits.len() {
            let split = &self.splits[node];
            let diff = values[split.idx1 as usize] - values[split.idx2 as usize];
            node = if diff > split.threshold {
                2 * node + 1
            } else {
                2 * node + 2
            };
        }
        &self.leaves[node - self.splits.len()]
    }
}

/// One cascade level: a pool of pixel features and the forest that reads it.
#[derive(Debug, Clone, Serialize)]
pub struct CascadeStage {
    pub pool: Vec<FeaturePoint>,
    pub forest: Vec<RegressionTree>,
}

impl CascadeStage {
    /// Build a stage, checking that every split reads an existing feature.
    pub fn new(pool: Vec<FeaturePoint>, forest: Vec<RegressionTree>) -> Result<Self> {
        for split in forest.iter().flat_map(|tree| tree.splits()) {
            let max_idx = split.idx1.max(split.idx2) as usize;
            if max_idx >= pool.len() {
                return Err(Error::InvalidModel(format!(
                    "split reads feature {} but the pool has {}",
                    max_idx,
                    pool.len()
                )));
            }
        }
        Ok(Self { pool, forest })
    }

    /// Add every tree's leaf for `values` to `shape`.
    pub fn refine(&self, values: &[f32], shape: &mut Shape) {
        for tree in &self.forest {
            shape.add_delta(tree.leaf(values));
        }
    }
}
