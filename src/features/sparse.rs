use serde::{Deserialize, Serialize};

/// Sparse row in the hashed feature space, indices strictly increasing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SparseVector {
    dim: usize,
    indices: Vec<u32>,
    values: Vec<f64>,
}

impl SparseVector {
    /// Build from `(index, value)` pairs already sorted by index with no duplicates.
    pub(crate) fn from_sorted(dim: usize, entries: impl IntoIterator<Item = (u32, f64)>) -> Self {
        let (indices, values) = entries.into_iter().unzip();
        Self {
            dim,
            indices,
            values,
        }
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of stored (non-zero) entries.
    pub fn nnz(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.indices
            .iter()
            .zip(self.values.iter())
            .map(|(&idx, &value)| (idx as usize, value))
    }

    /// Dot product against a dense weight vector of the same dimension.
    pub fn dot(&self, dense: &[f64]) -> f64 {
        self.iter().map(|(idx, value)| dense[idx] * value).sum()
    }

    pub fn l2_norm(&self) -> f64 {
        self.values.iter().map(|v| v * v).sum::<f64>().sqrt()
    }

    pub(crate) fn scale(&mut self, factor: f64) {
        for value in &mut self.values {
            *value *= factor;
        }
    }

    pub(crate) fn fill(&mut self, value: f64) {
        for stored in &mut self.values {
            *stored = value;
        }
    }

    pub(crate) fn values(&self) -> &[f64] {
        &self.values
    }
}
