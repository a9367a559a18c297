//! Exact inner-product index
//!
//! Vectors are stored contiguously in insertion order; ordinal `i` is the
//! i-th inserted vector. Brute-force search is exact and fast enough for
//! filing-scale corpora (tens of thousands of chunks).

use crate::embedding::dot;
use crate::errors::{RagError, Result};

#[derive(Debug, Clone, PartialEq)]
pub struct FlatIndex {
    dimension: usize,
    data: Vec<f32>,
}

impl FlatIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            data: Vec::new(),
        }
    }

    /// Rebuild from raw row-major storage
    pub fn from_raw(dimension: usize, data: Vec<f32>) -> Result<Self> {
        if dimension == 0 || data.len() % dimension != 0 {
            return Err(RagError::IndexCorrupt(format!(
                "{} values cannot form rows of dimension {}",
                data.len(),
                dimension
            )));
        }
        Ok(Self { dimension, data })
    }

    /// Append one vector; its ordinal is the previous `len()`
    pub fn add(&mut self, vector: &[f32]) -> Result<usize> {
        if vector.len() != self.dimension {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }

        let ordinal = self.len();
        self.data.extend_from_slice(vector);
        Ok(ordinal)
    }

    pub fn len(&self) -> usize {
        if self.dimension == 0 {
            0
        } else {
            self.data.len() / self.dimension
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn vector(&self, ordinal: usize) -> Option<&[f32]> {
        let start = ordinal.checked_mul(self.dimension)?;
        self.data.get(start..start + self.dimension)
    }

    pub fn raw(&self) -> &[f32] {
        &self.data
    }

    /// Top-`k` ordinals by inner product, best first. Ties keep insertion order.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>> {
        if query.len() != self.dimension {
            return Err(RagError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .data
            .chunks_exact(self.dimension)
            .map(|row| dot(row, query))
            .enumerate()
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        scored.truncate(k);

        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn index() -> FlatIndex {
        let mut index = FlatIndex::new(2);
        index.add(&[1.0, 0.0]).unwrap();
        index.add(&[0.0, 1.0]).unwrap();
        index.add(&[0.6, 0.8]).unwrap();
        index
    }

    #[test]
    fn test_add_assigns_ordinals() {
        let mut index = FlatIndex::new(3);
        assert_eq!(index.add(&[1.0, 0.0, 0.0]).unwrap(), 0);
        assert_eq!(index.add(&[0.0, 1.0, 0.0]).unwrap(), 1);
        assert_eq!(index.len(), 2);
        assert_eq!(index.vector(1), Some(&[0.0, 1.0, 0.0][..]));
        assert_eq!(index.vector(2), None);
    }

    #[test]
    fn test_add_rejects_wrong_dimension() {
        let mut index = FlatIndex::new(3);
        let err = index.add(&[1.0]).unwrap_err();
        assert!(matches!(err, RagError::DimensionMismatch { expected: 3, actual: 1 }));
    }

    #[test]
    fn test_search_orders_by_inner_product() {
        let hits = index().search(&[0.0, 1.0], 3).unwrap();
        let ordinals: Vec<usize> = hits.iter().map(|h| h.0).collect();
        assert_eq!(ordinals, vec![1, 2, 0]);
        assert!((hits[0].1 - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_search_k_larger_than_index() {
        let hits = index().search(&[1.0, 0.0], 10).unwrap();
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn test_search_ties_keep_insertion_order() {
        let mut index = FlatIndex::new(1);
        index.add(&[0.5]).unwrap();
        index.add(&[0.5]).unwrap();
        let hits = index.search(&[1.0], 2).unwrap();
        assert_eq!(hits[0].0, 0);
        assert_eq!(hits[1].0, 1);
    }

    #[test]
    fn test_from_raw_validates_shape() {
        assert!(FlatIndex::from_raw(2, vec![1.0, 2.0, 3.0]).is_err());
        assert!(FlatIndex::from_raw(0, vec![]).is_err());
        assert_eq!(FlatIndex::from_raw(2, vec![1.0, 2.0]).unwrap().len(), 1);
    }
}
