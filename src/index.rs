//! # EmbeddingIndex
//!
//! An ordered, append-only collection of fixed-dimension `f32` vectors
//! with exact nearest-neighbor search.
//!
//! Vectors are assigned sequential positions starting at 0. Positions are
//! never reused: deletion is handled one level up (see
//! [`MetadataTable`](crate::metadata::MetadataTable)) by unmapping the
//! position, which leaves the vector behind as a tombstone.
//!
//! Search is deliberately brute force: every query is compared against
//! every stored vector, O(n·dimension) per call. Exactness is the
//! contract here; swapping in an approximate structure would change
//! results, not just speed.
//!
//! ## Quick Example
//! ```
//! use simdex::index::EmbeddingIndex;
//!
//! # fn main() -> Result<(), simdex::error::StoreError> {
//! let mut index = EmbeddingIndex::new(4);
//! index.add(vec![1.0, 0.0, 0.0, 0.0])?;
//! index.add(vec![0.0, 1.0, 0.0, 0.0])?;
//! let hits = index.search(&[1.0, 0.0, 0.0, 0.0], 1)?;
//! assert_eq!(hits[0].0, 0);
//! # Ok(()) }
//! ```

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::error::StoreError;

/// Append-only vector index over squared Euclidean distance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingIndex {
    /// Dimensionality every stored vector must have. Set once, immutable.
    dimension: usize,
    /// Stored vectors; a vector's slot in this list is its position.
    vectors: Vec<Vec<f32>>,
}

impl EmbeddingIndex {
    /// Create an empty index for vectors of length `dimension`.
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension,
            vectors: Vec::new(),
        }
    }

    /// Rebuild an index from persisted parts.
    ///
    /// The caller (the persistence layer) is responsible for having
    /// validated that every vector has length `dimension`.
    pub(crate) fn from_parts(dimension: usize, vectors: Vec<Vec<f32>>) -> Self {
        Self { dimension, vectors }
    }

    /// Append a vector and return its position.
    ///
    /// Positions start at 0 and are strictly increasing; a returned
    /// position is never handed out twice.
    ///
    /// # Errors
    /// [`StoreError::DimensionMismatch`] if `vector.len()` disagrees with
    /// the index dimension. Nothing is appended in that case.
    pub fn add(&mut self, vector: Vec<f32>) -> Result<usize, StoreError> {
        if vector.len() != self.dimension {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimension,
                actual: vector.len(),
            });
        }
        let position = self.vectors.len();
        self.vectors.push(vector);
        Ok(position)
    }

    /// Find the `k` nearest stored vectors to `query`.
    ///
    /// Returns `(position, squared L2 distance)` pairs sorted ascending by
    /// distance, at most `min(k, len)` of them. Equal distances are broken
    /// by insertion order (lower position first) so results are
    /// deterministic.
    ///
    /// # Errors
    /// [`StoreError::DimensionMismatch`] if the query length disagrees
    /// with the index dimension.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<(usize, f32)>, StoreError> {
        if query.len() != self.dimension {
            return Err(StoreError::DimensionMismatch {
                expected: self.dimension,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .vectors
            .iter()
            .enumerate()
            .map(|(position, stored)| (position, squared_l2(query, stored)))
            .collect();

        // Ascending by distance, position as the deterministic tie-break.
        scored.sort_by(|a, b| {
            a.1.partial_cmp(&b.1)
                .unwrap_or(Ordering::Equal)
                .then(a.0.cmp(&b.0))
        });
        scored.truncate(k);

        Ok(scored)
    }

    /// Number of stored vectors, tombstoned or not.
    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    /// Whether the index holds no vectors at all.
    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// The dimension every vector in this index has.
    pub fn dimension(&self) -> usize {
        self.dimension
    }

    /// The vector stored at `position`, if any.
    pub fn vector_at(&self, position: usize) -> Option<&[f32]> {
        self.vectors.get(position).map(Vec::as_slice)
    }

    /// All stored vectors in position order. Used by the persistence layer.
    pub fn vectors(&self) -> &[Vec<f32>] {
        &self.vectors
    }
}

/// Squared Euclidean (L2) distance between two equal-length vectors.
///
/// The square root is skipped: only relative ordering matters for ranking,
/// and the similarity formula is calibrated against the squared form.
#[inline]
pub fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    debug_assert_eq!(a.len(), b.len(), "vectors must have same dimension");
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_assigns_sequential_positions() {
        let mut index = EmbeddingIndex::new(3);
        assert_eq!(index.add(vec![1.0, 0.0, 0.0]).unwrap(), 0);
        assert_eq!(index.add(vec![0.0, 1.0, 0.0]).unwrap(), 1);
        assert_eq!(index.add(vec![0.0, 0.0, 1.0]).unwrap(), 2);
        assert_eq!(index.len(), 3);
    }

    #[test]
    fn add_rejects_wrong_dimension() {
        let mut index = EmbeddingIndex::new(4);
        let result = index.add(vec![1.0, 2.0]);
        assert!(matches!(
            result,
            Err(StoreError::DimensionMismatch {
                expected: 4,
                actual: 2
            })
        ));
        assert!(index.is_empty());
    }

    #[test]
    fn search_rejects_wrong_dimension() {
        let mut index = EmbeddingIndex::new(4);
        index.add(vec![0.0; 4]).unwrap();
        let result = index.search(&[1.0, 2.0, 3.0], 1);
        assert!(matches!(
            result,
            Err(StoreError::DimensionMismatch {
                expected: 4,
                actual: 3
            })
        ));
    }

    #[test]
    fn search_returns_closest_first() {
        let mut index = EmbeddingIndex::new(4);
        index.add(vec![1.0, 0.0, 0.0, 0.0]).unwrap();
        index.add(vec![0.0, 1.0, 0.0, 0.0]).unwrap();
        index.add(vec![0.0, 0.0, 1.0, 0.0]).unwrap();

        let hits = index.search(&[0.0, 1.0, 0.0, 0.0], 2).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].0, 1);
        assert_eq!(hits[0].1, 0.0);
        assert!(hits[1].1 > hits[0].1);
    }

    #[test]
    fn search_breaks_ties_by_position() {
        let mut index = EmbeddingIndex::new(2);
        // Both vectors are equidistant from the query.
        index.add(vec![1.0, 0.0]).unwrap();
        index.add(vec![-1.0, 0.0]).unwrap();

        let hits = index.search(&[0.0, 0.0], 2).unwrap();
        assert_eq!(hits[0].0, 0);
        assert_eq!(hits[1].0, 1);
        assert_eq!(hits[0].1, hits[1].1);
    }

    #[test]
    fn search_k_larger_than_len() {
        let mut index = EmbeddingIndex::new(2);
        index.add(vec![1.0, 0.0]).unwrap();
        index.add(vec![0.0, 1.0]).unwrap();

        let hits = index.search(&[1.0, 0.0], 10).unwrap();
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn search_empty_index_is_empty_not_error() {
        let index = EmbeddingIndex::new(2);
        let hits = index.search(&[0.0, 0.0], 5).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn squared_l2_matches_hand_computation() {
        let d = squared_l2(&[1.0, 2.0, 3.0], &[4.0, 6.0, 3.0]);
        // (1-4)^2 + (2-6)^2 + (3-3)^2 = 9 + 16 + 0
        assert_eq!(d, 25.0);
    }
}
