//! # VectorStore
//!
//! The store facade: document registration, exact similarity search,
//! deletion, and crash-safe persistence, composed from the
//! [`EmbeddingIndex`], [`MetadataTable`],
//! [`SimilarityScorer`](crate::scorer::SimilarityScorer), and the
//! snapshot layer in [`persistence`](crate::persistence).
//!
//! ## Responsibilities
//! - **Validation**: document ids must be unique and embeddings must have
//!   the configured dimension, checked before anything mutates.
//! - **Tombstones**: deletion unmaps a document but leaves its vector in
//!   the append-only index; search over-fetches by the tombstone count
//!   and filters dead positions, so ranks only ever count live documents.
//! - **Durability**: a full snapshot is written after every mutation.
//!   Simple and crash-safe, and the dominant cost at scale — every add or
//!   delete rewrites the whole store.
//!
//! ## Concurrency
//! The store has no internal locking. Mutation takes `&mut self` and
//! search takes `&self`, so within one process the borrow checker
//! enforces single-writer semantics; to share a store across threads,
//! wrap it in an `RwLock`. Nothing guards against a second *process*
//! opening the same data directory.
//!
//! ## Quick Example
//! ```
//! use simdex::config::SimdexConfig;
//! use simdex::store::VectorStore;
//! use std::collections::HashMap;
//!
//! # fn main() -> Result<(), simdex::error::StoreError> {
//! # let dir = tempfile::tempdir().unwrap();
//! let config = SimdexConfig {
//!     dimension: 4,
//!     data_dir: dir.path().to_path_buf(),
//!     store_name: "demo".to_string(),
//!     ..SimdexConfig::default()
//! };
//! let mut store = VectorStore::open(&config)?;
//! store.add_document("doc1", vec![1.0, 0.0, 0.0, 0.0], HashMap::new())?;
//! let hits = store.search(&[1.0, 0.0, 0.0, 0.0], 1)?;
//! assert_eq!(hits[0].document_id, "doc1");
//! assert_eq!(hits[0].similarity, 1.0);
//! # Ok(()) }
//! ```

use serde::Serialize;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use tracing::{debug, info};

use crate::config::SimdexConfig;
use crate::error::StoreError;
use crate::index::EmbeddingIndex;
use crate::metadata::MetadataTable;
use crate::persistence::{self, SnapshotPaths};
use crate::scorer::SimilarityScorer;

/// One ranked search result.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchHit {
    /// The matched document's id.
    pub document_id: String,
    /// Similarity in `[0, 1]`, higher is more similar.
    pub similarity: f32,
    /// The metadata stored with the document, verbatim.
    pub metadata: HashMap<String, JsonValue>,
    /// 1-based rank among live results.
    pub rank: usize,
}

/// A point-in-time view of the store's size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StoreStats {
    /// Documents that resolve to a vector.
    pub live_documents: usize,
    /// Every vector ever added, tombstoned or not.
    pub total_vectors: usize,
    /// Vectors whose document has been deleted.
    pub tombstones: usize,
    /// The configured embedding dimension.
    pub dimension: usize,
}

/// Persistent embedding similarity store.
///
/// Construct one per logical store with [`VectorStore::open`] and pass it
/// by reference to whatever front end consumes it; there is deliberately
/// no global instance.
pub struct VectorStore {
    index: EmbeddingIndex,
    metadata: MetadataTable,
    scorer: SimilarityScorer,
    paths: SnapshotPaths,
}

impl VectorStore {
    /// Open the store described by `config`: load its snapshot pair from
    /// disk, or start empty if none exists yet.
    ///
    /// # Errors
    /// [`StoreError::StorageCorruption`] if a snapshot exists but is
    /// inconsistent or was written at a different dimension. The store
    /// refuses to start on data it cannot trust.
    pub fn open(config: &SimdexConfig) -> Result<Self, StoreError> {
        let paths = SnapshotPaths::for_store(&config.data_dir, &config.store_name);
        let (index, metadata) = match persistence::load(&paths, config.dimension)? {
            Some(pair) => pair,
            None => (EmbeddingIndex::new(config.dimension), MetadataTable::new()),
        };

        info!(
            "opened store '{}': {} live documents, {} vectors",
            config.store_name,
            metadata.len(),
            index.len()
        );

        Ok(Self {
            index,
            metadata,
            scorer: SimilarityScorer::new(config.scoring),
            paths,
        })
    }

    /// Register a document with its precomputed embedding and metadata.
    ///
    /// Returns the position assigned to the vector. The id is checked for
    /// uniqueness *before* the vector is appended, so a rejected call
    /// leaves no orphan behind.
    ///
    /// # Errors
    /// - [`StoreError::DuplicateKey`] if the id is already present.
    /// - [`StoreError::DimensionMismatch`] if the embedding has the wrong
    ///   length.
    /// - Persistence errors from the post-mutation snapshot; the new
    ///   record is backed out of the metadata table first, leaving the
    ///   appended vector as a tombstone rather than a live orphan.
    pub fn add_document(
        &mut self,
        document_id: &str,
        embedding: Vec<f32>,
        metadata: HashMap<String, JsonValue>,
    ) -> Result<usize, StoreError> {
        if self.metadata.contains(document_id) {
            return Err(StoreError::DuplicateKey(document_id.to_string()));
        }

        let position = self.index.add(embedding)?;
        self.metadata.put(document_id, position, metadata)?;

        if let Err(e) = self.persist() {
            self.metadata.remove(document_id);
            return Err(e);
        }

        info!("added document '{document_id}' at position {position}");
        Ok(position)
    }

    /// Find the documents most similar to `query`.
    ///
    /// Returns up to `limit` live documents, closest first, ranked from 1.
    /// Deleted documents never appear and never occupy a rank. Asking for
    /// more results than there are live documents returns what exists, not
    /// an error.
    ///
    /// # Errors
    /// [`StoreError::DimensionMismatch`] if the query has the wrong length.
    pub fn search(&self, query: &[f32], limit: usize) -> Result<Vec<SearchHit>, StoreError> {
        // Over-fetch by the tombstone count so filtering dead positions
        // can never starve the result list below `limit`.
        let tombstones = self.index.len() - self.metadata.len();
        let candidates = self.index.search(query, limit.saturating_add(tombstones))?;

        let mut live: Vec<(&str, &crate::metadata::DocumentRecord, f32)> = candidates
            .iter()
            .filter_map(|&(position, distance)| {
                self.metadata
                    .resolve_record(position)
                    .map(|(id, record)| (id, record, distance))
            })
            .collect();
        live.truncate(limit);

        let distances: Vec<f32> = live.iter().map(|&(_, _, d)| d).collect();
        let scores = self.scorer.score_batch(&distances);

        let hits = live
            .into_iter()
            .zip(scores)
            .enumerate()
            .map(|(i, ((document_id, record, _), similarity))| SearchHit {
                document_id: document_id.to_string(),
                similarity,
                metadata: record.metadata.clone(),
                rank: i + 1,
            })
            .collect::<Vec<_>>();

        debug!("search returned {} of limit {limit}", hits.len());
        Ok(hits)
    }

    /// Delete a document by id.
    ///
    /// Returns `Ok(true)` if the document existed and was removed,
    /// `Ok(false)` if the id was unknown (not an error). The vector stays
    /// in the index as a tombstone; only the id <-> position mapping is
    /// dropped.
    pub fn delete_document(&mut self, document_id: &str) -> Result<bool, StoreError> {
        match self.metadata.remove(document_id) {
            Some(position) => {
                self.persist()?;
                info!("deleted document '{document_id}', position {position} is now a tombstone");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Number of live documents (tombstones excluded).
    pub fn count(&self) -> usize {
        self.metadata.len()
    }

    /// The embedding dimension this store accepts.
    pub fn dimension(&self) -> usize {
        self.index.dimension()
    }

    /// Size breakdown: live documents, raw vectors, tombstones.
    pub fn stats(&self) -> StoreStats {
        StoreStats {
            live_documents: self.metadata.len(),
            total_vectors: self.index.len(),
            tombstones: self.index.len() - self.metadata.len(),
            dimension: self.index.dimension(),
        }
    }

    /// Write the current state to the snapshot pair.
    fn persist(&self) -> Result<(), StoreError> {
        persistence::save(&self.paths, &self.index, &self.metadata)
    }
}
