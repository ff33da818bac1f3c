//! Error types for the similarity store.
//!
//! Every fallible store operation returns [`StoreError`] so callers can
//! match on the exact failure kind instead of inspecting strings. Two
//! conditions are deliberately *not* errors: deleting an unknown document
//! (signalled as `Ok(false)`) and opening a store with no snapshot on disk
//! (a fresh empty store).

use thiserror::Error;

/// Errors produced by the store, its index, and its persistence layer.
#[derive(Debug, Error)]
pub enum StoreError {
    /// An embedding's length disagrees with the store's configured dimension.
    #[error("dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch {
        /// The dimension the store was created with.
        expected: usize,
        /// The length of the offending vector.
        actual: usize,
    },

    /// A document with this id is already present. Overwriting is never
    /// implicit; remove the document first.
    #[error("document '{0}' already exists in the store")]
    DuplicateKey(String),

    /// The on-disk snapshot exists but is incomplete or inconsistent.
    /// Fatal on the load path: the store refuses to start rather than run
    /// on a snapshot it cannot trust.
    #[error("snapshot corrupt: {0}")]
    StorageCorruption(String),

    /// Filesystem failure while reading or writing a snapshot.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// The metadata snapshot or a config file failed to (de)serialize.
    #[error("metadata encoding error: {0}")]
    MetadataEncoding(#[from] serde_yaml::Error),

    /// The vector snapshot failed to encode.
    #[error("vector encoding error: {0}")]
    VectorEncoding(String),
}
