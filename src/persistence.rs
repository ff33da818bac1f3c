//! # Snapshot persistence
//!
//! Durable on-disk representation of an [`EmbeddingIndex`] +
//! [`MetadataTable`] pair. Two artifacts per store, named from a digest
//! of the store name so several logical stores can share one data
//! directory:
//!
//! - `<stem>_embeddings.bin` — bincode-encoded vectors, with a version
//!   tag and the dimension they were written at.
//! - `<stem>_metadata.yaml` — the document table, same version/dimension
//!   envelope, human-inspectable.
//!
//! ## Write protocol
//! Each file is written to a temporary file in the destination directory
//! and atomically renamed into place, so a crash never leaves a
//! half-written file. The vector file commits first: a crash between the
//! two renames leaves extra vectors that no metadata entry references,
//! which is exactly the tombstone state and loads cleanly. Every torn
//! state that cannot be read that way (one file missing, metadata
//! pointing past the end of the vector file, version or dimension
//! disagreement) is refused at load with
//! [`StoreError::StorageCorruption`].
//!
//! A missing snapshot — neither file present — is not an error; it means
//! a fresh, empty store.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::error::StoreError;
use crate::index::EmbeddingIndex;
use crate::metadata::MetadataTable;

/// Bumped whenever the on-disk layout changes incompatibly.
pub const SNAPSHOT_VERSION: u32 = 1;

/// On-disk form of the embedding index.
#[derive(Debug, Serialize, Deserialize)]
struct IndexSnapshot {
    version: u32,
    dimension: usize,
    vectors: Vec<Vec<f32>>,
}

/// On-disk form of the metadata table.
#[derive(Debug, Serialize, Deserialize)]
struct MetadataSnapshot {
    version: u32,
    dimension: usize,
    documents: MetadataTable,
}

/// The pair of files one store persists to.
#[derive(Debug, Clone)]
pub struct SnapshotPaths {
    /// Path of the bincode vector file.
    pub embeddings: PathBuf,
    /// Path of the YAML metadata file.
    pub metadata: PathBuf,
}

impl SnapshotPaths {
    /// Derive the snapshot file paths for a named store under `data_dir`.
    ///
    /// The stem is a digest of the store name, so any string — including
    /// ones with path separators — yields valid sibling filenames, and the
    /// same name always resolves to the same pair.
    pub fn for_store(data_dir: &Path, store_name: &str) -> Self {
        let digest = sha256::digest(store_name);
        let uuid: u64 = digest.as_bytes().iter().map(|b| *b as u64).sum();

        Self {
            embeddings: data_dir.join(format!("{uuid}_embeddings.bin")),
            metadata: data_dir.join(format!("{uuid}_metadata.yaml")),
        }
    }
}

/// Write both snapshot files, vectors first, each atomically.
///
/// # Errors
/// - [`StoreError::VectorEncoding`] if the vector snapshot fails to encode.
/// - [`StoreError::MetadataEncoding`] if the metadata snapshot fails to encode.
/// - [`StoreError::Io`] on filesystem failures.
pub fn save(
    paths: &SnapshotPaths,
    index: &EmbeddingIndex,
    metadata: &MetadataTable,
) -> Result<(), StoreError> {
    let dir = paths
        .embeddings
        .parent()
        .ok_or_else(|| StoreError::StorageCorruption("snapshot path has no parent directory".into()))?;
    fs::create_dir_all(dir)?;

    let index_snapshot = IndexSnapshot {
        version: SNAPSHOT_VERSION,
        dimension: index.dimension(),
        vectors: index.vectors().to_vec(),
    };
    let encoded = bincode::serde::encode_to_vec(&index_snapshot, bincode::config::standard())
        .map_err(|e| StoreError::VectorEncoding(e.to_string()))?;
    write_atomically(&paths.embeddings, &encoded)?;

    let metadata_snapshot = MetadataSnapshot {
        version: SNAPSHOT_VERSION,
        dimension: index.dimension(),
        documents: metadata.clone(),
    };
    let yaml = serde_yaml::to_string(&metadata_snapshot)?;
    write_atomically(&paths.metadata, yaml.as_bytes())?;

    debug!(
        "snapshot saved: {} vectors, {} documents",
        index.len(),
        metadata.len()
    );
    Ok(())
}

/// Load a snapshot pair, if one exists.
///
/// Returns `Ok(None)` when neither file is present — the caller starts
/// with an empty store of the configured dimension.
///
/// # Errors
/// [`StoreError::StorageCorruption`] when the snapshot exists but cannot
/// be trusted: only one of the two files present, unknown version,
/// dimension differing from `expected_dimension` or between the two
/// files, undecodable content, a vector of the wrong length, or metadata
/// referencing a position outside the vector file.
pub fn load(
    paths: &SnapshotPaths,
    expected_dimension: usize,
) -> Result<Option<(EmbeddingIndex, MetadataTable)>, StoreError> {
    match (paths.embeddings.exists(), paths.metadata.exists()) {
        (false, false) => {
            info!("no snapshot at {}, starting empty", paths.embeddings.display());
            return Ok(None);
        }
        (true, false) => {
            return Err(StoreError::StorageCorruption(format!(
                "vector file {} exists but metadata file {} is missing",
                paths.embeddings.display(),
                paths.metadata.display()
            )));
        }
        (false, true) => {
            return Err(StoreError::StorageCorruption(format!(
                "metadata file {} exists but vector file {} is missing",
                paths.metadata.display(),
                paths.embeddings.display()
            )));
        }
        (true, true) => {}
    }

    let bytes = fs::read(&paths.embeddings)?;
    let (index_snapshot, _): (IndexSnapshot, usize) =
        bincode::serde::decode_from_slice(&bytes, bincode::config::standard()).map_err(|e| {
            StoreError::StorageCorruption(format!(
                "vector file {} is unreadable: {e}",
                paths.embeddings.display()
            ))
        })?;

    if index_snapshot.version != SNAPSHOT_VERSION {
        return Err(StoreError::StorageCorruption(format!(
            "vector file has snapshot version {}, this build reads version {}",
            index_snapshot.version, SNAPSHOT_VERSION
        )));
    }
    if index_snapshot.dimension != expected_dimension {
        return Err(StoreError::StorageCorruption(format!(
            "snapshot holds {}-dimension vectors but the store is configured for {}",
            index_snapshot.dimension, expected_dimension
        )));
    }
    if let Some(bad) = index_snapshot
        .vectors
        .iter()
        .position(|v| v.len() != index_snapshot.dimension)
    {
        return Err(StoreError::StorageCorruption(format!(
            "vector at position {bad} has length {} instead of {}",
            index_snapshot.vectors[bad].len(),
            index_snapshot.dimension
        )));
    }

    let yaml = fs::read_to_string(&paths.metadata)?;
    let metadata_snapshot: MetadataSnapshot = serde_yaml::from_str(&yaml).map_err(|e| {
        StoreError::StorageCorruption(format!(
            "metadata file {} is unreadable: {e}",
            paths.metadata.display()
        ))
    })?;

    if metadata_snapshot.version != SNAPSHOT_VERSION {
        return Err(StoreError::StorageCorruption(format!(
            "metadata file has snapshot version {}, this build reads version {}",
            metadata_snapshot.version, SNAPSHOT_VERSION
        )));
    }
    if metadata_snapshot.dimension != expected_dimension {
        return Err(StoreError::StorageCorruption(format!(
            "metadata file was written for dimension {} but the store is configured for {}",
            metadata_snapshot.dimension, expected_dimension
        )));
    }

    let vector_count = index_snapshot.vectors.len();
    let documents = metadata_snapshot.documents;
    for (document_id, record) in documents.iter() {
        if record.position >= vector_count {
            return Err(StoreError::StorageCorruption(format!(
                "document '{document_id}' references position {} but the vector file holds {} vectors",
                record.position, vector_count
            )));
        }
    }

    info!(
        "snapshot loaded: {} vectors, {} documents",
        vector_count,
        documents.len()
    );
    let index = EmbeddingIndex::from_parts(expected_dimension, index_snapshot.vectors);
    Ok(Some((index, documents)))
}

/// Write `bytes` to `path` via a temp file in the same directory and an
/// atomic rename.
fn write_atomically(path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
    let dir = path
        .parent()
        .ok_or_else(|| StoreError::StorageCorruption("snapshot path has no parent directory".into()))?;
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::tempdir;

    fn sample_pair() -> (EmbeddingIndex, MetadataTable) {
        let mut index = EmbeddingIndex::new(3);
        let mut table = MetadataTable::new();
        let p0 = index.add(vec![1.0, 0.0, 0.0]).unwrap();
        table.put("doc1", p0, HashMap::new()).unwrap();
        let p1 = index.add(vec![0.0, 1.0, 0.0]).unwrap();
        table.put("doc2", p1, HashMap::new()).unwrap();
        (index, table)
    }

    #[test]
    fn missing_snapshot_is_fresh_store() {
        let dir = tempdir().unwrap();
        let paths = SnapshotPaths::for_store(dir.path(), "empty");
        assert!(load(&paths, 3).unwrap().is_none());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempdir().unwrap();
        let paths = SnapshotPaths::for_store(dir.path(), "round_trip");
        let (index, table) = sample_pair();

        save(&paths, &index, &table).unwrap();
        let (loaded_index, loaded_table) = load(&paths, 3).unwrap().unwrap();

        assert_eq!(loaded_index.len(), 2);
        assert_eq!(loaded_index.vector_at(0).unwrap(), &[1.0, 0.0, 0.0]);
        assert_eq!(loaded_index.vector_at(1).unwrap(), &[0.0, 1.0, 0.0]);
        assert_eq!(loaded_table.len(), 2);
        assert_eq!(loaded_table.resolve_position(1), Some("doc2"));
    }

    #[test]
    fn one_missing_file_is_corruption() {
        let dir = tempdir().unwrap();
        let paths = SnapshotPaths::for_store(dir.path(), "torn");
        let (index, table) = sample_pair();
        save(&paths, &index, &table).unwrap();

        fs::remove_file(&paths.metadata).unwrap();
        let result = load(&paths, 3);
        assert!(matches!(result, Err(StoreError::StorageCorruption(_))));
    }

    #[test]
    fn dimension_mismatch_is_corruption() {
        let dir = tempdir().unwrap();
        let paths = SnapshotPaths::for_store(dir.path(), "dims");
        let (index, table) = sample_pair();
        save(&paths, &index, &table).unwrap();

        let result = load(&paths, 768);
        assert!(matches!(result, Err(StoreError::StorageCorruption(_))));
    }

    #[test]
    fn dangling_position_is_corruption() {
        let dir = tempdir().unwrap();
        let paths = SnapshotPaths::for_store(dir.path(), "dangling");

        // A table referencing a position the vector file doesn't hold.
        let mut index = EmbeddingIndex::new(3);
        index.add(vec![1.0, 0.0, 0.0]).unwrap();
        let mut table = MetadataTable::new();
        table.put("ghost", 5, HashMap::new()).unwrap();
        save(&paths, &index, &table).unwrap();

        let result = load(&paths, 3);
        assert!(matches!(result, Err(StoreError::StorageCorruption(_))));
    }

    #[test]
    fn garbage_vector_file_is_corruption() {
        let dir = tempdir().unwrap();
        let paths = SnapshotPaths::for_store(dir.path(), "garbage");
        let (index, table) = sample_pair();
        save(&paths, &index, &table).unwrap();

        fs::write(&paths.embeddings, b"not a snapshot").unwrap();
        let result = load(&paths, 3);
        assert!(matches!(result, Err(StoreError::StorageCorruption(_))));
    }

    #[test]
    fn store_name_determines_paths() {
        let dir = tempdir().unwrap();
        let a = SnapshotPaths::for_store(dir.path(), "alpha");
        let a2 = SnapshotPaths::for_store(dir.path(), "alpha");
        let b = SnapshotPaths::for_store(dir.path(), "beta");
        assert_eq!(a.embeddings, a2.embeddings);
        assert_ne!(a.embeddings, b.embeddings);
    }
}
