//! # Simdex (library root)
//!
//! A persistent embedding similarity store. Documents are registered
//! under a unique id with a precomputed fixed-dimension embedding and
//! opaque metadata; queries rank stored documents by exact
//! nearest-neighbor search over squared Euclidean distance.
//!
//! The crate deliberately does **not** compute embeddings: an external
//! embedding model produces the vectors, and this store indexes them. In
//! the same spirit there is no HTTP surface here — the [`store`] facade
//! is what a server or the bundled `simdex` CLI calls into.
//!
//! ## Modules
//! - [`store`] — the facade: add, search, delete, count, stats.
//! - [`index`] — append-only vector index with exact k-NN.
//! - [`metadata`] — document id <-> position mapping plus metadata.
//! - [`scorer`] — distance to `[0, 1]` similarity conversion.
//! - [`persistence`] — crash-safe two-file snapshots.
//! - [`config`], [`commands`], [`error`] — configuration, CLI, errors.
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
//!     dimension: 384,
//!     data_dir: dir.path().to_path_buf(),
//!     store_name: "articles".to_string(),
//!     ..SimdexConfig::default()
//! };
//! let mut store = VectorStore::open(&config)?;
//! store.add_document("intro", vec![0.1; 384], HashMap::new())?;
//! let hits = store.search(&vec![0.1; 384], 5)?;
//! assert_eq!(hits[0].document_id, "intro");
//! # Ok(()) }
//! ```

use directories::ProjectDirs;
use std::error::Error;

pub mod commands;
pub mod config;
pub mod error;
pub mod index;
pub mod metadata;
pub mod persistence;
pub mod scorer;
pub mod store;

/// Return the per-platform configuration directory used by Simdex.
///
/// This uses [`directories::ProjectDirs`] with the application triple
/// `("com", "simdex", "simdex")`, so you get the right place on each OS
/// (e.g., `~/.config/simdex` under XDG on Linux).
///
/// The directory is **not** created by this function; callers that need it
/// should create it with `fs::create_dir_all`.
///
/// # Errors
/// Returns an error if the platform configuration directory cannot be
/// determined (rare, but possible in heavily sandboxed environments).
pub fn config_dir() -> Result<std::path::PathBuf, Box<dyn Error>> {
    let proj_dirs = ProjectDirs::from("com", "simdex", "simdex")
        .ok_or("Unable to determine config directory")?;

    Ok(proj_dirs.config_dir().to_path_buf())
}
