//! Loading and handling the store's configuration.
//!
//! Configuration lives in a YAML file, by default `config.yaml` under the
//! per-platform config directory (see [`config_dir`](crate::config_dir)).
//! Every field has a default, so an empty file — or no file at all, for
//! callers constructing [`SimdexConfig`] directly — yields a working
//! store.
//!
//! # Examples
//!
//! Loading the configuration from a file:
//!
//! ```no_run
//! use simdex::config::{SimdexConfig, load_config};
//!
//! let config: SimdexConfig = load_config("/path/to/config.yaml").unwrap();
//! println!("{:?}", config);
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::{error::Error, fs};
use tracing::debug;

use crate::scorer::ScoringMode;

/// The store's configuration.
///
/// `dimension` is fixed for the lifetime of a store's data: a snapshot
/// written at one dimension refuses to load under another. The default of
/// 768 matches the sentence-embedding models this store is typically fed
/// from; set it to whatever your embedding producer emits.
#[derive(Serialize, Deserialize, Debug, PartialEq, Clone)]
pub struct SimdexConfig {
    /// Length every embedding must have.
    #[serde(default = "default_dimension")]
    pub dimension: usize,

    /// Directory holding the snapshot files.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Logical store name; names the snapshot files, so several stores can
    /// share one `data_dir`.
    #[serde(default = "default_store_name")]
    pub store_name: String,

    /// How raw distances become similarity scores.
    #[serde(default)]
    pub scoring: ScoringMode,
}

impl Default for SimdexConfig {
    fn default() -> Self {
        Self {
            dimension: default_dimension(),
            data_dir: default_data_dir(),
            store_name: default_store_name(),
            scoring: ScoringMode::default(),
        }
    }
}

fn default_dimension() -> usize {
    768
}

fn default_data_dir() -> PathBuf {
    crate::config_dir()
        .map(|dir| dir.join("data"))
        .unwrap_or_else(|_| PathBuf::from("data"))
}

fn default_store_name() -> String {
    "default".to_string()
}

/// Load the configuration from a YAML file.
///
/// # Parameters
/// - `file`: The path to the YAML configuration file.
///
/// # Returns
/// - `Ok(SimdexConfig)`: The loaded configuration.
/// - `Err(Box<dyn Error>)`: The file could not be read or parsed.
///
/// # Examples
///
/// ```no_run
/// use simdex::config::load_config;
///
/// match load_config("/path/to/config.yaml") {
///     Ok(config) => println!("{:?}", config),
///     Err(err) => eprintln!("Error loading config: {}", err),
/// }
/// ```
pub fn load_config(file: &str) -> Result<SimdexConfig, Box<dyn Error>> {
    debug!("loading config from {file}");
    let content = fs::read_to_string(file)?;
    let config: SimdexConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scorer::DEFAULT_SCALE;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_config_valid_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"
dimension: 384
data_dir: "/tmp/simdex-test"
store_name: "articles"
scoring:
  mode: fixed
  scale: 4.0
"#
        )
        .unwrap();

        let config = load_config(temp_file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.dimension, 384);
        assert_eq!(config.data_dir, PathBuf::from("/tmp/simdex-test"));
        assert_eq!(config.store_name, "articles");
        assert_eq!(config.scoring, ScoringMode::Fixed { scale: 4.0 });
    }

    #[test]
    fn test_load_config_applies_defaults() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, r#"store_name: "minimal""#).unwrap();

        let config = load_config(temp_file.path().to_str().unwrap()).unwrap();
        assert_eq!(config.dimension, 768);
        assert_eq!(
            config.scoring,
            ScoringMode::Fixed {
                scale: DEFAULT_SCALE
            }
        );
    }

    #[test]
    fn test_load_config_invalid_file() {
        let config = load_config("non/existent/path");
        assert!(config.is_err());
    }

    #[test]
    fn test_load_config_invalid_format() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, r#"dimension: "not a number""#).unwrap();

        let config = load_config(temp_file.path().to_str().unwrap());
        assert!(config.is_err());
    }

    #[test]
    fn test_config_round_trips_through_yaml() {
        let config = SimdexConfig {
            dimension: 4,
            data_dir: PathBuf::from("/var/lib/simdex"),
            store_name: "notes".to_string(),
            scoring: ScoringMode::Adaptive,
        };
        let yaml = serde_yaml::to_string(&config).unwrap();
        let restored: SimdexConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(restored, config);
    }
}
