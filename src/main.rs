//! Main module for the `simdex` CLI.
//!
//! Parses the command line, loads the YAML configuration, opens the
//! store, and dispatches to the matching store operation.
//!
//! # Examples
//!
//! Registering and searching a document:
//!
//! ```sh
//! simdex add report-q3 embedding.json -m title="Quarterly Report"
//! simdex search query.json --limit 5
//! ```
//!
//! Initializing the configuration:
//!
//! ```sh
//! simdex init
//! ```

use clap::Parser;
use once_cell::sync::OnceCell;
use serde_json::Value as JsonValue;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::{env, error::Error, fs};
use tracing::{debug, info};

use simdex::commands::{self, Commands};
use simdex::config::{self, SimdexConfig};
use simdex::config_dir;
use simdex::store::VectorStore;

static TRACING: OnceCell<()> = OnceCell::new();

fn main() -> Result<(), Box<dyn Error>> {
    TRACING.get_or_init(|| {
        tracing_subscriber::fmt::init();
    });
    run()
}

/// Parse arguments, load configuration, and execute the subcommand.
///
/// The config path is `$SIMDEX_CONFIG` if set, otherwise `config.yaml`
/// under the per-platform config directory. A missing config file is not
/// an error; the defaults apply.
fn run() -> Result<(), Box<dyn Error>> {
    let cli = commands::Cli::parse();

    if let Commands::Init = cli.command {
        return init();
    }

    let config_path = match env::var("SIMDEX_CONFIG") {
        Ok(path) => PathBuf::from(path),
        Err(_) => config_dir()?.join("config.yaml"),
    };

    let store_config = if config_path.exists() {
        config::load_config(config_path.to_str().ok_or("config path is not valid UTF-8")?)?
    } else {
        debug!("no config at {}, using defaults", config_path.display());
        SimdexConfig::default()
    };
    debug!("config: {store_config:?}");

    let mut store = VectorStore::open(&store_config)?;

    match cli.command {
        Commands::Add {
            document_id,
            embedding_file,
            meta,
        } => {
            let embedding = read_embedding(&embedding_file)?;
            let metadata = parse_meta(&meta)?;
            let position = store.add_document(&document_id, embedding, metadata)?;
            println!("added '{document_id}' at position {position}");
        }
        Commands::Search {
            embedding_file,
            limit,
        } => {
            let embedding = read_embedding(&embedding_file)?;
            for hit in store.search(&embedding, limit)? {
                println!("{}", serde_json::to_string(&hit)?);
            }
        }
        Commands::Remove { document_id } => {
            if store.delete_document(&document_id)? {
                println!("removed '{document_id}'");
            } else {
                println!("document '{document_id}' not found");
            }
        }
        Commands::Count => {
            println!("{}", store.count());
        }
        Commands::Stats => {
            println!("{}", serde_json::to_string_pretty(&store.stats())?);
        }
        Commands::Init => unreachable!("handled before the store is opened"),
    }

    Ok(())
}

/// Write a default `config.yaml` into the config directory.
fn init() -> Result<(), Box<dyn Error>> {
    let config_dir = config_dir()?;
    info!("creating config directory: {}", config_dir.display());
    fs::create_dir_all(&config_dir)?;

    let config_path = config_dir.join("config.yaml");
    info!("creating config file: {}", config_path.display());
    let config_yaml = serde_yaml::to_string(&SimdexConfig::default())?;
    fs::write(&config_path, config_yaml)?;

    println!("wrote {}", config_path.display());
    Ok(())
}

/// Read an embedding from a JSON file holding an array of numbers.
fn read_embedding(path: &Path) -> Result<Vec<f32>, Box<dyn Error>> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("cannot read embedding file {}: {e}", path.display()))?;
    let embedding: Vec<f32> = serde_json::from_str(&content)
        .map_err(|e| format!("embedding file {} is not a JSON number array: {e}", path.display()))?;
    Ok(embedding)
}

/// Parse repeated `key=value` flags into a metadata map.
fn parse_meta(pairs: &[String]) -> Result<HashMap<String, JsonValue>, Box<dyn Error>> {
    let mut metadata = HashMap::with_capacity(pairs.len());
    for pair in pairs {
        let (key, value) = pair
            .split_once('=')
            .ok_or_else(|| format!("metadata entry '{pair}' is not key=value"))?;
        metadata.insert(key.to_string(), JsonValue::String(value.to_string()));
    }
    Ok(metadata)
}
