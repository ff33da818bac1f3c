//! The command-line interface for the store, defined with `clap`.
//!
//! `Cli` holds the parsed arguments; `Commands` enumerates the available
//! subcommands. The CLI is a thin front end: embeddings arrive as JSON
//! files produced by an external embedding model, and every subcommand
//! maps onto exactly one store operation.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Represents the parsed command-line arguments.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, propagate_version = true, color = clap::ColorChoice::Always)]
pub struct Cli {
    /// The parsed subcommand and its options.
    #[command(subcommand)]
    pub command: Commands,
}

/// The available subcommands and their options.
#[derive(Subcommand, Debug)]
#[command(about, long_about = None, color = clap::ColorChoice::Always)]
pub enum Commands {
    /// Register a document with a precomputed embedding.
    ///
    /// The embedding file holds a JSON array of numbers whose length must
    /// match the store's configured dimension.
    #[clap(name = "add", alias = "a")]
    Add {
        /// Unique id for the document.
        document_id: String,

        /// Path to a JSON file holding the embedding vector.
        embedding_file: PathBuf,

        /// Metadata entries as key=value pairs, repeatable.
        #[arg(name = "meta", short = 'm', long = "meta")]
        meta: Vec<String>,
    },

    /// Rank stored documents by similarity to a query embedding.
    ///
    /// Prints one JSON hit per line, closest first.
    #[clap(name = "search", alias = "s")]
    Search {
        /// Path to a JSON file holding the query embedding.
        embedding_file: PathBuf,

        /// Maximum number of results.
        #[arg(name = "limit", short = 'l', long = "limit", default_value_t = 5)]
        limit: usize,
    },

    /// Remove a document from the store.
    ///
    /// Removing an id that was never added is reported, not an error.
    #[clap(name = "remove", alias = "rm")]
    Remove {
        /// Id of the document to remove.
        document_id: String,
    },

    /// Print the number of live documents.
    Count,

    /// Print a size breakdown of the store as JSON.
    Stats,

    /// Create the config directory and write a default `config.yaml`.
    Init,
}
