//! CLI argument parsing for vstore.
//!
//! Flags override every other configuration source.

use clap::{Parser, Subcommand};

use vstore_index::DEFAULT_K;

/// Embedded vector index
///
/// Stores texts with their embeddings in a local RocksDB snapshot and ranks
/// them by cosine similarity.
#[derive(Parser, Debug)]
#[command(name = "vstore")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/vector-storage/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Override database path
    #[arg(long, global = true)]
    pub db_path: Option<String>,

    /// Override the eviction budget (MB)
    #[arg(long, global = true)]
    pub max_size_mb: Option<f64>,

    #[command(subcommand)]
    pub command: Commands,
}

/// vstore commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Embed and store texts; texts already present are skipped
    Add {
        /// Texts to store
        #[arg(required = true)]
        texts: Vec<String>,

        /// JSON metadata attached to every text
        #[arg(short, long, default_value = "{}")]
        metadata: String,
    },

    /// Rank stored texts by similarity to a query
    Query {
        /// Query text
        text: String,

        /// Maximum results
        #[arg(short, default_value_t = DEFAULT_K)]
        k: usize,

        /// JSON filter criteria documents must match, e.g. '{"text":["a","b"]}'
        #[arg(long)]
        include: Option<String>,

        /// JSON filter criteria documents must not match, e.g. '{"metadata":{"flag":true}}'
        #[arg(long)]
        exclude: Option<String>,

        /// Include vectors in the output
        #[arg(long)]
        vectors: bool,
    },

    /// Show collection statistics
    Stats,

    /// Print the effective configuration
    Config,
}
