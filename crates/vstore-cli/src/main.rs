//! vstore
//!
//! Embedded vector index over a local RocksDB snapshot.
//!
//! # Usage
//!
//! ```bash
//! vstore add "first text" "second text" --metadata '{"source":"notes"}'
//! vstore query "some text" -k 3 --exclude '{"metadata":{"archived":true}}'
//! vstore stats
//! vstore config
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/vector-storage/config.toml)
//! 3. Environment variables (VSTORE_*, OPENAI_API_KEY for the key)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use vstore_cli::{
    handle_add, handle_query, init_logging, load_settings, show_config, show_stats, Cli,
    Commands, Overrides, QueryArgs,
};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let overrides = Overrides {
        db_path: cli.db_path,
        log_level: cli.log_level,
        max_size_mb: cli.max_size_mb,
    };
    let settings = load_settings(cli.config.as_deref(), &overrides)?;
    init_logging(&settings)?;

    match cli.command {
        Commands::Add { texts, metadata } => {
            handle_add(&settings, texts, &metadata).await?;
        }
        Commands::Query {
            text,
            k,
            include,
            exclude,
            vectors,
        } => {
            let args = QueryArgs {
                text,
                k,
                include,
                exclude,
                vectors,
            };
            handle_query(&settings, args).await?;
        }
        Commands::Stats => {
            show_stats(&settings)?;
        }
        Commands::Config => {
            show_config(&settings)?;
        }
    }

    Ok(())
}
