//! vstore CLI library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations (add, query, stats, config)

pub mod cli;
pub mod commands;

pub use cli::{Cli, Commands};
pub use commands::{
    handle_add, handle_query, init_logging, load_settings, show_config, show_stats, Overrides,
    QueryArgs,
};
