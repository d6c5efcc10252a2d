use crate::config::{DEFAULT_HARD_WEIGHT, DEFAULT_SOFT_WEIGHT, OutputFormat};
use crate::graph::Weight;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "commit-order")]
#[command(about = "Dependency-respecting commit order for weighted graphs")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Sort the nodes of a JSON graph document
    Sort {
        /// Path to a document with `nodes` and `dependencies`
        file: PathBuf,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Order a batch of new tables by their foreign keys
    Schema {
        /// Path to a document with `tables`
        file: PathBuf,
        /// Print CREATE TABLE statements instead of table names
        #[arg(long)]
        sql: bool,
        /// Weight of a foreign key with a NOT NULL column
        #[arg(long, default_value_t = DEFAULT_HARD_WEIGHT, allow_negative_numbers = true)]
        hard_weight: Weight,
        /// Weight of a foreign key whose columns are all nullable
        #[arg(long, default_value_t = DEFAULT_SOFT_WEIGHT, allow_negative_numbers = true)]
        soft_weight: Weight,
        /// Output format
        #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },
}
