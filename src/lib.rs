pub mod calculator;
pub mod cli;
pub mod cli_handlers;
pub mod config;
pub mod error;
pub mod graph;
pub mod input;
pub mod schema;

pub use calculator::CommitOrderCalculator;
pub use config::{OutputFormat, WeightPolicy};
pub use error::{OrderError, Result};
pub use graph::{Graph, Weight};
pub use schema::{Column, ForeignKey, SchemaDiff, Table};
