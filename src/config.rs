//! Weight policy and output settings.

use crate::graph::Weight;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Weight of a relationship that must be respected.
pub const DEFAULT_HARD_WEIGHT: Weight = 1;

/// Weight of a relationship that may be broken to resolve a cycle.
pub const DEFAULT_SOFT_WEIGHT: Weight = 0;

/// Weights given to foreign keys when a table batch becomes a graph
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightPolicy {
    pub hard: Weight,
    pub soft: Weight,
}

impl Default for WeightPolicy {
    fn default() -> Self {
        Self {
            hard: DEFAULT_HARD_WEIGHT,
            soft: DEFAULT_SOFT_WEIGHT,
        }
    }
}

impl WeightPolicy {
    /// Pick the weight of a foreign key: nullable keys can be broken
    pub fn for_foreign_key(&self, nullable: bool) -> Weight {
        if nullable { self.soft } else { self.hard }
    }
}

/// How the CLI prints an order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One entry per line
    #[default]
    Text,
    /// A JSON array
    Json,
}
