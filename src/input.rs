//! JSON documents accepted by the command line.

use crate::calculator::CommitOrderCalculator;
use crate::config::DEFAULT_HARD_WEIGHT;
use crate::error::Result;
use crate::graph::Weight;
use crate::schema::Table;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A plain graph: node keys plus weighted dependencies between them
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDocument {
    pub nodes: Vec<String>,
    #[serde(default)]
    pub dependencies: Vec<DependencyEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DependencyEntry {
    pub from: String,
    pub to: String,
    #[serde(default = "default_weight")]
    pub weight: Weight,
}

fn default_weight() -> Weight {
    DEFAULT_HARD_WEIGHT
}

impl GraphDocument {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }

    /// Register every node and dependency, then sort the node keys
    pub fn commit_order(&self) -> Result<Vec<&str>> {
        let mut calculator: CommitOrderCalculator<&str, &str> = CommitOrderCalculator::new();
        for node in &self.nodes {
            calculator.add_node(node.as_str(), node.as_str());
        }
        for dependency in &self.dependencies {
            calculator.add_dependency(
                dependency.from.as_str(),
                dependency.to.as_str(),
                dependency.weight,
            )?;
        }
        calculator.sort()
    }
}

/// A batch of new tables
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SchemaDocument {
    pub tables: Vec<Table>,
}

impl SchemaDocument {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&raw)?)
    }
}
