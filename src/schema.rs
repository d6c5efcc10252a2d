//! New tables of a schema change, created in foreign key order.

use crate::calculator::CommitOrderCalculator;
use crate::config::WeightPolicy;
use crate::error::{OrderError, Result};
use crate::graph::Weight;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::debug;

/// A table column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    #[serde(rename = "type")]
    pub column_type: String,
    #[serde(default)]
    pub nullable: bool,
}

/// A foreign key from some local columns to another table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForeignKey {
    pub columns: Vec<String>,
    pub foreign_table: String,
    pub foreign_columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub primary_key: Vec<String>,
    #[serde(default)]
    pub foreign_keys: Vec<ForeignKey>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            primary_key: Vec::new(),
            foreign_keys: Vec::new(),
        }
    }

    pub fn column(mut self, name: &str, column_type: &str, nullable: bool) -> Self {
        self.columns.push(Column {
            name: name.to_string(),
            column_type: column_type.to_string(),
            nullable,
        });
        self
    }

    pub fn primary_key(mut self, columns: &[&str]) -> Self {
        self.primary_key = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn foreign_key(mut self, columns: &[&str], foreign_table: &str, foreign_columns: &[&str]) -> Self {
        self.foreign_keys.push(ForeignKey {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            foreign_table: foreign_table.to_string(),
            foreign_columns: foreign_columns.iter().map(|c| c.to_string()).collect(),
        });
        self
    }

    /// A foreign key is nullable when every one of its local columns is.
    /// Unknown columns count as not nullable.
    pub fn is_nullable(&self, foreign_key: &ForeignKey) -> bool {
        !foreign_key.columns.is_empty()
            && foreign_key.columns.iter().all(|name| {
                self.columns
                    .iter()
                    .any(|column| &column.name == name && column.nullable)
            })
    }

    /// Generic `CREATE TABLE` statement with inline constraints
    pub fn create_statement(&self) -> String {
        let mut parts: Vec<String> = self
            .columns
            .iter()
            .map(|column| {
                if column.nullable {
                    format!("{} {}", column.name, column.column_type)
                } else {
                    format!("{} {} NOT NULL", column.name, column.column_type)
                }
            })
            .collect();

        if !self.primary_key.is_empty() {
            parts.push(format!("PRIMARY KEY ({})", self.primary_key.join(", ")));
        }

        for foreign_key in &self.foreign_keys {
            parts.push(format!(
                "FOREIGN KEY ({}) REFERENCES {} ({})",
                foreign_key.columns.join(", "),
                foreign_key.foreign_table,
                foreign_key.foreign_columns.join(", ")
            ));
        }

        format!("CREATE TABLE {} ({})", self.name, parts.join(", "))
    }
}

/// Tables added by a schema change
#[derive(Debug, Clone, Default)]
pub struct SchemaDiff {
    pub new_tables: Vec<Table>,
}

impl SchemaDiff {
    pub fn new(new_tables: Vec<Table>) -> Self {
        Self { new_tables }
    }

    /// Order the new tables so referenced tables come before the tables that
    /// reference them. Foreign keys to tables outside the batch are ignored.
    pub fn new_tables_in_commit_order(&self, policy: &WeightPolicy) -> Result<Vec<&Table>> {
        let mut calculator: CommitOrderCalculator<&str, &Table> = CommitOrderCalculator::new();
        let mut seen = HashSet::new();

        for table in &self.new_tables {
            if !seen.insert(table.name.as_str()) {
                return Err(OrderError::DuplicateTable(table.name.clone()));
            }
            calculator.add_node(table.name.as_str(), table);
        }

        // Several keys between the same pair of tables keep the heaviest weight
        let mut edges: IndexMap<(&str, &str), Weight> = IndexMap::new();
        for table in &self.new_tables {
            for foreign_key in &table.foreign_keys {
                let foreign = foreign_key.foreign_table.as_str();
                if !seen.contains(foreign) {
                    continue;
                }
                let weight = policy.for_foreign_key(table.is_nullable(foreign_key));
                edges
                    .entry((foreign, table.name.as_str()))
                    .and_modify(|current| *current = (*current).max(weight))
                    .or_insert(weight);
            }
        }

        debug!(
            tables = self.new_tables.len(),
            references = edges.len(),
            "ordering new tables"
        );

        for ((foreign, table), weight) in edges {
            calculator.add_dependency(foreign, table, weight)?;
        }

        calculator.sort()
    }

    /// `CREATE TABLE` statements for the new tables, in commit order
    pub fn to_sql(&self, policy: &WeightPolicy) -> Result<Vec<String>> {
        Ok(self
            .new_tables_in_commit_order(policy)?
            .into_iter()
            .map(Table::create_statement)
            .collect())
    }
}
