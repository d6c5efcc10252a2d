use crate::config::{OutputFormat, WeightPolicy};
use crate::error::Result;
use crate::input::{GraphDocument, SchemaDocument};
use crate::schema::SchemaDiff;
use std::path::Path;

/// Handle the sort command
pub fn handle_sort(file: &Path, format: OutputFormat) -> Result<()> {
    let document = GraphDocument::load(file)?;
    let order = document.commit_order()?;
    print_order(&order, format)
}

/// Handle the schema command
pub fn handle_schema(file: &Path, sql: bool, policy: WeightPolicy, format: OutputFormat) -> Result<()> {
    let document = SchemaDocument::load(file)?;
    let diff = SchemaDiff::new(document.tables);

    if sql {
        let statements = diff.to_sql(&policy)?;
        return print_order(&statements, format);
    }

    let names: Vec<&str> = diff
        .new_tables_in_commit_order(&policy)?
        .into_iter()
        .map(|table| table.name.as_str())
        .collect();
    print_order(&names, format)
}

fn print_order<T: AsRef<str>>(entries: &[T], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            for entry in entries {
                println!("{}", entry.as_ref());
            }
        }
        OutputFormat::Json => {
            let entries: Vec<&str> = entries.iter().map(|entry| entry.as_ref()).collect();
            println!("{}", serde_json::to_string_pretty(&entries)?);
        }
    }
    Ok(())
}
