//! Loads the vendor export and the two reference datasets into [`Table`]s.
//!
//! Every loader fails on the first problem: a run never continues with partial reference data.

use crate::constants;
use crate::error::{IngestError, Result};
use crate::table::{Cell, Table};
use csv::ReaderBuilder;
use serde_json::Value;
use std::collections::HashSet;
use std::fs::{self, File};
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

/// Columns the skills-framework extract must carry
const SFW_REQUIRED_COLUMNS: [&str; 5] = [
    constants::SFW_JOB_ID,
    constants::SFW_JOBROLE_TITLE,
    constants::SFW_SECTOR,
    constants::SFW_JOBROLE_ID,
    constants::SFW_TRACK,
];

/// Read the vendor JSON export and flatten its `results` array into one row per posting.
pub fn load_job_postings(path: &Path) -> Result<Table> {
    let bytes = fs::read(path).map_err(|e| IngestError::source_read(path, e))?;
    let table = parse_job_postings(&bytes).map_err(|e| IngestError::source_read(path, e))?;
    info!(
        "Loaded {} job postings with {} columns from {}",
        table.len(),
        table.columns().len(),
        path.display()
    );
    Ok(table)
}

/// Flatten a vendor export held in memory. Nested objects become `parent.child` columns.
pub fn parse_job_postings(bytes: &[u8]) -> std::result::Result<Table, String> {
    let document: Value =
        serde_json::from_slice(bytes).map_err(|e| format!("invalid JSON: {e}"))?;

    let results = document
        .get(constants::RESULTS_KEY)
        .ok_or_else(|| format!("document has no '{}' key", constants::RESULTS_KEY))?
        .as_array()
        .ok_or_else(|| format!("'{}' is not an array", constants::RESULTS_KEY))?;

    let mut records = Vec::with_capacity(results.len());
    for (i, item) in results.iter().enumerate() {
        let object = item
            .as_object()
            .ok_or_else(|| format!("result {i} is not an object"))?;
        let mut fields = Vec::new();
        for (key, value) in object {
            flatten_value(key, value, &mut fields);
        }
        records.push(fields);
    }

    Ok(Table::from_records(records))
}

fn flatten_value(key: &str, value: &Value, out: &mut Vec<(String, Cell)>) {
    match value {
        Value::Object(map) => {
            for (child_key, child) in map {
                flatten_value(&format!("{key}.{child_key}"), child, out);
            }
        }
        Value::Null => out.push((key.to_string(), None)),
        Value::String(s) => out.push((key.to_string(), Some(s.clone()))),
        Value::Bool(b) => out.push((key.to_string(), Some(b.to_string()))),
        Value::Number(n) => out.push((key.to_string(), Some(n.to_string()))),
        // lists stay in one cell as compact JSON
        Value::Array(_) => out.push((key.to_string(), Some(value.to_string()))),
    }
}

/// Read the recruitment-agency list into a set of company names.
pub fn load_recruitment_agencies(path: &Path) -> Result<HashSet<String>> {
    let table = read_csv_file(path)?;
    require_columns(&table, path, &[constants::RECRUITMENT_COLUMN])?;

    let names: HashSet<String> = table
        .column_values(constants::RECRUITMENT_COLUMN)
        .into_iter()
        .flatten()
        .map(str::to_string)
        .collect();

    info!("Loaded {} recruitment agency names", names.len());
    Ok(names)
}

/// Read the skills-framework extract keyed by `job_id`.
pub fn load_skills_framework(path: &Path) -> Result<Table> {
    let table = read_csv_file(path)?;
    require_columns(&table, path, &SFW_REQUIRED_COLUMNS)?;
    info!("Loaded {} skills framework rows", table.len());
    Ok(table)
}

/// Read any headed CSV file. Short rows are padded and empty fields become `None`; a row with
/// more fields than the header is an error.
pub fn read_csv_file(path: &Path) -> Result<Table> {
    let file = File::open(path).map_err(|e| IngestError::source_read(path, e))?;
    let table = read_csv(file).map_err(|e| IngestError::source_read(path, e))?;
    debug!("Read {} rows from {}", table.len(), path.display());
    Ok(table)
}

pub fn read_csv<R: Read>(reader: R) -> std::result::Result<Table, String> {
    let mut reader = ReaderBuilder::new().flexible(true).from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| e.to_string())?
        .iter()
        .map(str::to_string)
        .collect();
    let expected = headers.len();
    let mut table = Table::new(headers);

    for record in reader.records() {
        let record = record.map_err(|e| e.to_string())?;
        let line = record.position().map_or(0, |p| p.line());
        let row = record
            .iter()
            .map(|field| (!field.is_empty()).then(|| field.to_string()))
            .collect();
        table
            .push_row(row)
            .map_err(|saw| format!("line {line}: expected {expected} fields, saw {saw}"))?;
    }

    Ok(table)
}

fn require_columns(table: &Table, path: &Path, columns: &[&str]) -> Result<()> {
    for column in columns {
        if !table.has_column(column) {
            return Err(IngestError::source_read(
                path,
                format!("missing required column '{column}'"),
            ));
        }
    }
    Ok(())
}
