use crate::error::{IngestError, Result};
use crate::table::Table;
use csv::Writer;
use std::fs::{self, File};
use std::path::Path;
use tracing::info;

/// What [`write_table`] did with a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteOutcome {
    Written { rows: usize },
    /// Empty tables produce no file
    SkippedEmpty,
}

/// Write a table as UTF-8 CSV with a header row and no index column.
///
/// An empty table is skipped without touching the filesystem. Any write failure is returned
/// as [`IngestError::OutputWrite`] naming the path.
pub fn write_table(table: &Table, path: &Path) -> Result<WriteOutcome> {
    if table.is_empty() {
        info!("Nothing to write to {}, table is empty", path.display());
        return Ok(WriteOutcome::SkippedEmpty);
    }

    info!("Saving {} rows to {}", table.len(), path.display());
    write_csv(table, path).map_err(|e| IngestError::output_write(path, e))?;
    info!("Saved {} rows to {}", table.len(), path.display());

    Ok(WriteOutcome::Written { rows: table.len() })
}

fn write_csv(table: &Table, path: &Path) -> std::result::Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut writer = Writer::from_writer(File::create(path)?);
    writer.write_record(table.columns())?;
    for row in table.rows() {
        writer.write_record(row.iter().map(|cell| cell.as_deref().unwrap_or("")))?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::loader::read_csv_file;

    #[test]
    fn test_write_then_read_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        let table = Table::from_records(vec![
            vec![("jobId", Some("j1".to_string())), ("note", Some("a, \"quoted\" value".to_string()))],
            vec![("jobId", Some("j2".to_string())), ("note", None)],
        ]);

        let outcome = write_table(&table, &path).unwrap();
        assert_eq!(outcome, WriteOutcome::Written { rows: 2 });

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("jobId,note\n"));
        assert!(content.contains("j2,\n"));

        assert_eq!(read_csv_file(&path).unwrap(), table);
    }

    #[test]
    fn test_empty_table_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");

        let outcome = write_table(&Table::new(vec!["jobId".to_string()]), &path).unwrap();
        assert_eq!(outcome, WriteOutcome::SkippedEmpty);
        assert!(!path.exists());
    }

    #[test]
    fn test_write_failure_is_output_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, "not a directory").unwrap();
        let table = Table::from_records(vec![vec![("jobId", Some("j1".to_string()))]]);

        let err = write_table(&table, &blocker.join("out.csv")).unwrap_err();
        assert!(matches!(err, IngestError::OutputWrite { .. }));
    }
}
