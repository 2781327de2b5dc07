use crate::config::Settings;
use crate::constants;
use crate::error::{IngestError, Result};
use crate::pipeline::loader::read_csv_file;
use crate::pipeline::writer::{write_table, WriteOutcome};
use crate::table::Table;
use crate::types::validate_year;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, info_span, warn, Dispatch};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeReport {
    /// Merged files, in the order their rows appear in the output
    pub files: Vec<PathBuf>,
    pub rows: usize,
    pub output_path: PathBuf,
    /// False when every input held only a header and no merged file was written
    pub written: bool,
}

/// Concatenates a year's per-period output files into one yearly file
pub struct YearlyMerger {
    settings: Settings,
    log: Dispatch,
}

impl YearlyMerger {
    pub fn new(settings: Settings, log: Dispatch) -> Self {
        Self { settings, log }
    }

    pub fn merge_year(&self, year: &str) -> Result<MergeReport> {
        tracing::dispatcher::with_default(&self.log, || {
            let span = info_span!("merge_year", year = %year);
            let _enter = span.enter();
            self.run(year)
        })
    }

    fn run(&self, year: &str) -> Result<MergeReport> {
        let year = validate_year(year)?;

        let dir = self.settings.output_dir.join(year);
        let prefix = constants::output_file_prefix(&self.settings.country_code);
        let files = discover_output_files(&dir, &prefix)?;
        if files.is_empty() {
            return Err(IngestError::NoMergeInputs { dir });
        }

        let mut tables = Vec::with_capacity(files.len());
        for file in &files {
            info!("Merging {}", file.display());
            tables.push(read_csv_file(file)?);
        }
        let merged = Table::concat(tables);

        let output_path = dir.join(constants::merged_file_name(
            &self.settings.country_code,
            &self.settings.vendor_code,
            year,
        ));
        let outcome = write_table(&merged, &output_path)?;
        let written = matches!(outcome, WriteOutcome::Written { .. });
        if written {
            info!(
                "Merged {} files ({} rows) into {}",
                files.len(),
                merged.len(),
                output_path.display()
            );
        } else {
            warn!("All {} input files are empty; no merged file written", files.len());
        }

        Ok(MergeReport {
            files,
            rows: merged.len(),
            output_path,
            written,
        })
    }
}

/// Regular files in `dir` whose names start with `prefix`, sorted by file name
pub fn discover_output_files(dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|e| IngestError::source_read(dir, e))?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| IngestError::source_read(dir, e))?;
        let path = entry.path();
        let matches = entry
            .file_name()
            .to_str()
            .is_some_and(|name| name.starts_with(prefix));
        if matches && path.is_file() {
            files.push(path);
        }
    }
    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));

    Ok(files)
}
