use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Invalid input: {0}")]
    InputValidation(String),

    #[error("Failed to read source '{}': {message}", .path.display())]
    SourceRead { path: PathBuf, message: String },

    #[error("Failed to write output '{}': {message}", .path.display())]
    OutputWrite { path: PathBuf, message: String },

    #[error("No files starting with the merge prefix were found in '{}'", .dir.display())]
    NoMergeInputs { dir: PathBuf },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing required column '{column}' in {table}")]
    MissingColumn { table: String, column: String },

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl IngestError {
    pub fn source_read(path: &Path, message: impl ToString) -> Self {
        IngestError::SourceRead {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }

    pub fn output_write(path: &Path, message: impl ToString) -> Self {
        IngestError::OutputWrite {
            path: path.to_path_buf(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, IngestError>;
