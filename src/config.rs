use crate::error::{IngestError, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Config file picked up from the working directory when no explicit path is given
pub const DEFAULT_CONFIG_FILE: &str = "jobtech.toml";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Root of the input layout; per-year folders live underneath
    pub data_dir: PathBuf,
    /// Root of the output layout; per-year folders are created underneath
    pub output_dir: PathBuf,
    pub country_code: String,
    pub vendor_code: String,
    /// Drop rows sharing a `jobDedupId`. Off by default so historical outputs reproduce.
    pub enable_dedup: bool,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub dir: PathBuf,
    pub file_prefix: String,
    /// Fallback directive when `RUST_LOG` is unset
    pub filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            output_dir: PathBuf::from("output"),
            country_code: "SG".to_string(),
            vendor_code: "jt".to_string(),
            enable_dedup: false,
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("logs"),
            file_prefix: "jobtech_ingest.log".to_string(),
            filter: "jobtech_ingest=info".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from `path`, or from `jobtech.toml` when present, or fall back to
    /// defaults. Environment overrides are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_or(path, Path::new(DEFAULT_CONFIG_FILE))
    }

    fn load_or(path: Option<&Path>, fallback: &Path) -> Result<Self> {
        let settings = match path {
            Some(p) => Self::from_file(p)?,
            None if fallback.is_file() => Self::from_file(fallback)?,
            None => Self::default(),
        };
        settings.with_env_overrides()
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            IngestError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let settings: Settings = toml::from_str(content)?;
        Ok(settings)
    }

    fn with_env_overrides(mut self) -> Result<Self> {
        if let Ok(dir) = std::env::var("JOBTECH_DATA_DIR") {
            if !dir.trim().is_empty() {
                self.data_dir = PathBuf::from(dir);
            }
        }
        if let Ok(dir) = std::env::var("JOBTECH_OUTPUT_DIR") {
            if !dir.trim().is_empty() {
                self.output_dir = PathBuf::from(dir);
            }
        }
        if let Ok(flag) = std::env::var("JOBTECH_ENABLE_DEDUP") {
            self.enable_dedup = parse_flag(&flag).ok_or_else(|| {
                IngestError::Config(format!("JOBTECH_ENABLE_DEDUP must be true or false, got '{flag}'"))
            })?;
        }
        Ok(self)
    }
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
