use crate::config::Settings;
use crate::constants;
use crate::error::{IngestError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Whether a processing period is a calendar quarter or a calendar month
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CycleType {
    Quarter,
    Month,
}

impl CycleType {
    /// Marker used in output file names
    pub fn marker(self) -> char {
        match self {
            CycleType::Quarter => 'q',
            CycleType::Month => 'm',
        }
    }

    pub fn max_period(self) -> u8 {
        match self {
            CycleType::Quarter => 4,
            CycleType::Month => 12,
        }
    }
}

impl FromStr for CycleType {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "quarter" => Ok(CycleType::Quarter),
            "month" => Ok(CycleType::Month),
            other => Err(IngestError::InputValidation(format!(
                "cycle type must be 'quarter' or 'month', got '{other}'"
            ))),
        }
    }
}

impl fmt::Display for CycleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CycleType::Quarter => write!(f, "quarter"),
            CycleType::Month => write!(f, "month"),
        }
    }
}

/// Trim a year as entered and check it is all ASCII digits, so it is safe to join onto a path.
pub fn validate_year(year: &str) -> Result<&str> {
    let year = year.trim();
    if year.is_empty() || !year.chars().all(|c| c.is_ascii_digit()) {
        return Err(IngestError::InputValidation(format!(
            "year must be numeric, got '{year}'"
        )));
    }
    Ok(year)
}

/// One validated (year, cycle, period, source file) unit of work
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSpec {
    year: String,
    cycle: CycleType,
    period: u8,
    source_file: String,
}

impl RunSpec {
    pub fn new(year: &str, cycle: CycleType, period: u8, source_file: &str) -> Result<Self> {
        let year = year.trim();
        let source_file = source_file.trim();

        if year.is_empty() || source_file.is_empty() {
            return Err(IngestError::InputValidation(
                "Year, period and source file must be provided.".to_string(),
            ));
        }
        let year = validate_year(year)?;
        if !(1..=cycle.max_period()).contains(&period) {
            return Err(IngestError::InputValidation(format!(
                "The period must be between 1 and {} for {}, got {}.",
                cycle.max_period(),
                cycle,
                period
            )));
        }

        Ok(Self {
            year: year.to_string(),
            cycle,
            period,
            source_file: source_file.to_string(),
        })
    }

    /// Like [`RunSpec::new`] but takes the cycle type and period as entered on the command line.
    pub fn parse(year: &str, cycle: &str, period: &str, source_file: &str) -> Result<Self> {
        let cycle: CycleType = cycle.parse()?;
        let period: u8 = period.trim().parse().map_err(|_| {
            IngestError::InputValidation(format!("period must be a number, got '{}'", period.trim()))
        })?;
        Self::new(year, cycle, period, source_file)
    }

    pub fn year(&self) -> &str {
        &self.year
    }

    pub fn cycle(&self) -> CycleType {
        self.cycle
    }

    pub fn period(&self) -> u8 {
        self.period
    }

    pub fn source_file(&self) -> &str {
        &self.source_file
    }

    /// `{year}{q|m}-{period}`, the run-specific part of every output file name
    pub fn period_tag(&self) -> String {
        format!("{}{}-{}", self.year, self.cycle.marker(), self.period)
    }
}

/// Every path a single run reads from or writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunPaths {
    pub source_path: PathBuf,
    pub skills_framework_path: PathBuf,
    pub recruitment_path: PathBuf,
    pub output_dir: PathBuf,
    pub output_path: PathBuf,
    pub statics_path: PathBuf,
}

impl RunPaths {
    pub fn resolve(spec: &RunSpec, settings: &Settings) -> Self {
        let year_data_dir = settings.data_dir.join(spec.year());
        let output_dir = settings.output_dir.join(spec.year());
        let suffix = format!(
            "{}-{}-{}.csv",
            settings.country_code,
            settings.vendor_code,
            spec.period_tag()
        );

        Self {
            source_path: year_data_dir.join(spec.source_file()),
            // the reference extract is always published per month, whatever the cycle
            skills_framework_path: year_data_dir.join(format!(
                "{}-jobs-sfw-{}m{}.csv",
                settings.vendor_code,
                spec.year(),
                spec.period()
            )),
            recruitment_path: settings.data_dir.join(constants::RECRUITMENT_FILE_NAME),
            output_path: output_dir.join(format!("{}-{}", constants::OUTPUT_FILE_STEM, suffix)),
            statics_path: output_dir.join(format!("{}-{}", constants::STATICS_FILE_STEM, suffix)),
            output_dir,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    #[test]
    fn test_cycle_type_parsing() {
        assert_eq!("quarter".parse::<CycleType>().unwrap(), CycleType::Quarter);
        assert_eq!(" Month ".parse::<CycleType>().unwrap(), CycleType::Month);
        assert!(matches!(
            "week".parse::<CycleType>(),
            Err(IngestError::InputValidation(_))
        ));
    }

    #[test]
    fn test_period_range_is_validated() {
        assert!(RunSpec::new("2023", CycleType::Quarter, 4, "jobs.json").is_ok());
        assert!(RunSpec::new("2023", CycleType::Quarter, 5, "jobs.json").is_err());
        assert!(RunSpec::new("2023", CycleType::Month, 12, "jobs.json").is_ok());
        assert!(RunSpec::new("2023", CycleType::Month, 0, "jobs.json").is_err());
        assert!(RunSpec::new("2023", CycleType::Month, 13, "jobs.json").is_err());
    }

    #[test]
    fn test_missing_fields_are_rejected() {
        let err = RunSpec::new("", CycleType::Month, 1, "jobs.json").unwrap_err();
        assert!(matches!(err, IngestError::InputValidation(_)));
        assert!(RunSpec::new("2023", CycleType::Month, 1, "  ").is_err());
        assert!(RunSpec::new("20x3", CycleType::Month, 1, "jobs.json").is_err());
    }

    #[test]
    fn test_validate_year() {
        assert_eq!(validate_year(" 2023 ").unwrap(), "2023");
        assert!(validate_year("").is_err());
        assert!(validate_year("../2023").is_err());
    }

    #[test]
    fn test_parse_from_text() {
        let spec = RunSpec::parse("2023", "quarter", "02", "jobs.json").unwrap();
        assert_eq!(spec.period(), 2);
        assert!(RunSpec::parse("2023", "quarter", "two", "jobs.json").is_err());
    }

    #[test]
    fn test_quarter_paths() {
        let spec = RunSpec::new("2023", CycleType::Quarter, 2, "jt-jobs.json").unwrap();
        let paths = RunPaths::resolve(&spec, &Settings::default());

        assert_eq!(paths.source_path, Path::new("data/2023/jt-jobs.json"));
        assert_eq!(
            paths.skills_framework_path,
            Path::new("data/2023/jt-jobs-sfw-2023m2.csv")
        );
        assert_eq!(
            paths.recruitment_path,
            Path::new("data/Recruitment Companies in JobTech Data.csv")
        );
        assert_eq!(paths.output_dir, Path::new("output/2023"));
        assert_eq!(
            paths.output_path,
            Path::new("output/2023/outputMergedFile-SG-jt-2023q-2.csv")
        );
        assert_eq!(
            paths.statics_path,
            Path::new("output/2023/statics-SG-jt-2023q-2.csv")
        );
    }

    #[test]
    fn test_month_paths() {
        let spec = RunSpec::new("2021", CycleType::Month, 11, "jt-jobs.json").unwrap();
        let paths = RunPaths::resolve(&spec, &Settings::default());

        assert_eq!(
            paths.output_path,
            Path::new("output/2021/outputMergedFile-SG-jt-2021m-11.csv")
        );
        assert_eq!(
            paths.statics_path,
            Path::new("output/2021/statics-SG-jt-2021m-11.csv")
        );
    }
}
