use anyhow::{Context, Result};
use clap::Parser;
use jobtech_ingest::config::Settings;
use jobtech_ingest::logging;
use jobtech_ingest::pipeline::YearlyMerger;
use jobtech_ingest::types::validate_year;
use std::path::PathBuf;

/// Merge every outputMergedFile of a year into merged_outputMergedFile-<country>-<vendor>-<year>.csv
#[derive(Parser)]
#[command(name = "merge-year")]
struct Args {
    /// Year whose output directory should be merged
    year: String,

    /// TOML config file (defaults to ./jobtech.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let year = validate_year(&args.year)?;

    dotenv::dotenv().ok();
    let settings = Settings::load(args.config.as_deref()).context("Failed to load settings")?;
    let (dispatch, _guard) = logging::init_logging(&settings.logging)?;

    let report = YearlyMerger::new(settings, dispatch)
        .merge_year(year)
        .with_context(|| format!("Failed to merge outputs for {year}"))?;

    if report.written {
        println!(
            "✅ Merged CSV file: {} successfully! ({} files, {} rows)",
            report.output_path.display(),
            report.files.len(),
            report.rows
        );
    } else {
        println!("⚠️  {} files matched but none had rows; nothing written", report.files.len());
    }
    Ok(())
}
