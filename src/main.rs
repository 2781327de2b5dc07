use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use jobtech_ingest::config::Settings;
use jobtech_ingest::logging;
use jobtech_ingest::pipeline::{JobTechIngestion, YearlyMerger};
use jobtech_ingest::types::{validate_year, RunSpec};
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "jobtech_ingest")]
#[command(about = "JobTech job-posting ingestion and cleaning")]
#[command(version = "0.1.0")]
struct Cli {
    /// TOML config file (defaults to ./jobtech.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process one period's job-posting export. Missing arguments are prompted for.
    Ingest {
        /// Year to process, e.g. 2023
        #[arg(long)]
        year: Option<String>,
        /// quarter or month
        #[arg(long)]
        cycle: Option<String>,
        /// 1-4 for a quarter, 1-12 for a month
        #[arg(long)]
        period: Option<String>,
        /// Export file name inside the year's data directory
        #[arg(long)]
        source_file: Option<String>,
        /// Drop postings sharing a jobDedupId
        #[arg(long)]
        enable_dedup: bool,
    },
    /// Merge a year's per-period output files into one file
    Merge {
        #[arg(long)]
        year: Option<String>,
    },
}

fn prompt(label: &str) -> Result<String> {
    print!("{label}: ");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    Ok(line.trim().to_string())
}

fn or_prompt(value: Option<String>, label: &str) -> Result<String> {
    match value {
        Some(v) => Ok(v),
        None => prompt(label),
    }
}

/// `.env` and the config file are only read once the arguments have been validated
fn load_settings(config: Option<&Path>) -> Result<Settings> {
    dotenv::dotenv().ok();
    Settings::load(config).context("Failed to load settings")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Ingest {
            year,
            cycle,
            period,
            source_file,
            enable_dedup,
        } => {
            let year = or_prompt(year, "Year to process")?;
            let cycle = or_prompt(cycle, "quarter or month")?;
            let period = or_prompt(period, "Period to process")?;
            let source_file = or_prompt(source_file, "Source file to process")?;

            let spec = RunSpec::parse(&year, &cycle, &period, &source_file)?;
            let mut settings = load_settings(cli.config.as_deref())?;
            settings.enable_dedup |= enable_dedup;

            let (dispatch, _guard) = logging::init_logging(&settings.logging)?;
            info!("Starting ingestion for {}", spec.period_tag());

            let report = JobTechIngestion::new(spec, settings, dispatch)
                .process_data()
                .context("An error occurred")?;

            println!("\n📊 Run {}:", report.run_id);
            println!("   Rows: {}", report.statistics.row_count);
            println!("   Zero SSOC codes: {}", report.statistics.zero_ssoc_count);
            println!("   Zero SSIC codes: {}", report.statistics.zero_ssic_count);
            if report.main_written {
                println!("   Output file: {}", report.output_path.display());
            } else {
                println!("   Output file: none (no rows)");
            }
            println!("   Statistics file: {}", report.statics_path.display());
        }
        Commands::Merge { year } => {
            let year = or_prompt(year, "Year to process")?;
            let year = validate_year(&year)?;
            let settings = load_settings(cli.config.as_deref())?;
            let (dispatch, _guard) = logging::init_logging(&settings.logging)?;

            let report = YearlyMerger::new(settings, dispatch)
                .merge_year(year)
                .with_context(|| format!("Failed to merge outputs for {year}"))?;

            if report.written {
                println!(
                    "✅ Merged {} files ({} rows) into {}",
                    report.files.len(),
                    report.rows,
                    report.output_path.display()
                );
            } else {
                println!("⚠️  {} files matched but none had rows; nothing written", report.files.len());
            }
        }
    }

    Ok(())
}
