use crate::config::Settings;
use crate::error::{IngestError, Result};
use crate::pipeline::clean::clean_final;
use crate::pipeline::enrich::{flag_recruitment_agency, join_skills_framework};
use crate::pipeline::loader::{load_job_postings, load_recruitment_agencies, load_skills_framework};
use crate::pipeline::summary::{compute_statistics, StatisticsSummary};
use crate::pipeline::writer::{write_table, WriteOutcome};
use crate::table::Table;
use crate::types::{RunPaths, RunSpec};
use chrono::{DateTime, Utc};
use metrics::{counter, histogram};
use serde::Serialize;
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use tracing::{error, info, info_span, Dispatch};
use uuid::Uuid;

/// Outcome of one completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub output_path: PathBuf,
    pub statics_path: PathBuf,
    pub statistics: StatisticsSummary,
    /// False when the cleaned table was empty and no main file was written
    pub main_written: bool,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// One batch run over a single (year, cycle, period, source file) unit
pub struct JobTechIngestion {
    spec: RunSpec,
    settings: Settings,
    paths: RunPaths,
    log: Dispatch,
}

impl JobTechIngestion {
    pub fn new(spec: RunSpec, settings: Settings, log: Dispatch) -> Self {
        let paths = RunPaths::resolve(&spec, &settings);
        Self {
            spec,
            settings,
            paths,
            log,
        }
    }

    pub fn paths(&self) -> &RunPaths {
        &self.paths
    }

    /// Load, enrich, clean, summarise and write. Any failure aborts the whole run.
    pub fn process_data(&self) -> Result<RunReport> {
        tracing::dispatcher::with_default(&self.log, || {
            let run_id = Uuid::new_v4();
            let span = info_span!(
                "process_data",
                run_id = %run_id,
                year = %self.spec.year(),
                cycle = %self.spec.cycle(),
                period = self.spec.period()
            );
            let _enter = span.enter();

            let result = self.run(run_id);
            if let Err(e) = &result {
                error!("Run failed: {}", e);
            }
            result
        })
    }

    fn run(&self, run_id: Uuid) -> Result<RunReport> {
        let started_at = Utc::now();
        let t_run = std::time::Instant::now();
        counter!("jobtech_runs_total", "cycle" => self.spec.cycle().to_string()).increment(1);

        let agencies = load_recruitment_agencies(&self.paths.recruitment_path)?;
        info!("Loaded recruitment firm data.");
        let postings = load_job_postings(&self.paths.source_path)?;
        info!("Loaded and normalized job posting data.");
        let sfw = load_skills_framework(&self.paths.skills_framework_path)?;
        info!("Loaded skills framework data.");

        let final_table = self.transform(&postings, &sfw, &agencies)?;
        let statistics = compute_statistics(&final_table);
        info!(
            row_count = statistics.row_count,
            zero_ssoc = statistics.zero_ssoc_count,
            zero_ssic = statistics.zero_ssic_count,
            "Computed run statistics"
        );
        counter!("jobtech_rows_processed_total").increment(statistics.row_count as u64);
        counter!("jobtech_missing_code_total", "code" => "ssoc")
            .increment(statistics.zero_ssoc_count as u64);
        counter!("jobtech_missing_code_total", "code" => "ssic")
            .increment(statistics.zero_ssic_count as u64);

        self.ensure_output_dir()?;
        let main = write_table(&final_table, &self.paths.output_path)?;
        write_table(&statistics.to_table(), &self.paths.statics_path)?;
        info!("Data processing and writing completed.");

        histogram!("jobtech_run_duration_seconds").record(t_run.elapsed().as_secs_f64());

        Ok(RunReport {
            run_id,
            output_path: self.paths.output_path.clone(),
            statics_path: self.paths.statics_path.clone(),
            statistics,
            main_written: matches!(main, WriteOutcome::Written { .. }),
            started_at,
            finished_at: Utc::now(),
        })
    }

    /// Join, flag and clean, in that order
    fn transform(
        &self,
        postings: &Table,
        sfw: &Table,
        agencies: &HashSet<String>,
    ) -> Result<Table> {
        let mut table = join_skills_framework(postings, sfw)?;
        flag_recruitment_agency(&mut table, agencies)?;
        Ok(clean_final(table, self.settings.enable_dedup))
    }

    fn ensure_output_dir(&self) -> Result<()> {
        let dir = &self.paths.output_dir;
        if dir.is_dir() {
            info!("Directory '{}' already exists.", dir.display());
        } else {
            fs::create_dir_all(dir).map_err(|e| IngestError::output_write(dir, e))?;
            info!("Directory '{}' created.", dir.display());
        }
        Ok(())
    }
}
