use anyhow::Result;
use jobtech_ingest::config::Settings;
use jobtech_ingest::error::IngestError;
use jobtech_ingest::pipeline::loader::read_csv_file;
use jobtech_ingest::pipeline::YearlyMerger;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use tempfile::tempdir;
use tracing::Dispatch;

fn merger_for(root: &Path) -> YearlyMerger {
    let settings = Settings {
        output_dir: root.to_path_buf(),
        ..Settings::default()
    };
    YearlyMerger::new(settings, Dispatch::none())
}

fn period_file(ids: std::ops::Range<usize>, tag: &str) -> String {
    let mut content = String::from("jobId,SSOC5dCode,isRecruitmentAgency\n");
    for i in ids {
        writeln!(content, "{tag}-{i},2512{},0", i % 10).unwrap();
    }
    content
}

#[test]
fn test_merge_concatenates_in_discovery_order() -> Result<()> {
    let temp_dir = tempdir()?;
    let year_dir = temp_dir.path().join("2023");
    fs::create_dir_all(&year_dir)?;
    fs::write(year_dir.join("outputMergedFile-SG-jt-2023q-2.csv"), period_file(0..7, "q2"))?;
    fs::write(year_dir.join("outputMergedFile-SG-jt-2023q-1.csv"), period_file(0..5, "q1"))?;
    fs::write(year_dir.join("statics-SG-jt-2023q-1.csv"), "row_count\n5\n")?;

    let report = merger_for(temp_dir.path()).merge_year("2023")?;

    assert_eq!(report.files.len(), 2);
    assert_eq!(report.rows, 12);
    assert!(report.written);
    assert_eq!(
        report.output_path,
        year_dir.join("merged_outputMergedFile-SG-jt-2023.csv")
    );

    let merged = read_csv_file(&report.output_path)?;
    assert_eq!(merged.columns(), &["jobId", "SSOC5dCode", "isRecruitmentAgency"]);
    assert_eq!(merged.len(), 12);

    let ids: Vec<&str> = merged.column_values("jobId").into_iter().flatten().collect();
    let expected: Vec<String> = (0..5)
        .map(|i| format!("q1-{i}"))
        .chain((0..7).map(|i| format!("q2-{i}")))
        .collect();
    assert_eq!(ids, expected);
    Ok(())
}

#[test]
fn test_merge_unions_columns() -> Result<()> {
    let temp_dir = tempdir()?;
    let year_dir = temp_dir.path().join("2022");
    fs::create_dir_all(&year_dir)?;
    fs::write(year_dir.join("outputMergedFile-SG-jt-2022m-1.csv"), "jobId,a\nj1,x\n")?;
    fs::write(year_dir.join("outputMergedFile-SG-jt-2022m-2.csv"), "jobId,b\nj2,y\n")?;

    let report = merger_for(temp_dir.path()).merge_year("2022")?;
    let merged = read_csv_file(&report.output_path)?;

    assert_eq!(merged.columns(), &["jobId", "a", "b"]);
    assert_eq!(merged.column_values("a"), vec![Some("x"), None]);
    assert_eq!(merged.column_values("b"), vec![None, Some("y")]);
    Ok(())
}

#[test]
fn test_rerun_does_not_merge_previous_output() -> Result<()> {
    let temp_dir = tempdir()?;
    let year_dir = temp_dir.path().join("2023");
    fs::create_dir_all(&year_dir)?;
    fs::write(year_dir.join("outputMergedFile-SG-jt-2023m-1.csv"), period_file(0..3, "m1"))?;

    let merger = merger_for(temp_dir.path());
    assert_eq!(merger.merge_year("2023")?.rows, 3);
    assert_eq!(merger.merge_year("2023")?.rows, 3);
    Ok(())
}

#[test]
fn test_no_matching_files_fails_fast() -> Result<()> {
    let temp_dir = tempdir()?;
    let year_dir = temp_dir.path().join("2024");
    fs::create_dir_all(&year_dir)?;
    fs::write(year_dir.join("statics-SG-jt-2024q-1.csv"), "row_count\n1\n")?;

    let err = merger_for(temp_dir.path()).merge_year("2024").unwrap_err();

    assert!(matches!(err, IngestError::NoMergeInputs { .. }));
    assert!(!year_dir.join("merged_outputMergedFile-SG-jt-2024.csv").exists());
    Ok(())
}

#[test]
fn test_header_only_inputs_report_nothing_written() -> Result<()> {
    let temp_dir = tempdir()?;
    let year_dir = temp_dir.path().join("2021");
    fs::create_dir_all(&year_dir)?;
    fs::write(year_dir.join("outputMergedFile-SG-jt-2021m-1.csv"), "jobId,SSOC5dCode\n")?;
    fs::write(year_dir.join("outputMergedFile-SG-jt-2021m-2.csv"), "jobId,SSOC5dCode\n")?;

    let report = merger_for(temp_dir.path()).merge_year("2021")?;

    assert_eq!(report.files.len(), 2);
    assert_eq!(report.rows, 0);
    assert!(!report.written);
    assert!(!report.output_path.exists());
    Ok(())
}

#[test]
fn test_invalid_year_is_rejected() {
    let temp_dir = tempdir().unwrap();
    let err = merger_for(temp_dir.path()).merge_year("../etc").unwrap_err();
    assert!(matches!(err, IngestError::InputValidation(_)));
}
