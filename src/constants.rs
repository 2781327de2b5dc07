/// File and column name constants shared by the loader, the writer and the yearly merger.
/// The vendor export and reference files follow these conventions by agreement, so they are
/// fixed here rather than configurable.

// Reference data
pub const RECRUITMENT_FILE_NAME: &str = "Recruitment Companies in JobTech Data.csv";
pub const RECRUITMENT_COLUMN: &str = "RecruitmentCompanies";

// Vendor export
pub const RESULTS_KEY: &str = "results";

// Posting columns
pub const JOB_ID: &str = "jobId";
pub const JOB_DEDUP_ID: &str = "jobDedupId";
pub const COMPANY_NAME: &str = "companyName";
pub const JOB_DESCRIPTION: &str = "jobDescription";
pub const SSOC_CODE: &str = "SSOC5dCode";
pub const SSIC_CODE: &str = "SSIC5dCode";
pub const IS_RECRUITMENT_AGENCY: &str = "isRecruitmentAgency";

// Skills-framework columns, as delivered
pub const SFW_JOB_ID: &str = "job_id";
pub const SFW_JOBROLE_TITLE: &str = "jobrole_title";
pub const SFW_SECTOR: &str = "ssg_sector";
pub const SFW_JOBROLE_ID: &str = "jobrole_id";
pub const SFW_TRACK: &str = "ssg_track";

// Skills-framework columns, as written
pub const SFW_JOB_ROLE_OUT: &str = "sfwJobRole";
pub const SFW_SECTOR_OUT: &str = "sfwSector";
pub const SFW_JOB_ROLE_ID_OUT: &str = "sfwJobRoleId";

/// Renames applied to the skills-framework columns after the join
pub const SFW_RENAMES: [(&str, &str); 3] = [
    (SFW_JOBROLE_TITLE, SFW_JOB_ROLE_OUT),
    (SFW_SECTOR, SFW_SECTOR_OUT),
    (SFW_JOBROLE_ID, SFW_JOB_ROLE_ID_OUT),
];

// Sentinels
/// Vendor spelling of "no value" in string-typed fields
pub const NONE_LITERAL: &str = "None";
/// Written in place of a missing classification code
pub const MISSING_CODE: &str = "0";

// Output naming
pub const OUTPUT_FILE_STEM: &str = "outputMergedFile";
pub const STATICS_FILE_STEM: &str = "statics";
pub const MERGED_FILE_PREFIX: &str = "merged_";

/// Prefix every per-period output file of a country starts with, e.g. `outputMergedFile-SG`
pub fn output_file_prefix(country_code: &str) -> String {
    format!("{OUTPUT_FILE_STEM}-{country_code}")
}

/// Name of the consolidated yearly file, e.g. `merged_outputMergedFile-SG-jt-2023.csv`
pub fn merged_file_name(country_code: &str, vendor_code: &str, year: &str) -> String {
    format!(
        "{MERGED_FILE_PREFIX}{}-{vendor_code}-{year}.csv",
        output_file_prefix(country_code)
    )
}
