use crate::constants;
use crate::error::{IngestError, Result};
use crate::table::{Cell, Table};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info, warn};

/// Left-join the skills-framework mapping onto the postings by `jobId = job_id`.
///
/// The mapping columns come out as `sfwJobRole`, `sfwSector` and `sfwJobRoleId`; `job_id`
/// and `ssg_track` are dropped. Unmatched postings keep empty mapping fields, and when a
/// `job_id` is listed twice the first mapping row wins, so the posting count never changes.
pub fn join_skills_framework(postings: &Table, sfw: &Table) -> Result<Table> {
    if !postings.is_empty() && !postings.has_column(constants::JOB_ID) {
        return Err(IngestError::MissingColumn {
            table: "job postings".to_string(),
            column: constants::JOB_ID.to_string(),
        });
    }
    let key_idx = sfw
        .column_index(constants::SFW_JOB_ID)
        .ok_or_else(|| IngestError::MissingColumn {
            table: "skills framework".to_string(),
            column: constants::SFW_JOB_ID.to_string(),
        })?;

    // Mapping columns to carry over, in output order, with their source index
    let mut carried: Vec<(String, usize)> = Vec::new();
    for (from, to) in constants::SFW_RENAMES {
        if let Some(idx) = sfw.column_index(from) {
            carried.push((to.to_string(), idx));
        }
    }
    for (idx, column) in sfw.columns().iter().enumerate() {
        let column = column.as_str();
        let handled = column == constants::SFW_JOB_ID
            || column == constants::SFW_TRACK
            || constants::SFW_RENAMES.iter().any(|(from, _)| *from == column);
        if handled {
            continue;
        }
        if postings.has_column(column) {
            warn!("Skipping skills framework column '{}': name already used by postings", column);
            continue;
        }
        carried.push((column.to_string(), idx));
    }

    let mut lookup: HashMap<&str, &[Cell]> = HashMap::new();
    for row in sfw.rows() {
        if let Some(key) = row[key_idx].as_deref() {
            lookup.entry(key).or_insert(row.as_slice());
        }
    }

    let job_ids: Vec<Option<String>> = postings
        .column_values(constants::JOB_ID)
        .into_iter()
        .map(|v| v.map(str::to_string))
        .collect();

    let mut joined = postings.clone();
    let mut matched = 0usize;
    for (row, job_id) in job_ids.iter().enumerate() {
        let mapping = job_id.as_deref().and_then(|id| lookup.get(id));
        if mapping.is_some() {
            matched += 1;
        }
        for (column, idx) in &carried {
            let value = mapping.and_then(|m| m[*idx].clone());
            joined.set(row, column, value);
        }
    }
    // an empty postings table still gets the mapping columns
    for (column, _) in &carried {
        joined.ensure_column(column);
    }

    info!(
        "Joined skills framework: {} of {} postings matched",
        matched,
        joined.len()
    );
    Ok(joined)
}

/// Add `isRecruitmentAgency`: 1 when `companyName` is exactly (case-sensitively) on the
/// agency list, 0 otherwise, including for postings without a company name.
pub fn flag_recruitment_agency(table: &mut Table, agency_names: &HashSet<String>) -> Result<()> {
    if !table.is_empty() && !table.has_column(constants::COMPANY_NAME) {
        return Err(IngestError::MissingColumn {
            table: "job postings".to_string(),
            column: constants::COMPANY_NAME.to_string(),
        });
    }

    let flags: Vec<Cell> = table
        .column_values(constants::COMPANY_NAME)
        .into_iter()
        .map(|name| {
            let is_agency = name.is_some_and(|n| agency_names.contains(n));
            Some(if is_agency { "1" } else { "0" }.to_string())
        })
        .collect();

    let flagged = flags.iter().filter(|f| f.as_deref() == Some("1")).count();
    let mut flags = flags.into_iter();
    table.map_column(constants::IS_RECRUITMENT_AGENCY, |_| flags.next().flatten());

    debug!("Flagged {} postings as recruitment agencies", flagged);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(s: &str) -> Cell {
        Some(s.to_string())
    }

    fn postings() -> Table {
        Table::from_records(vec![
            vec![("jobId", cell("j1")), ("companyName", cell("Hays"))],
            vec![("jobId", cell("j2")), ("companyName", cell("Acme Pte Ltd"))],
            vec![("jobId", cell("j3")), ("companyName", None)],
        ])
    }

    fn sfw() -> Table {
        let mut table = Table::new(
            ["job_id", "jobrole_title", "ssg_sector", "jobrole_id", "ssg_track"]
                .iter()
                .map(|s| s.to_string())
                .collect(),
        );
        table.push_row(vec![cell("j1"), cell("Recruiter"), cell("HR"), cell("R-1"), cell("T")]).unwrap();
        table.push_row(vec![cell("j1"), cell("Other"), cell("X"), cell("R-9"), cell("T")]).unwrap();
        table.push_row(vec![cell("j9"), cell("Analyst"), cell("Fin"), cell("R-2"), cell("T")]).unwrap();
        table
    }

    #[test]
    fn test_left_join_preserves_rows_and_renames() {
        let joined = join_skills_framework(&postings(), &sfw()).unwrap();

        assert_eq!(joined.len(), 3);
        assert_eq!(
            joined.columns(),
            &["jobId", "companyName", "sfwJobRole", "sfwSector", "sfwJobRoleId"]
        );
        assert_eq!(joined.get(0, "sfwJobRole"), Some("Recruiter"));
        assert_eq!(joined.get(0, "sfwJobRoleId"), Some("R-1"));
        assert_eq!(joined.get(1, "sfwSector"), None);
        assert_eq!(joined.get(2, "sfwJobRole"), None);
        assert!(!joined.has_column("job_id"));
        assert!(!joined.has_column("ssg_track"));
    }

    #[test]
    fn test_join_with_no_matches_keeps_every_posting() {
        let mut unrelated = sfw();
        unrelated.retain_rows(|_, row| row[0].as_deref() == Some("j9"));

        let joined = join_skills_framework(&postings(), &unrelated).unwrap();
        assert_eq!(joined.len(), postings().len());
        assert!(joined.column_values("sfwJobRole").iter().all(Option::is_none));
    }

    #[test]
    fn test_join_carries_extra_columns() {
        let mut mapping = sfw();
        mapping.ensure_column("sfw_version");
        mapping.set(0, "sfw_version", cell("v2"));
        mapping.ensure_column("companyName");

        let joined = join_skills_framework(&postings(), &mapping).unwrap();
        assert_eq!(joined.get(0, "sfw_version"), Some("v2"));
        assert_eq!(joined.get(0, "companyName"), Some("Hays"));
    }

    #[test]
    fn test_join_requires_job_id() {
        let no_id = Table::from_records(vec![vec![("companyName", cell("Hays"))]]);
        assert!(join_skills_framework(&no_id, &sfw()).is_err());
    }

    #[test]
    fn test_flag_recruitment_agency() {
        let mut table = postings();
        let agencies: HashSet<String> = ["Hays".to_string()].into_iter().collect();

        flag_recruitment_agency(&mut table, &agencies).unwrap();

        assert_eq!(
            table.column_values("isRecruitmentAgency"),
            vec![Some("1"), Some("0"), Some("0")]
        );
    }

    #[test]
    fn test_flag_is_case_sensitive() {
        let mut table = Table::from_records(vec![vec![("companyName", cell("hays"))]]);
        let agencies: HashSet<String> = ["Hays".to_string()].into_iter().collect();

        flag_recruitment_agency(&mut table, &agencies).unwrap();
        assert_eq!(table.get(0, "isRecruitmentAgency"), Some("0"));
    }
}
