//! Cleaning rules applied to the enriched postings before they are written.
//!
//! The vendor writes the string `"None"` where it has no value. Two different policies apply
//! to it: a missing dedup id is replaced by the posting's own id ([`populate_dedup_id`]), while
//! a missing classification code becomes the sentinel `"0"` ([`clean_code`]). They stay
//! separate functions on purpose.

use crate::constants;
use crate::table::{Cell, Table};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;
use tracing::{debug, info, warn};

/// HTML tags, character/numeric entities and the bare `nbsp;` token
static MARKUP_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<.*?>|&([a-z0-9]+|#[0-9]{1,6}|#x[0-9a-f]{1,6});|nbsp;").expect("valid regex")
});
static WHITESPACE_RUN_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s{2,}").expect("valid regex"));
static ANGLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<|>").expect("valid regex"));
static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<.*?>").expect("valid regex"));

/// Fill `jobDedupId` from `jobId` where the vendor left it unassigned.
///
/// Unassigned means the literal `"None"`; a null or empty cell is treated the same so every
/// cleaned row carries a dedup id. Any other value is kept as is. A posting with no `jobId`
/// to fall back on keeps the literal `"None"` and is logged.
pub fn populate_dedup_id(table: &mut Table) {
    let job_ids: Vec<Cell> = table
        .column_values(constants::JOB_ID)
        .into_iter()
        .map(|v| v.filter(|id| !id.is_empty()).map(str::to_string))
        .collect();

    let mut filled = 0usize;
    let mut unresolved = 0usize;
    let mut job_ids = job_ids.into_iter();
    table.map_column(constants::JOB_DEDUP_ID, |dedup_id| {
        let job_id = job_ids.next().flatten();
        match dedup_id.as_deref() {
            None | Some("") | Some(constants::NONE_LITERAL) => match job_id {
                Some(id) => {
                    filled += 1;
                    Some(id)
                }
                None => {
                    unresolved += 1;
                    Some(constants::NONE_LITERAL.to_string())
                }
            },
            Some(_) => dedup_id,
        }
    });

    debug!("Populated {} dedup ids from jobId", filled);
    if unresolved > 0 {
        warn!(
            "{} postings have neither a dedup id nor a jobId; keeping '{}'",
            unresolved,
            constants::NONE_LITERAL
        );
    }
}

/// Drop rows sharing a `jobDedupId`, keeping the first. A no-op unless `enabled`, which
/// keeps output cardinality identical to historical runs by default.
pub fn drop_duplicates(table: &mut Table, enabled: bool) {
    if !enabled {
        return;
    }

    let before = table.len();
    let mut seen: HashSet<Option<String>> = HashSet::new();
    match table.column_index(constants::JOB_DEDUP_ID) {
        Some(idx) => table.retain_rows(|_, row| seen.insert(row[idx].clone())),
        None => return,
    }

    info!("Dropped {} duplicate postings", before - table.len());
}

/// One pass of the description clean-up. Order matters: entities for `<` and `>` are
/// unescaped first so the tags they spell out are stripped with the real ones.
fn sanitize_pass(text: &str) -> String {
    let text = text.replace("&lt;", "<").replace("&gt;", ">");
    let text = MARKUP_RE.replace_all(&text, " ");
    let text = WHITESPACE_RUN_RE.replace_all(&text, " ");
    let text = ANGLE_RE.replace_all(text.trim(), "");
    TAG_RE.replace_all(&text, " ").into_owned()
}

/// Strip markup and entities from a job description and normalise its whitespace.
///
/// The pass is repeated until the text stops changing. Every pass that changes the text
/// makes it shorter, so this terminates, and the result is a fixed point: sanitizing it
/// again returns it unchanged.
pub fn sanitize_description(text: &str) -> String {
    let mut current = text.to_string();
    loop {
        let mut next = sanitize_pass(&current);
        // removing a stray `<` or `>` can leave a double or edge space behind
        if WHITESPACE_RUN_RE.is_match(&next) || next.trim().len() != next.len() {
            next = WHITESPACE_RUN_RE.replace_all(next.trim(), " ").into_owned();
        }
        if next == current {
            return next;
        }
        current = next;
    }
}

/// Sanitize the `jobDescription` of every row; a missing description becomes empty text.
pub fn clean_job_description(table: &mut Table) {
    table.map_column(constants::JOB_DESCRIPTION, |text| {
        Some(sanitize_description(text.as_deref().unwrap_or_default()))
    });
}

/// Map a missing classification code (null, empty, or the literal `"None"`) to `"0"`.
pub fn clean_code(value: Option<&str>) -> String {
    match value {
        None | Some("") | Some(constants::NONE_LITERAL) => constants::MISSING_CODE.to_string(),
        Some(code) => code.to_string(),
    }
}

/// Apply [`clean_code`] to one code column, creating it when the export did not have it.
pub fn clean_code_column(table: &mut Table, column: &str) {
    table.map_column(column, |value| Some(clean_code(value.as_deref())));
}

/// Run the cleaning steps in their fixed order.
pub fn clean_final(mut table: Table, enable_dedup: bool) -> Table {
    populate_dedup_id(&mut table);
    drop_duplicates(&mut table, enable_dedup);
    clean_job_description(&mut table);
    clean_code_column(&mut table, constants::SSOC_CODE);
    clean_code_column(&mut table, constants::SSIC_CODE);
    info!("Cleaned {} postings", table.len());
    table
}
