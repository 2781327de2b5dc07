use crate::constants;
use crate::table::Table;
use serde::Serialize;

/// Per-run counts written next to the cleaned postings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatisticsSummary {
    pub row_count: usize,
    /// Null or empty SSOC codes; zero after cleaning unless a rule regressed
    pub missing_ssoc_count: usize,
    pub missing_ssic_count: usize,
    /// Codes equal to the `"0"` sentinel
    pub zero_ssoc_count: usize,
    pub zero_ssic_count: usize,
}

impl StatisticsSummary {
    pub const COLUMNS: [&'static str; 5] = [
        "row_count",
        "missing_ssoc_count",
        "missing_ssic_count",
        "zero_ssoc_count",
        "zero_ssic_count",
    ];

    /// The summary as a one-row table, for the writer
    pub fn to_table(&self) -> Table {
        let values = [
            self.row_count,
            self.missing_ssoc_count,
            self.missing_ssic_count,
            self.zero_ssoc_count,
            self.zero_ssic_count,
        ];
        Table::from_records([Self::COLUMNS
            .iter()
            .zip(values)
            .map(|(column, n)| (*column, Some(n.to_string())))])
    }
}

pub fn compute_statistics(table: &Table) -> StatisticsSummary {
    let ssoc = table.column_values(constants::SSOC_CODE);
    let ssic = table.column_values(constants::SSIC_CODE);

    let missing = |values: &[Option<&str>]| {
        values
            .iter()
            .filter(|v| v.map_or(true, str::is_empty))
            .count()
    };
    let zero = |values: &[Option<&str>]| {
        values
            .iter()
            .filter(|v| **v == Some(constants::MISSING_CODE))
            .count()
    };

    StatisticsSummary {
        row_count: table.len(),
        missing_ssoc_count: missing(&ssoc),
        missing_ssic_count: missing(&ssic),
        zero_ssoc_count: zero(&ssoc),
        zero_ssic_count: zero(&ssic),
    }
}
