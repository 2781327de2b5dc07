// Batch pipeline: load, enrich, clean, summarise, write; plus the yearly merge

pub mod clean;
pub mod enrich;
pub mod ingest;
pub mod loader;
pub mod merge;
pub mod summary;
pub mod writer;

// Re-export the entry points and the types they return
pub use ingest::{JobTechIngestion, RunReport};
pub use merge::{MergeReport, YearlyMerger};
pub use summary::StatisticsSummary;
pub use writer::WriteOutcome;
