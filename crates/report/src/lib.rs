//! Cancellation Report
//!
//! Turns analysis results into outputs:
//! - **Summary:** Fixed-column, tab-delimited record per dataset
//! - **Sinks:** Per-dataset output directories (summary, metrics JSON,
//!   heatmap PNGs) or an in-memory collector
//! - **Pipeline:** Load → map → metrics → heatmaps → sink for one dataset
//! - **Batch:** The pipeline over every dataset directory, plus a combined
//!   table

pub mod batch;
pub mod pipeline;
pub mod render;
pub mod sink;
pub mod summary;

pub use batch::{run_batch, BatchFailure, BatchOutcome};
pub use pipeline::{analyse, run_dataset, RunOutcome};
pub use sink::{AnalysisReport, EmptyNotice, FileReportSink, MemoryReportSink, ReportSink};
pub use summary::{BatchTable, SummaryRecord};
