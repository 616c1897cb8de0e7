//! Batch mode: every dataset directory below a raw-data root.

use std::path::{Path, PathBuf};

use cancellation_common::config::AnalysisConfig;
use cancellation_common::error::{CancellationError, CancellationResult};
use cancellation_dataset_model::name::DatasetName;

use crate::pipeline::{run_dataset, RunOutcome};
use crate::sink::ReportSink;
use crate::summary::BatchTable;

pub const BATCH_TABLE_FILE: &str = "batch.txt";

/// A dataset that could not be analysed.
#[derive(Debug)]
pub struct BatchFailure {
    pub dataset: String,
    pub error: CancellationError,
}

/// Result of a batch run.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    pub table: BatchTable,
    /// Datasets without clicks.
    pub empty: Vec<String>,
    pub failures: Vec<BatchFailure>,
    /// Where the combined table was written.
    pub table_path: PathBuf,
}

impl BatchOutcome {
    pub fn analysed(&self) -> usize {
        self.table.len()
    }
}

/// Dataset directories below `raw_dir`, sorted by name.
pub fn dataset_dirs(raw_dir: &Path) -> CancellationResult<Vec<PathBuf>> {
    if !raw_dir.is_dir() {
        return Err(CancellationError::FileNotFound {
            path: raw_dir.to_path_buf(),
        });
    }

    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(raw_dir)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

/// Analyse every dataset directory in `raw_dir`, one after another, and
/// write the combined table to `<output_dir>/batch.txt`.
///
/// A dataset that fails is logged and recorded; the batch carries on
/// unless the failure means the machine is out of memory or disk.
pub fn run_batch(
    raw_dir: &Path,
    config: &AnalysisConfig,
    sink: &mut dyn ReportSink,
) -> CancellationResult<BatchOutcome> {
    let dirs = dataset_dirs(raw_dir)?;
    tracing::info!("Batch analysis of {} datasets in {}", dirs.len(), raw_dir.display());

    let mut outcome = BatchOutcome {
        table_path: config.output_dir.join(BATCH_TABLE_FILE),
        ..Default::default()
    };

    for (i, dir) in dirs.iter().enumerate() {
        let dataset = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        tracing::info!("[{}/{}] {}", i + 1, dirs.len(), dataset);

        match run_dataset(dir, config, sink) {
            Ok(RunOutcome::Analysed(summary)) => {
                outcome.table.push(DatasetName::parse(&dataset), summary);
            }
            Ok(RunOutcome::Empty(_)) => outcome.empty.push(dataset),
            Err(error) if error.is_resource_exhaustion() => {
                tracing::error!("Aborting batch at '{}': {}", dataset, error);
                return Err(error);
            }
            Err(error) => {
                tracing::warn!("Skipping '{}': {}", dataset, error);
                outcome.failures.push(BatchFailure { dataset, error });
            }
        }
    }

    outcome.table.write(&outcome.table_path)?;
    tracing::info!(
        "Batch done: {} analysed, {} empty, {} failed",
        outcome.analysed(),
        outcome.empty.len(),
        outcome.failures.len()
    );
    Ok(outcome)
}
