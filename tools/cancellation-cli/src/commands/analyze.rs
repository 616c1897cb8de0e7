//! Analyse a single dataset directory.

use std::path::PathBuf;

use cancellation_common::config::AnalysisConfig;
use cancellation_report::pipeline::{run_dataset, RunOutcome};
use cancellation_report::sink::{FileReportSink, SUMMARY_FILE};
use cancellation_report::summary::{SummaryRecord, SUMMARY_COLUMNS};

pub fn run(path: PathBuf, config: AnalysisConfig) -> anyhow::Result<()> {
    println!("Analyzing dataset at: {}", path.display());

    let mut sink = FileReportSink::new(&config.output_dir, config.render_images);
    let outcome = run_dataset(&path, &config, &mut sink)
        .map_err(|e| anyhow::anyhow!("Failed to analyze dataset: {e}"))?;

    match outcome {
        RunOutcome::Empty(notice) => {
            println!("  {}", notice.message);
        }
        RunOutcome::Analysed(summary) => {
            print_summary(&summary);
            let dir = sink.dataset_dir(&dataset_name(&path));
            println!("\nSummary written to: {}", dir.join(SUMMARY_FILE).display());
        }
    }

    Ok(())
}

fn print_summary(summary: &SummaryRecord) {
    let width = SUMMARY_COLUMNS.iter().map(|c| c.len()).max().unwrap_or(0);
    for (column, value) in SUMMARY_COLUMNS.iter().zip(summary.fields()) {
        println!("  {column:<width$}  {value}");
    }
}

fn dataset_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
