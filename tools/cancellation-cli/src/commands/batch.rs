//! Analyse every dataset directory in a raw-data folder.

use std::path::PathBuf;

use cancellation_common::config::AnalysisConfig;
use cancellation_report::batch::run_batch;
use cancellation_report::sink::FileReportSink;

pub fn run(path: PathBuf, config: AnalysisConfig) -> anyhow::Result<()> {
    println!("Running batch analysis of: {}", path.display());

    let mut sink = FileReportSink::new(&config.output_dir, config.render_images);
    let outcome = run_batch(&path, &config, &mut sink)
        .map_err(|e| anyhow::anyhow!("Batch analysis failed: {e}"))?;

    println!("  Analyzed: {}", outcome.analysed());
    println!("  Without data: {}", outcome.empty.len());
    for name in &outcome.empty {
        println!("    - {name}");
    }

    if !outcome.failures.is_empty() {
        println!("\nSkipped datasets:");
        for failure in &outcome.failures {
            println!("  - {}: {}", failure.dataset, failure.error);
        }
    }

    println!("\nBatch table written to: {}", outcome.table_path.display());
    Ok(())
}
