//! Single-dataset pipeline: load, map, measure, render, report.

use std::path::Path;

use cancellation_analysis_core::heatmap::{HeatmapKind, HeatmapRenderer};
use cancellation_analysis_core::mapping::ClickMapper;
use cancellation_analysis_core::metrics::MetricsEngine;
use cancellation_common::config::AnalysisConfig;
use cancellation_common::error::CancellationResult;
use cancellation_dataset_model::dataset::{Dataset, LoadOutcome};
use cancellation_dataset_model::loader::DatasetLoader;

use crate::sink::{AnalysisReport, EmptyNotice, RenderedHeatmap, ReportSink};
use crate::summary::SummaryRecord;

/// Result of running one dataset directory.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    Analysed(SummaryRecord),
    Empty(EmptyNotice),
}

/// Analyse a loaded dataset.
pub fn analyse(dataset: &Dataset, config: &AnalysisConfig) -> CancellationResult<AnalysisReport> {
    let mapped =
        ClickMapper::new(config.distance_threshold).map(dataset.clicks(), dataset.targets());

    let mut engine = MetricsEngine::new(dataset, &mapped);
    let metrics = engine.run()?;
    let derived = engine.into_metrics();

    let renderer = HeatmapRenderer::new(dataset.display);
    let heatmaps = HeatmapKind::ALL
        .into_iter()
        .map(|kind| {
            let density = renderer.render_kind(kind, dataset.targets(), &mapped, &metrics);
            RenderedHeatmap::new(kind, density)
        })
        .collect();

    let summary = SummaryRecord::from_report(&metrics, dataset.duration());

    Ok(AnalysisReport {
        dataset: dataset.name.clone(),
        meta: dataset.meta.clone(),
        display: dataset.display,
        task_image: dataset.task_image.clone(),
        duration: dataset.duration(),
        summary,
        metrics,
        derived,
        targets: dataset.targets().as_slice().to_vec(),
        clicks: dataset.clicks().to_vec(),
        mapped,
        heatmaps,
    })
}

/// Run the full pipeline for one dataset directory and hand the result to
/// `sink`.
pub fn run_dataset(
    dir: &Path,
    config: &AnalysisConfig,
    sink: &mut dyn ReportSink,
) -> CancellationResult<RunOutcome> {
    match DatasetLoader::new(config).load(dir)? {
        LoadOutcome::Empty(empty) => {
            let notice = EmptyNotice::from(&empty);
            tracing::warn!("{}", notice.message);
            sink.write_empty(&notice)?;
            Ok(RunOutcome::Empty(notice))
        }
        LoadOutcome::Ready(dataset) => {
            tracing::info!(
                "Analysing '{}': {} clicks, {} targets",
                dataset.name,
                dataset.clicks().len(),
                dataset.targets().len()
            );
            let report = analyse(&dataset, config)?;
            sink.write_report(&report)?;
            Ok(RunOutcome::Analysed(report.summary))
        }
    }
}
