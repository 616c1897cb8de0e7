//! Report sinks: where assembled reports go.

use std::path::{Path, PathBuf};

use serde::Serialize;

use cancellation_analysis_core::heatmap::{DensityGrid, HeatmapKind, SparseDensityGrid};
use cancellation_analysis_core::mapping::MappedClick;
use cancellation_analysis_core::metrics::{DerivedMetrics, MetricsReport};
use cancellation_common::clock::TaskDuration;
use cancellation_common::config::DisplaySize;
use cancellation_common::error::CancellationResult;
use cancellation_dataset_model::click::RawClick;
use cancellation_dataset_model::dataset::{DatasetMeta, EmptyDataset};
use cancellation_dataset_model::target::TargetPosition;

use crate::render;
use crate::summary::SummaryRecord;

pub const SUMMARY_FILE: &str = "summary.txt";
pub const EMPTY_FILE: &str = "empty.txt";
pub const METRICS_FILE: &str = "metrics.json";

/// Stands in for a report when a dataset has no clicks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmptyNotice {
    pub dataset: String,
    pub message: String,
}

impl From<&EmptyDataset> for EmptyNotice {
    fn from(empty: &EmptyDataset) -> Self {
        Self {
            dataset: empty.name.clone(),
            message: empty.notice(),
        }
    }
}

/// Density grids of one heatmap kind.
#[derive(Debug, Clone)]
pub struct RenderedHeatmap {
    pub kind: HeatmapKind,
    pub density: DensityGrid,
    pub overlay: SparseDensityGrid,
}

impl RenderedHeatmap {
    pub fn new(kind: HeatmapKind, density: DensityGrid) -> Self {
        let overlay = density.sparsify();
        Self {
            kind,
            density,
            overlay,
        }
    }

    pub fn file_name(&self) -> String {
        format!("{}_heatmap.png", self.kind)
    }

    pub fn overlay_file_name(&self) -> String {
        format!("{}_heatmap_transparent.png", self.kind)
    }

    pub fn superimposed_file_name(&self) -> String {
        format!("{}_heatmap_superimposed.png", self.kind)
    }
}

/// Everything produced for one analysed dataset.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisReport {
    pub dataset: String,
    pub meta: DatasetMeta,
    pub display: DisplaySize,
    /// Background for the superimposed heatmaps.
    pub task_image: Option<PathBuf>,
    pub duration: TaskDuration,
    pub summary: SummaryRecord,
    pub metrics: MetricsReport,
    pub derived: DerivedMetrics,
    pub targets: Vec<TargetPosition>,
    pub clicks: Vec<RawClick>,
    pub mapped: Vec<MappedClick>,
    #[serde(skip)]
    pub heatmaps: Vec<RenderedHeatmap>,
}

impl AnalysisReport {
    pub fn heatmap(&self, kind: HeatmapKind) -> Option<&RenderedHeatmap> {
        self.heatmaps.iter().find(|h| h.kind == kind)
    }
}

/// Receives the outputs of single-dataset runs.
pub trait ReportSink {
    fn write_empty(&mut self, notice: &EmptyNotice) -> CancellationResult<()>;

    fn write_report(&mut self, report: &AnalysisReport) -> CancellationResult<()>;
}

/// Writes one directory per dataset below a root directory.
#[derive(Debug, Clone)]
pub struct FileReportSink {
    root: PathBuf,
    render_images: bool,
}

impl FileReportSink {
    pub fn new(root: impl Into<PathBuf>, render_images: bool) -> Self {
        Self {
            root: root.into(),
            render_images,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Output directory of a dataset.
    pub fn dataset_dir(&self, dataset: &str) -> PathBuf {
        self.root.join(dataset)
    }

    fn prepare_dir(&self, dataset: &str) -> CancellationResult<PathBuf> {
        let dir = self.dataset_dir(dataset);
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

impl ReportSink for FileReportSink {
    fn write_empty(&mut self, notice: &EmptyNotice) -> CancellationResult<()> {
        let dir = self.prepare_dir(&notice.dataset)?;
        std::fs::write(dir.join(EMPTY_FILE), format!("{}\n", notice.message))?;
        Ok(())
    }

    fn write_report(&mut self, report: &AnalysisReport) -> CancellationResult<()> {
        let dir = self.prepare_dir(&report.dataset)?;

        report.summary.save(&dir.join(SUMMARY_FILE))?;

        let json = serde_json::to_string_pretty(report)?;
        std::fs::write(dir.join(METRICS_FILE), json)?;

        if self.render_images {
            for heatmap in &report.heatmaps {
                render::save_density_png(&heatmap.density, &dir.join(heatmap.file_name()))?;
                let overlay_path = dir.join(heatmap.overlay_file_name());
                render::save_overlay_png(&heatmap.overlay, &overlay_path)?;
                if let Some(task_image) = &report.task_image {
                    render::save_superimposed_png(
                        task_image,
                        &heatmap.overlay,
                        &dir.join(heatmap.superimposed_file_name()),
                    )?;
                }
            }
        }

        tracing::info!("Report for '{}' written to {}", report.dataset, dir.display());
        Ok(())
    }
}

/// Keeps reports in memory.
#[derive(Debug, Default)]
pub struct MemoryReportSink {
    pub reports: Vec<AnalysisReport>,
    pub empty: Vec<EmptyNotice>,
}

impl MemoryReportSink {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReportSink for MemoryReportSink {
    fn write_empty(&mut self, notice: &EmptyNotice) -> CancellationResult<()> {
        self.empty.push(notice.clone());
        Ok(())
    }

    fn write_report(&mut self, report: &AnalysisReport) -> CancellationResult<()> {
        self.reports.push(report.clone());
        Ok(())
    }
}
