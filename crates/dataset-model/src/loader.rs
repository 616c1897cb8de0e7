//! Dataset loader: turns a dataset directory into a [`Dataset`].
//!
//! Directory layout written by the task tool:
//!
//! ```text
//! <dataset>/
//!   raw.txt       click log (ppname, taskname, testdate, testtime,
//!                 input, cancellations, time, x, y)
//!   task.png      marked task image (display resolution)
//!   targets.txt   optional; otherwise <tasks_dir>/<taskname>/targets.txt
//! ```

use std::path::{Path, PathBuf};

use cancellation_common::config::{AnalysisConfig, DisplaySize};
use cancellation_common::error::{CancellationError, CancellationResult};

use crate::click::{CancellationVisibility, InputModality, RawClick};
use crate::dataset::{Dataset, DatasetMeta, EmptyDataset, LoadOutcome};
use crate::delimited::{read_records, ClickRow, Record};
use crate::target::TargetSet;

pub const RAW_LOG_FILE: &str = "raw.txt";
pub const TARGETS_FILE: &str = "targets.txt";
pub const TASK_IMAGE_FILE: &str = "task.png";

/// Loads dataset directories according to an [`AnalysisConfig`].
#[derive(Debug, Clone, Copy)]
pub struct DatasetLoader<'a> {
    config: &'a AnalysisConfig,
}

impl<'a> DatasetLoader<'a> {
    pub fn new(config: &'a AnalysisConfig) -> Self {
        Self { config }
    }

    /// Load a dataset directory.
    ///
    /// A click log without data rows yields [`LoadOutcome::Empty`]; nothing
    /// else (targets, display size) is resolved in that case.
    pub fn load(&self, dir: impl AsRef<Path>) -> CancellationResult<LoadOutcome> {
        let dir = dir.as_ref();
        let name = dir_name(dir);
        let raw_path = dir.join(RAW_LOG_FILE);

        let raw = read_records::<ClickRow>(&raw_path)?;
        if raw.is_empty() {
            tracing::info!("Dataset '{}' contains no clicks", name);
            return Ok(LoadOutcome::Empty(EmptyDataset {
                name,
                raw_log: raw_path,
            }));
        }

        let (meta, clicks) = parse_click_log(&raw);
        tracing::debug!("Read {} clicks from {}", clicks.len(), raw_path.display());

        let targets_path = self.targets_path(dir, &meta.task)?;
        let targets = TargetSet::load(&targets_path)?;
        tracing::debug!(
            "Read {} targets from {}",
            targets.len(),
            targets_path.display()
        );

        let task_image = self.task_image_path(dir, &meta.task);
        let display = self.display_size(dir, task_image.as_deref())?;

        Ok(LoadOutcome::Ready(
            Dataset::new(name, meta, clicks, targets, display)
                .with_source(dir)
                .with_task_image(task_image),
        ))
    }

    fn targets_path(&self, dir: &Path, task: &str) -> CancellationResult<PathBuf> {
        let local = dir.join(TARGETS_FILE);
        if local.exists() {
            return Ok(local);
        }
        match &self.config.tasks_dir {
            Some(tasks_dir) => Ok(tasks_dir.join(task).join(TARGETS_FILE)),
            None => Err(CancellationError::FileNotFound { path: local }),
        }
    }

    /// The dataset's own task image, else the task's in `tasks_dir`.
    fn task_image_path(&self, dir: &Path, task: &str) -> Option<PathBuf> {
        let mut candidates = vec![dir.join(TASK_IMAGE_FILE)];
        if let Some(tasks_dir) = &self.config.tasks_dir {
            candidates.push(tasks_dir.join(task).join(TASK_IMAGE_FILE));
        }
        candidates.into_iter().find(|p| p.exists())
    }

    fn display_size(
        &self,
        dir: &Path,
        task_image: Option<&Path>,
    ) -> CancellationResult<DisplaySize> {
        if let Some(display) = self.config.display {
            return Ok(display);
        }

        if let Some(image_path) = task_image {
            let (width, height) = image::image_dimensions(image_path)?;
            return Ok(DisplaySize::new(width, height));
        }

        Err(CancellationError::config(format!(
            "display size unknown for '{}': no task image found and none configured",
            dir.display()
        )))
    }
}

/// Split click-log rows into metadata (first row) and clicks.
pub fn parse_click_log(rows: &[Record<ClickRow>]) -> (DatasetMeta, Vec<RawClick>) {
    let Some(first) = rows.first() else {
        return (DatasetMeta::default(), Vec::new());
    };

    let first = &first.value;
    let meta = DatasetMeta {
        participant: first.ppname.clone(),
        task: first.taskname.clone(),
        test_date: first.testdate.clone(),
        test_time: first.testtime.clone(),
        input: InputModality::parse(&first.input),
        visibility: CancellationVisibility::parse(&first.cancellations),
    };

    let clicks = rows
        .iter()
        .map(|row| RawClick::new(row.value.time, row.value.x, row.value.y))
        .collect();

    (meta, clicks)
}

fn dir_name(dir: &Path) -> String {
    dir.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| dir.display().to_string())
}
