//! The in-memory representation of one task run.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use cancellation_common::clock::TaskDuration;
use cancellation_common::config::DisplaySize;

use crate::click::{CancellationVisibility, InputModality, RawClick};
use crate::target::TargetSet;

/// Participant and task metadata, taken from the first click-log row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetMeta {
    pub participant: String,
    pub task: String,
    pub test_date: String,
    pub test_time: String,
    pub input: InputModality,
    pub visibility: CancellationVisibility,
}

impl Default for DatasetMeta {
    fn default() -> Self {
        Self {
            participant: String::new(),
            task: String::new(),
            test_date: String::new(),
            test_time: String::new(),
            input: InputModality::Mouse,
            visibility: CancellationVisibility::Visible,
        }
    }
}

/// A loaded, non-empty task run. Read-only after construction.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Directory name the run was loaded from.
    pub name: String,
    pub meta: DatasetMeta,
    /// Display resolution the task was shown at.
    pub display: DisplaySize,
    /// Source directory, if loaded from disk.
    pub source: Option<PathBuf>,
    /// Task image the run was shown on, if one was found.
    pub task_image: Option<PathBuf>,
    clicks: Vec<RawClick>,
    targets: TargetSet,
    duration: TaskDuration,
}

impl Dataset {
    /// Assemble a dataset. Clicks must already be in capture order; the
    /// duration is the timestamp of the last click.
    pub fn new(
        name: impl Into<String>,
        meta: DatasetMeta,
        clicks: Vec<RawClick>,
        targets: TargetSet,
        display: DisplaySize,
    ) -> Self {
        let duration = clicks
            .last()
            .map(|c| TaskDuration::from_last_timestamp(c.time_ms))
            .unwrap_or_default();
        Self {
            name: name.into(),
            meta,
            display,
            source: None,
            task_image: None,
            clicks,
            targets,
            duration,
        }
    }

    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    pub fn with_task_image(mut self, image: Option<PathBuf>) -> Self {
        self.task_image = image;
        self
    }

    pub fn clicks(&self) -> &[RawClick] {
        &self.clicks
    }

    pub fn targets(&self) -> &TargetSet {
        &self.targets
    }

    pub fn duration(&self) -> TaskDuration {
        self.duration
    }
}

/// A run whose click log holds a header but no data rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmptyDataset {
    /// Directory name the run was loaded from.
    pub name: String,
    pub raw_log: PathBuf,
}

impl EmptyDataset {
    /// Notice shown in place of a report.
    pub fn notice(&self) -> String {
        format!("File '{}' contains no data.", self.name)
    }
}

/// Result of loading a dataset directory.
#[derive(Debug, Clone)]
pub enum LoadOutcome {
    Ready(Dataset),
    Empty(EmptyDataset),
}

impl LoadOutcome {
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty(_))
    }

    pub fn into_dataset(self) -> Option<Dataset> {
        match self {
            Self::Ready(dataset) => Some(dataset),
            Self::Empty(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::target::TargetPosition;

    #[test]
    fn test_duration_is_last_click_time() {
        let dataset = Dataset::new(
            "pp",
            DatasetMeta::default(),
            vec![RawClick::new(1_000, 1, 1), RawClick::new(61_500, 2, 2)],
            TargetSet::new([TargetPosition::new(1, 1)]),
            DisplaySize::new(800, 600),
        );
        assert_eq!(dataset.duration().total_ms(), 61_500);
        assert_eq!(dataset.duration().hms_string(), "00:01:02");
    }

    #[test]
    fn test_empty_notice_names_dataset() {
        let empty = EmptyDataset {
            name: "pp_2014-01-01_10-00-00".to_string(),
            raw_log: PathBuf::from("raw.txt"),
        };
        assert_eq!(
            empty.notice(),
            "File 'pp_2014-01-01_10-00-00' contains no data."
        );
    }
}
