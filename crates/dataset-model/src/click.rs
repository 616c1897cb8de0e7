//! Raw click records and task-run metadata enums.

use serde::{Deserialize, Serialize};

/// Milliseconds since the task display appeared.
pub type TimestampMs = i64;

/// A single recorded click.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawClick {
    /// Capture time.
    #[serde(rename = "time")]
    pub time_ms: TimestampMs,
    /// Click position in display pixels.
    pub x: i64,
    pub y: i64,
}

impl RawClick {
    pub fn new(time_ms: TimestampMs, x: i64, y: i64) -> Self {
        Self { time_ms, x, y }
    }

    /// Timestamp as fractional seconds.
    pub fn time_secs(&self) -> f64 {
        self.time_ms as f64 / 1_000.0
    }
}

/// How the participant responded.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputModality {
    Mouse,
    Touch,
    /// Any value the task tool did not write itself.
    Other(String),
}

/// Whether cancellation marks were drawn on screen during the task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationVisibility {
    Visible,
    Invisible,
    Other(String),
}

impl InputModality {
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "mouse" => Self::Mouse,
            "touch" => Self::Touch,
            _ => Self::Other(value.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Mouse => "mouse",
            Self::Touch => "touch",
            Self::Other(s) => s,
        }
    }
}

impl CancellationVisibility {
    pub fn parse(value: &str) -> Self {
        match value.to_ascii_lowercase().as_str() {
            "visible" => Self::Visible,
            "invisible" => Self::Invisible,
            _ => Self::Other(value.to_string()),
        }
    }

    pub fn is_visible(&self) -> bool {
        matches!(self, Self::Visible)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Visible => "visible",
            Self::Invisible => "invisible",
            Self::Other(s) => s,
        }
    }
}
