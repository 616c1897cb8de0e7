//! Task timing utilities.
//!
//! Click timestamps are milliseconds since the task display appeared. The
//! total task duration is the timestamp of the last click. This module
//! converts that total into the forms used by the metrics and reports:
//! - whole seconds (Q score, summary table)
//! - a zero-padded `HH:MM:SS` string (human-readable report)

use serde::{Deserialize, Serialize};

const MS_PER_HOUR: u64 = 3_600_000;
const MS_PER_MINUTE: u64 = 60_000;
const MS_PER_SECOND: u64 = 1_000;

/// Total duration of one task run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct TaskDuration {
    total_ms: u64,
}

impl TaskDuration {
    /// Create a duration from a millisecond total.
    pub fn from_ms(total_ms: u64) -> Self {
        Self { total_ms }
    }

    /// Duration from the last click timestamp; negative stamps clamp to zero.
    pub fn from_last_timestamp(last_ms: i64) -> Self {
        Self::from_ms(last_ms.max(0) as u64)
    }

    /// Total milliseconds.
    pub fn total_ms(&self) -> u64 {
        self.total_ms
    }

    /// Whole seconds, rounded down.
    pub fn whole_seconds(&self) -> u64 {
        self.total_ms / MS_PER_SECOND
    }

    /// Hours, minutes and seconds: hours and minutes are floored, the
    /// remaining seconds are rounded up.
    pub fn hms(&self) -> (u64, u64, u64) {
        let hours = self.total_ms / MS_PER_HOUR;
        let rest = self.total_ms - hours * MS_PER_HOUR;
        let minutes = rest / MS_PER_MINUTE;
        let rest = rest - minutes * MS_PER_MINUTE;
        let seconds = rest.div_ceil(MS_PER_SECOND);
        (hours, minutes, seconds)
    }

    /// Zero-padded `HH:MM:SS`.
    pub fn hms_string(&self) -> String {
        let (h, m, s) = self.hms();
        format!("{h:02}:{m:02}:{s:02}")
    }
}

impl std::fmt::Display for TaskDuration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.hms_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hms_rounds_seconds_up() {
        let duration = TaskDuration::from_ms(3_723_400);
        assert_eq!(duration.hms(), (1, 2, 4));
        assert_eq!(duration.hms_string(), "01:02:04");
    }

    #[test]
    fn test_exact_seconds_are_not_rounded() {
        assert_eq!(TaskDuration::from_ms(65_000).hms_string(), "00:01:05");
        assert_eq!(TaskDuration::from_ms(0).hms_string(), "00:00:00");
    }

    #[test]
    fn test_second_conversions() {
        let duration = TaskDuration::from_ms(12_750);
        assert_eq!(duration.whole_seconds(), 12);
    }

    #[test]
    fn test_negative_timestamp_clamps() {
        assert_eq!(TaskDuration::from_last_timestamp(-20).total_ms(), 0);
    }
}
