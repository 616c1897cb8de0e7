//! Dataset directory naming.
//!
//! The task tool stores each run in a directory named
//! `<ppname>_<YYYY-MM-DD>_<HH-MM-SS>`. Batch mode recovers the participant
//! name and test date/time from that name.

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// Participant and test timestamp recovered from a directory name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetName {
    pub participant: String,
    /// `YYYY-MM-DD`, empty when the name does not follow the convention.
    pub date: String,
    /// `HH:MM:SS`, empty when the name does not follow the convention.
    pub time: String,
}

impl DatasetName {
    /// Parse a directory name. Names that do not follow the convention are
    /// kept whole as the participant name.
    pub fn parse(dir_name: &str) -> Self {
        Self::try_parse(dir_name).unwrap_or_else(|| {
            tracing::warn!(
                "Dataset directory '{}' does not follow <ppname>_<date>_<time>",
                dir_name
            );
            Self {
                participant: dir_name.to_string(),
                date: String::new(),
                time: String::new(),
            }
        })
    }

    fn try_parse(dir_name: &str) -> Option<Self> {
        let mut parts = dir_name.rsplitn(3, '_');
        let time = parts.next()?;
        let date = parts.next()?;
        let participant = parts.next()?;

        let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
        let time = NaiveTime::parse_from_str(time, "%H-%M-%S").ok()?;

        Some(Self {
            participant: participant.to_string(),
            date: date.format("%Y-%m-%d").to_string(),
            time: time.format("%H:%M:%S").to_string(),
        })
    }

    /// Whether date and time were recovered.
    pub fn has_timestamp(&self) -> bool {
        !self.date.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_conventional_name() {
        let name = DatasetName::parse("jane_doe_2014-03-07_14-05-09");
        assert_eq!(name.participant, "jane_doe");
        assert_eq!(name.date, "2014-03-07");
        assert_eq!(name.time, "14:05:09");
        assert!(name.has_timestamp());
    }

    #[test]
    fn test_parse_unconventional_name_keeps_whole() {
        let name = DatasetName::parse("pilot-run");
        assert_eq!(name.participant, "pilot-run");
        assert!(!name.has_timestamp());
    }

    #[test]
    fn test_parse_rejects_invalid_date() {
        let name = DatasetName::parse("pp_2014-13-40_10-00-00");
        assert_eq!(name.participant, "pp_2014-13-40_10-00-00");
        assert!(name.time.is_empty());
    }
}
