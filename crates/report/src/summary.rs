//! One-line summary records and the combined batch table.

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use cancellation_analysis_core::metrics::MetricsReport;
use cancellation_common::clock::TaskDuration;
use cancellation_common::error::{CancellationError, CancellationResult};
use cancellation_dataset_model::name::DatasetName;

/// Column names of a summary record, in output order.
pub const SUMMARY_COLUMNS: [&str; 21] = [
    "om_tot",
    "om_left",
    "om_right",
    "pers_tot",
    "pers_imm",
    "pers_del",
    "CoC_hor",
    "CoC_ver",
    "duration",
    "mean_intertime",
    "Qscore",
    "mean_interdist",
    "stand_interdist",
    "speed",
    "mean_angle",
    "stand_angle",
    "bestR",
    "hor_R",
    "ver_R",
    "intersect_tot",
    "intersect_rate",
];

/// Columns that prefix every row of the batch table.
pub const BATCH_PREFIX_COLUMNS: [&str; 3] = ["ppname", "date", "time"];

/// Written in place of an undefined measure.
pub const MISSING_VALUE: &str = "NA";

/// Field delimiter of summary and batch files.
pub const DELIMITER: u8 = b'\t';

fn delimited_writer<W: Write>(out: W) -> csv::Writer<W> {
    csv::WriterBuilder::new()
        .delimiter(DELIMITER)
        .has_headers(false)
        .from_writer(out)
}

/// Flush a writer and hand back its output buffer.
fn finish<W: Write>(writer: csv::Writer<W>) -> CancellationResult<W> {
    writer
        .into_inner()
        .map_err(|e| CancellationError::Io(e.into_error()))
}

fn into_text(bytes: Vec<u8>) -> CancellationResult<String> {
    String::from_utf8(bytes).map_err(|e| CancellationError::processing(e.to_string()))
}

/// Fixed-order summary of one analysed dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub omissions_total: usize,
    pub omissions_left: usize,
    pub omissions_right: usize,
    pub perseverations_total: usize,
    pub perseverations_immediate: usize,
    pub perseverations_delayed: usize,
    pub centre_x: Option<f64>,
    pub centre_y: Option<f64>,
    /// Whole seconds.
    pub duration_secs: u64,
    /// Seconds.
    pub mean_inter_time_secs: Option<f64>,
    pub q_score: Option<f64>,
    pub mean_inter_distance: Option<f64>,
    pub standardized_inter_distance: Option<f64>,
    pub search_speed: Option<f64>,
    pub mean_angle: Option<f64>,
    pub standardized_angle: Option<f64>,
    pub best_r: Option<f64>,
    pub horizontal_r: Option<f64>,
    pub vertical_r: Option<f64>,
    pub intersections_total: usize,
    pub intersection_rate: Option<f64>,
}

impl SummaryRecord {
    pub fn from_report(report: &MetricsReport, duration: TaskDuration) -> Self {
        Self {
            omissions_total: report.omissions.total,
            omissions_left: report.omissions.left,
            omissions_right: report.omissions.right,
            perseverations_total: report.perseverations.total,
            perseverations_immediate: report.perseverations.immediate,
            perseverations_delayed: report.perseverations.delayed,
            centre_x: report.centre.x,
            centre_y: report.centre.y,
            duration_secs: duration.whole_seconds(),
            mean_inter_time_secs: report.mean_inter_time_ms.map(|ms| ms / 1000.0),
            q_score: report.q_score,
            mean_inter_distance: report.mean_inter_distance,
            standardized_inter_distance: report.standardized_inter_distance,
            search_speed: report.search_speed,
            mean_angle: report.mean_angle,
            standardized_angle: report.standardized_angle,
            best_r: report.best_r.best,
            horizontal_r: report.best_r.x,
            vertical_r: report.best_r.y,
            intersections_total: report.intersections.len(),
            intersection_rate: report.intersection_rate,
        }
    }

    /// Field values in column order.
    pub fn fields(&self) -> Vec<String> {
        vec![
            self.omissions_total.to_string(),
            self.omissions_left.to_string(),
            self.omissions_right.to_string(),
            self.perseverations_total.to_string(),
            self.perseverations_immediate.to_string(),
            self.perseverations_delayed.to_string(),
            format_value(self.centre_x),
            format_value(self.centre_y),
            self.duration_secs.to_string(),
            format_value(self.mean_inter_time_secs),
            format_value(self.q_score),
            format_value(self.mean_inter_distance),
            format_value(self.standardized_inter_distance),
            format_value(self.search_speed),
            format_value(self.mean_angle),
            format_value(self.standardized_angle),
            format_value(self.best_r),
            format_value(self.horizontal_r),
            format_value(self.vertical_r),
            self.intersections_total.to_string(),
            format_value(self.intersection_rate),
        ]
    }

    /// Write the header row and the value row.
    pub fn write_to<W: Write>(&self, out: W) -> CancellationResult<W> {
        let mut writer = delimited_writer(out);
        writer.write_record(SUMMARY_COLUMNS)?;
        writer.write_record(self.fields())?;
        finish(writer)
    }

    /// Contents of a `summary.txt` file.
    pub fn to_file_contents(&self) -> CancellationResult<String> {
        into_text(self.write_to(Vec::new())?)
    }

    pub fn save(&self, path: &Path) -> CancellationResult<()> {
        let file = std::fs::File::create(path)?;
        self.write_to(file)?;
        Ok(())
    }
}

/// Render an optional measure, `NA` when undefined.
pub fn format_value(value: Option<f64>) -> String {
    match value {
        Some(v) if v.is_finite() => v.to_string(),
        _ => MISSING_VALUE.to_string(),
    }
}

/// One batch row: the directory-name prefix and the dataset's summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRow {
    pub name: DatasetName,
    pub summary: SummaryRecord,
}

impl BatchRow {
    /// Name prefix followed by the summary fields.
    pub fn fields(&self) -> Vec<String> {
        let mut fields = vec![
            self.name.participant.clone(),
            self.name.date.clone(),
            self.name.time.clone(),
        ];
        fields.extend(self.summary.fields());
        fields
    }
}

/// Summaries of every analysed dataset in a batch, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchTable {
    pub rows: Vec<BatchRow>,
}

impl BatchTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, name: DatasetName, summary: SummaryRecord) {
        self.rows.push(BatchRow { name, summary });
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Column names, name prefix first.
    pub fn header() -> Vec<&'static str> {
        BATCH_PREFIX_COLUMNS
            .iter()
            .chain(SUMMARY_COLUMNS.iter())
            .copied()
            .collect()
    }

    /// Write the header and one row per dataset.
    pub fn write_to<W: Write>(&self, out: W) -> CancellationResult<W> {
        let mut writer = delimited_writer(out);
        writer.write_record(Self::header())?;
        for row in &self.rows {
            writer.write_record(row.fields())?;
        }
        finish(writer)
    }

    pub fn render(&self) -> CancellationResult<String> {
        into_text(self.write_to(Vec::new())?)
    }

    pub fn write(&self, path: &Path) -> CancellationResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let file = std::fs::File::create(path)?;
        self.write_to(file)?;
        tracing::info!("Wrote batch table with {} rows to {}", self.len(), path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> SummaryRecord {
        SummaryRecord {
            omissions_total: 3,
            omissions_left: 2,
            omissions_right: 1,
            perseverations_total: 1,
            perseverations_immediate: 1,
            perseverations_delayed: 0,
            centre_x: Some(-0.25),
            centre_y: None,
            duration_secs: 61,
            mean_inter_time_secs: Some(1.5),
            q_score: Some(0.4),
            mean_inter_distance: Some(120.0),
            standardized_inter_distance: Some(1.2),
            search_speed: Some(0.08),
            mean_angle: Some(30.0),
            standardized_angle: Some(0.5),
            best_r: Some(0.9),
            horizontal_r: Some(0.9),
            vertical_r: Some(-0.1),
            intersections_total: 0,
            intersection_rate: Some(0.0),
        }
    }

    #[test]
    fn test_header_matches_field_count() {
        let text = record().to_file_contents().unwrap();
        let mut lines = text.lines();
        let header = lines.next().unwrap();
        assert_eq!(header.split('\t').count(), 21);
        assert!(header.starts_with("om_tot\tom_left\tom_right\tpers_tot"));
        assert_eq!(lines.next().unwrap().split('\t').count(), 21);
        assert!(lines.next().is_none());
        assert_eq!(record().fields().len(), SUMMARY_COLUMNS.len());
    }

    #[test]
    fn test_undefined_values_render_as_na() {
        let text = record().to_file_contents().unwrap();
        let line = text.lines().nth(1).unwrap();
        let fields: Vec<&str> = line.split('\t').collect();
        assert_eq!(fields[6], "-0.25");
        assert_eq!(fields[7], "NA");
        assert_eq!(fields[8], "61");
        assert_eq!(fields[9], "1.5");
        assert_eq!(format_value(Some(f64::NAN)), "NA");
    }

    #[test]
    fn test_mean_and_standardized_angle_are_distinct_columns() {
        let fields = record().fields();
        assert_eq!(fields[14], "30");
        assert_eq!(fields[15], "0.5");
    }

    #[test]
    fn test_batch_table_prefixes_name_parts() {
        let mut table = BatchTable::new();
        table.push(DatasetName::parse("pp01_2014-01-31_12-30-05"), record());
        let rendered = table.render().unwrap();
        let mut lines = rendered.lines();
        assert!(lines.next().unwrap().starts_with("ppname\tdate\ttime\tom_tot"));
        assert!(lines
            .next()
            .unwrap()
            .starts_with("pp01\t2014-01-31\t12:30:05\t3\t2\t1"));
        assert!(lines.next().is_none());
    }

    #[test]
    fn test_summary_file_parses_back_by_header() {
        let text = record().to_file_contents().unwrap();
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(DELIMITER)
            .from_reader(text.as_bytes());
        let headers = reader.headers().unwrap().clone();
        let row = reader.records().next().unwrap().unwrap();
        let column = |name: &str| headers.iter().position(|h| h == name).unwrap();
        assert_eq!(&row[column("Qscore")], "0.4");
        assert_eq!(&row[column("CoC_ver")], "NA");
    }
}
