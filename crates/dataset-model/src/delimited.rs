//! Reader for the tab-delimited text files written by the task.
//!
//! Files are read with `csv` configured for tabs and deserialized row by
//! row into serde records. Fields are matched by header name, so column
//! order may vary between files. Blank lines, carriage returns and quoted
//! fields are handled by the reader.

use std::io::Read;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Deserialize;

use cancellation_common::error::{CancellationError, CancellationResult};

/// A row type read from a tab-delimited file.
pub trait DelimitedRecord: DeserializeOwned {
    /// Header names the file must provide.
    const COLUMNS: &'static [&'static str];
}

/// One deserialized row with its 1-based line number in the source file.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<T> {
    pub line: usize,
    pub value: T,
}

/// One row of a click log. Only the first row's metadata is used.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ClickRow {
    pub ppname: String,
    pub taskname: String,
    pub testdate: String,
    pub testtime: String,
    pub input: String,
    pub cancellations: String,
    pub time: i64,
    pub x: i64,
    pub y: i64,
}

impl DelimitedRecord for ClickRow {
    const COLUMNS: &'static [&'static str] = &[
        "ppname",
        "taskname",
        "testdate",
        "testtime",
        "input",
        "cancellations",
        "time",
        "x",
        "y",
    ];
}

/// One row of a target file. The `target` label column is ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct TargetRow {
    pub x: i64,
    pub y: i64,
}

impl DelimitedRecord for TargetRow {
    const COLUMNS: &'static [&'static str] = &["x", "y"];
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .delimiter(b'\t')
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All);
    builder
}

/// Read every row of a file.
pub fn read_records<T: DelimitedRecord>(
    path: impl AsRef<Path>,
) -> CancellationResult<Vec<Record<T>>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(CancellationError::FileNotFound {
            path: path.to_path_buf(),
        });
    }
    let reader = reader_builder()
        .from_path(path)
        .map_err(|e| csv_error(path, e, 0))?;
    collect_records(path, reader)
}

/// Read rows from already-loaded content. `path` is only used in errors.
pub fn parse_records<T: DelimitedRecord>(
    path: impl AsRef<Path>,
    content: &str,
) -> CancellationResult<Vec<Record<T>>> {
    let reader = reader_builder().from_reader(content.as_bytes());
    collect_records(path.as_ref(), reader)
}

fn collect_records<T: DelimitedRecord, R: Read>(
    path: &Path,
    mut reader: csv::Reader<R>,
) -> CancellationResult<Vec<Record<T>>> {
    let headers = reader
        .headers()
        .map_err(|e| csv_error(path, e, 1))?
        .clone();
    if let Some(column) = T::COLUMNS
        .iter()
        .find(|column| !headers.iter().any(|h| h == **column))
    {
        return Err(CancellationError::missing_column(path, *column));
    }

    let mut records = Vec::new();
    for result in reader.records() {
        let row = result.map_err(|e| csv_error(path, e, 0))?;
        let line = row
            .position()
            .and_then(|pos| usize::try_from(pos.line()).ok())
            .unwrap_or(0);
        let value = row
            .deserialize::<T>(Some(&headers))
            .map_err(|e| csv_error(path, e, line))?;
        records.push(Record { line, value });
    }
    Ok(records)
}

/// Map a `csv` failure to a crate error. `line` is used when the error
/// carries no position of its own.
fn csv_error(path: &Path, err: csv::Error, line: usize) -> CancellationError {
    let line = err
        .position()
        .and_then(|pos| usize::try_from(pos.line()).ok())
        .unwrap_or(line);
    let message = match err.kind() {
        csv::ErrorKind::Deserialize { err, .. } => err.to_string(),
        _ => err.to_string(),
    };
    match err.into_kind() {
        csv::ErrorKind::Io(io) => CancellationError::Io(io),
        _ => CancellationError::parse(path, line, message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_columns_are_addressed_by_name() {
        let rows: Vec<Record<TargetRow>> = parse_records("t.txt", "y\tx\n5\t7\n").unwrap();
        assert_eq!(rows[0].value, TargetRow { x: 7, y: 5 });
    }

    #[test]
    fn test_quotes_and_carriage_returns_are_handled() {
        let content = "\"target\"\t\"x\"\t\"y\"\r\n\"u\"\t\"12\"\t\"34\"\r\n";
        let rows: Vec<Record<TargetRow>> = parse_records("t.txt", content).unwrap();
        assert_eq!(rows[0].value, TargetRow { x: 12, y: 34 });
    }

    #[test]
    fn test_header_only_file_has_no_rows() {
        let rows: Vec<Record<TargetRow>> = parse_records("t.txt", "x\ty\n\n").unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_missing_column_is_reported() {
        let err = parse_records::<TargetRow>("t.txt", "x\n1\n").unwrap_err();
        match err {
            CancellationError::MissingColumn { column, .. } => assert_eq!(column, "y"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_malformed_integer_reports_line_number() {
        let err = parse_records::<TargetRow>("t.txt", "x\ty\n1\t1\nabc\t2\n").unwrap_err();
        match err {
            CancellationError::Parse { line, .. } => assert_eq!(line, 3),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_short_row_is_a_parse_error() {
        let err = parse_records::<TargetRow>("t.txt", "x\ty\n1\n").unwrap_err();
        assert!(matches!(err, CancellationError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_record_lines_follow_the_file() {
        let rows: Vec<Record<TargetRow>> =
            parse_records("t.txt", "x\ty\n1\t1\n2\t2\n3\t3\n").unwrap();
        let lines: Vec<usize> = rows.iter().map(|r| r.line).collect();
        assert_eq!(lines, vec![2, 3, 4]);
    }

    #[test]
    fn test_missing_file_is_not_found() {
        let err = read_records::<TargetRow>("/nonexistent/targets.txt").unwrap_err();
        assert!(matches!(err, CancellationError::FileNotFound { .. }));
    }
}
