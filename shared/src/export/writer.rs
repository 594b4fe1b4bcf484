//! CSV serialization of aligned tables.
//!
//! Layout:
//!
//! ```text
//! Time,cpu,mem
//! 2016-09-14T08:46:32.837Z,1.5,
//! 2016-09-14T08:46:33.973Z,,42
//! ```
//!
//! The time column is a UTC instant with millisecond precision, values use
//! the shortest decimal form that round-trips, and missing cells are empty.

use crate::models::{Row, Table};
use chrono::DateTime;
use std::io::Write;
use thiserror::Error;

/// Errors that can occur while writing a table.
#[derive(Debug, Error)]
pub enum WriterError {
    /// CSV encoding failed (including rows whose width differs from the header).
    #[error("CSV encoding failed: {0}")]
    Csv(#[from] csv::Error),

    /// The underlying writer failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The output was not valid UTF-8.
    #[error("CSV output is not valid UTF-8")]
    Utf8,
}

/// Formats a nanosecond Unix timestamp as `YYYY-MM-DDTHH:MM:SS.mmmZ`.
///
/// Sub-millisecond digits are truncated.
#[must_use]
pub fn format_timestamp(nanos: i64) -> String {
    DateTime::from_timestamp_nanos(nanos)
        .format("%Y-%m-%dT%H:%M:%S%.3fZ")
        .to_string()
}

/// Formats a sample value; `None` becomes the empty string.
#[must_use]
pub fn format_value(value: Option<f64>) -> String {
    match value {
        None => String::new(),
        Some(v) if v.is_nan() => "NaN".to_string(),
        Some(v) if v == f64::INFINITY => "+Inf".to_string(),
        Some(v) if v == f64::NEG_INFINITY => "-Inf".to_string(),
        // `Display` for f64 is the shortest round-trip form, never exponential.
        Some(v) => v.to_string(),
    }
}

fn format_row(row: &Row) -> Vec<String> {
    std::iter::once(format_timestamp(row.timestamp))
        .chain(row.values.iter().copied().map(format_value))
        .collect()
}

/// Writes `table` as CSV into `writer`.
///
/// # Errors
///
/// Returns an error if a row width does not match the header or the writer
/// fails.
pub fn write_csv<W: Write>(table: &Table, writer: W) -> Result<(), WriterError> {
    let mut csv_writer = csv::Writer::from_writer(writer);

    csv_writer.write_record(&table.header)?;
    for row in &table.rows {
        csv_writer.write_record(format_row(row))?;
    }

    csv_writer.flush()?;
    Ok(())
}

/// Writes `table` as CSV into a new string.
///
/// # Errors
///
/// Returns an error under the same conditions as [`write_csv`].
pub fn to_csv_string(table: &Table) -> Result<String, WriterError> {
    let mut buffer = Vec::new();
    write_csv(table, &mut buffer)?;
    String::from_utf8(buffer).map_err(|_| WriterError::Utf8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp_millisecond_precision() {
        assert_eq!(
            format_timestamp(1_473_842_792_837_738_370),
            "2016-09-14T08:46:32.837Z"
        );
        assert_eq!(format_timestamp(0), "1970-01-01T00:00:00.000Z");
    }

    #[test]
    fn test_format_timestamp_before_epoch() {
        assert_eq!(format_timestamp(-1), "1969-12-31T23:59:59.999Z");
        assert_eq!(format_timestamp(-1_000_000_000), "1969-12-31T23:59:59.000Z");
    }

    #[test]
    fn test_format_value() {
        assert_eq!(format_value(None), "");
        assert_eq!(format_value(Some(1.0)), "1");
        assert_eq!(format_value(Some(1.1)), "1.1");
        assert_eq!(format_value(Some(-0.000_001)), "-0.000001");
        assert_eq!(format_value(Some(1e21)), "1000000000000000000000");
        assert_eq!(format_value(Some(f64::NAN)), "NaN");
        assert_eq!(format_value(Some(f64::INFINITY)), "+Inf");
        assert_eq!(format_value(Some(f64::NEG_INFINITY)), "-Inf");
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_format_value_round_trips() {
        for v in [0.1, 1.0 / 3.0, 123_456.789, f64::MIN_POSITIVE, f64::MAX] {
            let parsed: f64 = format_value(Some(v)).parse().unwrap();
            assert_eq!(parsed, v);
        }
    }

    #[test]
    fn test_write_csv() {
        let table = Table::new(
            ["cpu", "mem"],
            vec![
                Row::new(1_473_842_792_837_738_370, vec![Some(1.5), None]),
                Row::new(1_473_842_793_973_036_635, vec![None, Some(42.0)]),
            ],
        );

        let csv = to_csv_string(&table).unwrap();

        assert_eq!(
            csv,
            "Time,cpu,mem\n\
             2016-09-14T08:46:32.837Z,1.5,\n\
             2016-09-14T08:46:33.973Z,,42\n"
        );
    }

    #[test]
    fn test_write_header_only() {
        let table = Table::new(Vec::<String>::new(), Vec::new());
        assert_eq!(to_csv_string(&table).unwrap(), "Time\n");
    }

    #[test]
    fn test_labels_are_quoted_when_needed() {
        let table = Table::new(["load, 1m", "say \"hi\""], Vec::new());
        assert_eq!(
            to_csv_string(&table).unwrap(),
            "Time,\"load, 1m\",\"say \"\"hi\"\"\"\n"
        );
    }

    #[test]
    fn test_row_width_mismatch_is_an_error() {
        let table = Table::new(["a", "b"], vec![Row::new(0, vec![Some(1.0)])]);
        assert!(matches!(to_csv_string(&table), Err(WriterError::Csv(_))));
    }
}
