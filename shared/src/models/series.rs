//! Point and series data model.
//!
//! A [`Series`] is the unit handed from a fetcher to the aligner: an ordered
//! run of [`Point`]s with strictly increasing timestamps.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A single observation from a time series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    /// Nanoseconds since the Unix epoch.
    pub timestamp: i64,
    /// The sampled value.
    pub value: f64,
}

impl Point {
    /// Creates a new point.
    #[must_use]
    pub const fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

impl From<(i64, f64)> for Point {
    fn from((timestamp, value): (i64, f64)) -> Self {
        Self::new(timestamp, value)
    }
}

/// Errors raised when building a series from points that break ordering.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SeriesError {
    /// A point has a timestamp lower than its predecessor.
    #[error("Point {index} has timestamp {timestamp} which is before the previous timestamp {previous}")]
    NotSorted {
        /// Index of the offending point.
        index: usize,
        /// Timestamp of the offending point.
        timestamp: i64,
        /// Timestamp of the point before it.
        previous: i64,
    },

    /// A point repeats the timestamp of its predecessor.
    #[error("Point {index} repeats timestamp {timestamp}")]
    DuplicateTimestamp {
        /// Index of the offending point.
        index: usize,
        /// The repeated timestamp.
        timestamp: i64,
    },
}

/// An ordered sequence of points with strictly increasing timestamps.
///
/// The ordering invariant is checked once, on construction, so everything
/// downstream (the aligner in particular) can rely on it.
///
/// # Example
///
/// ```
/// use shared::models::{Point, Series};
///
/// let series = Series::new(vec![Point::new(10, 1.0), Point::new(20, 1.1)]).unwrap();
/// assert_eq!(series.len(), 2);
///
/// assert!(Series::new(vec![Point::new(20, 1.0), Point::new(10, 1.1)]).is_err());
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Series {
    points: Vec<Point>,
}

impl Series {
    /// Builds a series, rejecting unsorted or duplicate timestamps.
    ///
    /// # Errors
    ///
    /// Returns the first ordering violation found, scanning from the start.
    pub fn new(points: Vec<Point>) -> Result<Self, SeriesError> {
        for (index, pair) in points.windows(2).enumerate() {
            let (previous, current) = (pair[0].timestamp, pair[1].timestamp);
            if current == previous {
                return Err(SeriesError::DuplicateTimestamp {
                    index: index + 1,
                    timestamp: current,
                });
            }
            if current < previous {
                return Err(SeriesError::NotSorted {
                    index: index + 1,
                    timestamp: current,
                    previous,
                });
            }
        }
        Ok(Self { points })
    }

    /// Builds a series from points in any order.
    ///
    /// Points are stably sorted by timestamp; when several points share a
    /// timestamp the first one in input order is kept.
    #[must_use]
    pub fn from_unsorted(mut points: Vec<Point>) -> Self {
        points.sort_by_key(|p| p.timestamp);
        points.dedup_by_key(|p| p.timestamp);
        Self { points }
    }

    /// Returns an empty series.
    #[must_use]
    pub const fn empty() -> Self {
        Self { points: Vec::new() }
    }

    /// Returns the points in timestamp order.
    #[must_use]
    pub fn points(&self) -> &[Point] {
        &self.points
    }

    /// Iterates over the points in timestamp order.
    pub fn iter(&self) -> std::slice::Iter<'_, Point> {
        self.points.iter()
    }

    /// Number of points.
    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no points.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Timestamp of the earliest point, if any.
    #[must_use]
    pub fn first_timestamp(&self) -> Option<i64> {
        self.points.first().map(|p| p.timestamp)
    }

    /// Timestamp of the latest point, if any.
    #[must_use]
    pub fn last_timestamp(&self) -> Option<i64> {
        self.points.last().map(|p| p.timestamp)
    }
}

impl<'a> IntoIterator for &'a Series {
    type Item = &'a Point;
    type IntoIter = std::slice::Iter<'a, Point>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl TryFrom<Vec<Point>> for Series {
    type Error = SeriesError;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl<'de> Deserialize<'de> for Series {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let points = Vec::<Point>::deserialize(deserializer)?;
        Self::new(points).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn points(raw: &[(i64, f64)]) -> Vec<Point> {
        raw.iter().copied().map(Point::from).collect()
    }

    #[test]
    fn test_new_accepts_sorted_points() {
        let series = Series::new(points(&[(10, 1.0), (20, 1.1), (30, 1.2)])).unwrap();
        assert_eq!(series.len(), 3);
        assert_eq!(series.first_timestamp(), Some(10));
        assert_eq!(series.last_timestamp(), Some(30));
    }

    #[test]
    fn test_new_accepts_empty() {
        let series = Series::new(Vec::new()).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.first_timestamp(), None);
        assert_eq!(series, Series::empty());
    }

    #[test]
    fn test_new_rejects_unsorted() {
        let result = Series::new(points(&[(10, 1.0), (30, 1.1), (20, 1.2)]));
        assert_eq!(
            result,
            Err(SeriesError::NotSorted {
                index: 2,
                timestamp: 20,
                previous: 30,
            })
        );
    }

    #[test]
    fn test_new_rejects_duplicate_timestamp() {
        let result = Series::new(points(&[(10, 1.0), (10, 1.1)]));
        assert_eq!(
            result,
            Err(SeriesError::DuplicateTimestamp {
                index: 1,
                timestamp: 10,
            })
        );
    }

    #[test]
    #[allow(clippy::float_cmp)]
    fn test_from_unsorted_sorts_and_keeps_first_duplicate() {
        let series = Series::from_unsorted(points(&[(30, 3.0), (10, 1.0), (30, 3.5), (20, 2.0)]));
        let timestamps: Vec<i64> = series.iter().map(|p| p.timestamp).collect();
        assert_eq!(timestamps, vec![10, 20, 30]);
        assert_eq!(series.points()[2].value, 3.0);
    }

    #[test]
    fn test_negative_timestamps_are_ordered() {
        let series = Series::new(points(&[(-20, 1.0), (-10, 2.0), (0, 3.0)]));
        assert!(series.is_ok());
    }

    #[test]
    fn test_deserialize_validates_order() {
        let ok: Series =
            serde_json::from_str(r#"[{"timestamp": 1, "value": 1.5}, {"timestamp": 2, "value": 2.5}]"#)
                .unwrap();
        assert_eq!(ok.len(), 2);

        let bad = serde_json::from_str::<Series>(
            r#"[{"timestamp": 2, "value": 1.5}, {"timestamp": 1, "value": 2.5}]"#,
        );
        assert!(bad.is_err());
    }

    #[test]
    fn test_serialize_is_plain_array() {
        let series = Series::new(points(&[(1, 0.5)])).unwrap();
        let json = serde_json::to_string(&series).unwrap();
        assert_eq!(json, r#"[{"timestamp":1,"value":0.5}]"#);
    }
}
