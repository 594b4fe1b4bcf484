//! Time alignment of independent series.
//!
//! [`align`] performs a k-way merge-join on timestamp equality: it produces one
//! [`Row`] per distinct timestamp found in any input series, in ascending
//! order, with one cell per series. A cell is `None` when its series has no
//! sample at that timestamp. No resampling or interpolation takes place.
//!
//! # Example
//!
//! ```
//! use shared::align::align;
//! use shared::models::{Point, Row, Series};
//!
//! let a = Series::new(vec![Point::new(10, 1.0)]).unwrap();
//! let b = Series::new(vec![Point::new(20, 2.0)]).unwrap();
//!
//! let rows = align(&[a, b]);
//! assert_eq!(
//!     rows,
//!     vec![
//!         Row::new(10, vec![Some(1.0), None]),
//!         Row::new(20, vec![None, Some(2.0)]),
//!     ]
//! );
//! ```

use crate::models::{Row, Series};
use std::cmp::Reverse;
use std::collections::BinaryHeap;

/// Series count above which [`align`] switches from the linear scan to the
/// heap-based merge.
pub const HEAP_THRESHOLD: usize = 32;

/// How the next (minimum) timestamp is selected on each step of the merge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignStrategy {
    /// Scan every cursor on each step: O(N) per row.
    Scan,
    /// Keep active cursors in a min-heap: O(log N) per advanced cursor.
    Heap,
}

impl AlignStrategy {
    /// Picks the strategy used by [`align`] for `series_count` inputs.
    #[must_use]
    pub fn for_series_count(series_count: usize) -> Self {
        if series_count > HEAP_THRESHOLD {
            Self::Heap
        } else {
            Self::Scan
        }
    }
}

/// Aligns `series` on timestamp equality.
///
/// The output contains exactly the union of the input timestamps, strictly
/// ascending, and `row.values[i]` is the sample of `series[i]` at
/// `row.timestamp` if there is one. Zero series, or only empty series, give an
/// empty result.
#[must_use]
pub fn align(series: &[Series]) -> Vec<Row> {
    align_with(series, AlignStrategy::for_series_count(series.len()))
}

/// Aligns `series` using an explicit [`AlignStrategy`].
///
/// Both strategies produce identical output.
#[must_use]
pub fn align_with(series: &[Series], strategy: AlignStrategy) -> Vec<Row> {
    let rows = match strategy {
        AlignStrategy::Scan => merge_scan(series),
        AlignStrategy::Heap => merge_heap(series),
    };

    tracing::debug!(
        series = series.len(),
        rows = rows.len(),
        ?strategy,
        "Aligned series"
    );

    rows
}

fn merge_scan(series: &[Series]) -> Vec<Row> {
    let width = series.len();
    let mut cursors = vec![0usize; width];
    let mut rows = Vec::with_capacity(series.iter().map(Series::len).max().unwrap_or(0));

    loop {
        let next = series
            .iter()
            .zip(&cursors)
            .filter_map(|(s, &cursor)| s.points().get(cursor))
            .map(|p| p.timestamp)
            .min();

        let Some(timestamp) = next else {
            break;
        };

        let mut row = Row::missing(timestamp, width);
        for ((s, cursor), cell) in series.iter().zip(cursors.iter_mut()).zip(&mut row.values) {
            if let Some(point) = s.points().get(*cursor) {
                if point.timestamp == timestamp {
                    *cell = Some(point.value);
                    *cursor += 1;
                }
            }
        }
        rows.push(row);
    }

    rows
}

fn merge_heap(series: &[Series]) -> Vec<Row> {
    let width = series.len();
    let mut cursors = vec![0usize; width];
    let mut rows = Vec::with_capacity(series.iter().map(Series::len).max().unwrap_or(0));

    // (timestamp, series index) of each cursor that has not reached the end
    let mut heap: BinaryHeap<Reverse<(i64, usize)>> = series
        .iter()
        .enumerate()
        .filter_map(|(i, s)| s.first_timestamp().map(|t| Reverse((t, i))))
        .collect();

    while let Some(&Reverse((timestamp, _))) = heap.peek() {
        let mut row = Row::missing(timestamp, width);

        while let Some(&Reverse((t, index))) = heap.peek() {
            if t != timestamp {
                break;
            }
            heap.pop();

            let points = series[index].points();
            row.values[index] = Some(points[cursors[index]].value);
            cursors[index] += 1;

            if let Some(next) = points.get(cursors[index]) {
                heap.push(Reverse((next.timestamp, index)));
            }
        }

        rows.push(row);
    }

    rows
}
