use crate::foundation::core::Point;
use crate::foundation::error::{FlightError, FlightResult};
use crate::path::curve::CurveSegment;

/// One sample of the path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PathRow {
    /// Index of the curve segment the row was sampled from.
    pub segment: usize,
    /// Local curve parameter in `[0, 1)`.
    pub s: f64,
    /// Cumulative distance from the path start.
    pub distance: f64,
    /// Normalized `[0,1]²` position.
    pub pos: Point,
    /// Row index mapped linearly onto `[0, 1]`.
    pub progress: f64,
    /// Row index mapped linearly onto `[0, schedule_secs]`.
    pub schedule_time: f64,
}

/// Dense cumulative-distance to position table.
///
/// Rows are sorted by `distance`, so lookups are binary searches. Lookups never interpolate:
/// resolution is bounded by row density.
#[derive(Clone, Debug)]
pub struct PathTable {
    rows: Vec<PathRow>,
    total_length: f64,
}

/// Per-segment row budgets, proportional to each segment's share of the total length.
///
/// Each budget is truncated, so the sum lies in `[total_rows - segments.len(), total_rows]`.
pub fn row_budgets(segments: &[CurveSegment], total_rows: usize) -> Vec<usize> {
    let total: f64 = segments.iter().map(|s| s.length).sum();
    if total <= 0.0 {
        return vec![0; segments.len()];
    }
    segments
        .iter()
        .map(|s| (s.length / total * total_rows as f64) as usize)
        .collect()
}

/// `linspace(start, end, n)` element `i`, endpoint inclusive.
fn linspace_at(start: f64, end: f64, n: usize, i: usize) -> f64 {
    if n <= 1 {
        start
    } else {
        start + (end - start) * (i as f64 / (n - 1) as f64)
    }
}

impl PathTable {
    /// Sample `segments` into roughly `total_rows` rows.
    ///
    /// Deterministic for identical input. Each segment is sampled at its budget of evenly spaced
    /// parameters, excluding its own end so shared boundaries are not duplicated.
    pub fn build(
        segments: &[CurveSegment],
        total_rows: usize,
        schedule_secs: f64,
    ) -> FlightResult<Self> {
        let total_length: f64 = segments.iter().map(|s| s.length).sum();
        if !(total_length.is_finite() && total_length > 0.0) {
            return Err(FlightError::degenerate_input(
                "path has zero or non-finite total length",
            ));
        }

        let budgets = row_budgets(segments, total_rows);
        let mut rows = Vec::with_capacity(total_rows);
        let mut offset = 0.0;
        for (seg, &n) in segments.iter().zip(&budgets) {
            for i in 0..n {
                let s = i as f64 / n as f64;
                rows.push(PathRow {
                    segment: seg.index,
                    s,
                    distance: linspace_at(offset, offset + seg.length, n, i),
                    pos: seg.eval(s),
                    progress: 0.0,
                    schedule_time: 0.0,
                });
            }
            offset += seg.length;
        }

        if rows.is_empty() {
            return Err(FlightError::degenerate_input(format!(
                "path table is empty ({total_rows} rows over {} segments)",
                segments.len()
            )));
        }

        let n = rows.len();
        for (i, row) in rows.iter_mut().enumerate() {
            row.progress = linspace_at(0.0, 1.0, n, i);
            row.schedule_time = linspace_at(0.0, schedule_secs, n, i);
        }

        Ok(Self { rows, total_length })
    }

    /// All rows in distance order.
    pub fn rows(&self) -> &[PathRow] {
        &self.rows
    }

    /// Number of rows; never zero.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Always `false`: construction rejects empty tables.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sum of all segment arc lengths.
    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    /// Row by index.
    pub fn row(&self, idx: usize) -> FlightResult<&PathRow> {
        self.rows.get(idx).ok_or_else(|| {
            FlightError::lookup_miss(format!("row {idx} out of {} rows", self.rows.len()))
        })
    }

    /// Wrap an unbounded travelled distance onto `[0, total_length)`.
    pub fn wrap(&self, distance: f64) -> f64 {
        distance.rem_euclid(self.total_length)
    }

    /// Index of the row with the greatest distance strictly less than the wrapped query.
    ///
    /// Queries at or before the first row resolve to row 0.
    pub fn row_index_at(&self, distance: f64) -> usize {
        let q = self.wrap(distance);
        let idx = self.rows.partition_point(|r| r.distance < q);
        if idx == 0 {
            tracing::trace!(distance, "path lookup fell back to the first row");
        }
        idx.saturating_sub(1)
    }

    /// Row for a travelled distance.
    pub fn position_at(&self, distance: f64) -> &PathRow {
        &self.rows[self.row_index_at(distance)]
    }

    /// Contiguous rows covered while travelling from `from` to `to`.
    ///
    /// If both resolve to the same row the start is moved back one row so the span always
    /// contains at least one line segment. At row 0 there is nothing before it, so the end moves
    /// forward to row 1 instead.
    pub fn span_between(&self, from: f64, to: f64) -> RowSpan {
        let mut start = self.row_index_at(from);
        let mut end = self.row_index_at(to);
        if start == end {
            if start > 0 {
                start -= 1;
            } else if self.rows.len() > 1 {
                end = 1;
            }
        }
        RowSpan {
            start,
            end,
            len: self.rows.len(),
        }
    }
}

/// Row interval returned by [`PathTable::span_between`].
///
/// `start > end` means the travel crossed the path end and wrapped to the beginning.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RowSpan {
    /// First row index.
    pub start: usize,
    /// Last row index (inclusive).
    pub end: usize,
    len: usize,
}

impl RowSpan {
    /// `true` when the span crosses from the last row back to row 0.
    pub fn wraps(&self) -> bool {
        self.start > self.end
    }

    /// Row indices in travel order.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        let (head, tail) = if self.wraps() {
            (self.start..self.len, 0..self.end + 1)
        } else {
            (self.start..self.end + 1, 0..0)
        };
        head.chain(tail)
    }

    /// Consecutive row pairs to join with line segments; the jump across the wrap is skipped.
    pub fn line_pairs(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let (head, tail) = if self.wraps() {
            (self.start..self.len.saturating_sub(1), 0..self.end)
        } else {
            (self.start..self.end, 0..0)
        };
        head.chain(tail).map(|i| (i, i + 1))
    }

    /// The newest line segment, used to orient the heading marker.
    pub fn last_pair(&self) -> Option<(usize, usize)> {
        self.line_pairs().last()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/path/table.rs"]
mod tests;
