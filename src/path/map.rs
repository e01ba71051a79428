use rand::Rng;

use crate::config::PathConfig;
use crate::foundation::core::Point;
use crate::foundation::error::FlightResult;
use crate::path::checkpoints::{extend_checkpoints, random_checkpoints};
use crate::path::curve::{CurveBuilder, CurveSegment};
use crate::path::table::{PathTable, row_budgets};

/// A segment plus its place in the table.
#[derive(Clone, Debug)]
pub struct SegmentEntry {
    /// The curve segment.
    pub segment: CurveSegment,
    /// Rows the segment contributed to the table.
    pub rows: usize,
    /// Cumulative length of all earlier segments.
    pub distance_offset: f64,
}

/// Everything derived from one set of checkpoints.
///
/// Immutable once built; a path change builds a new map and swaps it in whole.
#[derive(Clone, Debug)]
pub struct PathMap {
    raw_checkpoints: Vec<Point>,
    checkpoints: Vec<Point>,
    segments: Vec<SegmentEntry>,
    table: PathTable,
    schedule_secs: f64,
}

impl PathMap {
    /// Extend `raw` for long gaps, fit curves, and sample the table.
    pub fn build(raw: &[Point], cfg: &PathConfig) -> FlightResult<Self> {
        let checkpoints = extend_checkpoints(raw, cfg.extend_threshold, cfg.tail_length);
        let segments = CurveBuilder::new(cfg.tangent_offset).build(&checkpoints)?;

        let total_rows = cfg.total_rows()?;
        let table = PathTable::build(&segments, total_rows, cfg.schedule_secs)?;

        let budgets = row_budgets(&segments, total_rows);
        let mut offset = 0.0;
        let segments = segments
            .into_iter()
            .zip(budgets)
            .map(|(segment, rows)| {
                let distance_offset = offset;
                offset += segment.length;
                SegmentEntry {
                    segment,
                    rows,
                    distance_offset,
                }
            })
            .collect::<Vec<_>>();

        let map = Self {
            raw_checkpoints: raw.to_vec(),
            checkpoints,
            segments,
            table,
            schedule_secs: cfg.schedule_secs,
        };
        tracing::info!(
            checkpoints = map.checkpoints.len(),
            segments = map.segments.len(),
            rows = map.table.len(),
            total_length = map.total_length(),
            speed_unit = map.speed_unit(),
            "built path map"
        );
        Ok(map)
    }

    /// Build from `cfg.random_checkpoints` random checkpoints.
    pub fn random<R: Rng + ?Sized>(cfg: &PathConfig, rng: &mut R) -> FlightResult<Self> {
        let raw = random_checkpoints(cfg.random_checkpoints, rng);
        Self::build(&raw, cfg)
    }

    /// Checkpoints as supplied.
    pub fn raw_checkpoints(&self) -> &[Point] {
        &self.raw_checkpoints
    }

    /// Checkpoints after long-gap extension; one more than the segment count.
    pub fn checkpoints(&self) -> &[Point] {
        &self.checkpoints
    }

    /// Segment table.
    pub fn segments(&self) -> &[SegmentEntry] {
        &self.segments
    }

    /// Distance lookup table.
    pub fn table(&self) -> &PathTable {
        &self.table
    }

    /// Total arc length of the path.
    pub fn total_length(&self) -> f64 {
        self.table.total_length()
    }

    /// Nominal time for speed 1 to cover the path.
    pub fn schedule_secs(&self) -> f64 {
        self.schedule_secs
    }

    /// Distance per second at speed 1.
    pub fn speed_unit(&self) -> f64 {
        self.total_length() / self.schedule_secs
    }
}

#[cfg(test)]
#[path = "../../tests/unit/path/map.rs"]
mod tests;
