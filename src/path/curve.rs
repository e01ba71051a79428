use kurbo::{CubicBez, ParamCurve, ParamCurveArclen, ParamCurveDeriv};

use crate::foundation::core::{Point, Vec2};
use crate::foundation::error::{FlightError, FlightResult};

/// Accuracy passed to the arc-length integrator, in normalized path units.
const ARCLEN_ACCURACY: f64 = 1e-9;

/// Below this chord length two checkpoints count as coincident.
const MIN_CHORD: f64 = 1e-12;

/// One cubic segment between two consecutive checkpoints.
#[derive(Clone, Debug, PartialEq)]
pub struct CurveSegment {
    /// Position of the segment along the path.
    pub index: usize,
    /// Checkpoint at `t = 0`.
    pub start: Point,
    /// Checkpoint at `t = 1`.
    pub end: Point,
    /// Arc length, integrated numerically.
    pub length: f64,
    /// The curve itself.
    pub curve: CubicBez,
}

impl CurveSegment {
    /// Position at local parameter `t` in `[0, 1]`.
    pub fn eval(&self, t: f64) -> Point {
        self.curve.eval(t)
    }

    /// Unnormalized tangent at `t`.
    pub fn tangent(&self, t: f64) -> Vec2 {
        self.curve.deriv().eval(t).to_vec2()
    }
}

/// Builds smooth cubic segments through a sequence of checkpoints.
///
/// Interior checkpoints get left/right control points offset along the direction of the chord
/// from the previous to the next checkpoint, so consecutive segments share a tangent line. The
/// first and last segments use the midpoint towards the neighbour as their free control point.
#[derive(Clone, Copy, Debug)]
pub struct CurveBuilder {
    tangent_offset: f64,
}

impl CurveBuilder {
    /// `tangent_offset` is the distance between an interior checkpoint and its control points.
    pub fn new(tangent_offset: f64) -> Self {
        Self { tangent_offset }
    }

    /// Build one segment per consecutive checkpoint pair.
    pub fn build(&self, checkpoints: &[Point]) -> FlightResult<Vec<CurveSegment>> {
        let n = checkpoints.len();
        if n < 2 {
            return Err(FlightError::degenerate_input(format!(
                "need at least 2 checkpoints, got {n}"
            )));
        }
        for (i, pair) in checkpoints.windows(2).enumerate() {
            if !(pair[0].is_finite() && pair[1].is_finite()) {
                return Err(FlightError::degenerate_input(format!(
                    "checkpoint {i} or {} is not finite",
                    i + 1
                )));
            }
            if (pair[1] - pair[0]).hypot() < MIN_CHORD {
                return Err(FlightError::degenerate_input(format!(
                    "checkpoints {i} and {} coincide",
                    i + 1
                )));
            }
        }

        let handles = self.handles(checkpoints);
        let segments = (1..n)
            .map(|i| {
                let curve = CubicBez::new(
                    checkpoints[i - 1],
                    handles[i - 1].1,
                    handles[i].0,
                    checkpoints[i],
                );
                CurveSegment {
                    index: i - 1,
                    start: checkpoints[i - 1],
                    end: checkpoints[i],
                    length: curve.arclen(ARCLEN_ACCURACY),
                    curve,
                }
            })
            .collect();
        Ok(segments)
    }

    /// `(left, right)` control points around every checkpoint.
    fn handles(&self, p: &[Point]) -> Vec<(Point, Point)> {
        let n = p.len();
        let mut out = Vec::with_capacity(n);
        out.push((p[0], p[0].midpoint(p[1])));
        for i in 1..n - 1 {
            let chord = p[i - 1] - p[i + 1];
            let len = chord.hypot();
            let offset = if len < MIN_CHORD {
                Vec2::ZERO
            } else {
                chord * (self.tangent_offset / len)
            };
            out.push((p[i] + offset, p[i] - offset));
        }
        out.push((p[n - 1].midpoint(p[n - 2]), p[n - 1]));
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/path/curve.rs"]
mod tests;
