use rand::Rng;

use crate::foundation::core::Point;
use crate::foundation::error::{FlightError, FlightResult};

/// Draw `n` checkpoints uniformly inside `[0.1, 0.9]²`.
pub fn random_checkpoints<R: Rng + ?Sized>(n: usize, rng: &mut R) -> Vec<Point> {
    (0..n)
        .map(|_| {
            Point::new(
                rng.random::<f64>() * 0.8 + 0.1,
                rng.random::<f64>() * 0.8 + 0.1,
            )
        })
        .collect()
}

/// Convert wire-format `[x, y]` pairs into points, rejecting non-finite coordinates.
pub fn checkpoints_from_pairs(pairs: &[[f64; 2]]) -> FlightResult<Vec<Point>> {
    pairs
        .iter()
        .enumerate()
        .map(|(i, &[x, y])| {
            if x.is_finite() && y.is_finite() {
                Ok(Point::new(x, y))
            } else {
                Err(FlightError::degenerate_input(format!(
                    "checkpoint {i} has a non-finite coordinate"
                )))
            }
        })
        .collect()
}

/// Split long gaps so no single curve segment dominates the path.
///
/// For each consecutive pair farther apart than `threshold`, two tail points are inserted at
/// distance `tail` from either end. Input points, their order, and both endpoints are kept.
pub fn extend_checkpoints(points: &[Point], threshold: f64, tail: f64) -> Vec<Point> {
    let Some(&last) = points.last() else {
        return Vec::new();
    };

    let mut out = Vec::with_capacity(points.len() * 3);
    for pair in points.windows(2) {
        let (p1, p2) = (pair[0], pair[1]);
        out.push(p1);
        let length = (p2 - p1).hypot();
        if length > threshold {
            let r = tail / length;
            out.push(p1.lerp(p2, r));
            out.push(p2.lerp(p1, r));
        }
    }
    out.push(last);
    out
}

#[cfg(test)]
#[path = "../../tests/unit/path/checkpoints.rs"]
mod tests;
