use super::*;
use crate::path::checkpoints::extend_checkpoints;
use crate::path::curve::CurveBuilder;
use proptest::prelude::*;

fn segments(raw: &[(f64, f64)]) -> Vec<CurveSegment> {
    let pts: Vec<Point> = raw.iter().map(|&(x, y)| Point::new(x, y)).collect();
    let ext = extend_checkpoints(&pts, 0.3, 0.1);
    CurveBuilder::new(0.05).build(&ext).unwrap()
}

fn l_shape() -> PathTable {
    let segs = segments(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
    PathTable::build(&segs, 1000, 10.0).unwrap()
}

#[test]
fn l_shape_scenario() {
    let segs = segments(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
    let table = PathTable::build(&segs, 1000, 10.0).unwrap();
    assert!(table.len() <= 1000);
    assert!(table.len() >= 1000 - segs.len());

    let first = table.rows()[0];
    assert!(first.pos.distance(Point::new(0.0, 0.0)) < 1e-9);
    let last = table.rows()[table.len() - 1];
    assert!(last.pos.distance(Point::new(1.0, 1.0)) < 0.01, "{:?}", last.pos);
    assert_eq!(first.progress, 0.0);
    assert_eq!(last.progress, 1.0);
    assert!((last.schedule_time - 10.0).abs() < 1e-12);
}

#[test]
fn distance_column_is_monotone_and_spans_total_length() {
    let segs = segments(&[(0.1, 0.1), (0.8, 0.2), (0.5, 0.9), (0.2, 0.4), (0.9, 0.7)]);
    let table = PathTable::build(&segs, 3000, 30.0).unwrap();
    let sum: f64 = segs.iter().map(|s| s.length).sum();
    assert!((table.total_length() - sum).abs() < 1e-12);
    for pair in table.rows().windows(2) {
        assert!(pair[0].distance <= pair[1].distance);
    }
    let last = table.rows()[table.len() - 1].distance;
    assert!((last - sum).abs() < 1e-9, "last = {last}, sum = {sum}");
}

#[test]
fn progress_and_schedule_are_linear_in_row_index() {
    let table = l_shape();
    let n = table.len() as f64 - 1.0;
    for (i, row) in table.rows().iter().enumerate() {
        assert!((row.progress - i as f64 / n).abs() < 1e-12);
        assert!((row.schedule_time - 10.0 * i as f64 / n).abs() < 1e-9);
    }
}

#[test]
fn build_is_deterministic() {
    let a = l_shape();
    let b = l_shape();
    assert_eq!(a.rows(), b.rows());
}

#[test]
fn too_few_rows_is_degenerate() {
    let segs = segments(&[(0.0, 0.0), (1.0, 0.0), (1.0, 1.0)]);
    assert!(matches!(
        PathTable::build(&segs, 0, 10.0).unwrap_err(),
        FlightError::DegenerateInput(_)
    ));
}

#[test]
fn budgets_sum_within_truncation_bounds() {
    let segs = segments(&[(0.1, 0.1), (0.8, 0.2), (0.5, 0.9)]);
    let total: usize = row_budgets(&segs, 777).iter().sum();
    assert!(total <= 777 && total >= 777 - segs.len());
}

#[test]
fn exact_row_distance_never_overshoots() {
    let table = l_shape();
    for row in table.rows().iter().skip(1).step_by(37) {
        let hit = table.position_at(row.distance);
        assert!(hit.distance <= row.distance);
        assert!(hit.distance < row.distance || hit.distance == 0.0);
    }
}

#[test]
fn query_before_first_row_returns_first_row() {
    let table = l_shape();
    assert_eq!(table.row_index_at(0.0), 0);
    assert_eq!(table.position_at(f64::NAN), &table.rows()[0]);
}

#[test]
fn row_out_of_range_is_lookup_miss() {
    let table = l_shape();
    assert!(matches!(
        table.row(table.len()).unwrap_err(),
        FlightError::LookupMiss(_)
    ));
}

#[test]
fn span_with_same_row_still_has_a_segment() {
    let table = l_shape();
    let d = table.rows()[100].distance + 1e-6;
    let span = table.span_between(d, d);
    assert_eq!(span.end, 100);
    assert_eq!(span.start, 99);
    assert_eq!(span.line_pairs().count(), 1);

    let span0 = table.span_between(0.0, 0.0);
    assert_eq!((span0.start, span0.end), (0, 1));
}

#[test]
fn span_across_the_wrap_skips_the_jump() {
    let table = l_shape();
    let total = table.total_length();
    let span = table.span_between(total - 0.01, total + 0.01);
    assert!(span.wraps());
    let last = table.len() - 1;
    assert!(span.line_pairs().all(|(a, b)| b == a + 1 && b <= last));
    assert!(span.indices().any(|i| i == 0));
    assert!(span.indices().any(|i| i == last));
}

proptest! {
    #[test]
    fn lookup_is_invariant_under_whole_laps(d in 0.0f64..2.2, k in -5i32..5) {
        let table = l_shape();
        let total = table.total_length();
        let base = table.row_index_at(d);
        let lapped = table.row_index_at(d + f64::from(k) * total);
        // Floating-point wrap can land on the neighbouring row right at a row boundary.
        prop_assert!(base.abs_diff(lapped) <= 1 || base.abs_diff(lapped) == table.len() - 1);
    }

    #[test]
    fn lookup_never_overshoots(d in 0.0f64..2.2) {
        let table = l_shape();
        let row = table.position_at(d);
        prop_assert!(row.distance <= table.wrap(d) || row.distance == 0.0);
    }
}
