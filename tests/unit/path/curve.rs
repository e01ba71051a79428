use super::*;

fn pts(raw: &[(f64, f64)]) -> Vec<Point> {
    raw.iter().map(|&(x, y)| Point::new(x, y)).collect()
}

#[test]
fn rejects_fewer_than_two_checkpoints() {
    let b = CurveBuilder::new(0.05);
    assert!(matches!(
        b.build(&[]).unwrap_err(),
        FlightError::DegenerateInput(_)
    ));
    assert!(matches!(
        b.build(&pts(&[(0.5, 0.5)])).unwrap_err(),
        FlightError::DegenerateInput(_)
    ));
}

#[test]
fn rejects_coincident_neighbours() {
    let err = CurveBuilder::new(0.05)
        .build(&pts(&[(0.1, 0.1), (0.4, 0.4), (0.4, 0.4), (0.8, 0.2)]))
        .unwrap_err();
    assert!(err.to_string().contains("coincide"));
}

#[test]
fn two_points_make_a_straight_segment() {
    let segs = CurveBuilder::new(0.05)
        .build(&pts(&[(0.0, 0.0), (1.0, 0.0)]))
        .unwrap();
    assert_eq!(segs.len(), 1);
    assert!((segs[0].length - 1.0).abs() < 1e-6);
    let mid = segs[0].eval(0.5);
    assert!(mid.y.abs() < 1e-12);
}

#[test]
fn segments_are_positionally_continuous() {
    let cps = pts(&[(0.1, 0.1), (0.5, 0.8), (0.9, 0.3), (0.4, 0.2)]);
    let segs = CurveBuilder::new(0.05).build(&cps).unwrap();
    assert_eq!(segs.len(), 3);
    for (i, seg) in segs.iter().enumerate() {
        assert_eq!(seg.index, i);
        assert_eq!(seg.eval(0.0), cps[i]);
        assert_eq!(seg.eval(1.0), cps[i + 1]);
    }
    for pair in segs.windows(2) {
        assert_eq!(pair[0].eval(1.0), pair[1].eval(0.0));
    }
}

#[test]
fn interior_tangents_are_collinear() {
    let cps = pts(&[(0.1, 0.1), (0.5, 0.8), (0.9, 0.3)]);
    let segs = CurveBuilder::new(0.05).build(&cps).unwrap();
    let t_in = segs[0].tangent(1.0);
    let t_out = segs[1].tangent(0.0);
    let cross = t_in.cross(t_out);
    assert!(cross.abs() < 1e-9, "cross = {cross}");
    assert!(t_in.dot(t_out) > 0.0);
}

#[test]
fn arc_length_is_at_least_the_chord() {
    let cps = pts(&[(0.1, 0.1), (0.5, 0.8), (0.9, 0.3), (0.2, 0.6)]);
    for seg in CurveBuilder::new(0.05).build(&cps).unwrap() {
        let chord = (seg.end - seg.start).hypot();
        assert!(seg.length + 1e-9 >= chord);
    }
}

#[test]
fn doubling_back_does_not_divide_by_zero() {
    let cps = pts(&[(0.2, 0.2), (0.6, 0.2), (0.2, 0.2)]);
    let segs = CurveBuilder::new(0.05).build(&cps).unwrap();
    assert!(segs.iter().all(|s| s.length.is_finite() && s.length > 0.0));
}
