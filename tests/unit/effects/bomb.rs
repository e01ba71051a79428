use super::*;

fn bomb() -> Bomb {
    Bomb {
        position: Point::new(5.0, 5.0),
        t0: 100.0,
        style: BombStyle {
            duration: 2.0,
            start_radius: 10.0,
            end_radius: 20.0,
        },
        color: Rgba8::opaque(255, 0, 0),
        owner: "entity-1".to_string(),
    }
}

#[test]
fn opacity_is_zero_at_spawn_and_full_at_expiry() {
    let b = bomb();
    let start = b.state_at(100.0);
    assert_eq!(start.color.a, 0);
    assert!((start.radius - 10.0).abs() < 1e-12);

    let end = b.state_at(102.0);
    assert_eq!(end.color.a, 255);
    assert!((end.radius - 20.0).abs() < 1e-12);
}

#[test]
fn bloom_is_monotone() {
    let b = bomb();
    let mut prev = b.state_at(100.0);
    for i in 1..=20 {
        let now = b.state_at(100.0 + f64::from(i) * 0.1);
        assert!(now.radius >= prev.radius);
        assert!(now.color.a >= prev.color.a);
        prev = now;
    }
}

#[test]
fn halfway_is_halfway() {
    let f = bomb().state_at(101.0);
    assert!((f.radius - 15.0).abs() < 1e-12);
    assert_eq!(f.color.a, 128);
    assert_eq!((f.color.r, f.color.g, f.color.b), (255, 0, 0));
}

#[test]
fn expiry_boundary_is_exclusive() {
    let b = bomb();
    assert!(!b.is_expired(99.0));
    assert!(!b.is_expired(100.0));
    assert!(!b.is_expired(102.0));
    assert!(b.is_expired(102.000_001));
}
