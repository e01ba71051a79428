use super::*;
use rand::SeedableRng;

fn rng() -> rand_pcg::Pcg64 {
    rand_pcg::Pcg64::seed_from_u64(42)
}

#[test]
fn unarmed_emitter_never_fires() {
    let mut e = EffectEmitter::new(100.0, BombStyle::default());
    let mut rng = rng();
    for i in 0..100 {
        assert!(
            e.try_emit(f64::from(i), Point::ZERO, 10.0, Rgba8::opaque(1, 2, 3), "a", &mut rng)
                .is_none()
        );
    }
}

#[test]
fn fires_only_once_due_and_rearms() {
    let mut e = EffectEmitter::new(2.0, BombStyle::default());
    let mut rng = rng();
    e.schedule_next(10.0, &mut rng);
    let due = e.next_due().unwrap();
    assert!(due >= 10.0);

    let c = Rgba8::opaque(9, 8, 7);
    if due > 10.0 {
        assert!(e.try_emit(10.0, Point::ZERO, 5.0, c, "a", &mut rng).is_none());
    }
    let bomb = e.try_emit(due, Point::ZERO, 5.0, c, "a", &mut rng).unwrap();
    assert_eq!(bomb.t0, due);
    assert_eq!(bomb.color, c);
    assert_eq!(bomb.owner, "a");
    assert!(e.next_due().unwrap() >= due);
}

#[test]
fn empirical_mean_interval_matches_rate() {
    let lambda = 4.0;
    let e = EffectEmitter::new(lambda, BombStyle::default());
    let mut rng = rng();
    let n = 50_000;
    let sum: f64 = (0..n).map(|_| e.sample_interval(&mut rng)).sum();
    let mean = sum / f64::from(n);
    assert!((mean - 1.0 / lambda).abs() < 0.01, "mean = {mean}");
}

#[test]
fn intervals_are_finite_and_non_negative() {
    let e = EffectEmitter::new(0.5, BombStyle::default());
    let mut rng = rng();
    for _ in 0..10_000 {
        let dt = e.sample_interval(&mut rng);
        assert!(dt.is_finite() && dt >= 0.0);
    }
}

#[test]
fn bombs_land_inside_the_range_disk_uniformly() {
    let mut e = EffectEmitter::new(1.0, BombStyle::default());
    let mut rng = rng();
    let center = Point::new(100.0, 50.0);
    let range = 20.0;
    let mut inner = 0;
    let n = 20_000;
    for _ in 0..n {
        e.schedule_next(0.0, &mut rng);
        let due = e.next_due().unwrap();
        let b = e
            .try_emit(due, center, range, Rgba8::opaque(0, 0, 0), "a", &mut rng)
            .unwrap();
        let d = b.position.distance(center);
        assert!(d <= range + 1e-9);
        if d <= range / 2.0 {
            inner += 1;
        }
    }
    // A disk of half the radius holds a quarter of the area.
    let frac = f64::from(inner) / f64::from(n);
    assert!((frac - 0.25).abs() < 0.02, "inner fraction = {frac}");
}

#[test]
fn disarm_stops_emission() {
    let mut e = EffectEmitter::new(1.0, BombStyle::default());
    let mut rng = rng();
    e.schedule_next(0.0, &mut rng);
    e.disarm();
    assert!(
        e.try_emit(1e9, Point::ZERO, 1.0, Rgba8::opaque(0, 0, 0), "a", &mut rng)
            .is_none()
    );
}
