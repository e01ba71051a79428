use super::*;
use crate::effects::bomb::BombStyle;
use crate::effects::emitter::EffectEmitter;
use crate::foundation::core::Rgba8;
use crate::motion::state::{Appearance, Bounds, Motion};
use crate::motion::trail::TrailBuffer;

fn entity(speed: f64, speed_unit: f64) -> Entity {
    let state = EntityState {
        appearance: Appearance {
            radius: 5.0,
            color: Rgba8::opaque(255, 0, 0),
        },
        motion: Motion::new(speed, speed_unit, Bounds { min: 0.1, max: 10.0 }),
        emitter: EffectEmitter::new(0.5, BombStyle::default()),
        trail: TrailBuffer::new(256),
        running: false,
        effect_range: 0.05,
        effect_range_visible: false,
    };
    Entity::new("probe", state, Duration::from_millis(5))
}

#[test]
fn second_go_is_rejected_while_live() {
    let e = entity(1.0, 1.0);
    e.go().unwrap();
    let err = e.go().unwrap_err();
    assert!(matches!(err, FlightError::AlreadyRunning(_)));
    assert!(err.is_recoverable());
    e.stop_and_join().unwrap();
}

#[test]
fn concurrent_go_starts_exactly_one_updater() {
    let e = Arc::new(entity(1.0, 1.0));
    let handles = (0..8)
        .map(|_| {
            let e = Arc::clone(&e);
            thread::spawn(move || e.go().is_ok())
        })
        .collect::<Vec<_>>();
    let ok = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .filter(|ok| *ok)
        .count();
    assert_eq!(ok, 1);
    e.stop_and_join().unwrap();
}

#[test]
fn stop_freezes_distance_and_go_resumes() {
    let e = entity(1.0, 1.0);
    e.go().unwrap();
    thread::sleep(Duration::from_millis(60));
    e.stop_and_join().unwrap();
    assert!(!e.is_running().unwrap());

    let frozen = e.info().unwrap().distance;
    assert!(frozen > 0.0);
    thread::sleep(Duration::from_millis(30));
    assert_eq!(e.info().unwrap().distance, frozen);

    e.go().unwrap();
    assert!(e.is_running().unwrap());
    thread::sleep(Duration::from_millis(60));
    e.stop_and_join().unwrap();
    assert!(e.info().unwrap().distance > frozen);
}

#[test]
fn stop_then_go_immediately_succeeds() {
    let e = entity(1.0, 1.0);
    e.go().unwrap();
    e.stop().unwrap();
    e.go().unwrap();
    assert!(e.is_running().unwrap());
    e.stop_and_join().unwrap();
}

#[test]
fn updater_fills_trail_buffer() {
    let e = entity(2.0, 1.0);
    e.go().unwrap();
    thread::sleep(Duration::from_millis(50));
    e.stop_and_join().unwrap();
    let trail = e.with_state(|s| s.trail.len()).unwrap();
    assert!(trail >= 2, "trail had {trail} samples");
}

#[test]
fn non_finite_growth_halts_updater() {
    let e = entity(1.0, f64::INFINITY);
    e.go().unwrap();
    thread::sleep(Duration::from_millis(50));
    assert!(!e.is_running().unwrap());
    assert_eq!(e.info().unwrap().distance, 0.0);
    // The halted updater counts as finished, so a restart is allowed.
    e.with_state(|s| s.set_speed_unit(1.0)).unwrap();
    e.go().unwrap();
    e.stop_and_join().unwrap();
}

#[test]
fn lock_within_times_out_while_held() {
    let e = entity(1.0, 1.0);
    let held = e.lock().unwrap();
    assert!(e.lock_within(Duration::from_millis(5)).is_none());
    drop(held);
    assert!(e.lock_within(Duration::from_millis(5)).is_some());
}
