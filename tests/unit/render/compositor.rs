use rand::SeedableRng;

use super::*;
use crate::stage::EntitySpec;

fn stage() -> Stage {
    let config = StageConfig {
        canvas: Canvas {
            width: 200,
            height: 200,
            padding: 0,
        },
        seed: Some(11),
        ..StageConfig::default()
    };
    let pts = [Point::new(0.2, 0.5), Point::new(0.8, 0.5)];
    Stage::with_checkpoints(config, &pts).unwrap()
}

fn compositor(stage: &Stage) -> Compositor {
    Compositor::new(stage.config(), Pcg64::seed_from_u64(3)).unwrap()
}

fn add_idle(stage: &Stage, name: &str) {
    stage
        .add_entity_with(EntitySpec {
            name: Some(name.to_string()),
            color: Rgba8::opaque(255, 0, 0),
            speed: 1.0,
            start: false,
        })
        .unwrap();
}

#[test]
fn empty_stage_yields_idle_frame() {
    let s = stage();
    let mut c = compositor(&s);
    let frame = c.frame(&s, 0.0).unwrap();
    assert_eq!((frame.width, frame.height), (200, 200));
    assert!(frame.data.chunks_exact(4).all(|px| px == IDLE_RGBA));
}

#[test]
fn entity_body_is_drawn_at_its_row() {
    let s = stage();
    add_idle(&s, "a");
    let mut c = compositor(&s);
    let frame = c.frame(&s, 0.0).unwrap();
    assert_eq!(frame.pixel(40, 100), Some([255, 0, 0, 255]));
    assert_eq!(frame.pixel(100, 20).unwrap()[3], 0);
}

#[test]
fn running_entity_emits_and_effects_expire() {
    let s = stage();
    add_idle(&s, "a");
    s.set_emission_rate(crate::stage::Target::All, 50.0).unwrap();
    s.entity("a").unwrap().with_state(|st| st.running = true).unwrap();

    let mut c = compositor(&s);
    c.frame(&s, 0.0).unwrap();
    assert!(c.effects().is_empty());
    c.frame(&s, 5.0).unwrap();
    assert_eq!(c.effects().len(), 1);
    let bomb = c.effects().iter().next().unwrap();
    assert_eq!(bomb.owner, "a");
    assert!(bomb.position.distance(Point::new(40.0, 100.0)) <= 0.05 * 200.0 + 1e-9);

    c.frame(&s, 6.5).unwrap();
    assert!(c.effects().iter().all(|b| b.t0 >= 6.0));
}

#[test]
fn stopped_entity_never_emits() {
    let s = stage();
    add_idle(&s, "a");
    s.set_emission_rate(crate::stage::Target::All, 50.0).unwrap();
    let mut c = compositor(&s);
    for t in 0..20 {
        c.frame(&s, f64::from(t)).unwrap();
    }
    assert!(c.effects().is_empty());
}

#[test]
fn busy_entity_is_skipped_not_waited_on() {
    let s = stage();
    add_idle(&s, "a");
    let mut c = compositor(&s);
    let entity = s.entity("a").unwrap();
    let held = entity.lock().unwrap();
    let frame = c.frame(&s, 0.0).unwrap();
    drop(held);
    assert_ne!(frame.pixel(40, 100), Some([255, 0, 0, 255]));
}

#[test]
fn path_change_rebuilds_background() {
    let s = stage();
    add_idle(&s, "a");
    let mut c = compositor(&s);
    let before = c.frame(&s, 0.0).unwrap();
    s.regenerate_path(&[[0.5, 0.1], [0.5, 0.9]]).unwrap();
    let after = c.frame(&s, 0.1).unwrap();
    assert_ne!(before.data, after.data);
    assert_eq!(after.pixel(100, 20), Some([255, 0, 0, 255]));
}
