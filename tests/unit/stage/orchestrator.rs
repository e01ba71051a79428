use super::*;

fn config() -> StageConfig {
    StageConfig {
        seed: Some(7),
        ..StageConfig::default()
    }
}

fn l_shape() -> Vec<Point> {
    vec![
        Point::new(0.0, 0.0),
        Point::new(1.0, 0.0),
        Point::new(1.0, 1.0),
    ]
}

fn stage() -> Stage {
    Stage::with_checkpoints(config(), &l_shape()).unwrap()
}

fn idle(name: &str) -> EntitySpec {
    EntitySpec {
        name: Some(name.to_string()),
        color: Rgba8::opaque(255, 255, 0),
        speed: 1.0,
        start: false,
    }
}

#[test]
fn add_entity_picks_first_free_name() {
    let s = stage();
    s.add_entity_with(idle("entity-2")).unwrap();
    let first = s.add_entity().unwrap();
    let second = s.add_entity().unwrap();
    assert_eq!(first, "entity-1");
    assert_eq!(second, "entity-3");
    assert!(s.entity(&first).unwrap().is_running().unwrap());
    s.shutdown().unwrap();
}

#[test]
fn random_defaults_are_within_bounds() {
    let s = stage();
    let name = s.add_entity().unwrap();
    let info = s.entity(&name).unwrap().info().unwrap();
    assert!((0.5..=2.5).contains(&info.speed));
    assert_eq!((info.speed * 10.0).round(), info.speed * 10.0);
    assert_eq!(info.color.a, 255);
    assert_eq!(info.radius, 5.0);
    assert_eq!(info.emission_rate, 0.5);
    s.shutdown().unwrap();
}

#[test]
fn duplicate_name_is_rejected() {
    let s = stage();
    s.add_entity_with(idle("a")).unwrap();
    assert!(matches!(
        s.add_entity_with(idle("a")),
        Err(FlightError::InvalidEntity(_))
    ));
}

#[test]
fn unknown_names_fail_with_invalid_entity() {
    let s = stage();
    assert!(matches!(s.set_speed("ghost", 1.0), Err(FlightError::InvalidEntity(_))));
    assert!(matches!(s.remove_entity("ghost"), Err(FlightError::InvalidEntity(_))));
    assert!(matches!(s.reset_distance("ghost"), Err(FlightError::InvalidEntity(_))));
    assert!(matches!(
        s.set_running(Target::Named("ghost"), true),
        Err(FlightError::InvalidEntity(_))
    ));
}

#[test]
fn speed_is_clamped_server_side() {
    let s = stage();
    s.add_entity_with(idle("a")).unwrap();
    assert_eq!(s.set_speed("a", 1e9).unwrap(), 10.0);
    assert_eq!(s.set_speed("a", -3.0).unwrap(), 0.1);
    assert_eq!(s.list_entities().unwrap()[0].speed, 0.1);
}

#[test]
fn emission_rate_clamps_finite_and_rejects_nan() {
    let s = stage();
    s.add_entity_with(idle("a")).unwrap();
    s.add_entity_with(idle("b")).unwrap();
    assert_eq!(s.set_emission_rate(Target::All, 0.0).unwrap(), 0.01);
    assert!(s.list_entities().unwrap().iter().all(|i| i.emission_rate == 0.01));
    assert!(matches!(
        s.set_emission_rate(Target::Named("a"), f64::NAN),
        Err(FlightError::OutOfRange(_))
    ));
    assert_eq!(s.set_emission_rate(Target::Named("b"), 2.0).unwrap(), 2.0);
}

#[test]
fn wildcard_running_toggles_everyone() {
    let s = stage();
    s.add_entity_with(idle("a")).unwrap();
    s.add_entity_with(idle("b")).unwrap();
    s.set_running(Target::All, true).unwrap();
    // A second wildcard start skips the already-running entities.
    s.set_running(Target::All, true).unwrap();
    assert!(s.list_entities().unwrap().iter().all(|i| i.running));
    assert!(matches!(
        s.set_running(Target::Named("a"), true),
        Err(FlightError::AlreadyRunning(_))
    ));
    s.set_running(Target::All, false).unwrap();
    assert!(s.list_entities().unwrap().iter().all(|i| !i.running));
    s.shutdown().unwrap();
}

#[test]
fn update_entity_sets_speed_and_color() {
    let s = stage();
    s.add_entity_with(idle("a")).unwrap();
    let stored = s.update_entity("a", 2.5, Rgba8::opaque(1, 2, 3)).unwrap();
    assert_eq!(stored, 2.5);
    let info = s.entity("a").unwrap().info().unwrap();
    assert_eq!(info.color, Rgba8::opaque(1, 2, 3));
}

#[test]
fn failed_regeneration_keeps_previous_path() {
    let s = stage();
    let before = s.path().unwrap();
    let err = s.regenerate_path(&[[0.2, 0.2], [0.2, 0.2]]).unwrap_err();
    assert!(matches!(err, FlightError::DegenerateInput(_)));
    assert!(Arc::ptr_eq(&before, &s.path().unwrap()));
    assert_eq!(s.path_generation(), 0);
    assert!(s.regenerate_path(&[[0.5, 0.5]]).is_err());
}

#[test]
fn regeneration_resets_distance_and_updates_speed_unit() {
    let s = stage();
    s.add_entity_with(idle("a")).unwrap();
    s.entity("a")
        .unwrap()
        .with_state(|st| st.motion.distance = 1.25)
        .unwrap();

    s.regenerate_path(&[[0.1, 0.1], [0.2, 0.1]]).unwrap();
    assert_eq!(s.path_generation(), 1);
    let unit = s.path().unwrap().speed_unit();
    let entity = s.entity("a").unwrap();
    let (distance, speed_unit) = entity
        .with_state(|st| (st.motion.distance, st.motion.speed_unit))
        .unwrap();
    assert_eq!(distance, 0.0);
    assert!((speed_unit - unit).abs() < 1e-12);
    assert!((unit - 0.01).abs() < 1e-6);
}

#[test]
fn remove_entity_joins_updater() {
    let s = stage();
    let name = s.add_entity().unwrap();
    let entity = s.entity(&name).unwrap();
    s.remove_entity(&name).unwrap();
    assert!(!entity.is_running().unwrap());
    assert!(s.list_entities().unwrap().is_empty());
}

#[test]
fn seeded_stages_draw_the_same_path() {
    let a = Stage::new(config()).unwrap();
    let b = Stage::new(config()).unwrap();
    assert_eq!(
        a.path().unwrap().raw_checkpoints(),
        b.path().unwrap().raw_checkpoints()
    );
}

fn assert_units_match_path(s: &Stage) {
    let unit = s.path().unwrap().speed_unit();
    for entity in s.entities().unwrap() {
        let su = entity.with_state(|st| st.motion.speed_unit).unwrap();
        assert_eq!(su, unit, "{} kept a stale speed unit", entity.name());
    }
}

#[test]
fn concurrent_regenerations_leave_units_matching_installed_path() {
    let s = Arc::new(stage());
    for i in 0..40 {
        s.add_entity_with(idle(&format!("e{i}"))).unwrap();
    }
    let short = [[0.1, 0.1], [0.2, 0.1]];
    let long = [[0.1, 0.1], [0.9, 0.1], [0.9, 0.9], [0.1, 0.9]];

    for _ in 0..50 {
        let barrier = Arc::new(std::sync::Barrier::new(2));
        let workers = [&short[..], &long[..]].map(|pts| {
            let s = Arc::clone(&s);
            let barrier = Arc::clone(&barrier);
            let pts = pts.to_vec();
            std::thread::spawn(move || {
                barrier.wait();
                s.regenerate_path(&pts).unwrap();
            })
        });
        for w in workers {
            w.join().unwrap();
        }
        assert_units_match_path(&s);
    }
    s.shutdown().unwrap();
}

#[test]
fn entity_added_during_regeneration_gets_installed_unit() {
    let s = Arc::new(stage());
    for round in 0..50 {
        let barrier = Arc::new(std::sync::Barrier::new(2));
        let regen = {
            let s = Arc::clone(&s);
            let barrier = Arc::clone(&barrier);
            let pts = if round % 2 == 0 {
                vec![[0.1, 0.1], [0.2, 0.1]]
            } else {
                vec![[0.1, 0.1], [0.9, 0.1], [0.9, 0.9]]
            };
            std::thread::spawn(move || {
                barrier.wait();
                s.regenerate_path(&pts).unwrap();
            })
        };
        barrier.wait();
        s.add_entity_with(idle(&format!("late-{round}"))).unwrap();
        regen.join().unwrap();
        assert_units_match_path(&s);
    }
    s.shutdown().unwrap();
}
