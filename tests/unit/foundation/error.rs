use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        FlightError::degenerate_input("x")
            .to_string()
            .contains("degenerate input:")
    );
    assert!(
        FlightError::invalid_entity("x")
            .to_string()
            .contains("invalid entity:")
    );
    assert!(
        FlightError::out_of_range("x")
            .to_string()
            .contains("out of range:")
    );
    assert!(
        FlightError::already_running("x")
            .to_string()
            .contains("already running:")
    );
    assert!(
        FlightError::lookup_miss("x")
            .to_string()
            .contains("lookup miss:")
    );
    assert!(
        FlightError::protocol("x")
            .to_string()
            .contains("protocol error:")
    );
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = FlightError::from(base);
    assert!(err.to_string().contains("boom"));
}

#[test]
fn recoverable_kinds() {
    assert!(FlightError::already_running("e").is_recoverable());
    assert!(FlightError::out_of_range("e").is_recoverable());
    assert!(!FlightError::degenerate_input("e").is_recoverable());
    assert!(!FlightError::invalid_entity("e").is_recoverable());
}

#[test]
fn json_errors_map_to_serde() {
    let err: FlightError = serde_json::from_str::<u32>("nope").unwrap_err().into();
    assert!(matches!(err, FlightError::Serde(_)));
}
