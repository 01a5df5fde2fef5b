use apsema::error::ApsError;

#[test]
fn fetch_error_constructors() {
    assert!(matches!(ApsError::timeout("x"), ApsError::Timeout { .. }));
    assert!(matches!(
        ApsError::transport("x"),
        ApsError::Transport { .. }
    ));
    assert!(matches!(ApsError::parse("x"), ApsError::Parse { .. }));
    assert!(matches!(
        ApsError::application(7, "x"),
        ApsError::Application { code: 7, .. }
    ));
}

#[test]
fn lifecycle_error_constructors() {
    assert!(matches!(
        ApsError::update_failed("x"),
        ApsError::UpdateFailed { .. }
    ));
    assert!(matches!(ApsError::not_ready("x"), ApsError::NotReady { .. }));
    assert!(matches!(
        ApsError::empty_sequence("power"),
        ApsError::EmptySequence { .. }
    ));
    assert!(matches!(ApsError::config("x"), ApsError::Config { .. }));
    assert!(matches!(
        ApsError::validation("f", "m"),
        ApsError::Validation { .. }
    ));
    assert!(matches!(ApsError::io("x"), ApsError::Io { .. }));
}

#[test]
fn application_is_not_transport() {
    let e = ApsError::application(1001, "quota exceeded");
    assert!(!matches!(e, ApsError::Transport { .. }));
    assert!(e.to_string().contains("Application error"));
}
