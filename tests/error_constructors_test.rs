use octodash::error::OctodashError;

#[test]
fn error_constructors_group_1() {
    assert!(matches!(
        OctodashError::config("x"),
        OctodashError::Config { .. }
    ));
    assert!(matches!(
        OctodashError::cache("x"),
        OctodashError::Cache { .. }
    ));
    assert!(matches!(
        OctodashError::display("x"),
        OctodashError::Display { .. }
    ));
}

#[test]
fn error_constructors_group_2() {
    let ser = OctodashError::Serialization {
        message: "s".into(),
    };
    assert!(matches!(ser, OctodashError::Serialization { .. }));
    assert!(matches!(OctodashError::io("x"), OctodashError::Io { .. }));
    assert!(matches!(
        OctodashError::network("x"),
        OctodashError::Network { .. }
    ));
    assert!(matches!(OctodashError::api("x"), OctodashError::Api { .. }));
}

#[test]
fn error_constructors_group_3() {
    assert!(matches!(
        OctodashError::validation("f", "m"),
        OctodashError::Validation { .. }
    ));
    assert!(matches!(
        OctodashError::timeout("x"),
        OctodashError::Timeout { .. }
    ));
}

#[test]
fn io_errors_convert() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
    let e: OctodashError = io.into();
    assert!(matches!(e, OctodashError::Io { .. }));
    assert!(!e.is_transient());
}

#[test]
fn display_messages() {
    let e = OctodashError::validation("field", "bad");
    let s = format!("{}", e);
    assert!(s.contains("Validation error"));
}
