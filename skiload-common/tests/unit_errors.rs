use skiload_common::SkiLoadError;

#[test]
fn test_network_error() {
    let err = SkiLoadError::NetworkError("connection failed".to_string());
    assert_eq!(err.to_string(), "Network error: connection failed");
}

#[test]
fn test_error_equality() {
    let err1 = SkiLoadError::Persistence("disk full".to_string());
    let err2 = SkiLoadError::Persistence("disk full".to_string());
    let err3 = SkiLoadError::Persistence("read-only".to_string());

    assert_eq!(err1, err2);
    assert_ne!(err1, err3);
}

#[test]
fn test_invalid_config() {
    let err = SkiLoadError::InvalidConfig("max_threads must be in 4..=256, got 2".to_string());
    assert_eq!(
        err.to_string(),
        "Invalid configuration: max_threads must be in 4..=256, got 2"
    );
}

#[test]
fn test_persistence_error() {
    let err = SkiLoadError::Persistence("cannot create out.csv".to_string());
    assert_eq!(err.to_string(), "Persistence failure: cannot create out.csv");
}

#[test]
fn test_malformed_record() {
    let err = SkiLoadError::MalformedRecord("line 3: expected 5 fields".to_string());
    assert_eq!(err.to_string(), "Malformed record: line 3: expected 5 fields");
}
