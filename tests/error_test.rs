use std::io;

use stencil::error::Error;

#[test]
fn test_error_conversion() {
    let io_err = io::Error::new(io::ErrorKind::NotFound, "file not found");
    let err: Error = io_err.into();

    match err {
        Error::IoError(_) => (),
        _ => panic!("Expected IoError variant"),
    }
}

#[test]
fn test_error_display() {
    let err = Error::ConfigError("invalid plan".to_string());
    assert_eq!(err.to_string(), "Configuration error: invalid plan.");

    let err = Error::MissingGeneratorError;
    assert_eq!(err.to_string(), "Missing generator argument.");

    let err = Error::SourceAcquisitionError {
        command: "npm install some-generator".to_string(),
        status: 1,
    };
    assert_eq!(
        err.to_string(),
        "Source acquisition failed: 'npm install some-generator' exited with status 1."
    );
}
