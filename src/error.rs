//! Errors reported by the test-support helpers.

use std::path::PathBuf;
use std::{fmt, io};

use chrono::NaiveDate;

//------------ TestkitIoError ------------------------------------------------

/// An IO error with context about the operation that failed.
#[derive(Debug)]
pub struct TestkitIoError {
    context: String,
    cause: io::Error,
}

impl TestkitIoError {
    pub fn new(context: String, cause: io::Error) -> Self {
        TestkitIoError { context, cause }
    }
}

impl fmt::Display for TestkitIoError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}, underlying error: {}", self.context, self.cause)
    }
}

impl std::error::Error for TestkitIoError {}

//------------ Error ---------------------------------------------------------

/// All errors the helpers can report.
///
/// Errors propagate immediately to the enclosing test. Nothing is caught
/// or retried here; the surrounding test framework reports the failure
/// and moves on to the next case.
#[derive(Debug)]
pub enum Error {
    /// The service reported a different grace period than expected.
    FlexDaysMismatch { expected: u32, found: u32 },

    /// The certificate expires on the wrong calendar date.
    CertEndDateMismatch { expected: NaiveDate, found: NaiveDate },

    /// The order end date recorded in the certificate extension is off.
    OrderEndDateMismatch { expected: NaiveDate, found: NaiveDate },

    /// The certificate does not carry the requested extension.
    MissingExtension(String),

    /// An extension value could not be parsed as a calendar date.
    ExtensionDateInvalid(String),

    /// The certificate payload could not be decoded.
    CertDecode(String),

    /// The export operation did not produce an archive on disk.
    MissingArchive(PathBuf),

    /// The outer archive did not contain the nested consumer export.
    MissingNestedArchive(PathBuf),

    /// A record violated the HATEOAS serialization contract.
    HateoasViolation(String),

    /// The service rejected a request.
    ApiFailure(String),

    JsonError(serde_json::Error),

    ZipError(zip::result::ZipError),

    IoError(TestkitIoError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Error::FlexDaysMismatch { expected, found } => write!(
                f,
                "Expected flex expiry of {} days, service reported {}",
                expected, found
            ),
            Error::CertEndDateMismatch { expected, found } => write!(
                f,
                "Certificate expires on {}, expected {}",
                found, expected
            ),
            Error::OrderEndDateMismatch { expected, found } => write!(
                f,
                "Order end date extension holds {}, expected {}",
                found, expected
            ),
            Error::MissingExtension(oid) => {
                write!(f, "Certificate has no extension with OID {}", oid)
            }
            Error::ExtensionDateInvalid(value) => {
                write!(f, "Cannot parse extension value '{}' as a date", value)
            }
            Error::CertDecode(msg) => {
                write!(f, "Cannot decode certificate: {}", msg)
            }
            Error::MissingArchive(path) => write!(
                f,
                "Export did not produce an archive: {}",
                path.to_string_lossy()
            ),
            Error::MissingNestedArchive(path) => write!(
                f,
                "Export does not contain a nested archive: {}",
                path.to_string_lossy()
            ),
            Error::HateoasViolation(json) => {
                write!(f, "Record is not a HATEOAS reference: {}", json)
            }
            Error::ApiFailure(msg) => msg.fmt(f),
            Error::JsonError(e) => write!(f, "Invalid JSON: {}", e),
            Error::ZipError(e) => write!(f, "Invalid archive: {}", e),
            Error::IoError(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for Error {}

impl From<TestkitIoError> for Error {
    fn from(e: TestkitIoError) -> Self {
        Error::IoError(e)
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::JsonError(e)
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(e: zip::result::ZipError) -> Self {
        Error::ZipError(e)
    }
}
