//! Error types for ferro-bed
//!
//! Errors fall into three classes:
//! - input validation (malformed coordinates, unknown assembly), surfaced to
//!   the caller as a rejected request
//! - upstream failures (transport, HTTP status, malformed payloads), logged
//!   and converted into a skipped identifier by the resolver
//! - storage and I/O failures from the local cache

use std::fmt;
use thiserror::Error;

/// Error codes for categorizing errors
///
/// These codes can be used for programmatic error handling
/// and for documentation lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum ErrorCode {
    // Input errors (E1xxx)
    /// Coordinate string does not match `[chr]N:start-end`
    InvalidCoordinateFormat = 1001,
    /// Coordinate start is not less than end
    InvalidCoordinateRange = 1002,
    /// Assembly is neither GRCh37 nor GRCh38
    InvalidAssembly = 1003,
    /// Configuration value is unusable
    InvalidConfig = 1004,

    // Upstream errors (E2xxx)
    /// Request could not be sent or timed out
    HttpTransport = 2001,
    /// Upstream answered with a non-success status
    HttpStatus = 2002,
    /// Upstream payload did not have the expected shape
    MalformedResponse = 2003,

    // Storage errors (E3xxx)
    /// Cache database failure
    Storage = 3001,

    // IO errors (E9xxx)
    /// File IO error
    IoError = 9001,
    /// JSON parsing error
    JsonError = 9002,
}

impl ErrorCode {
    /// Get the error code as a string (e.g., "E1001")
    pub fn as_str(&self) -> String {
        format!("E{:04}", *self as u16)
    }

    /// Get a brief description of this error code
    pub fn description(&self) -> &'static str {
        match self {
            ErrorCode::InvalidCoordinateFormat => "invalid coordinate format",
            ErrorCode::InvalidCoordinateRange => "start must be less than end",
            ErrorCode::InvalidAssembly => "unsupported assembly",
            ErrorCode::InvalidConfig => "invalid configuration",
            ErrorCode::HttpTransport => "HTTP request failed",
            ErrorCode::HttpStatus => "unexpected HTTP status",
            ErrorCode::MalformedResponse => "malformed upstream response",
            ErrorCode::Storage => "cache storage error",
            ErrorCode::IoError => "file I/O error",
            ErrorCode::JsonError => "JSON parsing error",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Why a coordinate string was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordinateErrorKind {
    /// Did not match the accepted pattern
    Format,
    /// Start was greater than or equal to end
    Range,
}

/// Main error type for ferro-bed operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BedError {
    /// Coordinate text failed validation
    #[error("Invalid coordinates '{input}': {msg}")]
    InvalidCoordinates {
        input: String,
        kind: CoordinateErrorKind,
        msg: String,
    },

    /// Assembly selector is not one of the supported builds
    #[error("Invalid assembly: {value} (expected GRCh37 or GRCh38)")]
    InvalidAssembly { value: String },

    /// Configuration could not be used
    #[error("Invalid configuration: {msg}")]
    InvalidConfig { msg: String },

    /// Request could not be completed (connection, timeout, ...)
    #[error("{service} request {}: {msg}", request_outcome(.timed_out))]
    Http {
        service: String,
        msg: String,
        timed_out: bool,
    },

    /// Upstream answered with a non-success status
    #[error("{service} returned HTTP {status}")]
    HttpStatus { service: String, status: u16 },

    /// Upstream payload did not decode
    #[error("{service} returned a malformed response: {msg}")]
    MalformedResponse { service: String, msg: String },

    /// Cache database error
    #[error("Storage error: {msg}")]
    Storage { msg: String },

    /// IO error (for file operations)
    #[error("IO error: {msg}")]
    Io { msg: String },

    /// JSON error
    #[error("JSON error: {msg}")]
    Json { msg: String },
}

fn request_outcome(timed_out: &bool) -> &'static str {
    if *timed_out {
        "timed out"
    } else {
        "failed"
    }
}

impl BedError {
    /// Create a coordinate format error
    pub fn coordinate_format(input: impl Into<String>) -> Self {
        BedError::InvalidCoordinates {
            input: input.into(),
            kind: CoordinateErrorKind::Format,
            msg: "invalid format, expected [chr]<1-23>:<start>-<end>".to_string(),
        }
    }

    /// Create a coordinate range error
    pub fn coordinate_range(input: impl Into<String>) -> Self {
        BedError::InvalidCoordinates {
            input: input.into(),
            kind: CoordinateErrorKind::Range,
            msg: "start must be less than end".to_string(),
        }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            BedError::InvalidCoordinates {
                kind: CoordinateErrorKind::Format,
                ..
            } => ErrorCode::InvalidCoordinateFormat,
            BedError::InvalidCoordinates {
                kind: CoordinateErrorKind::Range,
                ..
            } => ErrorCode::InvalidCoordinateRange,
            BedError::InvalidAssembly { .. } => ErrorCode::InvalidAssembly,
            BedError::InvalidConfig { .. } => ErrorCode::InvalidConfig,
            BedError::Http { .. } => ErrorCode::HttpTransport,
            BedError::HttpStatus { .. } => ErrorCode::HttpStatus,
            BedError::MalformedResponse { .. } => ErrorCode::MalformedResponse,
            BedError::Storage { .. } => ErrorCode::Storage,
            BedError::Io { .. } => ErrorCode::IoError,
            BedError::Json { .. } => ErrorCode::JsonError,
        }
    }

    /// True for errors caused by the request itself rather than a dependency
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            BedError::InvalidCoordinates { .. } | BedError::InvalidAssembly { .. }
        )
    }

    /// True for errors raised by an upstream web service
    pub fn is_upstream_error(&self) -> bool {
        matches!(
            self,
            BedError::Http { .. } | BedError::HttpStatus { .. } | BedError::MalformedResponse { .. }
        )
    }

    /// Whether the request hit the configured timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, BedError::Http { timed_out: true, .. })
    }

    /// Message prefixed with the error code, e.g. `[E1002] ...`
    pub fn detailed_message(&self) -> String {
        format!("[{}] {}", self.code(), self)
    }
}

impl From<std::io::Error> for BedError {
    fn from(err: std::io::Error) -> Self {
        BedError::Io {
            msg: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for BedError {
    fn from(err: serde_json::Error) -> Self {
        BedError::Json {
            msg: err.to_string(),
        }
    }
}

impl From<rusqlite::Error> for BedError {
    fn from(err: rusqlite::Error) -> Self {
        BedError::Storage {
            msg: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_as_str() {
        assert_eq!(ErrorCode::InvalidCoordinateFormat.as_str(), "E1001");
        assert_eq!(ErrorCode::InvalidAssembly.as_str(), "E1003");
        assert_eq!(ErrorCode::HttpStatus.as_str(), "E2002");
        assert_eq!(ErrorCode::Storage.as_str(), "E3001");
        assert_eq!(ErrorCode::JsonError.as_str(), "E9002");
    }

    #[test]
    fn test_coordinate_errors() {
        let err = BedError::coordinate_range("1:300-200");
        assert_eq!(err.code(), ErrorCode::InvalidCoordinateRange);
        assert!(err.to_string().contains("start must be less than end"));
        assert!(err.is_input_error());

        let err = BedError::coordinate_format("25:1-2");
        assert_eq!(err.code(), ErrorCode::InvalidCoordinateFormat);
        assert!(err.to_string().contains("invalid format"));
    }

    #[test]
    fn test_upstream_classification() {
        let err = BedError::HttpStatus {
            service: "VEP".to_string(),
            status: 503,
        };
        assert!(err.is_upstream_error());
        assert!(!err.is_input_error());
        assert_eq!(err.to_string(), "VEP returned HTTP 503");
    }

    #[test]
    fn test_http_timeout() {
        let err = BedError::Http {
            service: "Tark".to_string(),
            msg: "operation timed out after 30s".to_string(),
            timed_out: true,
        };
        assert!(err.is_timeout());
        assert!(err.to_string().starts_with("Tark request timed out: "));

        let err = BedError::Http {
            service: "Tark".to_string(),
            msg: "connection refused".to_string(),
            timed_out: false,
        };
        assert!(!err.is_timeout());
        assert_eq!(err.to_string(), "Tark request failed: connection refused");
    }

    #[test]
    fn test_detailed_message() {
        let err = BedError::InvalidAssembly {
            value: "hg19".to_string(),
        };
        assert_eq!(
            err.detailed_message(),
            "[E1003] Invalid assembly: hg19 (expected GRCh37 or GRCh38)"
        );
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: BedError = io.into();
        assert_eq!(err.code(), ErrorCode::IoError);
    }
}
