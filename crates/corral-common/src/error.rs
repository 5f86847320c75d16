//! Error types for corral

use thiserror::Error;

/// Result type alias for corral operations
pub type Result<T> = std::result::Result<T, DatabaseError>;

/// Boxed driver error, retained as the cause of a translated failure
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Unified error type for the database layer
///
/// Only two situations produce a translated error: a failed connect call
/// (`Connection`) and a model resolution that found no schema
/// (`SchemaNotDefined`). Everything else the driver raises passes through
/// untouched via the transparent `Driver` variant.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// The driver's connect call failed
    #[error("failed to connect to database: {message}")]
    Connection {
        message: String,
        #[source]
        cause: Option<BoxError>,
    },

    /// Model resolution reached a descriptor with no schema attached
    #[error(
        "cannot register the model \"{0}\": schema is not defined. \
         Associate a schema through ModelDef::schema or SchemaBuilder before registration"
    )]
    SchemaNotDefined(String),

    /// A driver-side failure forwarded without translation
    #[error(transparent)]
    Driver(BoxError),

    /// Fallback when no further detail is available
    #[error("unknown database error")]
    Unknown,
}

impl Default for DatabaseError {
    fn default() -> Self {
        DatabaseError::Unknown
    }
}

impl DatabaseError {
    /// Wraps a driver connect failure, keeping its message and cause
    pub fn connection(cause: impl Into<BoxError>) -> Self {
        let cause = cause.into();
        DatabaseError::Connection {
            message: cause.to_string(),
            cause: Some(cause),
        }
    }

    /// Forwards a driver error without translation
    pub fn driver(cause: impl Into<BoxError>) -> Self {
        DatabaseError::Driver(cause.into())
    }

    /// Builds the no-schema resolution error for the given model name
    pub fn schema_not_defined(name: impl Into<String>) -> Self {
        DatabaseError::SchemaNotDefined(name.into())
    }

    /// Returns true if this error wraps a failed connect call
    pub fn is_connection(&self) -> bool {
        matches!(self, DatabaseError::Connection { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_connection_display() {
        let err = DatabaseError::connection("connection refused".to_string());
        assert_eq!(
            err.to_string(),
            "failed to connect to database: connection refused"
        );
        assert!(err.is_connection());
    }

    #[test]
    fn test_connection_keeps_cause() {
        let io_err = std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused");
        let err = DatabaseError::connection(io_err);
        let cause = err.source().expect("cause should be retained");
        assert!(cause.to_string().contains("refused"));
    }

    #[test]
    fn test_schema_not_defined_display() {
        let err = DatabaseError::schema_not_defined("User");
        let message = err.to_string();
        assert!(message.contains("schema is not defined"));
        assert!(message.contains("\"User\""));
    }

    #[test]
    fn test_driver_passthrough_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe closed");
        let err = DatabaseError::driver(io_err);
        // Transparent: the driver's own message, nothing prepended
        assert_eq!(err.to_string(), "pipe closed");
    }

    #[test]
    fn test_default_message_fallback() {
        let err = DatabaseError::default();
        assert!(err.to_string().contains("database error"));
    }

    #[test]
    fn test_result_type() {
        let ok: Result<i32> = Ok(42);
        assert_eq!(ok.unwrap(), 42);

        let err: Result<i32> = Err(DatabaseError::schema_not_defined("Order"));
        assert!(err.is_err());
    }
}
