use derive_more::Display;
use docpipe_config::ConfigError;
use docpipe_core::error::{ErrorClass, ErrorOrigin as CoreErrorOrigin, InternalError};
use serde::{Deserialize, Serialize};
use thiserror::Error as ThisError;

///
/// Error
/// Public error type with a stable kind + origin taxonomy.
///

#[derive(Debug, Deserialize, Serialize, ThisError)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub origin: ErrorOrigin,
    pub message: String,
}

impl Error {
    pub fn new(kind: ErrorKind, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
        }
    }

    /// True when the same work item may succeed if delivered again.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self.kind, ErrorKind::Transient)
    }
}

impl From<InternalError> for Error {
    fn from(err: InternalError) -> Self {
        let kind = match err.class {
            ErrorClass::InvalidInput => ErrorKind::InvalidTask(InvalidTaskKind::Malformed),
            ErrorClass::InvalidChangeLog => ErrorKind::InvalidTask(InvalidTaskKind::ChangeLog),
            ErrorClass::Unsupported => ErrorKind::InvalidTask(InvalidTaskKind::Unsupported),
            ErrorClass::Transient => ErrorKind::Transient,
            ErrorClass::Interrupted => ErrorKind::Interrupted,
            ErrorClass::InvariantViolation | ErrorClass::Internal => ErrorKind::Internal,
        };

        Self::new(kind, err.origin.into(), err.message)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::new(ErrorKind::Config, ErrorOrigin::Config, err.to_string())
    }
}

///
/// ErrorKind
/// Public error taxonomy for callers and host runtimes.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ErrorKind {
    /// The work item can never succeed as sent.
    InvalidTask(InvalidTaskKind),

    /// Retry later.
    Transient,

    /// Cooperative cancellation; nothing was acknowledged.
    Interrupted,

    /// The worker configuration is unusable.
    Config,

    /// The caller cannot remediate this.
    Internal,
}

///
/// InvalidTaskKind
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum InvalidTaskKind {
    /// Payload could not be decoded, or its classifier/version is unknown.
    Malformed,

    /// A change-log entry does not fit the document it is replayed on.
    ChangeLog,

    /// The task asks for something this output shape cannot express.
    Unsupported,
}

///
/// ErrorOrigin
/// Public origin taxonomy.
///

#[derive(Clone, Copy, Debug, Deserialize, Display, Eq, PartialEq, Serialize)]
pub enum ErrorOrigin {
    Batch,
    ChangeLog,
    Config,
    Emit,
    Hook,
    Resolver,
    Runtime,
    Serialize,
    Task,
    View,
    Worker,
}

impl From<CoreErrorOrigin> for ErrorOrigin {
    fn from(origin: CoreErrorOrigin) -> Self {
        match origin {
            CoreErrorOrigin::Batch => Self::Batch,
            CoreErrorOrigin::ChangeLog => Self::ChangeLog,
            CoreErrorOrigin::Emit => Self::Emit,
            CoreErrorOrigin::Hook => Self::Hook,
            CoreErrorOrigin::Resolver => Self::Resolver,
            CoreErrorOrigin::Runtime => Self::Runtime,
            CoreErrorOrigin::Serialize => Self::Serialize,
            CoreErrorOrigin::Task => Self::Task,
            CoreErrorOrigin::View => Self::View,
            CoreErrorOrigin::Worker => Self::Worker,
        }
    }
}

///
/// TESTS
///
