use crate::changelog::ChangeLogError;
use std::fmt;
use thiserror::Error as ThisError;

///
/// InternalError
///
/// Structured runtime error with a stable internal classification.
/// The class decides how a work item is disposed of; the origin names the
/// subsystem that raised it.
///

#[derive(Debug, ThisError)]
#[error("{message}")]
pub struct InternalError {
    pub class: ErrorClass,
    pub origin: ErrorOrigin,
    pub message: String,

    /// Optional structured error detail.
    /// The variant (if present) must correspond to `origin`.
    pub detail: Option<ErrorDetail>,
}

impl InternalError {
    /// Construct an InternalError without structured detail.
    pub fn new(class: ErrorClass, origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self {
            class,
            origin,
            message: message.into(),
            detail: None,
        }
    }

    /// Construct an invalid-input error for a malformed or unsupported work item.
    pub fn invalid_input(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvalidInput, origin, message)
    }

    /// Construct a transient error; the owning work item should be retried.
    pub fn transient(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Transient, origin, message)
    }

    /// Construct an interruption; nothing is acknowledged or retried.
    pub fn interrupted(origin: ErrorOrigin) -> Self {
        Self::new(ErrorClass::Interrupted, origin, "operation interrupted")
    }

    /// Construct an unsupported-operation error.
    pub(crate) fn unsupported(origin: ErrorOrigin, message: impl Into<String>) -> Self {
        Self::new(ErrorClass::Unsupported, origin, message)
    }

    /// Construct a view-origin invariant violation.
    pub(crate) fn view_invariant(message: impl Into<String>) -> Self {
        Self::new(ErrorClass::InvariantViolation, ErrorOrigin::View, message)
    }

    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self.class, ErrorClass::Transient)
    }

    #[must_use]
    pub const fn is_interrupted(&self) -> bool {
        matches!(self.class, ErrorClass::Interrupted)
    }

    /// True when the work item itself is bad and must not be retried.
    #[must_use]
    pub const fn is_invalid_task(&self) -> bool {
        matches!(
            self.class,
            ErrorClass::InvalidInput | ErrorClass::InvalidChangeLog
        )
    }

    /// Return the replay failure carried as detail, if any.
    #[must_use]
    pub const fn change_log_error(&self) -> Option<&ChangeLogError> {
        match &self.detail {
            Some(ErrorDetail::ChangeLog(err)) => Some(err),
            None => None,
        }
    }

    #[must_use]
    pub fn display_with_class(&self) -> String {
        format!("{}:{}: {}", self.origin, self.class, self.message)
    }
}

///
/// ErrorDetail
///
/// Structured, origin-specific error detail carried by [`InternalError`].
///

#[derive(Debug, ThisError)]
pub enum ErrorDetail {
    #[error("{0}")]
    ChangeLog(ChangeLogError),
}

impl From<ChangeLogError> for InternalError {
    fn from(err: ChangeLogError) -> Self {
        Self {
            class: ErrorClass::InvalidChangeLog,
            origin: ErrorOrigin::ChangeLog,
            message: format!("invalid change log: {err}"),
            detail: Some(ErrorDetail::ChangeLog(err)),
        }
    }
}

///
/// ErrorClass
/// Internal error taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorClass {
    InvalidInput,
    InvalidChangeLog,
    Transient,
    Interrupted,
    Unsupported,
    InvariantViolation,
    Internal,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::InvalidInput => "invalid_input",
            Self::InvalidChangeLog => "invalid_change_log",
            Self::Transient => "transient",
            Self::Interrupted => "interrupted",
            Self::Unsupported => "unsupported",
            Self::InvariantViolation => "invariant_violation",
            Self::Internal => "internal",
        };
        write!(f, "{label}")
    }
}

///
/// ErrorOrigin
/// Internal origin taxonomy for runtime classification.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorOrigin {
    Serialize,
    ChangeLog,
    View,
    Emit,
    Batch,
    Task,
    Hook,
    Worker,
    Resolver,
    Runtime,
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Serialize => "serialize",
            Self::ChangeLog => "change_log",
            Self::View => "view",
            Self::Emit => "emit",
            Self::Batch => "batch",
            Self::Task => "task",
            Self::Hook => "hook",
            Self::Worker => "worker",
            Self::Resolver => "resolver",
            Self::Runtime => "runtime",
        };
        write!(f, "{label}")
    }
}

///
/// TESTS
///
