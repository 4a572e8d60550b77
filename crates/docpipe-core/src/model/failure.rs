use serde::{Deserialize, Serialize};
use std::{error::Error, fmt::Write as _};

///
/// Failure
///
/// A failure recorded against a document. Immutable once created.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Failure {
    failure_id: String,
    failure_message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    failure_stack: Option<String>,
}

impl Failure {
    pub fn new(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            failure_id: id.into(),
            failure_message: message.into(),
            failure_stack: None,
        }
    }

    /// Build a failure whose message and stack come from an error and its sources.
    pub fn from_error(id: impl Into<String>, err: &(dyn Error + 'static)) -> Self {
        Self::new(id, err.to_string()).with_stack(render_error_chain(err))
    }

    #[must_use]
    pub fn with_stack(mut self, stack: impl Into<String>) -> Self {
        self.failure_stack = Some(stack.into());
        self
    }

    /// Machine identifier; not localised.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.failure_id
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.failure_message
    }

    #[must_use]
    pub fn stack(&self) -> Option<&str> {
        self.failure_stack.as_deref()
    }
}

/// Render an error followed by every `source()` beneath it, one per line.
pub(crate) fn render_error_chain(err: &(dyn Error + 'static)) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(out, "\ncaused by: {cause}");
        source = cause.source();
    }

    out
}
