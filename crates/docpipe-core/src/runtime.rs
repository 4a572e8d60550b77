//! Module: runtime
//! Responsibility: the work-item and response contract with the host queue.
//! Does not own: decoding payloads or choosing response content.
//! Boundary: the host delivers items through [`WorkItemSource`] and receives
//! exactly one [`TaskResponse`] per answered item through [`ResponseSink`].

use crate::{
    EXCEPTION_CLASSIFIER, TASK_API_VERSION,
    error::{ErrorOrigin, InternalError},
    obs::sink::{self, MetricsEvent},
};
use derive_more::Display;
use std::time::Duration;
use thiserror::Error as ThisError;

///
/// WorkItem
///
/// One message pulled from the input queue.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WorkItem {
    pub id: String,
    pub classifier: String,
    pub version: u32,
    pub payload: Vec<u8>,
}

impl WorkItem {
    pub fn new(
        id: impl Into<String>,
        classifier: impl Into<String>,
        version: u32,
        payload: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            id: id.into(),
            classifier: classifier.into(),
            version,
            payload: payload.into(),
        }
    }
}

///
/// TaskStatus
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum TaskStatus {
    #[display("RESULT_SUCCESS")]
    ResultSuccess,
    #[display("RESULT_EXCEPTION")]
    ResultException,
    #[display("INVALID_TASK")]
    InvalidTask,
    #[display("RETRY")]
    Retry,
}

///
/// TaskResponse
///
/// The single answer to one work item. `queue` is `None` when the host
/// should route the response on its own (retries and invalid tasks).
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TaskResponse {
    pub queue: Option<String>,
    pub status: TaskStatus,
    pub payload: Vec<u8>,
    pub classifier: String,
    pub version: u32,
}

impl TaskResponse {
    /// The item is malformed or unsupported; it will never succeed.
    #[must_use]
    pub fn invalid_task(message: &str) -> Self {
        Self {
            queue: None,
            status: TaskStatus::InvalidTask,
            payload: message.as_bytes().to_vec(),
            classifier: EXCEPTION_CLASSIFIER.to_string(),
            version: TASK_API_VERSION,
        }
    }

    /// The item hit a transient condition; the host should redeliver it.
    #[must_use]
    pub fn retry(message: &str) -> Self {
        Self {
            queue: None,
            status: TaskStatus::Retry,
            payload: message.as_bytes().to_vec(),
            classifier: EXCEPTION_CLASSIFIER.to_string(),
            version: TASK_API_VERSION,
        }
    }

    /// Payload as text, for logging and tests.
    #[must_use]
    pub fn payload_text(&self) -> std::borrow::Cow<'_, str> {
        String::from_utf8_lossy(&self.payload)
    }
}

///
/// TaskOutcome
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TaskOutcome {
    /// The item was answered with this status.
    Responded(TaskStatus),

    /// Processing was interrupted; the item is returned unanswered.
    Unanswered(WorkItem),
}

///
/// Interrupted
///
/// The current wait or operation was interrupted by the host.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, ThisError)]
#[error("interrupted while waiting for work")]
pub struct Interrupted;

impl From<Interrupted> for InternalError {
    fn from(_: Interrupted) -> Self {
        Self::interrupted(ErrorOrigin::Runtime)
    }
}

///
/// WorkItemSource
///

pub trait WorkItemSource {
    /// Wait up to `max_wait` for the next item. `Ok(None)` means the wait
    /// timed out with nothing available.
    fn pull_next(&mut self, max_wait: Duration) -> Result<Option<WorkItem>, Interrupted>;
}

///
/// ResponseSink
///

pub trait ResponseSink {
    /// Acknowledge `item` with `response`. Called at most once per item.
    fn respond(&mut self, item: WorkItem, response: TaskResponse);
}

/// Hand a response to the sink and count it.
pub(crate) fn deliver(sink: &mut dyn ResponseSink, item: WorkItem, response: TaskResponse) {
    tracing::debug!(
        item = %item.id,
        status = %response.status,
        queue = response.queue.as_deref().unwrap_or("-"),
        "work item answered"
    );
    sink::record(MetricsEvent::TaskFinish {
        status: response.status,
    });
    sink.respond(item, response);
}
