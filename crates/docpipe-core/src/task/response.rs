use crate::{
    DOCUMENT_TASK_CLASSIFIER, EXCEPTION_CLASSIFIER, FIELD_TASK_CLASSIFIER, TASK_API_VERSION,
    changelog::{self, ChangeLogEntry},
    emit::{FieldResultBuilder, changes_of, record_changes},
    error::InternalError,
    model::{Snapshot, render_error_chain},
    obs::sink::{self, MetricsEvent},
    runtime::{TaskResponse, TaskStatus},
    serialize::serialize,
    settings::WorkerSettings,
    task::{DocumentTaskMessage, GENERAL_FAILURE_ID, PROCESSING_FAILED_ID, Task, TaskKind},
};
use std::{collections::BTreeMap, error::Error};
use tracing::warn;

///
/// ResponseOptions
///
/// Worker-controlled overrides for the response of one task.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ResponseOptions {
    queue: Option<String>,
    custom_data: BTreeMap<String, String>,
}

impl ResponseOptions {
    /// Send the response to `queue` regardless of success or failure.
    pub fn redirect_to(&mut self, queue: impl Into<String>) -> &mut Self {
        self.queue = Some(queue.into());
        self
    }

    #[must_use]
    pub fn queue(&self) -> Option<&str> {
        self.queue.as_deref()
    }

    /// Attach a key/value pair to the response.
    pub fn set_custom_data(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.custom_data.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub const fn custom_data(&self) -> &BTreeMap<String, String> {
        &self.custom_data
    }
}

impl Task {
    /// Build the response for the current state of the view.
    pub fn build_response(&self, settings: &WorkerSettings) -> Result<TaskResponse, InternalError> {
        match self.kind {
            TaskKind::Document => self.document_response(settings),
            TaskKind::FieldEnrichment => self.field_response(settings),
        }
    }

    /// Response for a task whose processing ended normally. A response that
    /// cannot be built is reported as a general failure instead.
    pub(crate) fn complete(&mut self, settings: &WorkerSettings) -> TaskResponse {
        match self.build_response(settings) {
            Ok(response) => response,
            Err(err) => self.general_failure(&err, settings),
        }
    }

    /// Convert a non-transient worker failure into a response.
    ///
    /// Document tasks record it as a soft failure on the root and still
    /// succeed; field tasks answer with an exception.
    pub(crate) fn general_failure(
        &mut self,
        err: &(dyn Error + 'static),
        settings: &WorkerSettings,
    ) -> TaskResponse {
        warn!(item = %self.item.id, kind = %self.kind, error = %err, "worker failure recorded");

        if self.kind == TaskKind::Document {
            self.root()
                .failures()
                .add_with_cause(GENERAL_FAILURE_ID, err.to_string(), err);

            if let Ok(response) = self.document_response(settings) {
                return response;
            }
        }

        self.exception(settings, render_error_chain(err))
    }

    /// Response for a message that exhausted its delivery attempts.
    pub(crate) fn poisoned(&mut self, friendly_name: &str, settings: &WorkerSettings) -> TaskResponse {
        self.root().failures().add(
            PROCESSING_FAILED_ID,
            format!("{friendly_name} max processing attempts exceeded."),
        );

        self.complete(settings)
    }

    fn route(&self, settings: &WorkerSettings, failed: bool) -> String {
        match (&self.response.queue, failed) {
            (Some(queue), _) => queue.clone(),
            (None, true) => settings.failure_queue().to_string(),
            (None, false) => settings.output_queue.clone(),
        }
    }

    fn exception(&self, settings: &WorkerSettings, message: String) -> TaskResponse {
        TaskResponse {
            queue: Some(self.route(settings, true)),
            status: TaskStatus::ResultException,
            payload: message.into_bytes(),
            classifier: EXCEPTION_CLASSIFIER.to_string(),
            version: TASK_API_VERSION,
        }
    }

    fn document_response(&self, settings: &WorkerSettings) -> Result<TaskResponse, InternalError> {
        let changes = changes_of(&self.view, self.view.root())?;
        let failed = changelog::has_failures(&changes);
        record_emitted(changes.len());

        if failed && settings.enable_exception_on_failure {
            let snapshot = self.view.document(self.view.root()).to_snapshot();
            let mut lines = Vec::new();
            failure_lines(&snapshot, &mut lines);

            return Ok(self.exception(settings, lines.join("\n")));
        }

        let mut change_log = self.change_log.clone();
        change_log.push(ChangeLogEntry::new(settings.change_log_entry_name(), changes));
        let message = DocumentTaskMessage {
            document: self.base.clone(),
            change_log,
            custom_data: self.response.custom_data.clone(),
        };

        Ok(TaskResponse {
            queue: Some(self.route(settings, failed)),
            status: TaskStatus::ResultSuccess,
            payload: serialize(&message)?,
            classifier: DOCUMENT_TASK_CLASSIFIER.to_string(),
            version: TASK_API_VERSION,
        })
    }

    fn field_response(&self, settings: &WorkerSettings) -> Result<TaskResponse, InternalError> {
        let mut builder = FieldResultBuilder::new();
        record_changes(&self.view, self.view.root(), &mut builder)?;
        let result = builder.into_result();
        record_emitted(result.field_changes.as_ref().map_or(0, BTreeMap::len));

        Ok(TaskResponse {
            queue: Some(self.route(settings, result.has_failures())),
            status: TaskStatus::ResultSuccess,
            payload: serialize(&result)?,
            classifier: FIELD_TASK_CLASSIFIER.to_string(),
            version: TASK_API_VERSION,
        })
    }
}

fn record_emitted(changes: usize) {
    sink::record(MetricsEvent::ChangesEmitted {
        changes: u64::try_from(changes).unwrap_or(u64::MAX),
    });
}

// "<id>: <message>" for every failure in the subtree, depth-first
fn failure_lines(snapshot: &Snapshot, out: &mut Vec<String>) {
    out.extend(
        snapshot
            .failures()
            .iter()
            .map(|failure| format!("{}: {}", failure.id(), failure.message())),
    );
    for sub in snapshot.subdocuments() {
        failure_lines(sub, out);
    }
}
