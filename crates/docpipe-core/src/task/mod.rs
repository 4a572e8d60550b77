//! Module: task
//! Responsibility: one decoded work item, its replayed view, and the
//! response it produces.
//! Does not own: how documents are scheduled (see `worker` and `batch`).
//! Boundary: a [`Task`] owns its work item until a response is delivered
//! or the item is handed back unanswered.

mod decode;
mod message;
mod response;


use crate::{
    changelog::{ChangeLogEntry, replay},
    error::InternalError,
    model::Snapshot,
    runtime::{self, ResponseSink, TaskOutcome, TaskResponse, WorkItem},
    view::{DocumentMut, DocumentView, NodeId},
};
use derive_more::Display;
use std::{collections::BTreeMap, sync::Arc};
use thiserror::Error as ThisError;
use tracing::{debug, warn};

pub use decode::{DecodedTask, JsonTaskDecoder, TaskDecoder};
pub use message::{DocumentTaskMessage, FieldTaskMessage};
pub use response::ResponseOptions;

///
/// CONSTANTS
///

/// Failure id recorded when a worker fails with a non-transient error.
pub const GENERAL_FAILURE_ID: &str = "DW-GENERAL_FAILURE";

/// Failure id recorded on poison messages.
pub const PROCESSING_FAILED_ID: &str = "DW-PROCESSING_FAILED";

///
/// TaskKind
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub enum TaskKind {
    #[display("document")]
    Document,
    #[display("field_enrichment")]
    FieldEnrichment,
}

///
/// Task
///
/// A work item together with the effective document obtained by replaying
/// its change log, and the view through which it is edited.
///

#[derive(Debug)]
pub struct Task {
    item: WorkItem,
    kind: TaskKind,
    base: Snapshot,
    change_log: Vec<ChangeLogEntry>,
    custom_data: BTreeMap<String, String>,
    view: DocumentView,
    response: ResponseOptions,
}

impl Task {
    /// Decode and replay a work item. On failure the item is handed back
    /// inside the rejection.
    pub fn from_item(item: WorkItem, decoder: &dyn TaskDecoder) -> Result<Self, TaskRejection> {
        match decoder.decode(&item) {
            Ok(decoded) => Self::from_decoded(item, decoded),
            Err(error) => Err(TaskRejection { item, error }),
        }
    }

    pub fn from_decoded(item: WorkItem, decoded: DecodedTask) -> Result<Self, TaskRejection> {
        let effective = match replay(&decoded.document, &decoded.change_log) {
            Ok(effective) => effective,
            Err(err) => {
                return Err(TaskRejection {
                    item,
                    error: err.into(),
                });
            }
        };

        Ok(Self {
            item,
            kind: decoded.kind,
            base: decoded.document,
            change_log: decoded.change_log,
            custom_data: decoded.custom_data,
            view: DocumentView::new(Arc::new(effective)),
            response: ResponseOptions::default(),
        })
    }

    #[must_use]
    pub const fn item(&self) -> &WorkItem {
        &self.item
    }

    #[must_use]
    pub const fn kind(&self) -> TaskKind {
        self.kind
    }

    /// The document as it arrived on the wire, before replay.
    #[must_use]
    pub const fn base(&self) -> &Snapshot {
        &self.base
    }

    #[must_use]
    pub fn change_log(&self) -> &[ChangeLogEntry] {
        &self.change_log
    }

    /// Caller-supplied data that travelled with the task.
    #[must_use]
    pub fn custom_data(&self, key: &str) -> Option<&str> {
        self.custom_data.get(key).map(String::as_str)
    }

    #[must_use]
    pub const fn view(&self) -> &DocumentView {
        &self.view
    }

    pub const fn view_mut(&mut self) -> &mut DocumentView {
        &mut self.view
    }

    pub fn root(&mut self) -> DocumentMut<'_> {
        let root = self.view.root();

        self.view.document_mut(root)
    }

    #[must_use]
    pub const fn response_options(&self) -> &ResponseOptions {
        &self.response
    }

    pub const fn response_options_mut(&mut self) -> &mut ResponseOptions {
        &mut self.response
    }

    /// Documents offered for processing: the root alone, or the whole
    /// live hierarchy depth-first.
    pub fn candidates(&mut self, separately: bool) -> Vec<NodeId> {
        if separately {
            self.view.hierarchy()
        } else {
            vec![self.view.root()]
        }
    }

    #[must_use]
    pub fn into_item(self) -> WorkItem {
        self.item
    }
}

///
/// TaskRejection
///
/// A work item that could not become a task, with the reason.
///

#[derive(Debug, ThisError)]
#[error("work item '{}' rejected: {error}", item.id)]
pub struct TaskRejection {
    pub item: WorkItem,
    #[source]
    pub error: InternalError,
}

impl TaskRejection {
    /// Answer the rejected item: retry for transient errors, invalid-task
    /// otherwise. An interrupted rejection is handed back unanswered.
    pub fn dispose(self, sink: &mut dyn ResponseSink) -> TaskOutcome {
        let Self { item, error } = self;

        if error.is_interrupted() {
            debug!(item = %item.id, "task preparation interrupted");
            return TaskOutcome::Unanswered(item);
        }

        let response = if error.is_transient() {
            warn!(item = %item.id, error = %error, "work item rejected for retry");
            TaskResponse::retry(&error.message)
        } else {
            warn!(item = %item.id, error = %error.display_with_class(), "invalid task");
            TaskResponse::invalid_task(&error.message)
        };
        let status = response.status;
        runtime::deliver(sink, item, response);

        TaskOutcome::Responded(status)
    }
}
