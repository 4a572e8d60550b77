//! Core runtime for docpipe: document snapshots, change-log replay, the
//! mutable document view, diff emission, and deadline-bounded batch assembly.
#![warn(unreachable_pub)]

// public exports are one module level down
pub mod batch;
pub mod changelog;
pub mod emit;
pub mod error;
pub mod hooks;
pub mod model;
pub mod obs;
pub mod resolve;
pub mod runtime;
pub mod serialize;
pub mod settings;
pub mod task;
pub mod view;
pub mod worker;

// test
#[cfg(test)]
pub(crate) mod test_support;

///
/// CONSTANTS
///

/// Classifier of work items carrying a document task with change-log history.
pub const DOCUMENT_TASK_CLASSIFIER: &str = "DocumentWorkerTask";

/// Classifier of work items carrying a flat field-enrichment task.
pub const FIELD_TASK_CLASSIFIER: &str = "DocumentWorker";

/// Highest task message version either decoder understands.
pub const TASK_API_VERSION: u32 = 1;

/// Classifier attached to exception responses.
pub const EXCEPTION_CLASSIFIER: &str = "DocumentWorkerException";

///
/// Prelude
///
/// Prelude contains only domain vocabulary.
/// No errors, processors, or serializers are re-exported here.
///

pub mod prelude {
    pub use crate::{
        changelog::{Change, ChangeLogEntry},
        hooks::{Admission, TaskHooks},
        model::{FieldValue, Failure, Snapshot},
        view::{DocumentMut, DocumentRef, DocumentView, NodeId},
        worker::{BulkDocumentWorker, DocumentWorker},
    };
}
