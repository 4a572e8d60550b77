//! Module: worker
//! Responsibility: the worker traits and the processors that drive them
//! over single tasks and over batches.
//! Does not own: batch growth (see `batch`) or response content (see `task`).
//! Boundary: every work item handed to a processor is either answered
//! through the sink or returned to the caller unanswered.

mod bulk;
mod single;


use crate::{
    batch::Batch,
    error::{ErrorOrigin, InternalError},
    hooks::HookError,
    view::DocumentMut,
};
use std::error::Error;
use thiserror::Error as ThisError;

pub use bulk::{BatchReport, BulkTaskProcessor};
pub use single::TaskProcessor;

///
/// WorkerError
///
/// How a worker's processing ended, when it did not succeed.
///

#[derive(Debug, ThisError)]
pub enum WorkerError {
    /// The item may succeed later; it is answered with a retry.
    #[error("transient failure: {0}")]
    Transient(String),

    /// Processing was interrupted; nothing is answered.
    #[error("worker interrupted")]
    Interrupted,

    /// Any other failure; recorded on the document as a soft failure.
    #[error(transparent)]
    Failed(Box<dyn Error + Send + Sync>),
}

impl WorkerError {
    pub fn failed(err: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        Self::Failed(err.into())
    }
}

impl From<HookError> for WorkerError {
    fn from(err: HookError) -> Self {
        match err {
            HookError::Transient(message) => Self::Transient(message),
            HookError::Interrupted => Self::Interrupted,
        }
    }
}

impl From<InternalError> for WorkerError {
    fn from(err: InternalError) -> Self {
        if err.is_transient() {
            Self::Transient(err.message)
        } else if err.is_interrupted() {
            Self::Interrupted
        } else {
            Self::Failed(Box::new(err))
        }
    }
}

impl From<WorkerError> for InternalError {
    fn from(err: WorkerError) -> Self {
        match err {
            WorkerError::Transient(message) => Self::transient(ErrorOrigin::Worker, message),
            WorkerError::Interrupted => Self::interrupted(ErrorOrigin::Worker),
            WorkerError::Failed(source) => Self::new(
                crate::error::ErrorClass::Internal,
                ErrorOrigin::Worker,
                source.to_string(),
            ),
        }
    }
}

///
/// DocumentWorker
///
/// Processes one document at a time.
///

pub trait DocumentWorker {
    fn process_document(&mut self, document: &mut DocumentMut<'_>) -> Result<(), WorkerError>;
}

///
/// BulkDocumentWorker
///
/// Processes a whole batch, pulling documents from it as it goes.
///

pub trait BulkDocumentWorker {
    fn process_documents(&mut self, batch: &mut Batch<'_>) -> Result<(), WorkerError>;
}
