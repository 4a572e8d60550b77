use crate::{
    batch::{Batch, BatchId, BatchParts, BatchTask},
    hooks::{Admission, HookError, TaskHooks},
    runtime::{self, ResponseSink, TaskResponse, WorkItem, WorkItemSource},
    settings::WorkerSettings,
    task::{Task, TaskDecoder},
    view::NodeId,
    worker::{BulkDocumentWorker, WorkerError},
};
use tracing::{debug, warn};

///
/// BatchReport
///
/// What happened to one batch. Items in `unanswered` were neither
/// acknowledged nor rejected and belong to the caller again.
///

#[derive(Debug)]
pub struct BatchReport {
    pub batch_id: BatchId,
    pub documents: usize,
    pub work_items: usize,
    pub interrupted: bool,
    pub unanswered: Vec<WorkItem>,
}

///
/// BulkTaskProcessor
///
/// Assembles one batch, hands it to a [`BulkDocumentWorker`], then
/// completes every work item that entered the batch.
///

#[derive(Clone, Copy)]
pub struct BulkTaskProcessor<'a> {
    settings: &'a WorkerSettings,
    decoder: &'a dyn TaskDecoder,
}

impl<'a> BulkTaskProcessor<'a> {
    #[must_use]
    pub const fn new(settings: &'a WorkerSettings, decoder: &'a dyn TaskDecoder) -> Self {
        Self { settings, decoder }
    }

    pub fn process_batch(
        &self,
        source: &mut dyn WorkItemSource,
        sink: &mut dyn ResponseSink,
        hooks: &mut dyn TaskHooks,
        worker: &mut dyn BulkDocumentWorker,
    ) -> BatchReport {
        let mut batch = Batch::new(self.settings, source, sink, self.decoder, hooks);
        let outcome = worker.process_documents(&mut batch);
        let BatchParts {
            id,
            tasks,
            documents,
            interrupted,
            held,
        } = batch.into_parts();

        let mut report = BatchReport {
            batch_id: id,
            documents,
            work_items: tasks.len(),
            interrupted,
            unanswered: held.into_iter().collect(),
        };
        let mut tasks = tasks.into_iter();

        match outcome {
            Ok(()) => {
                for entry in tasks.by_ref() {
                    if let Some(item) = self.complete(entry, sink, hooks) {
                        report.interrupted = true;
                        report.unanswered.push(item);
                        break;
                    }
                }
            }
            Err(WorkerError::Transient(message)) => {
                warn!(batch_id = %id, %message, "batch rejected for retry");
                for entry in tasks.by_ref() {
                    runtime::deliver(sink, entry.task.into_item(), TaskResponse::retry(&message));
                }
            }
            Err(WorkerError::Interrupted) => {
                debug!(batch_id = %id, "bulk processing interrupted");
                report.interrupted = true;
            }
            Err(WorkerError::Failed(err)) => {
                for BatchTask { mut task, .. } in tasks.by_ref() {
                    let response = task.general_failure(&*err, self.settings);
                    runtime::deliver(sink, task.into_item(), response);
                }
            }
        }

        report
            .unanswered
            .extend(tasks.map(|entry| entry.task.into_item()));

        report
    }

    // after-hooks then response; an interrupted item is handed back
    fn complete(
        &self,
        entry: BatchTask,
        sink: &mut dyn ResponseSink,
        hooks: &mut dyn TaskHooks,
    ) -> Option<WorkItem> {
        let BatchTask {
            mut task,
            candidates,
        } = entry;

        let response = match run_after_hooks(&mut task, &candidates, hooks) {
            Ok(()) => task.complete(self.settings),
            Err(HookError::Transient(message)) => TaskResponse::retry(&message),
            Err(HookError::Interrupted) => return Some(task.into_item()),
        };
        runtime::deliver(sink, task.into_item(), response);

        None
    }
}

fn run_after_hooks(
    task: &mut Task,
    candidates: &[(NodeId, Admission)],
    hooks: &mut dyn TaskHooks,
) -> Result<(), HookError> {
    for (id, admission) in candidates {
        hooks.after_admit(&mut task.view_mut().document_mut(*id), *admission)?;
    }

    hooks.after_task(task)
}
