use crate::{
    hooks::{Admission, HookError, TaskHooks},
    obs::sink::{self, MetricsEvent},
    runtime::{
        self, Interrupted, ResponseSink, TaskOutcome, TaskResponse, WorkItem, WorkItemSource,
    },
    settings::WorkerSettings,
    task::{Task, TaskDecoder},
    view::{DocumentMut, NodeId},
};
use derive_more::Display;
use std::time::Instant;
use tracing::{debug, info, warn};
use ulid::Ulid;

///
/// BatchId
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, PartialEq)]
pub struct BatchId(Ulid);

impl BatchId {
    fn generate() -> Self {
        Self(Ulid::new())
    }
}

///
/// CloseReason
///

#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum CloseReason {
    #[display("full")]
    Full,
    #[display("deadline")]
    Deadline,
    #[display("explicit")]
    Explicit,
    #[display("interrupted")]
    Interrupted,
    #[display("finished")]
    Finished,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum BatchState {
    Open,
    Closed(CloseReason),
}

// one admitted document: owning task index and node within that task's view
#[derive(Clone, Copy, Debug)]
struct Member {
    task: usize,
    node: NodeId,
}

///
/// BatchTask
///
/// A work item pulled into the batch and the admission decision for each
/// of its candidate documents, in document order.
///

#[derive(Debug)]
pub(crate) struct BatchTask {
    pub(crate) task: Task,
    pub(crate) candidates: Vec<(NodeId, Admission)>,
}

///
/// BatchParts
///
/// Everything a closed batch hands back to the bulk processor.
///

#[derive(Debug)]
pub(crate) struct BatchParts {
    pub(crate) id: BatchId,
    pub(crate) tasks: Vec<BatchTask>,
    pub(crate) documents: usize,
    pub(crate) interrupted: bool,
    pub(crate) held: Option<WorkItem>,
}

// result of offering one work item to the batch
enum Growth {
    Admitted(usize),
    Skipped,
    Interrupted,
}

///
/// Batch
///
/// A single growing batch of documents, filled on demand from the input
/// queue. States: open, then closed. The deadline for the whole batch
/// starts when the first document is admitted.
///

pub struct Batch<'r> {
    id: BatchId,
    settings: &'r WorkerSettings,
    source: &'r mut dyn WorkItemSource,
    sink: &'r mut dyn ResponseSink,
    decoder: &'r dyn TaskDecoder,
    hooks: &'r mut dyn TaskHooks,
    tasks: Vec<BatchTask>,
    members: Vec<Member>,
    state: BatchState,
    deadline: Option<Instant>,
    cursor: usize,
    interrupted: bool,
    held: Option<WorkItem>,
}

impl<'r> Batch<'r> {
    pub(crate) fn new(
        settings: &'r WorkerSettings,
        source: &'r mut dyn WorkItemSource,
        sink: &'r mut dyn ResponseSink,
        decoder: &'r dyn TaskDecoder,
        hooks: &'r mut dyn TaskHooks,
    ) -> Self {
        Self {
            id: BatchId::generate(),
            settings,
            source,
            sink,
            decoder,
            hooks,
            tasks: Vec::new(),
            members: Vec::new(),
            state: BatchState::Open,
            deadline: None,
            cursor: 0,
            interrupted: false,
            held: None,
        }
    }

    #[must_use]
    pub const fn id(&self) -> BatchId {
        self.id
    }

    /// True when another document is available, growing the batch if
    /// needed. May block until the batch deadline.
    pub fn has_next(&mut self) -> bool {
        if self.cursor < self.members.len() {
            return true;
        }
        if self.is_batch_closed() {
            return false;
        }

        let limits = self.settings.batch;
        let grown = if self.members.is_empty() {
            let grown = self.grow(Instant::now() + limits.max_batch_time());
            if grown {
                self.deadline = Some(Instant::now() + limits.max_batch_time());
                debug!(batch_id = %self.id, "batch opened");
            }
            grown
        } else if self.members.len() >= limits.max_batch_size() {
            self.close(CloseReason::Full);
            return false;
        } else {
            let deadline = self.deadline.unwrap_or_else(Instant::now);
            self.grow(deadline)
        };

        if !grown {
            let reason = if self.interrupted {
                CloseReason::Interrupted
            } else {
                CloseReason::Deadline
            };
            self.close(reason);
        }

        grown
    }

    /// Next admitted document, or `None` once the batch is closed and drained.
    pub fn next_document(&mut self) -> Option<DocumentMut<'_>> {
        if !self.has_next() {
            return None;
        }
        let member = self.members[self.cursor];
        self.cursor += 1;

        Some(self.tasks[member.task].task.view_mut().document_mut(member.node))
    }

    /// Admitted document at `position`, whether or not it was returned yet.
    pub fn document_mut(&mut self, position: usize) -> Option<DocumentMut<'_>> {
        let member = *self.members.get(position)?;

        Some(self.tasks[member.task].task.view_mut().document_mut(member.node))
    }

    /// Task owning the admitted document at `position`.
    #[must_use]
    pub fn task_of(&self, position: usize) -> Option<&Task> {
        let member = self.members.get(position)?;

        Some(&self.tasks[member.task].task)
    }

    /// Stop growing; documents already admitted stay in the batch.
    pub fn close_batch(&mut self) {
        self.close(CloseReason::Explicit);
    }

    #[must_use]
    pub const fn is_batch_closed(&self) -> bool {
        matches!(self.state, BatchState::Closed(_))
    }

    #[must_use]
    pub const fn close_reason(&self) -> Option<CloseReason> {
        match self.state {
            BatchState::Open => None,
            BatchState::Closed(reason) => Some(reason),
        }
    }

    /// Documents admitted so far. Cancelled candidates are not counted.
    #[must_use]
    pub fn current_size(&self) -> usize {
        self.members.len()
    }

    /// Work items pulled so far, including those with no admitted document.
    #[must_use]
    pub fn work_items(&self) -> usize {
        self.tasks.len()
    }

    #[must_use]
    pub const fn is_interrupted(&self) -> bool {
        self.interrupted
    }

    pub(crate) fn into_parts(mut self) -> BatchParts {
        self.close(CloseReason::Finished);

        BatchParts {
            id: self.id,
            documents: self.members.len(),
            tasks: self.tasks,
            interrupted: self.interrupted,
            held: self.held,
        }
    }

    fn close(&mut self, reason: CloseReason) {
        if self.is_batch_closed() {
            return;
        }
        self.state = BatchState::Closed(reason);

        info!(
            batch_id = %self.id,
            documents = self.members.len(),
            work_items = self.tasks.len(),
            reason = %reason,
            "batch closed"
        );
        sink::record(MetricsEvent::BatchClosed {
            documents: to_u64(self.members.len()),
            work_items: to_u64(self.tasks.len()),
            reason,
        });
    }

    // Pull work items until one yields an admitted document or the
    // deadline passes. Every retry shares the same deadline.
    fn grow(&mut self, deadline: Instant) -> bool {
        loop {
            let max_wait = deadline.saturating_duration_since(Instant::now());
            let item = match self.source.pull_next(max_wait) {
                Ok(Some(item)) => item,
                Ok(None) => return false,
                Err(Interrupted) => {
                    debug!(batch_id = %self.id, "batch growth interrupted");
                    self.interrupted = true;
                    return false;
                }
            };

            match self.admit(item) {
                Growth::Admitted(0) | Growth::Skipped => {}
                Growth::Admitted(_) => return true,
                Growth::Interrupted => {
                    self.interrupted = true;
                    return false;
                }
            }
        }
    }

    fn admit(&mut self, item: WorkItem) -> Growth {
        let mut task = match Task::from_item(item, self.decoder) {
            Ok(task) => task,
            Err(rejection) => {
                return match rejection.dispose(self.sink) {
                    TaskOutcome::Unanswered(item) => {
                        self.held = Some(item);
                        Growth::Interrupted
                    }
                    TaskOutcome::Responded(_) => Growth::Skipped,
                };
            }
        };
        sink::record(MetricsEvent::TaskStart { kind: task.kind() });

        let candidates = match self.offer(&mut task) {
            Ok(candidates) => candidates,
            Err(HookError::Transient(message)) => {
                warn!(batch_id = %self.id, item = %task.item().id, %message, "work item rejected for retry");
                runtime::deliver(self.sink, task.into_item(), TaskResponse::retry(&message));
                return Growth::Skipped;
            }
            Err(HookError::Interrupted) => {
                self.held = Some(task.into_item());
                return Growth::Interrupted;
            }
        };

        let index = self.tasks.len();
        let before = self.members.len();
        self.members.extend(
            candidates
                .iter()
                .filter(|(_, admission)| admission.is_admitted())
                .map(|(node, _)| Member {
                    task: index,
                    node: *node,
                }),
        );
        self.tasks.push(BatchTask { task, candidates });

        Growth::Admitted(self.members.len() - before)
    }

    // prepare the task and run the admission check on every candidate
    fn offer(&mut self, task: &mut Task) -> Result<Vec<(NodeId, Admission)>, HookError> {
        self.hooks.prepare(task)?;

        let ids = task.candidates(self.settings.process_subdocuments_separately);
        let mut candidates = Vec::with_capacity(ids.len());
        for id in ids {
            let admission = self
                .hooks
                .before_admit(&mut task.view_mut().document_mut(id))?;
            if !admission.is_admitted() {
                debug!(batch_id = %self.id, item = %task.item().id, document = %id, "document cancelled");
                sink::record(MetricsEvent::DocumentCancelled);
            }
            candidates.push((id, admission));
        }

        Ok(candidates)
    }
}

fn to_u64(n: usize) -> u64 {
    u64::try_from(n).unwrap_or(u64::MAX)
}
