use crate::{runtime::TaskStatus, task::TaskKind};
use serde::{Deserialize, Serialize};
use std::{
    cell::RefCell,
    time::{SystemTime, UNIX_EPOCH},
};

///
/// EventState
/// Ephemeral, in-memory counters since `since_ms`.
///

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EventState {
    pub ops: EventOps,
    pub since_ms: u64,
}

impl Default for EventState {
    fn default() -> Self {
        Self {
            ops: EventOps::default(),
            since_ms: now_millis(),
        }
    }
}

///
/// EventOps
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventOps {
    // Task entrypoints
    pub document_tasks: u64,
    pub field_tasks: u64,

    // Task outcomes
    pub results_success: u64,
    pub results_exception: u64,
    pub invalid_tasks: u64,
    pub retries: u64,

    // Batching
    pub batches_closed: u64,
    pub batch_documents: u64,
    pub batch_work_items: u64,
    pub documents_cancelled: u64,

    // Emission
    pub changes_emitted: u64,
}

thread_local! {
    static EVENT_STATE: RefCell<EventState> = RefCell::new(EventState::default());
}

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX))
}

/// Borrow metrics immutably.
pub(crate) fn with_state<R>(f: impl FnOnce(&EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&m.borrow()))
}

/// Borrow metrics mutably.
pub(crate) fn with_state_mut<R>(f: impl FnOnce(&mut EventState) -> R) -> R {
    EVENT_STATE.with(|m| f(&mut m.borrow_mut()))
}

/// Reset all counters.
pub(crate) fn reset_all() {
    with_state_mut(|m| *m = EventState::default());
}

pub(crate) fn record_task_start(ops: &mut EventOps, kind: TaskKind) {
    match kind {
        TaskKind::Document => ops.document_tasks = ops.document_tasks.saturating_add(1),
        TaskKind::FieldEnrichment => ops.field_tasks = ops.field_tasks.saturating_add(1),
    }
}

pub(crate) fn record_task_finish(ops: &mut EventOps, status: TaskStatus) {
    let counter = match status {
        TaskStatus::ResultSuccess => &mut ops.results_success,
        TaskStatus::ResultException => &mut ops.results_exception,
        TaskStatus::InvalidTask => &mut ops.invalid_tasks,
        TaskStatus::Retry => &mut ops.retries,
    };
    *counter = counter.saturating_add(1);
}

///
/// EventReport
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct EventReport {
    pub counters: Option<EventState>,
    pub avg_documents_per_batch: f64,
}

/// Build a report from the in-memory counters.
#[must_use]
#[expect(clippy::cast_precision_loss)]
pub(crate) fn report() -> EventReport {
    let snap = with_state(Clone::clone);
    let avg = if snap.ops.batches_closed > 0 {
        snap.ops.batch_documents as f64 / snap.ops.batches_closed as f64
    } else {
        0.0
    };

    EventReport {
        counters: Some(snap),
        avg_documents_per_batch: avg,
    }
}
