//! Metrics sink boundary.
//!
//! All instrumentation flows through MetricsEvent and MetricsSink; this
//! module is the only bridge between processing code and counter state.

use crate::{batch::CloseReason, obs::metrics, runtime::TaskStatus, task::TaskKind};
use std::{cell::RefCell, rc::Rc};

thread_local! {
    static SINK_OVERRIDE: RefCell<Option<Rc<dyn MetricsSink>>> = RefCell::new(None);
}

///
/// MetricsEvent
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum MetricsEvent {
    TaskStart {
        kind: TaskKind,
    },
    TaskFinish {
        status: TaskStatus,
    },
    DocumentCancelled,
    BatchClosed {
        documents: u64,
        work_items: u64,
        reason: CloseReason,
    },
    ChangesEmitted {
        changes: u64,
    },
}

///
/// MetricsSink
///

pub trait MetricsSink {
    fn record(&self, event: MetricsEvent);
}

/// GlobalMetricsSink
/// Default sink writing into the thread-local counters.

pub(crate) struct GlobalMetricsSink;

impl MetricsSink for GlobalMetricsSink {
    fn record(&self, event: MetricsEvent) {
        metrics::with_state_mut(|m| match event {
            MetricsEvent::TaskStart { kind } => metrics::record_task_start(&mut m.ops, kind),
            MetricsEvent::TaskFinish { status } => metrics::record_task_finish(&mut m.ops, status),
            MetricsEvent::DocumentCancelled => {
                m.ops.documents_cancelled = m.ops.documents_cancelled.saturating_add(1);
            }
            MetricsEvent::BatchClosed {
                documents,
                work_items,
                ..
            } => {
                m.ops.batches_closed = m.ops.batches_closed.saturating_add(1);
                m.ops.batch_documents = m.ops.batch_documents.saturating_add(documents);
                m.ops.batch_work_items = m.ops.batch_work_items.saturating_add(work_items);
            }
            MetricsEvent::ChangesEmitted { changes } => {
                m.ops.changes_emitted = m.ops.changes_emitted.saturating_add(changes);
            }
        });
    }
}

pub(crate) const GLOBAL_METRICS_SINK: GlobalMetricsSink = GlobalMetricsSink;

pub(crate) fn record(event: MetricsEvent) {
    let override_sink = SINK_OVERRIDE.with(|cell| cell.borrow().clone());
    match override_sink {
        Some(sink) => sink.record(event),
        None => GLOBAL_METRICS_SINK.record(event),
    }
}

/// Snapshot the current metrics state.
#[must_use]
pub fn metrics_report() -> metrics::EventReport {
    metrics::report()
}

/// Reset all metrics state.
pub fn metrics_reset_all() {
    metrics::reset_all();
}

/// Run a closure with a temporary metrics sink override on this thread.
pub fn with_metrics_sink<T>(sink: Rc<dyn MetricsSink>, f: impl FnOnce() -> T) -> T {
    struct Guard(Option<Rc<dyn MetricsSink>>);

    impl Drop for Guard {
        fn drop(&mut self) {
            let previous = self.0.take();
            SINK_OVERRIDE.with(|cell| {
                *cell.borrow_mut() = previous;
            });
        }
    }

    let previous = SINK_OVERRIDE.with(|cell| cell.borrow_mut().replace(sink));
    let _guard = Guard(previous);

    f()
}
