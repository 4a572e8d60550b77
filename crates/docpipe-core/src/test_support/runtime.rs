use crate::{
    DOCUMENT_TASK_CLASSIFIER, FIELD_TASK_CLASSIFIER, TASK_API_VERSION,
    batch::BatchSizeController,
    changelog::ChangeLogEntry,
    hooks::{Admission, HookError, TaskHooks},
    model::{FieldValue, Snapshot},
    runtime::{Interrupted, ResponseSink, TaskResponse, WorkItem, WorkItemSource},
    serialize::serialize,
    settings::WorkerSettings,
    task::{DocumentTaskMessage, FieldTaskMessage, Task},
    view::DocumentMut,
};
use std::{
    collections::{BTreeMap, BTreeSet, VecDeque},
    thread,
    time::Duration,
};

/// Settings for worker "test:1" with the given batch limits.
pub(crate) fn settings(max_batch_size: i64, max_batch_time_ms: i64) -> WorkerSettings {
    let mut settings = WorkerSettings::new("test", "1", "out");
    settings.failure_queue = Some("failed".into());
    settings.batch = BatchSizeController::new(max_batch_size, max_batch_time_ms);

    settings
}

/// A document-task work item.
pub(crate) fn document_item(
    id: &str,
    document: Snapshot,
    change_log: Vec<ChangeLogEntry>,
) -> WorkItem {
    let message = DocumentTaskMessage {
        document,
        change_log,
        custom_data: BTreeMap::new(),
    };
    let payload = serialize(&message).expect("serialize document task");

    WorkItem::new(id, DOCUMENT_TASK_CLASSIFIER, TASK_API_VERSION, payload)
}

/// A field-enrichment work item.
pub(crate) fn field_item(id: &str, fields: Vec<(&str, Vec<&str>)>) -> WorkItem {
    let message = FieldTaskMessage {
        fields: fields
            .into_iter()
            .map(|(name, values)| {
                let values = values.into_iter().map(FieldValue::text).collect();
                (name.to_string(), Some(values))
            })
            .collect(),
        custom_map: BTreeMap::new(),
    };
    let payload = serialize(&message).expect("serialize field task");

    WorkItem::new(id, FIELD_TASK_CLASSIFIER, TASK_API_VERSION, payload)
}

///
/// Step
///

#[derive(Debug)]
pub(crate) enum Step {
    Item(WorkItem),
    /// Block for the whole wait, then time out.
    Stall,
    Interrupt,
}

///
/// ScriptedSource
///
/// Replays a fixed script; an exhausted script times out immediately.
///

#[derive(Debug, Default)]
pub(crate) struct ScriptedSource {
    steps: VecDeque<Step>,
    pub(crate) waits: Vec<Duration>,
}

impl ScriptedSource {
    pub(crate) fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            steps: steps.into_iter().collect(),
            waits: Vec::new(),
        }
    }

    pub(crate) fn items(items: impl IntoIterator<Item = WorkItem>) -> Self {
        Self::new(items.into_iter().map(Step::Item))
    }

    pub(crate) fn remaining(&self) -> usize {
        self.steps.len()
    }
}

impl WorkItemSource for ScriptedSource {
    fn pull_next(&mut self, max_wait: Duration) -> Result<Option<WorkItem>, Interrupted> {
        self.waits.push(max_wait);

        match self.steps.pop_front() {
            Some(Step::Item(item)) => Ok(Some(item)),
            Some(Step::Stall) => {
                thread::sleep(max_wait);
                Ok(None)
            }
            Some(Step::Interrupt) => Err(Interrupted),
            None => Ok(None),
        }
    }
}

///
/// RecordingSink
///

#[derive(Debug, Default)]
pub(crate) struct RecordingSink {
    pub(crate) responses: Vec<(WorkItem, TaskResponse)>,
}

impl RecordingSink {
    pub(crate) fn response_for(&self, id: &str) -> Option<&TaskResponse> {
        self.responses
            .iter()
            .find(|(item, _)| item.id == id)
            .map(|(_, response)| response)
    }
}

impl ResponseSink for RecordingSink {
    fn respond(&mut self, item: WorkItem, response: TaskResponse) {
        self.responses.push((item, response));
    }
}

///
/// ScriptedHooks
///
/// Records every call; cancels documents by reference and fails
/// preparation of listed items.
///

#[derive(Debug, Default)]
pub(crate) struct ScriptedHooks {
    pub(crate) cancel: BTreeSet<String>,
    pub(crate) transient_prepare: BTreeSet<String>,
    pub(crate) interrupt_prepare: BTreeSet<String>,
    pub(crate) calls: Vec<String>,
}

impl ScriptedHooks {
    pub(crate) fn cancelling(references: &[&str]) -> Self {
        Self {
            cancel: references.iter().map(ToString::to_string).collect(),
            ..Self::default()
        }
    }
}

fn label(document: &DocumentMut<'_>) -> String {
    document.reference().unwrap_or("-").to_string()
}

impl TaskHooks for ScriptedHooks {
    fn prepare(&mut self, task: &mut Task) -> Result<(), HookError> {
        let id = task.item().id.clone();
        self.calls.push(format!("prepare:{id}"));

        if self.transient_prepare.contains(&id) {
            return Err(HookError::Transient(format!("{id} not ready")));
        }
        if self.interrupt_prepare.contains(&id) {
            return Err(HookError::Interrupted);
        }

        Ok(())
    }

    fn before_admit(&mut self, document: &mut DocumentMut<'_>) -> Result<Admission, HookError> {
        let name = label(document);
        self.calls.push(format!("before:{name}"));

        if self.cancel.contains(&name) {
            Ok(Admission::Cancel)
        } else {
            Ok(Admission::Admit)
        }
    }

    fn after_admit(
        &mut self,
        document: &mut DocumentMut<'_>,
        admission: Admission,
    ) -> Result<(), HookError> {
        self.calls
            .push(format!("after:{}:{admission:?}", label(document)));

        Ok(())
    }

    fn after_task(&mut self, task: &mut Task) -> Result<(), HookError> {
        self.calls.push(format!("task:{}", task.item().id));

        Ok(())
    }
}
