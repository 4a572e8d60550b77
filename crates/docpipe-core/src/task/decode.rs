use crate::{
    DOCUMENT_TASK_CLASSIFIER, FIELD_TASK_CLASSIFIER, TASK_API_VERSION,
    changelog::ChangeLogEntry,
    error::{ErrorOrigin, InternalError},
    model::Snapshot,
    runtime::WorkItem,
    serialize::deserialize,
    settings::WorkerSettings,
    task::{DocumentTaskMessage, FieldTaskMessage, TaskKind},
};
use std::collections::BTreeMap;

///
/// DecodedTask
///
/// A work item's payload before its change log has been replayed.
///

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DecodedTask {
    pub kind: TaskKind,
    pub document: Snapshot,
    pub change_log: Vec<ChangeLogEntry>,
    pub custom_data: BTreeMap<String, String>,
}

///
/// TaskDecoder
///

pub trait TaskDecoder {
    /// Decode one work item. Malformed or unsupported items fail with an
    /// invalid-input error; transient errors ask for redelivery.
    fn decode(&self, item: &WorkItem) -> Result<DecodedTask, InternalError>;
}

///
/// JsonTaskDecoder
///
/// Decodes both task formats from their JSON wire form, each of which can
/// be switched off.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct JsonTaskDecoder {
    document_tasks: bool,
    field_tasks: bool,
}

impl JsonTaskDecoder {
    #[must_use]
    pub const fn new(document_tasks: bool, field_tasks: bool) -> Self {
        Self {
            document_tasks,
            field_tasks,
        }
    }

    #[must_use]
    pub const fn from_settings(settings: &WorkerSettings) -> Self {
        Self::new(settings.document_tasks_accepted, settings.field_tasks_accepted)
    }

    fn kind_of(&self, classifier: &str) -> Result<TaskKind, InternalError> {
        let (kind, accepted) = match classifier {
            DOCUMENT_TASK_CLASSIFIER => (TaskKind::Document, self.document_tasks),
            FIELD_TASK_CLASSIFIER => (TaskKind::FieldEnrichment, self.field_tasks),
            other => {
                return Err(InternalError::invalid_input(
                    ErrorOrigin::Task,
                    format!("unknown task classifier '{other}'"),
                ));
            }
        };

        if accepted {
            Ok(kind)
        } else {
            Err(InternalError::invalid_input(
                ErrorOrigin::Task,
                format!("'{classifier}' tasks are not accepted by this worker"),
            ))
        }
    }
}

impl Default for JsonTaskDecoder {
    fn default() -> Self {
        Self::new(true, true)
    }
}

impl TaskDecoder for JsonTaskDecoder {
    fn decode(&self, item: &WorkItem) -> Result<DecodedTask, InternalError> {
        let kind = self.kind_of(&item.classifier)?;

        if item.version > TASK_API_VERSION {
            return Err(InternalError::invalid_input(
                ErrorOrigin::Task,
                format!(
                    "task version {} is newer than the supported version {TASK_API_VERSION}",
                    item.version
                ),
            ));
        }
        let decoded = match kind {
            TaskKind::Document => {
                let message: DocumentTaskMessage = deserialize(&item.payload)?;

                DecodedTask {
                    kind,
                    document: message.document,
                    change_log: message.change_log,
                    custom_data: message.custom_data,
                }
            }
            TaskKind::FieldEnrichment => {
                let message: FieldTaskMessage = deserialize(&item.payload)?;
                let fields = message
                    .fields
                    .into_iter()
                    .filter_map(|(name, values)| values.map(|values| (name, values)))
                    .collect();

                DecodedTask {
                    kind,
                    document: Snapshot::from_fields(fields),
                    change_log: Vec::new(),
                    custom_data: message.custom_map,
                }
            }
        };

        Ok(decoded)
    }
}
