//! Change-log model, replay, and inspection.
//!
//! A change log is the append-only list of named entries each pipeline stage
//! adds to a document. Replaying it over the base snapshot yields the
//! effective document a stage works on.

mod error;
mod inspect;
mod replay;


use crate::{
    model::{Failure, FieldValue, Snapshot},
    serialize::null_as_default,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use error::ChangeLogError;
pub use inspect::{failure_messages, has_failures};
pub use replay::replay;

///
/// Change
///
/// One mutation of a document. Serialized as a single-key object naming the
/// operation, e.g. `{"addFields": {...}}`.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Change {
    SetReference {
        value: Option<String>,
    },
    AddFields(BTreeMap<String, Vec<FieldValue>>),
    /// `None` removes the field.
    SetFields(BTreeMap<String, Option<Vec<FieldValue>>>),
    RemoveFields(Vec<String>),
    AddFailure(Failure),
    SetFailures(Vec<Failure>),
    AddSubdocument(Snapshot),
    InsertSubdocument {
        index: usize,
        subdocument: Snapshot,
    },
    UpdateSubdocument {
        index: usize,
        reference: Option<String>,
        #[serde(default, deserialize_with = "null_as_default")]
        changes: Vec<Change>,
    },
    RemoveSubdocument {
        index: usize,
        reference: Option<String>,
    },
}

impl Change {
    /// Wire name of the operation, used in error paths and logs.
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::SetReference { .. } => "setReference",
            Self::AddFields(_) => "addFields",
            Self::SetFields(_) => "setFields",
            Self::RemoveFields(_) => "removeFields",
            Self::AddFailure(_) => "addFailure",
            Self::SetFailures(_) => "setFailures",
            Self::AddSubdocument(_) => "addSubdocument",
            Self::InsertSubdocument { .. } => "insertSubdocument",
            Self::UpdateSubdocument { .. } => "updateSubdocument",
            Self::RemoveSubdocument { .. } => "removeSubdocument",
        }
    }
}

///
/// ChangeLogEntry
///
/// The changes one named pipeline stage made to a document.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct ChangeLogEntry {
    pub name: String,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub changes: Vec<Change>,
}

impl ChangeLogEntry {
    pub fn new(name: impl Into<String>, changes: Vec<Change>) -> Self {
        Self {
            name: name.into(),
            changes,
        }
    }
}
