//! Module: emit
//! Responsibility: walk a document view and report everything that differs
//! from its original snapshot to a changes journal.
//! Does not own: response assembly or queue selection.
//! Boundary: emission is read-only over the view.

mod changelog;
mod result;

#[cfg(test)]
mod tests;

use crate::{
    changelog::Change,
    error::InternalError,
    model::{Failure, FieldValue, Snapshot},
    view::{DocumentView, FieldAction, NodeId},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub use changelog::ChangeLogBuilder;
pub use result::{FieldResult, FieldResultBuilder};

///
/// FieldChanges
///
/// The recorded delta of one field: an action and the values added under it.
///

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct FieldChanges {
    #[serde(default)]
    pub action: FieldAction,
    #[serde(default)]
    pub values: Vec<FieldValue>,
}

///
/// ChangesJournal
///
/// Receiver of the changes found while walking a document. Implementations
/// decide the output shape and may refuse operations they cannot express.
///

pub trait ChangesJournal {
    fn set_reference(&mut self, reference: Option<String>) -> Result<(), InternalError>;

    fn add_field_changes(
        &mut self,
        changes: BTreeMap<String, FieldChanges>,
    ) -> Result<(), InternalError>;

    fn add_failure(&mut self, failure: Failure) -> Result<(), InternalError>;

    fn add_failures(&mut self, failures: Vec<Failure>) -> Result<(), InternalError> {
        for failure in failures {
            self.add_failure(failure)?;
        }

        Ok(())
    }

    /// Replace every failure, including those added earlier in this journal.
    fn set_failures(&mut self, failures: Vec<Failure>) -> Result<(), InternalError>;

    fn add_subdocument(&mut self, subdocument: Snapshot) -> Result<(), InternalError>;

    /// Record nested changes of the original subdocument at `index`.
    /// `changes` may be empty.
    fn update_subdocument(
        &mut self,
        index: usize,
        reference: Option<String>,
        changes: Vec<Change>,
    ) -> Result<(), InternalError>;

    fn remove_subdocument(
        &mut self,
        index: usize,
        reference: Option<String>,
    ) -> Result<(), InternalError>;
}

/// Report the changes of document `id` and its subtree to `journal`.
///
/// Order: reference, fields, failures, original subdocuments from the highest
/// index down, then added subdocuments in append order. Original indices are
/// used throughout so that a replaying stage never sees renumbering.
pub fn record_changes(
    view: &DocumentView,
    id: NodeId,
    journal: &mut dyn ChangesJournal,
) -> Result<(), InternalError> {
    let node = view.node(id);

    if node.reference_changed() {
        journal.set_reference(node.reference.clone())?;
    }

    let field_changes: BTreeMap<String, FieldChanges> = node
        .fields
        .iter()
        .filter(|(_, tracker)| tracker.has_changes())
        .map(|(name, tracker)| {
            (
                name.clone(),
                FieldChanges {
                    action: tracker.action,
                    values: tracker.pending.clone(),
                },
            )
        })
        .collect();
    if !field_changes.is_empty() {
        journal.add_field_changes(field_changes)?;
    }

    if node.failures.discard_original {
        journal.set_failures(node.failures.added.clone())?;
    } else if !node.failures.added.is_empty() {
        journal.add_failures(node.failures.added.clone())?;
    }

    for (index, slot) in node.subdocuments.original_rev() {
        let Some(sub) = slot else {
            continue;
        };
        let original_reference = view.node(sub).original.reference().map(str::to_string);

        if view.node(sub).deleted {
            journal.remove_subdocument(index, original_reference)?;
        } else {
            let mut nested = ChangeLogBuilder::new();
            record_changes(view, sub, &mut nested)?;
            journal.update_subdocument(index, original_reference, nested.into_changes())?;
        }
    }

    for &sub in node.subdocuments.added() {
        if !view.node(sub).deleted {
            journal.add_subdocument(view.to_snapshot(sub))?;
        }
    }

    Ok(())
}

/// Emit the change list for document `id`.
pub fn changes_of(view: &DocumentView, id: NodeId) -> Result<Vec<Change>, InternalError> {
    let mut builder = ChangeLogBuilder::new();
    record_changes(view, id, &mut builder)?;

    Ok(builder.into_changes())
}
