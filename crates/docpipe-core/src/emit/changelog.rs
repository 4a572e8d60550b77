use crate::{
    changelog::Change,
    emit::{ChangesJournal, FieldChanges},
    error::InternalError,
    model::{Failure, FieldValue, Snapshot},
    view::FieldAction,
};
use std::collections::BTreeMap;

///
/// ChangeLogBuilder
///
/// Journal producing the change list of one change-log entry.
///

#[derive(Debug, Default)]
pub struct ChangeLogBuilder {
    changes: Vec<Change>,
    failure_positions: Vec<usize>,
}

impl ChangeLogBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn into_changes(self) -> Vec<Change> {
        self.changes
    }

    fn push_failure_change(&mut self, change: Change) {
        self.failure_positions.push(self.changes.len());
        self.changes.push(change);
    }
}

impl ChangesJournal for ChangeLogBuilder {
    fn set_reference(&mut self, reference: Option<String>) -> Result<(), InternalError> {
        self.changes.push(Change::SetReference { value: reference });

        Ok(())
    }

    // Split into removals, additions, and replacements, emitted in that order.
    fn add_field_changes(
        &mut self,
        changes: BTreeMap<String, FieldChanges>,
    ) -> Result<(), InternalError> {
        let mut remove_fields = Vec::new();
        let mut add_fields: BTreeMap<String, Vec<FieldValue>> = BTreeMap::new();
        let mut set_fields: BTreeMap<String, Option<Vec<FieldValue>>> = BTreeMap::new();

        for (name, FieldChanges { action, values }) in changes {
            match (action, values.is_empty()) {
                (FieldAction::Add, true) => {}
                (FieldAction::Add, false) => {
                    add_fields.insert(name, values);
                }
                (FieldAction::Replace, true) => remove_fields.push(name),
                (FieldAction::Replace, false) => {
                    set_fields.insert(name, Some(values));
                }
            }
        }

        if !remove_fields.is_empty() {
            self.changes.push(Change::RemoveFields(remove_fields));
        }
        if !add_fields.is_empty() {
            self.changes.push(Change::AddFields(add_fields));
        }
        if !set_fields.is_empty() {
            self.changes.push(Change::SetFields(set_fields));
        }

        Ok(())
    }

    fn add_failure(&mut self, failure: Failure) -> Result<(), InternalError> {
        self.push_failure_change(Change::AddFailure(failure));

        Ok(())
    }

    fn set_failures(&mut self, failures: Vec<Failure>) -> Result<(), InternalError> {
        for position in self.failure_positions.drain(..).rev() {
            self.changes.remove(position);
        }
        self.push_failure_change(Change::SetFailures(failures));

        Ok(())
    }

    fn add_subdocument(&mut self, subdocument: Snapshot) -> Result<(), InternalError> {
        self.changes.push(Change::AddSubdocument(subdocument));

        Ok(())
    }

    fn update_subdocument(
        &mut self,
        index: usize,
        reference: Option<String>,
        changes: Vec<Change>,
    ) -> Result<(), InternalError> {
        if !changes.is_empty() {
            self.changes.push(Change::UpdateSubdocument {
                index,
                reference,
                changes,
            });
        }

        Ok(())
    }

    fn remove_subdocument(
        &mut self,
        index: usize,
        reference: Option<String>,
    ) -> Result<(), InternalError> {
        self.changes
            .push(Change::RemoveSubdocument { index, reference });

        Ok(())
    }
}
