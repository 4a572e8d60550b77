use crate::{
    changelog::Change,
    emit::{ChangesJournal, FieldChanges},
    error::{ErrorOrigin, InternalError},
    model::{Failure, Snapshot},
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

///
/// FieldResult
///
/// Flat per-field result with no change-log history, returned to stages
/// that are the last consumer of a document.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_changes: Option<BTreeMap<String, FieldChanges>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub failures: Option<Vec<Failure>>,
}

impl FieldResult {
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.failures.as_ref().is_some_and(|f| !f.is_empty())
    }
}

///
/// FieldResultBuilder
///
/// Journal producing a [`FieldResult`]. Only field changes and added
/// failures can be expressed in this shape.
///

#[derive(Debug, Default)]
pub struct FieldResultBuilder {
    result: FieldResult,
}

impl FieldResultBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn into_result(self) -> FieldResult {
        self.result
    }

    fn unsupported(operation: &str) -> InternalError {
        InternalError::unsupported(
            ErrorOrigin::Emit,
            format!("{operation} cannot be expressed in a field result"),
        )
    }
}

impl ChangesJournal for FieldResultBuilder {
    fn set_reference(&mut self, _reference: Option<String>) -> Result<(), InternalError> {
        Err(Self::unsupported("setReference"))
    }

    fn add_field_changes(
        &mut self,
        changes: BTreeMap<String, FieldChanges>,
    ) -> Result<(), InternalError> {
        if !changes.is_empty() {
            self.result
                .field_changes
                .get_or_insert_with(BTreeMap::new)
                .extend(changes);
        }

        Ok(())
    }

    fn add_failure(&mut self, failure: Failure) -> Result<(), InternalError> {
        self.result
            .failures
            .get_or_insert_with(Vec::new)
            .push(failure);

        Ok(())
    }

    fn set_failures(&mut self, _failures: Vec<Failure>) -> Result<(), InternalError> {
        Err(Self::unsupported("setFailures"))
    }

    fn add_subdocument(&mut self, _subdocument: Snapshot) -> Result<(), InternalError> {
        Err(Self::unsupported("addSubdocument"))
    }

    fn update_subdocument(
        &mut self,
        _index: usize,
        _reference: Option<String>,
        changes: Vec<Change>,
    ) -> Result<(), InternalError> {
        if changes.is_empty() {
            Ok(())
        } else {
            Err(Self::unsupported("updateSubdocument"))
        }
    }

    fn remove_subdocument(
        &mut self,
        _index: usize,
        _reference: Option<String>,
    ) -> Result<(), InternalError> {
        Err(Self::unsupported("removeSubdocument"))
    }
}
