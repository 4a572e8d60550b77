//! Module: changelog::replay
//! Responsibility: fold an ordered change log onto a base snapshot.
//! Does not own: wire decoding or the mutable view handed to workers.
//! Boundary: returns either the complete effective snapshot or an error;
//! a failed replay never exposes partially applied state.

use crate::{
    changelog::{Change, ChangeLogEntry, ChangeLogError},
    model::Snapshot,
};
use std::sync::Arc;

/// Replay `entries` over `base` and return the effective snapshot.
///
/// Work happens on a private copy that is only returned once every change
/// applied cleanly.
pub fn replay(base: &Snapshot, entries: &[ChangeLogEntry]) -> Result<Snapshot, ChangeLogError> {
    let mut working = base.clone();

    for (index, entry) in entries.iter().enumerate() {
        apply_changes(&mut working, &entry.changes).map_err(|err| err.with_entry(index))?;
    }

    Ok(working)
}

fn apply_changes(document: &mut Snapshot, changes: &[Change]) -> Result<(), ChangeLogError> {
    for (index, change) in changes.iter().enumerate() {
        apply_change(document, change).map_err(|err| err.with_change(index))?;
    }

    Ok(())
}

fn apply_change(document: &mut Snapshot, change: &Change) -> Result<(), ChangeLogError> {
    match change {
        Change::SetReference { value } => document.set_reference(value.clone()),

        Change::AddFields(fields) => {
            for (name, values) in fields {
                if !values.is_empty() {
                    document
                        .fields_mut()
                        .entry(name.clone())
                        .or_default()
                        .extend(values.iter().cloned());
                }
            }
        }

        Change::SetFields(fields) => {
            for (name, values) in fields {
                match values {
                    Some(values) if !values.is_empty() => {
                        document.fields_mut().insert(name.clone(), values.clone());
                    }
                    _ => {
                        document.fields_mut().remove(name);
                    }
                }
            }
        }

        Change::RemoveFields(names) => {
            for name in names {
                document.fields_mut().remove(name);
            }
        }

        Change::AddFailure(failure) => document.failures_mut().push(failure.clone()),

        Change::SetFailures(failures) => *document.failures_mut() = failures.clone(),

        Change::AddSubdocument(subdocument) => {
            document
                .subdocuments_mut()
                .push(Arc::new(subdocument.clone()));
        }

        Change::InsertSubdocument { index, subdocument } => {
            let len = document.subdocuments().len();
            if *index > len {
                return Err(ChangeLogError::IndexOutOfRange {
                    operation: change.operation(),
                    index: *index,
                    len,
                });
            }
            document
                .subdocuments_mut()
                .insert(*index, Arc::new(subdocument.clone()));
        }

        Change::UpdateSubdocument {
            index,
            reference,
            changes,
        } => {
            let slot = locate(document, change.operation(), *index, reference.as_deref())?;
            apply_changes(Arc::make_mut(slot), changes)
                .map_err(|err| err.with_subdocument(*index))?;
        }

        Change::RemoveSubdocument { index, reference } => {
            locate(document, change.operation(), *index, reference.as_deref())?;
            document.subdocuments_mut().remove(*index);
        }
    }

    Ok(())
}

// Find the subdocument at `index` and check it is the one the change expects.
fn locate<'a>(
    document: &'a mut Snapshot,
    operation: &'static str,
    index: usize,
    expected: Option<&str>,
) -> Result<&'a mut Arc<Snapshot>, ChangeLogError> {
    let len = document.subdocuments().len();
    let slot = document
        .subdocuments_mut()
        .get_mut(index)
        .ok_or(ChangeLogError::IndexOutOfRange {
            operation,
            index,
            len,
        })?;

    if let Some(expected) = expected
        && slot.reference() != Some(expected)
    {
        return Err(ChangeLogError::ReferenceMismatch {
            operation,
            index,
            expected: expected.to_string(),
            actual: slot.reference().map(str::to_string),
        });
    }

    Ok(slot)
}
