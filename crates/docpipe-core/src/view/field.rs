use crate::model::FieldValue;
use serde::{Deserialize, Serialize};

///
/// FieldAction
///
/// How pending values relate to the original ones: `Add` appends to them,
/// `Replace` discards them.
///

#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldAction {
    #[default]
    Add,
    Replace,
}

///
/// FieldTracker
///
/// Journal for one field name: the action and the values added since.
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct FieldTracker {
    pub(crate) action: FieldAction,
    pub(crate) pending: Vec<FieldValue>,
}

impl FieldTracker {
    pub(crate) fn has_changes(&self) -> bool {
        matches!(self.action, FieldAction::Replace) || !self.pending.is_empty()
    }

    fn clear(&mut self) {
        self.action = FieldAction::Replace;
        self.pending.clear();
    }

    fn reset(&mut self) {
        self.action = FieldAction::Add;
        self.pending.clear();
    }
}

/// Current values: original followed by pending for `Add`, pending only for `Replace`.
pub(crate) fn current_values<'a>(
    original: &'a [FieldValue],
    tracker: Option<&'a FieldTracker>,
) -> impl Iterator<Item = &'a FieldValue> + 'a {
    let (original, pending): (&[FieldValue], &[FieldValue]) = match tracker {
        None => (original, &[]),
        Some(tracker) => match tracker.action {
            FieldAction::Add => (original, &tracker.pending),
            FieldAction::Replace => (&[], &tracker.pending),
        },
    };

    original.iter().chain(pending)
}

///
/// FieldRef
///

#[derive(Clone, Copy, Debug)]
pub struct FieldRef<'a> {
    name: &'a str,
    original: &'a [FieldValue],
    tracker: Option<&'a FieldTracker>,
}

impl<'a> FieldRef<'a> {
    pub(crate) const fn new(
        name: &'a str,
        original: &'a [FieldValue],
        tracker: Option<&'a FieldTracker>,
    ) -> Self {
        Self {
            name,
            original,
            tracker,
        }
    }

    #[must_use]
    pub const fn name(&self) -> &'a str {
        self.name
    }

    pub fn values(&self) -> impl Iterator<Item = &'a FieldValue> + 'a {
        current_values(self.original, self.tracker)
    }

    /// Inline values that are valid UTF-8.
    pub fn string_values(&self) -> impl Iterator<Item = &'a str> + 'a {
        self.values().filter_map(FieldValue::string_value)
    }

    #[must_use]
    pub fn has_values(&self) -> bool {
        self.values().next().is_some()
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.tracker.is_some_and(FieldTracker::has_changes)
    }
}

///
/// FieldMut
///
/// Mutable handle on one field of one document.
///

#[derive(Debug)]
pub struct FieldMut<'a> {
    name: &'a str,
    original: &'a [FieldValue],
    tracker: &'a mut FieldTracker,
}

impl<'a> FieldMut<'a> {
    pub(crate) const fn new(
        name: &'a str,
        original: &'a [FieldValue],
        tracker: &'a mut FieldTracker,
    ) -> Self {
        Self {
            name,
            original,
            tracker,
        }
    }

    #[must_use]
    pub fn to_ref(&self) -> FieldRef<'_> {
        FieldRef::new(self.name, self.original, Some(self.tracker))
    }

    #[must_use]
    pub const fn name(&self) -> &str {
        self.name
    }

    pub fn values(&self) -> impl Iterator<Item = &FieldValue> + '_ {
        current_values(self.original, Some(self.tracker))
    }

    pub fn string_values(&self) -> impl Iterator<Item = &str> + '_ {
        self.values().filter_map(FieldValue::string_value)
    }

    #[must_use]
    pub fn has_values(&self) -> bool {
        self.values().next().is_some()
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.tracker.has_changes()
    }

    /// Append one value.
    pub fn add(&mut self, value: impl Into<FieldValue>) -> &mut Self {
        self.tracker.pending.push(value.into());
        self
    }

    /// Append a storage reference value.
    pub fn add_reference(&mut self, reference: impl Into<String>) -> &mut Self {
        self.add(FieldValue::reference(reference))
    }

    /// Drop the original values and anything added so far.
    pub fn clear(&mut self) -> &mut Self {
        self.tracker.clear();
        self
    }

    /// Replace every value with `value`.
    pub fn set(&mut self, value: impl Into<FieldValue>) -> &mut Self {
        self.clear().add(value)
    }

    /// Forget every change made to this field.
    pub fn reset(&mut self) -> &mut Self {
        self.tracker.reset();
        self
    }
}
