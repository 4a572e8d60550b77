use crate::model::{Failure, render_error_chain};
use std::error::Error;

///
/// FailureTracker
///

#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct FailureTracker {
    pub(crate) discard_original: bool,
    pub(crate) added: Vec<Failure>,
}

impl FailureTracker {
    pub(crate) fn has_changes(&self) -> bool {
        self.discard_original || !self.added.is_empty()
    }

    pub(crate) fn current<'a>(
        &'a self,
        original: &'a [Failure],
    ) -> impl Iterator<Item = &'a Failure> + 'a {
        let original: &[Failure] = if self.discard_original { &[] } else { original };
        original.iter().chain(&self.added)
    }

    fn len(&self, original: &[Failure]) -> usize {
        let kept = if self.discard_original { 0 } else { original.len() };
        kept + self.added.len()
    }

    pub(crate) fn reset(&mut self) {
        self.discard_original = false;
        self.added.clear();
    }
}

///
/// FailuresRef
///

#[derive(Clone, Copy, Debug)]
pub struct FailuresRef<'a> {
    original: &'a [Failure],
    tracker: &'a FailureTracker,
}

impl<'a> FailuresRef<'a> {
    pub(crate) const fn new(original: &'a [Failure], tracker: &'a FailureTracker) -> Self {
        Self { original, tracker }
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a Failure> + 'a {
        self.tracker.current(self.original)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tracker.len(self.original)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.tracker.has_changes()
    }
}

///
/// FailuresMut
///

#[derive(Debug)]
pub struct FailuresMut<'a> {
    original: &'a [Failure],
    tracker: &'a mut FailureTracker,
}

impl<'a> FailuresMut<'a> {
    pub(crate) const fn new(original: &'a [Failure], tracker: &'a mut FailureTracker) -> Self {
        Self { original, tracker }
    }

    #[must_use]
    pub fn to_ref(&self) -> FailuresRef<'_> {
        FailuresRef::new(self.original, self.tracker)
    }

    /// Record a failure.
    pub fn add(&mut self, id: impl Into<String>, message: impl Into<String>) -> &mut Self {
        self.push(Failure::new(id, message))
    }

    /// Record a failure carrying the rendered cause chain as its stack.
    pub fn add_with_cause(
        &mut self,
        id: impl Into<String>,
        message: impl Into<String>,
        cause: &(dyn Error + 'static),
    ) -> &mut Self {
        self.push(Failure::new(id, message).with_stack(render_error_chain(cause)))
    }

    pub fn push(&mut self, failure: Failure) -> &mut Self {
        self.tracker.added.push(failure);
        self
    }

    /// Drop the original failures and everything recorded so far.
    pub fn clear(&mut self) -> &mut Self {
        self.tracker.discard_original = true;
        self.tracker.added.clear();
        self
    }

    pub fn reset(&mut self) -> &mut Self {
        self.tracker.reset();
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &Failure> + '_ {
        self.tracker.current(self.original)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.tracker.len(self.original)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.tracker.has_changes()
    }
}
