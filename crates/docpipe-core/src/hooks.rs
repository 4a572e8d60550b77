//! Per-task extension points invoked around document processing.

use crate::{
    error::{ErrorOrigin, InternalError},
    task::Task,
    view::DocumentMut,
};
use thiserror::Error as ThisError;

///
/// Admission
///
/// Whether a candidate document joins the batch.
///

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Admission {
    #[default]
    Admit,
    Cancel,
}

impl Admission {
    #[must_use]
    pub const fn is_admitted(self) -> bool {
        matches!(self, Self::Admit)
    }
}

///
/// HookError
///

#[derive(Debug, ThisError)]
pub enum HookError {
    #[error("transient hook failure: {0}")]
    Transient(String),

    #[error("hook interrupted")]
    Interrupted,
}

impl From<HookError> for InternalError {
    fn from(err: HookError) -> Self {
        match err {
            HookError::Transient(message) => Self::transient(ErrorOrigin::Hook, message),
            HookError::Interrupted => Self::interrupted(ErrorOrigin::Hook),
        }
    }
}

///
/// TaskHooks
///
/// Every method defaults to a no-op that admits everything.
///
/// Call order for one task: `prepare`, then `before_admit` for each
/// candidate document, then (after processing) `after_admit` for each
/// candidate in the same order, then `after_task`.
///

pub trait TaskHooks {
    fn prepare(&mut self, _task: &mut Task) -> Result<(), HookError> {
        Ok(())
    }

    fn before_admit(&mut self, _document: &mut DocumentMut<'_>) -> Result<Admission, HookError> {
        Ok(Admission::Admit)
    }

    fn after_admit(
        &mut self,
        _document: &mut DocumentMut<'_>,
        _admission: Admission,
    ) -> Result<(), HookError> {
        Ok(())
    }

    fn after_task(&mut self, _task: &mut Task) -> Result<(), HookError> {
        Ok(())
    }
}

///
/// NoHooks
///

#[derive(Clone, Copy, Debug, Default)]
pub struct NoHooks;

impl TaskHooks for NoHooks {}
