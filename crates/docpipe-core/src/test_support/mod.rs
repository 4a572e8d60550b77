//! Fixtures shared by the unit tests of this crate.

pub(crate) mod arb;
mod runtime;

use crate::{
    error::{ErrorOrigin, InternalError},
    model::{FieldValue, Snapshot},
    resolve::ValueResolver,
    view::DocumentView,
};
use std::{collections::BTreeMap, io::Read, sync::Arc};

pub(crate) use runtime::{
    RecordingSink, ScriptedHooks, ScriptedSource, Step, document_item, field_item, settings,
};

/// Text field values in order.
pub(crate) fn text_values<const N: usize>(values: [&str; N]) -> Vec<FieldValue> {
    values.into_iter().map(FieldValue::text).collect()
}

/// Fresh view over an owned snapshot.
pub(crate) fn view_of(snapshot: Snapshot) -> DocumentView {
    DocumentView::new(Arc::new(snapshot))
}

///
/// MapResolver
///
/// In-memory remote storage keyed by reference.
///

#[derive(Debug, Default)]
pub(crate) struct MapResolver {
    blobs: BTreeMap<String, Vec<u8>>,
}

impl MapResolver {
    pub(crate) fn with(mut self, reference: &str, bytes: impl AsRef<[u8]>) -> Self {
        self.blobs
            .insert(reference.to_string(), bytes.as_ref().to_vec());
        self
    }
}

impl ValueResolver for MapResolver {
    fn resolve(&self, reference: &str) -> Result<Box<dyn Read + '_>, InternalError> {
        self.blobs
            .get(reference)
            .map(|bytes| Box::new(bytes.as_slice()) as Box<dyn Read + '_>)
            .ok_or_else(|| {
                InternalError::transient(ErrorOrigin::Resolver, format!("'{reference}' not found"))
            })
    }
}
