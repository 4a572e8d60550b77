use crate::{
    model::{Failure, FieldValue},
    serialize::null_as_default,
};
use serde::{Deserialize, Deserializer, Serialize};
use std::{collections::BTreeMap, sync::Arc};

///
/// Snapshot
///
/// Immutable document state: reference, named multi-valued fields, failures,
/// and an ordered list of subdocuments. Absent collections are empty, and a
/// field never maps to an empty value list.
///

#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reference: Option<String>,

    #[serde(
        default,
        deserialize_with = "deserialize_fields",
        skip_serializing_if = "BTreeMap::is_empty"
    )]
    fields: BTreeMap<String, Vec<FieldValue>>,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    failures: Vec<Failure>,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    subdocuments: Vec<Arc<Snapshot>>,
}

impl Snapshot {
    #[must_use]
    pub fn builder() -> SnapshotBuilder {
        SnapshotBuilder::default()
    }

    /// Snapshot holding only fields, as carried by flat field tasks.
    #[must_use]
    pub fn from_fields(fields: BTreeMap<String, Vec<FieldValue>>) -> Self {
        Self {
            fields: fields
                .into_iter()
                .filter(|(_, values)| !values.is_empty())
                .collect(),
            ..Self::default()
        }
    }

    pub(crate) fn from_parts(
        reference: Option<String>,
        fields: BTreeMap<String, Vec<FieldValue>>,
        failures: Vec<Failure>,
        subdocuments: Vec<Arc<Self>>,
    ) -> Self {
        Self {
            reference,
            fields,
            failures,
            subdocuments,
        }
    }

    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        self.reference.as_deref()
    }

    #[must_use]
    pub const fn fields(&self) -> &BTreeMap<String, Vec<FieldValue>> {
        &self.fields
    }

    /// Values of one field; empty when the field is absent.
    #[must_use]
    pub fn field(&self, name: &str) -> &[FieldValue] {
        self.fields.get(name).map_or(&[], Vec::as_slice)
    }

    #[must_use]
    pub fn failures(&self) -> &[Failure] {
        &self.failures
    }

    #[must_use]
    pub fn subdocuments(&self) -> &[Arc<Self>] {
        &self.subdocuments
    }

    #[must_use]
    pub fn subdocument(&self, index: usize) -> Option<&Self> {
        self.subdocuments.get(index).map(Arc::as_ref)
    }

    /// True when this document or any descendant carries a failure.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty() || self.subdocuments.iter().any(|sub| sub.has_failures())
    }

    /// Append the message of every failure in this subtree, depth-first.
    pub(crate) fn collect_failure_messages(&self, out: &mut Vec<String>) {
        out.extend(self.failures.iter().map(|f| f.message().to_string()));
        for sub in &self.subdocuments {
            sub.collect_failure_messages(out);
        }
    }

    // replay access

    pub(crate) fn set_reference(&mut self, reference: Option<String>) {
        self.reference = reference;
    }

    pub(crate) const fn fields_mut(&mut self) -> &mut BTreeMap<String, Vec<FieldValue>> {
        &mut self.fields
    }

    pub(crate) const fn failures_mut(&mut self) -> &mut Vec<Failure> {
        &mut self.failures
    }

    pub(crate) const fn subdocuments_mut(&mut self) -> &mut Vec<Arc<Self>> {
        &mut self.subdocuments
    }
}

// Null value lists and empty value lists both mean "no such field".
fn deserialize_fields<'de, D>(deserializer: D) -> Result<BTreeMap<String, Vec<FieldValue>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<BTreeMap<String, Option<Vec<FieldValue>>>> = Option::deserialize(deserializer)?;

    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(name, values)| match values {
            Some(values) if !values.is_empty() => Some((name, values)),
            _ => None,
        })
        .collect())
}

///
/// SnapshotBuilder
///

#[derive(Debug, Default)]
pub struct SnapshotBuilder {
    inner: Snapshot,
}

impl SnapshotBuilder {
    #[must_use]
    pub fn reference(mut self, reference: impl Into<String>) -> Self {
        self.inner.reference = Some(reference.into());
        self
    }

    /// Append values to a field. Appending nothing leaves the field absent.
    #[must_use]
    pub fn field<I, V>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<FieldValue>,
    {
        let values: Vec<FieldValue> = values.into_iter().map(Into::into).collect();
        if !values.is_empty() {
            self.inner
                .fields
                .entry(name.into())
                .or_default()
                .extend(values);
        }
        self
    }

    #[must_use]
    pub fn failure(mut self, failure: Failure) -> Self {
        self.inner.failures.push(failure);
        self
    }

    #[must_use]
    pub fn subdocument(mut self, subdocument: impl Into<Arc<Snapshot>>) -> Self {
        self.inner.subdocuments.push(subdocument.into());
        self
    }

    #[must_use]
    pub fn build(self) -> Snapshot {
        self.inner
    }
}
