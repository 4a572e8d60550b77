//! Proptest strategies over snapshots and view edits.

use crate::{
    model::{Failure, FieldValue, Snapshot},
    view::{DocumentMut, DocumentView},
};
use proptest::{collection::vec, option, prelude::*, sample::select};
use std::{collections::BTreeMap, sync::Arc};

const FIELD_NAMES: &[&str] = &["a", "b", "c"];
const VALUES: &[&str] = &["1", "2", "3"];
const REFERENCES: &[&str] = &["r1", "r2", "r3"];
const FAILURE_IDS: &[&str] = &["E1", "E2"];

fn arb_reference() -> impl Strategy<Value = Option<String>> {
    option::of(select(REFERENCES).prop_map(str::to_string))
}

fn arb_fields() -> impl Strategy<Value = BTreeMap<String, Vec<FieldValue>>> {
    proptest::collection::btree_map(
        select(FIELD_NAMES).prop_map(str::to_string),
        vec(select(VALUES).prop_map(FieldValue::text), 1..3),
        0..3,
    )
}

fn arb_failures() -> impl Strategy<Value = Vec<Failure>> {
    vec(select(FAILURE_IDS).prop_map(|id| Failure::new(id, "failed")), 0..2)
}

/// Snapshots up to three levels deep.
pub(crate) fn arb_snapshot() -> impl Strategy<Value = Snapshot> {
    let leaf = (arb_reference(), arb_fields(), arb_failures()).prop_map(
        |(reference, fields, failures)| Snapshot::from_parts(reference, fields, failures, Vec::new()),
    );

    leaf.prop_recursive(3, 16, 3, |inner| {
        (
            arb_reference(),
            arb_fields(),
            arb_failures(),
            vec(inner.prop_map(Arc::new), 0..3),
        )
            .prop_map(|(reference, fields, failures, subdocuments)| {
                Snapshot::from_parts(reference, fields, failures, subdocuments)
            })
    })
}

///
/// ViewOp
///
/// One edit addressed by a path of live subdocument positions. Each
/// position is taken modulo the live count, and the walk stops early at a
/// document without subdocuments.
///

#[derive(Clone, Debug)]
pub(crate) enum ViewOp {
    SetReference(Vec<usize>, Option<String>),
    ResetReference(Vec<usize>),
    AddValue(Vec<usize>, String, String),
    SetValue(Vec<usize>, String, String),
    ClearField(Vec<usize>, String),
    ResetField(Vec<usize>, String),
    AddFailure(Vec<usize>, String),
    ClearFailures(Vec<usize>),
    ResetFailures(Vec<usize>),
    AddSubdocument(Vec<usize>, Option<String>),
    Delete(Vec<usize>),
    ResetSubdocuments(Vec<usize>),
    Reset(Vec<usize>),
}

fn arb_path() -> impl Strategy<Value = Vec<usize>> {
    vec(0..4usize, 0..3)
}

fn arb_name() -> impl Strategy<Value = String> {
    select(FIELD_NAMES).prop_map(str::to_string)
}

fn arb_value() -> impl Strategy<Value = String> {
    select(VALUES).prop_map(str::to_string)
}

fn arb_view_op() -> impl Strategy<Value = ViewOp> {
    prop_oneof![
        1 => (arb_path(), arb_reference()).prop_map(|(p, r)| ViewOp::SetReference(p, r)),
        1 => arb_path().prop_map(ViewOp::ResetReference),
        3 => (arb_path(), arb_name(), arb_value()).prop_map(|(p, n, v)| ViewOp::AddValue(p, n, v)),
        2 => (arb_path(), arb_name(), arb_value()).prop_map(|(p, n, v)| ViewOp::SetValue(p, n, v)),
        1 => (arb_path(), arb_name()).prop_map(|(p, n)| ViewOp::ClearField(p, n)),
        1 => (arb_path(), arb_name()).prop_map(|(p, n)| ViewOp::ResetField(p, n)),
        2 => (arb_path(), select(FAILURE_IDS).prop_map(str::to_string))
            .prop_map(|(p, id)| ViewOp::AddFailure(p, id)),
        1 => arb_path().prop_map(ViewOp::ClearFailures),
        1 => arb_path().prop_map(ViewOp::ResetFailures),
        2 => (arb_path(), arb_reference()).prop_map(|(p, r)| ViewOp::AddSubdocument(p, r)),
        2 => arb_path().prop_map(ViewOp::Delete),
        1 => arb_path().prop_map(ViewOp::ResetSubdocuments),
        1 => arb_path().prop_map(ViewOp::Reset),
    ]
}

/// Short sequences of edits.
pub(crate) fn arb_view_ops() -> impl Strategy<Value = Vec<ViewOp>> {
    vec(arb_view_op(), 0..12)
}

fn resolve<'v>(view: &'v mut DocumentView, path: &[usize]) -> DocumentMut<'v> {
    let root = view.root();
    let mut document = view.document_mut(root);

    for position in path {
        let mut subdocuments = document.subdocuments();
        let len = subdocuments.len();
        if len == 0 {
            break;
        }
        let Some(id) = subdocuments.id_at(position % len) else {
            break;
        };
        document = document.into_node(id);
    }

    document
}

/// Apply one edit. Deleting the root is ignored.
pub(crate) fn apply_op(view: &mut DocumentView, op: &ViewOp) {
    match op {
        ViewOp::SetReference(path, reference) => {
            resolve(view, path).set_reference(reference.clone());
        }
        ViewOp::ResetReference(path) => resolve(view, path).reset_reference(),
        ViewOp::AddValue(path, name, value) => {
            resolve(view, path).field(name).add(value.as_str());
        }
        ViewOp::SetValue(path, name, value) => {
            resolve(view, path).field(name).set(value.as_str());
        }
        ViewOp::ClearField(path, name) => {
            resolve(view, path).field(name).clear();
        }
        ViewOp::ResetField(path, name) => {
            resolve(view, path).field(name).reset();
        }
        ViewOp::AddFailure(path, id) => {
            resolve(view, path).failures().add(id.as_str(), "failed");
        }
        ViewOp::ClearFailures(path) => {
            resolve(view, path).failures().clear();
        }
        ViewOp::ResetFailures(path) => {
            resolve(view, path).failures().reset();
        }
        ViewOp::AddSubdocument(path, reference) => {
            resolve(view, path).subdocuments().add(reference.clone());
        }
        ViewOp::Delete(path) => {
            let mut document = resolve(view, path);
            if document.parent().is_some() {
                document.delete().expect("subdocuments can be deleted");
            }
        }
        ViewOp::ResetSubdocuments(path) => resolve(view, path).subdocuments().reset(),
        ViewOp::Reset(path) => resolve(view, path).reset(),
    }
}
