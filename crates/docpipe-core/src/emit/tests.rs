use crate::{
    changelog::{Change, ChangeLogEntry, replay},
    emit::{
        ChangeLogBuilder, ChangesJournal, FieldChanges, FieldResultBuilder, changes_of,
        record_changes,
    },
    error::ErrorClass,
    model::{Failure, FieldValue, Snapshot},
    test_support::{
        arb::{apply_op, arb_snapshot, arb_view_ops},
        text_values, view_of,
    },
    view::FieldAction,
};
use proptest::prelude::*;
use std::collections::BTreeMap;

fn xyz() -> Snapshot {
    Snapshot::builder()
        .reference("root")
        .field("title", ["t"])
        .subdocument(Snapshot::builder().reference("x").build())
        .subdocument(Snapshot::builder().reference("y").build())
        .subdocument(Snapshot::builder().reference("z").field("n", ["1"]).build())
        .build()
}

#[test]
fn untouched_view_emits_nothing() {
    let mut view = view_of(xyz());
    let root = view.root();

    // reads and materialization alone are not changes
    let _ = view.hierarchy();
    {
        let mut doc = view.document_mut(root);
        let _ = doc.field("title").has_values();
        let _ = doc.failures().len();
    }

    assert!(!view.document(root).has_changes());
    assert!(changes_of(&view, root).expect("emit").is_empty());
}

#[test]
fn clear_flips_a_field_to_replace() {
    let mut view = view_of(Snapshot::default());
    let root = view.root();
    {
        let mut doc = view.document_mut(root);
        let mut field = doc.field("f");
        field.add("a").add("b");
        field.clear();
        field.add("c");
    }

    assert_eq!(
        changes_of(&view, root).expect("emit"),
        vec![Change::SetFields(BTreeMap::from([(
            "f".into(),
            Some(text_values(["c"]))
        )]))]
    );
}

#[test]
fn field_changes_are_grouped_remove_add_set() {
    let mut view = view_of(xyz());
    let root = view.root();
    {
        let mut doc = view.document_mut(root);
        doc.field("title").clear();
        doc.field("tags").add("new");
        doc.field("body").set("text");
        doc.field("untouched").add("x").reset();
    }

    assert_eq!(
        changes_of(&view, root).expect("emit"),
        vec![
            Change::RemoveFields(vec!["title".into()]),
            Change::AddFields(BTreeMap::from([("tags".into(), text_values(["new"]))])),
            Change::SetFields(BTreeMap::from([("body".into(), Some(text_values(["text"])))])),
        ]
    );
}

#[test]
fn reference_change_is_emitted_only_when_different() {
    let mut view = view_of(xyz());
    let root = view.root();

    view.document_mut(root).set_reference(Some("root".into()));
    assert!(changes_of(&view, root).expect("emit").is_empty());

    view.document_mut(root).set_reference(None);
    assert_eq!(
        changes_of(&view, root).expect("emit"),
        vec![Change::SetReference { value: None }]
    );
}

#[test]
fn added_failures_are_emitted_one_by_one() {
    let mut view = view_of(Snapshot::builder().failure(Failure::new("OLD", "o")).build());
    let root = view.root();
    view.document_mut(root)
        .failures()
        .add("A", "first")
        .add("B", "second");

    assert_eq!(
        changes_of(&view, root).expect("emit"),
        vec![
            Change::AddFailure(Failure::new("A", "first")),
            Change::AddFailure(Failure::new("B", "second")),
        ]
    );
}

#[test]
fn cleared_failures_emit_set_failures_even_when_empty() {
    let mut view = view_of(Snapshot::default());
    let root = view.root();
    view.document_mut(root).failures().clear();

    assert_eq!(
        changes_of(&view, root).expect("emit"),
        vec![Change::SetFailures(Vec::new())]
    );

    view.document_mut(root).failures().add("N", "new");
    assert_eq!(
        changes_of(&view, root).expect("emit"),
        vec![Change::SetFailures(vec![Failure::new("N", "new")])]
    );
}

#[test]
fn deleted_and_updated_subdocuments_keep_original_indices() {
    let mut view = view_of(xyz());
    let root = view.root();
    {
        let mut doc = view.document_mut(root);
        doc.subdocuments()
            .get(1)
            .expect("y")
            .delete()
            .expect("delete y");
        // live position 1 is now z
        let mut z = doc.subdocuments().get(1).expect("z");
        assert_eq!(z.reference(), Some("z"));
        z.field("n").add("2");
    }

    assert_eq!(
        changes_of(&view, root).expect("emit"),
        vec![
            Change::UpdateSubdocument {
                index: 2,
                reference: Some("z".into()),
                changes: vec![Change::AddFields(BTreeMap::from([(
                    "n".into(),
                    text_values(["2"])
                )]))],
            },
            Change::RemoveSubdocument {
                index: 1,
                reference: Some("y".into()),
            },
        ]
    );
}

#[test]
fn subdocument_changes_use_the_original_reference() {
    let mut view = view_of(xyz());
    let root = view.root();
    view.document_mut(root)
        .subdocuments()
        .get(0)
        .expect("x")
        .set_reference(Some("x2".into()));

    assert_eq!(
        changes_of(&view, root).expect("emit"),
        vec![Change::UpdateSubdocument {
            index: 0,
            reference: Some("x".into()),
            changes: vec![Change::SetReference {
                value: Some("x2".into())
            }],
        }]
    );
}

#[test]
fn added_subdocuments_are_emitted_whole_after_originals() {
    let mut view = view_of(xyz());
    let root = view.root();
    {
        let mut doc = view.document_mut(root);
        let mut first = doc.subdocuments().add(Some("new-1".into()));
        first.field("k").add("v");
        first
            .subdocuments()
            .add(Some("new-1.0".into()))
            .failures()
            .add("E", "nested");

        doc.subdocuments()
            .add(Some("dropped".into()))
            .delete()
            .expect("delete added");
        doc.subdocuments().get(0).expect("x").delete().expect("delete x");
    }

    let expected_added = Snapshot::builder()
        .reference("new-1")
        .field("k", ["v"])
        .subdocument(
            Snapshot::builder()
                .reference("new-1.0")
                .failure(Failure::new("E", "nested"))
                .build(),
        )
        .build();

    assert_eq!(
        changes_of(&view, root).expect("emit"),
        vec![
            Change::RemoveSubdocument {
                index: 0,
                reference: Some("x".into()),
            },
            Change::AddSubdocument(expected_added),
        ]
    );
}

#[test]
fn reset_discards_every_recorded_change() {
    let mut view = view_of(xyz());
    let root = view.root();
    {
        let mut doc = view.document_mut(root);
        doc.set_reference(Some("other".into()));
        doc.field("title").set("changed");
        doc.failures().clear();
        doc.subdocuments().add(None);
        doc.subdocuments().get(0).expect("x").delete().expect("delete");
        doc.reset();
    }

    assert!(!view.document(root).has_changes());
    assert!(changes_of(&view, root).expect("emit").is_empty());
    assert_eq!(view.document(root).to_snapshot(), xyz());
}

#[test]
fn builder_set_failures_supersedes_earlier_failure_changes() {
    let mut builder = ChangeLogBuilder::new();
    builder
        .add_failure(Failure::new("A", "a"))
        .expect("add failure");
    builder
        .set_reference(Some("r".into()))
        .expect("set reference");
    builder
        .add_failure(Failure::new("B", "b"))
        .expect("add failure");
    builder
        .set_failures(vec![Failure::new("C", "c")])
        .expect("set failures");

    assert_eq!(
        builder.into_changes(),
        vec![
            Change::SetReference {
                value: Some("r".into())
            },
            Change::SetFailures(vec![Failure::new("C", "c")]),
        ]
    );
}

#[test]
fn field_result_carries_field_changes_and_failures() {
    let mut view = view_of(Snapshot::builder().field("a", ["1"]).build());
    let root = view.root();
    {
        let mut doc = view.document_mut(root);
        doc.field("a").clear();
        doc.field("b").add(FieldValue::bytes(vec![1, 2]));
        doc.failures().add("W", "warning");
    }

    let mut builder = FieldResultBuilder::new();
    record_changes(&view, root, &mut builder).expect("flat result");
    let result = builder.into_result();

    assert_eq!(
        result.field_changes,
        Some(BTreeMap::from([
            (
                "a".into(),
                FieldChanges {
                    action: FieldAction::Replace,
                    values: Vec::new(),
                }
            ),
            (
                "b".into(),
                FieldChanges {
                    action: FieldAction::Add,
                    values: vec![FieldValue::bytes(vec![1, 2])],
                }
            ),
        ]))
    );
    assert!(result.has_failures());
}

#[test]
fn field_result_refuses_reference_changes() {
    let mut view = view_of(Snapshot::default());
    let root = view.root();
    view.document_mut(root).set_reference(Some("r".into()));

    let err = record_changes(&view, root, &mut FieldResultBuilder::new())
        .expect_err("reference change is not expressible");

    assert_eq!(err.class, ErrorClass::Unsupported);
}

proptest! {
    #[test]
    fn replaying_emitted_changes_reproduces_the_view(
        snapshot in arb_snapshot(),
        ops in arb_view_ops(),
    ) {
        let mut view = view_of(snapshot.clone());
        for op in &ops {
            apply_op(&mut view, op);
        }
        let root = view.root();

        let changes = changes_of(&view, root).expect("emit");
        let replayed = replay(&snapshot, &[ChangeLogEntry::new("prop:1", changes.clone())])
            .expect("replay emitted changes");

        prop_assert_eq!(replayed, view.document(root).to_snapshot());
        prop_assert_eq!(changes.is_empty(), !view.document(root).has_changes());
    }
}
