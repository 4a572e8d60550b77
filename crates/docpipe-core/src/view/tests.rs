use crate::{
    error::ErrorClass,
    model::{Failure, FieldValue, Snapshot},
    test_support::{text_values, view_of},
    view::NodeId,
};

fn article() -> Snapshot {
    Snapshot::builder()
        .reference("doc-1")
        .field("title", ["Hello"])
        .field("tags", ["a", "b"])
        .failure(Failure::new("OLD", "earlier stage failed"))
        .subdocument(Snapshot::builder().reference("att-1").field("n", ["1"]).build())
        .subdocument(Snapshot::builder().reference("att-2").build())
        .build()
}

#[test]
fn add_mode_reads_original_then_pending() {
    let mut view = view_of(article());
    let mut doc = view.document_mut(NodeId::ROOT);
    doc.field("tags").add("c");

    let tags: Vec<&str> = doc.to_ref().field("tags").string_values().collect();
    assert_eq!(tags, ["a", "b", "c"]);
}

#[test]
fn clear_hides_original_values_until_reset() {
    let mut view = view_of(article());
    let mut doc = view.document_mut(NodeId::ROOT);

    doc.field("title").clear();
    assert!(!doc.to_ref().field("title").has_values());
    assert!(doc.to_ref().field("title").has_changes());
    assert_eq!(doc.field_names(), ["tags"]);

    doc.field("title").reset();
    assert_eq!(
        doc.to_ref().field("title").values().cloned().collect::<Vec<_>>(),
        text_values(["Hello"])
    );
    assert!(!doc.has_changes());
}

#[test]
fn set_replaces_every_value() {
    let mut view = view_of(article());
    let mut doc = view.document_mut(NodeId::ROOT);
    doc.field("tags").set("only");

    let tags: Vec<&FieldValue> = doc.to_ref().field("tags").values().collect();
    assert_eq!(tags, [&FieldValue::text("only")]);
}

#[test]
fn failure_count_honours_discard_flag() {
    let mut view = view_of(article());
    let mut doc = view.document_mut(NodeId::ROOT);

    doc.failures().add("NEW", "this stage failed");
    assert_eq!(doc.failures().len(), 2);

    doc.failures().clear();
    assert!(doc.failures().is_empty());
    assert!(doc.failures().has_changes());

    doc.failures().add("NEWER", "again");
    let ids: Vec<&str> = doc.to_ref().failures().iter().map(Failure::id).collect();
    assert_eq!(ids, ["NEWER"]);

    doc.failures().reset();
    assert_eq!(doc.failures().len(), 1);
    assert!(!doc.failures().has_changes());
}

#[test]
fn reference_change_is_reported_only_when_different() {
    let mut view = view_of(article());
    let mut doc = view.document_mut(NodeId::ROOT);

    doc.set_reference(Some("doc-1".into()));
    assert!(!doc.has_changes());

    doc.set_reference(None);
    assert!(doc.has_changes());
    assert_eq!(doc.to_ref().original_reference(), Some("doc-1"));

    doc.reset_reference();
    assert_eq!(doc.reference(), Some("doc-1"));
    assert!(!doc.has_changes());
}

#[test]
fn deleted_subdocuments_are_skipped_by_live_positions() {
    let mut view = view_of(article());
    let mut root = view.document_mut(NodeId::ROOT);

    root.subdocuments()
        .get(0)
        .expect("first attachment")
        .delete()
        .expect("delete subdocument");

    let subdocuments = root.subdocuments();
    assert_eq!(subdocuments.len(), 1);
    let remaining = subdocuments.get(0).expect("second attachment");
    assert_eq!(remaining.reference(), Some("att-2"));
}

#[test]
fn added_subdocuments_follow_originals() {
    let mut view = view_of(article());
    let mut root = view.document_mut(NodeId::ROOT);

    root.subdocuments()
        .add(Some("att-3".into()))
        .field("n")
        .add("3");

    let ids = root.subdocuments().ids();
    let references: Vec<Option<&str>> = ids
        .iter()
        .map(|id| view.document(*id).reference())
        .collect();
    assert_eq!(references, [Some("att-1"), Some("att-2"), Some("att-3")]);
}

#[test]
fn subdocument_reset_restores_originals_and_drops_new_ones() {
    let mut view = view_of(article());
    let mut root = view.document_mut(NodeId::ROOT);

    root.subdocuments().add(None);
    root.subdocuments()
        .get(1)
        .expect("att-2")
        .delete()
        .expect("delete");
    assert_eq!(root.subdocuments().len(), 2);
    assert!(root.subdocuments().has_changes());

    root.subdocuments().reset();
    assert_eq!(root.subdocuments().len(), 2);
    assert!(!root.subdocuments().has_changes());
    assert!(!root.has_changes());
}

#[test]
fn root_cannot_be_deleted() {
    let mut view = view_of(article());
    let err = view
        .document_mut(NodeId::ROOT)
        .delete()
        .expect_err("root delete must fail");

    assert_eq!(err.class, ErrorClass::InvariantViolation);
}

#[test]
fn nested_change_marks_ancestors_changed() {
    let mut view = view_of(article());
    let child = view
        .document_mut(NodeId::ROOT)
        .subdocuments()
        .id_at(0)
        .expect("first attachment");

    view.document_mut(child).field("n").add("2");

    assert!(view.document(child).has_changes());
    assert!(view.document(NodeId::ROOT).has_changes());
    assert_eq!(view.document(child).parent(), Some(NodeId::ROOT));
}

#[test]
fn hierarchy_is_depth_first_and_skips_deleted() {
    let snapshot = Snapshot::builder()
        .reference("r")
        .subdocument(
            Snapshot::builder()
                .reference("a")
                .subdocument(Snapshot::builder().reference("a1").build())
                .build(),
        )
        .subdocument(Snapshot::builder().reference("b").build())
        .build();
    let mut view = view_of(snapshot);
    let b = view
        .document_mut(NodeId::ROOT)
        .subdocuments()
        .id_at(1)
        .expect("b");
    view.document_mut(b).delete().expect("delete b");

    let order: Vec<Option<&str>> = view
        .hierarchy()
        .into_iter()
        .map(|id| view.document(id).reference())
        .collect();

    assert_eq!(order, [Some("r"), Some("a"), Some("a1")]);
}

#[test]
fn to_snapshot_freezes_current_state() {
    let mut view = view_of(article());
    {
        let mut root = view.document_mut(NodeId::ROOT);
        root.field("title").clear();
        root.failures().clear();
        root.subdocuments()
            .get(0)
            .expect("att-1")
            .delete()
            .expect("delete");
    }

    let frozen = view.document(NodeId::ROOT).to_snapshot();

    assert!(frozen.field("title").is_empty());
    assert!(frozen.failures().is_empty());
    assert_eq!(frozen.subdocuments().len(), 1);
    assert_eq!(frozen.subdocuments()[0].reference(), Some("att-2"));
    assert_eq!(view.original().as_ref(), &article());
}
