use crate::{
    error::InternalError,
    model::Snapshot,
    view::{
        DocumentView, FailuresMut, FailuresRef, FieldMut, FieldRef, NodeId, Subdocuments,
    },
};

///
/// DocumentRef
///
/// Read-only handle on one document of a view.
///

#[derive(Clone, Copy, Debug)]
pub struct DocumentRef<'a> {
    view: &'a DocumentView,
    id: NodeId,
}

impl<'a> DocumentRef<'a> {
    pub(crate) const fn new(view: &'a DocumentView, id: NodeId) -> Self {
        Self { view, id }
    }

    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn reference(&self) -> Option<&'a str> {
        self.view.node(self.id).reference.as_deref()
    }

    /// Reference the document had before this pass.
    #[must_use]
    pub fn original_reference(&self) -> Option<&'a str> {
        self.view.node(self.id).original.reference()
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.view.node(self.id).parent
    }

    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent().is_none()
    }

    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.view.node(self.id).deleted
    }

    #[must_use]
    pub fn field(&self, name: &'a str) -> FieldRef<'a> {
        let node = self.view.node(self.id);

        FieldRef::new(name, node.original.field(name), node.fields.get(name))
    }

    /// Names of every field that currently has values.
    #[must_use]
    pub fn field_names(&self) -> Vec<&'a str> {
        let node = self.view.node(self.id);
        let mut names: Vec<&'a str> = node
            .original
            .fields()
            .keys()
            .chain(node.fields.keys())
            .map(String::as_str)
            .filter(|name| self.field(*name).has_values())
            .collect();
        names.sort_unstable();
        names.dedup();

        names
    }

    #[must_use]
    pub fn failures(&self) -> FailuresRef<'a> {
        let node = self.view.node(self.id);

        FailuresRef::new(node.original.failures(), &node.failures)
    }

    #[must_use]
    pub fn subdocument_count(&self) -> usize {
        self.view.live_children(self.id).len()
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.view.has_changes(self.id)
    }

    /// Freeze the current state of this document and its subtree.
    #[must_use]
    pub fn to_snapshot(&self) -> Snapshot {
        self.view.to_snapshot(self.id)
    }
}

///
/// DocumentMut
///
/// Mutable handle on one document of a view.
///

#[derive(Debug)]
pub struct DocumentMut<'a> {
    view: &'a mut DocumentView,
    id: NodeId,
}

impl<'a> DocumentMut<'a> {
    pub(crate) const fn new(view: &'a mut DocumentView, id: NodeId) -> Self {
        Self { view, id }
    }

    #[must_use]
    pub fn to_ref(&self) -> DocumentRef<'_> {
        DocumentRef::new(self.view, self.id)
    }

    /// Reborrow as a shorter-lived handle on the same document.
    pub fn reborrow(&mut self) -> DocumentMut<'_> {
        DocumentMut::new(self.view, self.id)
    }

    /// Switch this handle to another node of the same view.
    #[must_use]
    pub fn into_node(self, id: NodeId) -> Self {
        Self::new(self.view, id)
    }

    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn reference(&self) -> Option<&str> {
        self.view.node(self.id).reference.as_deref()
    }

    pub fn set_reference(&mut self, reference: Option<String>) {
        self.view.node_mut(self.id).reference = reference;
    }

    pub fn reset_reference(&mut self) {
        let node = self.view.node_mut(self.id);
        node.reference = node.original.reference().map(str::to_string);
    }

    #[must_use]
    pub fn parent(&self) -> Option<NodeId> {
        self.view.node(self.id).parent
    }

    /// Mutable handle on a field; the journal entry is created on first access.
    pub fn field<'s>(&'s mut self, name: &'s str) -> FieldMut<'s> {
        let node = self.view.node_mut(self.id);
        let original = node.original.field(name);
        let tracker = node.fields.entry(name.to_string()).or_default();

        FieldMut::new(name, original, tracker)
    }

    #[must_use]
    pub fn field_names(&self) -> Vec<&str> {
        self.to_ref().field_names()
    }

    pub fn failures(&mut self) -> FailuresMut<'_> {
        let node = self.view.node_mut(self.id);

        FailuresMut::new(node.original.failures(), &mut node.failures)
    }

    pub fn subdocuments(&mut self) -> Subdocuments<'_> {
        Subdocuments::new(self.view, self.id)
    }

    /// Mark this subdocument deleted. The root document cannot be deleted.
    pub fn delete(&mut self) -> Result<(), InternalError> {
        if self.parent().is_none() {
            return Err(InternalError::view_invariant(
                "the root document cannot be deleted",
            ));
        }
        self.view.node_mut(self.id).deleted = true;

        Ok(())
    }

    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.view.node(self.id).deleted
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.view.has_changes(self.id)
    }

    /// Discard every change made to this document and its subtree.
    pub fn reset(&mut self) {
        self.view.reset(self.id);
    }
}
