use crate::view::{DocumentMut, DocumentView, NodeId};

///
/// Child
///
/// One subdocument position: an original slot (possibly not yet
/// materialized) or a newly added node.
///

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum Child {
    Original { index: usize, node: Option<NodeId> },
    Added(NodeId),
}

///
/// SubdocumentSlots
///
/// Fixed array aligned to the original subdocument indices plus the list of
/// subdocuments added since.
///

#[derive(Clone, Debug, Default)]
pub(crate) struct SubdocumentSlots {
    original: Vec<Option<NodeId>>,
    added: Vec<NodeId>,
}

impl SubdocumentSlots {
    pub(crate) fn new(original_len: usize) -> Self {
        Self {
            original: vec![None; original_len],
            added: Vec::new(),
        }
    }

    pub(crate) fn original_slot(&self, index: usize) -> Option<NodeId> {
        self.original.get(index).copied().flatten()
    }

    pub(crate) fn fill_slot(&mut self, index: usize, id: NodeId) {
        self.original[index] = Some(id);
    }

    pub(crate) fn push_added(&mut self, id: NodeId) {
        self.added.push(id);
    }

    /// Original slots in index order, then added nodes in append order.
    pub(crate) fn children(&self) -> impl Iterator<Item = Child> + '_ {
        self.original
            .iter()
            .enumerate()
            .map(|(index, node)| Child::Original { index, node: *node })
            .chain(self.added.iter().copied().map(Child::Added))
    }

    /// Original slots, highest index first.
    pub(crate) fn original_rev(&self) -> impl Iterator<Item = (usize, Option<NodeId>)> + '_ {
        self.original.iter().copied().enumerate().rev()
    }

    pub(crate) fn added(&self) -> &[NodeId] {
        &self.added
    }
}

///
/// Subdocuments
///
/// Live subdocument collection of one document. Positions count live
/// entries only: deleted subdocuments are skipped.
///

#[derive(Debug)]
pub struct Subdocuments<'a> {
    view: &'a mut DocumentView,
    owner: NodeId,
}

impl<'a> Subdocuments<'a> {
    pub(crate) const fn new(view: &'a mut DocumentView, owner: NodeId) -> Self {
        Self { view, owner }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.view.live_children(self.owner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Live subdocument at `position`, materialized on demand.
    #[must_use]
    pub fn get(mut self, position: usize) -> Option<DocumentMut<'a>> {
        let id = self.id_at(position)?;

        Some(DocumentMut::new(self.view, id))
    }

    /// Node id of the live subdocument at `position`.
    pub fn id_at(&mut self, position: usize) -> Option<NodeId> {
        let child = self.view.live_children(self.owner).into_iter().nth(position)?;

        Some(match child {
            Child::Original { index, .. } => self.view.materialize(self.owner, index),
            Child::Added(id) => id,
        })
    }

    /// Node ids of every live subdocument, in order.
    pub fn ids(&mut self) -> Vec<NodeId> {
        self.view.materialize_children(self.owner)
    }

    /// Append a new, empty subdocument.
    pub fn add(self, reference: Option<String>) -> DocumentMut<'a> {
        let id = self.view.add_child(self.owner, reference);

        DocumentMut::new(self.view, id)
    }

    /// Restore original subdocuments and drop added ones.
    pub fn reset(&mut self) {
        self.view.reset_subdocuments(self.owner);
    }

    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.view.subdocuments_changed(self.owner)
    }
}
