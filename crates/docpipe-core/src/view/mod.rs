//! Module: view
//! Responsibility: per-task mutable view over an effective snapshot.
//! Does not own: turning recorded deltas into wire changes (see `emit`).
//! Boundary: the original snapshot is never mutated; every edit lands in a
//! per-node journal that can be reset or emitted.
//!
//! Nodes live in an arena owned by [`DocumentView`]. Subdocuments that
//! existed in the snapshot keep a slot aligned to their original index and
//! are materialized on first access; new subdocuments are appended to a
//! separate list. Deletion is a tombstone, so original indices never shift.

mod document;
mod failures;
mod field;
mod subdocuments;

#[cfg(test)]
mod tests;

use crate::model::{Failure, FieldValue, Snapshot};
use derive_more::Display;
use std::{collections::BTreeMap, sync::Arc};

pub use document::{DocumentMut, DocumentRef};
pub use failures::{FailuresMut, FailuresRef};
pub use field::{FieldAction, FieldMut, FieldRef};
pub use subdocuments::Subdocuments;

pub(crate) use failures::FailureTracker;
pub(crate) use field::FieldTracker;
pub(crate) use subdocuments::{Child, SubdocumentSlots};

///
/// NodeId
///
/// Handle to one document node inside a [`DocumentView`].
///

#[derive(Clone, Copy, Debug, Display, Eq, Hash, Ord, PartialEq, PartialOrd)]
#[display("node#{_0}")]
pub struct NodeId(usize);

impl NodeId {
    /// The root document of every view.
    pub const ROOT: Self = Self(0);
}

///
/// Node
///

#[derive(Debug)]
pub(crate) struct Node {
    pub(crate) original: Arc<Snapshot>,
    pub(crate) parent: Option<NodeId>,
    pub(crate) reference: Option<String>,
    pub(crate) fields: BTreeMap<String, FieldTracker>,
    pub(crate) failures: FailureTracker,
    pub(crate) subdocuments: SubdocumentSlots,
    pub(crate) deleted: bool,
}

impl Node {
    fn new(original: Arc<Snapshot>, parent: Option<NodeId>) -> Self {
        Self {
            reference: original.reference().map(str::to_string),
            subdocuments: SubdocumentSlots::new(original.subdocuments().len()),
            fields: BTreeMap::new(),
            failures: FailureTracker::default(),
            deleted: false,
            original,
            parent,
        }
    }

    pub(crate) fn reference_changed(&self) -> bool {
        self.reference.as_deref() != self.original.reference()
    }
}

///
/// DocumentView
///
/// Arena of journal-backed document nodes rooted at one snapshot.
///

#[derive(Debug)]
pub struct DocumentView {
    nodes: Vec<Node>,
}

impl DocumentView {
    #[must_use]
    pub fn new(snapshot: Arc<Snapshot>) -> Self {
        Self {
            nodes: vec![Node::new(snapshot, None)],
        }
    }

    #[must_use]
    pub const fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    /// The snapshot the root document diffs against.
    #[must_use]
    pub fn original(&self) -> &Arc<Snapshot> {
        &self.nodes[0].original
    }

    #[must_use]
    pub fn document(&self, id: NodeId) -> DocumentRef<'_> {
        DocumentRef::new(self, id)
    }

    pub fn document_mut(&mut self, id: NodeId) -> DocumentMut<'_> {
        DocumentMut::new(self, id)
    }

    /// Every live document, root first, depth-first in subdocument order.
    /// Materializes each visited subdocument.
    pub fn hierarchy(&mut self) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.collect_hierarchy(NodeId::ROOT, &mut out);

        out
    }

    fn collect_hierarchy(&mut self, id: NodeId, out: &mut Vec<NodeId>) {
        out.push(id);
        for child in self.materialize_children(id) {
            self.collect_hierarchy(child, out);
        }
    }

    // arena access

    pub(crate) fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    fn push_node(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);

        id
    }

    /// Return the node for an original subdocument slot, creating it on first use.
    pub(crate) fn materialize(&mut self, owner: NodeId, index: usize) -> NodeId {
        if let Some(id) = self.node(owner).subdocuments.original_slot(index) {
            return id;
        }

        let original = Arc::clone(&self.node(owner).original.subdocuments()[index]);
        let id = self.push_node(Node::new(original, Some(owner)));
        self.node_mut(owner).subdocuments.fill_slot(index, id);

        id
    }

    /// Append a brand-new subdocument under `owner`.
    pub(crate) fn add_child(&mut self, owner: NodeId, reference: Option<String>) -> NodeId {
        let mut node = Node::new(Arc::new(Snapshot::default()), Some(owner));
        node.reference = reference;
        let id = self.push_node(node);
        self.node_mut(owner).subdocuments.push_added(id);

        id
    }

    /// Live children of `owner`, originals first, without materializing.
    pub(crate) fn live_children(&self, owner: NodeId) -> Vec<Child> {
        self.node(owner)
            .subdocuments
            .children()
            .filter(|child| match child {
                Child::Original { node: None, .. } => true,
                Child::Original { node: Some(id), .. } | Child::Added(id) => {
                    !self.node(*id).deleted
                }
            })
            .collect()
    }

    /// Live children of `owner` as node ids, materializing originals.
    pub(crate) fn materialize_children(&mut self, owner: NodeId) -> Vec<NodeId> {
        self.live_children(owner)
            .into_iter()
            .map(|child| match child {
                Child::Original { index, .. } => self.materialize(owner, index),
                Child::Added(id) => id,
            })
            .collect()
    }

    /// True when the node differs from its original state in any way.
    pub(crate) fn has_changes(&self, id: NodeId) -> bool {
        let node = self.node(id);

        node.reference_changed()
            || node.fields.values().any(FieldTracker::has_changes)
            || node.failures.has_changes()
            || self.subdocuments_changed(id)
    }

    pub(crate) fn subdocuments_changed(&self, id: NodeId) -> bool {
        self.node(id).subdocuments.children().any(|child| match child {
            Child::Original { node: None, .. } => false,
            Child::Original { node: Some(sub), .. } => {
                self.node(sub).deleted || self.has_changes(sub)
            }
            Child::Added(sub) => !self.node(sub).deleted,
        })
    }

    /// Restore the node and everything beneath it to the original state.
    pub(crate) fn reset(&mut self, id: NodeId) {
        let node = self.node_mut(id);
        node.reference = node.original.reference().map(str::to_string);
        node.fields.clear();
        node.failures.reset();

        self.reset_subdocuments(id);
    }

    /// Undelete and reset original subdocuments; drop new ones.
    pub(crate) fn reset_subdocuments(&mut self, id: NodeId) {
        let children: Vec<Child> = self.node(id).subdocuments.children().collect();
        for child in children {
            match child {
                Child::Original { node: None, .. } => {}
                Child::Original { node: Some(sub), .. } => {
                    self.node_mut(sub).deleted = false;
                    self.reset(sub);
                }
                Child::Added(sub) => self.node_mut(sub).deleted = true,
            }
        }
    }

    /// Current values of one field on one node.
    pub(crate) fn field_values(&self, id: NodeId, name: &str) -> Vec<&FieldValue> {
        let node = self.node(id);
        field::current_values(node.original.field(name), node.fields.get(name)).collect()
    }

    /// Current failures of one node.
    pub(crate) fn current_failures(&self, id: NodeId) -> Vec<&Failure> {
        let node = self.node(id);
        node.failures.current(node.original.failures()).collect()
    }

    /// Freeze the current state of a node into a snapshot.
    pub(crate) fn to_snapshot(&self, id: NodeId) -> Snapshot {
        let node = self.node(id);

        let mut names: Vec<&str> = node.original.fields().keys().map(String::as_str).collect();
        names.extend(node.fields.keys().map(String::as_str));
        names.sort_unstable();
        names.dedup();

        let fields = names
            .into_iter()
            .filter_map(|name| {
                let values: Vec<FieldValue> =
                    self.field_values(id, name).into_iter().cloned().collect();
                (!values.is_empty()).then(|| (name.to_string(), values))
            })
            .collect();

        let failures = self.current_failures(id).into_iter().cloned().collect();

        let subdocuments = self
            .live_children(id)
            .into_iter()
            .map(|child| match child {
                Child::Original { index, node: None } => {
                    Arc::clone(&node.original.subdocuments()[index])
                }
                Child::Original { node: Some(sub), .. } | Child::Added(sub) => {
                    Arc::new(self.to_snapshot(sub))
                }
            })
            .collect();

        Snapshot::from_parts(node.reference.clone(), fields, failures, subdocuments)
    }
}
