//! Seams to the outside world.
//!
//! The model never talks to a view directly. A [`Reader`] builds a tree from
//! some external representation, a [`Writer`] projects the tree back out, and
//! a [`SelectionAdapter`] translates between the host's notion of a
//! selection and model ranges.

use std::collections::HashMap;
use std::hash::Hash;

use crate::model::{NodeId, Range, Tree};

/// Bidirectional map between model nodes and opaque view handles.
#[derive(Debug, Clone)]
pub struct NodeBindings<H> {
    to_view: HashMap<NodeId, H>,
    to_model: HashMap<H, NodeId>,
}

impl<H> Default for NodeBindings<H> {
    fn default() -> Self {
        Self {
            to_view: HashMap::new(),
            to_model: HashMap::new(),
        }
    }
}

impl<H: Eq + Hash + Clone> NodeBindings<H> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `node` to `handle`, dropping any earlier binding of either side.
    pub fn bind(&mut self, node: NodeId, handle: H) {
        if let Some(old) = self.to_view.remove(&node) {
            self.to_model.remove(&old);
        }
        if let Some(old) = self.to_model.remove(&handle) {
            self.to_view.remove(&old);
        }
        self.to_view.insert(node, handle.clone());
        self.to_model.insert(handle, node);
    }

    pub fn view_of(&self, node: NodeId) -> Option<&H> {
        self.to_view.get(&node)
    }

    pub fn model_of(&self, handle: &H) -> Option<NodeId> {
        self.to_model.get(handle).copied()
    }

    pub fn unbind(&mut self, node: NodeId) -> Option<H> {
        let handle = self.to_view.remove(&node)?;
        self.to_model.remove(&handle);
        Some(handle)
    }

    pub fn len(&self) -> usize {
        self.to_view.len()
    }

    pub fn is_empty(&self) -> bool {
        self.to_view.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &H)> {
        self.to_view.iter().map(|(node, handle)| (*node, handle))
    }
}

/// A freshly read tree and the bindings of its nodes to the source view.
#[derive(Debug, Clone)]
pub struct Parsed<H> {
    pub tree: Tree,
    pub bindings: NodeBindings<H>,
}

pub trait Reader<V> {
    type Handle: Eq + Hash + Clone;
    type Error: std::error::Error;

    fn parse(&self, view: &V) -> Result<Parsed<Self::Handle>, Self::Error>;
}

/// Projects a tree onto a view. Writing the same tree twice must produce
/// equal views.
pub trait Writer<V> {
    fn write(&self, tree: &Tree) -> V;
}

pub trait SelectionAdapter {
    type Native;
    type Error: std::error::Error;

    fn read(&self, tree: &Tree, native: &Self::Native) -> Result<Range, Self::Error>;

    fn write(&self, tree: &Tree, range: &Range) -> Result<Self::Native, Self::Error>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MarkSet;

    #[test]
    fn rebinding_replaces_both_directions() {
        let mut tree = Tree::new();
        let a = tree.create_text("a", MarkSet::new());
        let b = tree.create_text("b", MarkSet::new());
        let mut bindings = NodeBindings::new();

        bindings.bind(a, "view-1".to_string());
        bindings.bind(b, "view-1".to_string());
        assert_eq!(bindings.len(), 1);
        assert_eq!(bindings.model_of(&"view-1".to_string()), Some(b));
        assert_eq!(bindings.view_of(a), None);

        assert_eq!(bindings.unbind(b).as_deref(), Some("view-1"));
        assert!(bindings.is_empty());
    }
}
