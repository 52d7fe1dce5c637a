use std::cmp::Ordering;
use std::hash::{Hash, Hasher};

use crate::error::{ModelError, Result};
use crate::model::node::NodeId;
use crate::model::tree::Tree;

/// A point in the document.
///
/// The path holds one offset per level: every entry but the last selects an
/// element child in its parent's offset space, the last entry is the offset
/// inside that element. An offset may fall strictly inside a text child.
///
/// Positions are values. They do not follow edits on their own; anything
/// held across a step must be mapped through that step's
/// [`RangeMapper`](crate::editing::RangeMapper).
///
/// A position built against a tree remembers the tree's revision. Once a
/// step has moved offsets, resolving it again fails with
/// [`ModelError::StaleReference`] instead of landing somewhere else.
/// Mapped positions carry no revision. Equality and ordering look at the
/// root and path only.
#[derive(Debug, Clone)]
pub struct Position {
    root: NodeId,
    path: Vec<usize>,
    revision: Option<u64>,
}

impl PartialEq for Position {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root && self.path == other.path
    }
}

impl Eq for Position {}

impl Hash for Position {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.root.hash(state);
        self.path.hash(state);
    }
}

/// Where a position lands: the element it is in and the offset inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub parent: NodeId,
    pub offset: usize,
}

impl Position {
    /// Build a position without checking it against a tree.
    pub(crate) fn unchecked(root: NodeId, path: Vec<usize>) -> Self {
        Self {
            root,
            path,
            revision: None,
        }
    }

    /// Tie the position to the current revision of `tree`.
    pub(crate) fn stamped(mut self, tree: &Tree) -> Self {
        self.revision = Some(tree.revision());
        self
    }

    pub fn from_path(tree: &Tree, root: NodeId, path: Vec<usize>) -> Result<Self> {
        let position = Self::unchecked(root, path);
        position.resolve(tree)?;
        Ok(position.stamped(tree))
    }

    pub fn from_in_element(tree: &Tree, element: NodeId, offset: usize) -> Result<Self> {
        tree.element(element)?;
        let size = tree.size(element);
        if offset > size {
            return Err(ModelError::out_of_range(offset, size));
        }
        let mut path = tree.path_of(element)?;
        path.push(offset);
        Ok(Self::unchecked(tree.root(), path).stamped(tree))
    }

    pub fn from_in_text_node(tree: &Tree, text: NodeId, offset: usize) -> Result<Self> {
        let len = tree.text(text)?.len();
        if offset > len {
            return Err(ModelError::out_of_range(offset, len));
        }
        let mut path = tree.path_of(text)?;
        if let Some(last) = path.last_mut() {
            *last += offset;
        }
        Ok(Self::unchecked(tree.root(), path).stamped(tree))
    }

    pub fn from_before_node(tree: &Tree, node: NodeId) -> Result<Self> {
        if node == tree.root() {
            return Err(ModelError::out_of_range(0, 0));
        }
        Ok(Self::unchecked(tree.root(), tree.path_of(node)?).stamped(tree))
    }

    pub fn from_after_node(tree: &Tree, node: NodeId) -> Result<Self> {
        let mut position = Self::from_before_node(tree, node)?;
        if let Some(last) = position.path.last_mut() {
            *last += tree.width(node);
        }
        Ok(position)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn path(&self) -> &[usize] {
        &self.path
    }

    /// Path of the parent element (every entry but the last).
    pub fn parent_path(&self) -> &[usize] {
        &self.path[..self.path.len().saturating_sub(1)]
    }

    /// Offset inside the parent element.
    pub fn parent_offset(&self) -> usize {
        self.path.last().copied().unwrap_or(0)
    }

    /// Same parent, different offset.
    pub fn with_offset(&self, offset: usize) -> Self {
        let mut path = self.path.clone();
        if let Some(last) = path.last_mut() {
            *last = offset;
        }
        Self {
            path,
            ..self.clone()
        }
    }

    /// The tree revision the position was built at, if it was built
    /// against a tree rather than mapped.
    pub fn revision(&self) -> Option<u64> {
        self.revision
    }

    /// Check the position against `tree` and find its parent element.
    pub fn resolve(&self, tree: &Tree) -> Result<Location> {
        if self.root != tree.root() || !tree.contains(self.root) {
            return Err(ModelError::stale("position belongs to another tree"));
        }
        if let Some(revision) = self.revision {
            if revision != tree.revision() {
                return Err(ModelError::stale(format!(
                    "position {:?} was taken at revision {revision}, the tree is at {}",
                    self.path,
                    tree.revision()
                )));
            }
        }
        let Some((&offset, prefix)) = self.path.split_last() else {
            return Err(ModelError::out_of_range(0, 0));
        };
        let mut parent = self.root;
        for &step in prefix {
            match tree.child_at_offset(parent, step)? {
                Some(child) if tree.is_element(child) => parent = child,
                _ => {
                    return Err(ModelError::stale(format!(
                        "no element at offset {step} of path {:?}",
                        self.path
                    )));
                }
            }
        }
        let size = tree.size(parent);
        if offset > size {
            return Err(ModelError::out_of_range(offset, size));
        }
        Ok(Location { parent, offset })
    }

    pub fn parent(&self, tree: &Tree) -> Result<NodeId> {
        Ok(self.resolve(tree)?.parent)
    }

    /// The child ending at or containing the position, or `None` at the
    /// start of the parent.
    pub fn node_before(&self, tree: &Tree) -> Result<Option<NodeId>> {
        let Location { parent, offset } = self.resolve(tree)?;
        if offset == 0 {
            return Ok(None);
        }
        tree.child_at_offset(parent, offset - 1)
    }

    /// The child starting at or containing the position, or `None` at the
    /// end of the parent.
    pub fn node_after(&self, tree: &Tree) -> Result<Option<NodeId>> {
        let Location { parent, offset } = self.resolve(tree)?;
        tree.child_at_offset(parent, offset)
    }

    /// The text node the position lies strictly inside, with the character
    /// offset into it.
    pub fn text_node(&self, tree: &Tree) -> Result<Option<(NodeId, usize)>> {
        let Location { parent, offset } = self.resolve(tree)?;
        let index = tree.offset_to_index(parent, offset)?;
        let Some(&child) = tree.children(parent).get(index) else {
            return Ok(None);
        };
        let start = tree.index_to_offset(parent, index)?;
        if tree.is_text(child) && start < offset {
            Ok(Some((child, offset - start)))
        } else {
            Ok(None)
        }
    }

    /// Make the position a child boundary by splitting the text node it lies
    /// inside. Offsets do not move, so the returned position equals `self`;
    /// at a boundary the tree is left untouched.
    pub fn split(&self, tree: &mut Tree) -> Result<Position> {
        if let Some((text, at)) = self.text_node(tree)? {
            tree.split_text(text, at)?;
        }
        Ok(self.clone())
    }

    /// Index of the boundary in the parent's child list, splitting text if
    /// needed.
    pub(crate) fn split_to_index(&self, tree: &mut Tree) -> Result<(NodeId, usize)> {
        self.split(tree)?;
        let Location { parent, offset } = self.resolve(tree)?;
        Ok((parent, tree.offset_to_index(parent, offset)?))
    }
}

impl PartialOrd for Position {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Document order: paths compare lexicographically, a parent's boundary
/// before anything inside the element that starts there.
impl Ord for Position {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path
            .cmp(&other.path)
            .then_with(|| self.root.cmp(&other.root))
    }
}
