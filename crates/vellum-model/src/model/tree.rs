use std::collections::BTreeMap;

use crate::error::{ModelError, Result};
use crate::model::fragment::Fragment;
use crate::model::mark::MarkSet;
use crate::model::node::{ElementKind, ElementNode, NodeData, NodeId, TextNode, byte_offset};
use crate::model::walk::{Ancestors, Descendants};

#[derive(Debug, Clone)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

#[derive(Debug, Clone)]
struct Entry {
    parent: Option<NodeId>,
    data: NodeData,
}

/// Arena-backed document tree.
///
/// The tree owns every node. Children are owned top-down by their parent's
/// child list; the parent link stored next to each node is a plain
/// [`NodeId`] used for upward traversal only.
///
/// ## Offset space
///
/// Positions address content through offsets: inside an element, a text
/// child is as wide as its character count and an element child is exactly
/// one offset wide. Splitting or merging text nodes therefore never moves an
/// offset, which is what lets mark operations return an empty mapper.
#[derive(Debug, Clone)]
pub struct Tree {
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeId,
    revision: u64,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    /// A tree holding nothing but an empty root element.
    pub fn new() -> Self {
        let mut tree = Self {
            slots: Vec::new(),
            free: Vec::new(),
            root: NodeId {
                index: 0,
                generation: 0,
            },
            revision: 0,
        };
        tree.root = tree.alloc(NodeData::Element(ElementNode::new(ElementKind::Root)));
        tree
    }

    /// Build a tree whose root is the given element fragment.
    pub fn from_fragment(fragment: &Fragment) -> Result<Self> {
        let Fragment::Element {
            kind,
            attributes,
            children,
        } = fragment
        else {
            return Err(ModelError::WrongNodeType {
                expected: "element",
            });
        };
        let mut tree = Self::new();
        let root = tree.root;
        {
            let element = tree.element_mut(root)?;
            element.kind = kind.clone();
            element.attributes = attributes.clone();
        }
        for (index, child) in children.iter().enumerate() {
            tree.insert_fragment(root, index, child)?;
        }
        Ok(tree)
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of executed operations that moved offsets. Positions built
    /// at an older revision no longer resolve.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub(crate) fn bump_revision(&mut self) {
        self.revision += 1;
    }

    fn entry(&self, id: NodeId) -> Result<&Entry> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_ref())
            .ok_or_else(|| ModelError::stale(format!("node {id:?} no longer exists")))
    }

    fn entry_mut(&mut self, id: NodeId) -> Result<&mut Entry> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_mut())
            .ok_or_else(|| ModelError::stale(format!("node {id:?} no longer exists")))
    }

    /// Whether the id still refers to a live node.
    pub fn contains(&self, id: NodeId) -> bool {
        self.entry(id).is_ok()
    }

    pub fn get(&self, id: NodeId) -> Result<&NodeData> {
        Ok(&self.entry(id)?.data)
    }

    pub fn element(&self, id: NodeId) -> Result<&ElementNode> {
        self.get(id)?.as_element().ok_or(ModelError::WrongNodeType {
            expected: "element",
        })
    }

    pub fn element_mut(&mut self, id: NodeId) -> Result<&mut ElementNode> {
        match &mut self.entry_mut(id)?.data {
            NodeData::Element(element) => Ok(element),
            NodeData::Text(_) => Err(ModelError::WrongNodeType {
                expected: "element",
            }),
        }
    }

    pub fn text(&self, id: NodeId) -> Result<&TextNode> {
        self.get(id)?
            .as_text()
            .ok_or(ModelError::WrongNodeType { expected: "text" })
    }

    pub fn text_mut(&mut self, id: NodeId) -> Result<&mut TextNode> {
        match &mut self.entry_mut(id)?.data {
            NodeData::Text(text) => Ok(text),
            NodeData::Element(_) => Err(ModelError::WrongNodeType { expected: "text" }),
        }
    }

    pub fn is_text(&self, id: NodeId) -> bool {
        self.get(id).map(NodeData::is_text).unwrap_or(false)
    }

    pub fn is_element(&self, id: NodeId) -> bool {
        self.get(id).map(NodeData::is_element).unwrap_or(false)
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.entry(id).ok().and_then(|entry| entry.parent)
    }

    /// Children of an element; empty for text nodes and dead ids.
    pub fn children(&self, id: NodeId) -> &[NodeId] {
        match self.get(id) {
            Ok(NodeData::Element(element)) => &element.children,
            _ => &[],
        }
    }

    /// Width of the node in its parent's offset space.
    pub fn width(&self, id: NodeId) -> usize {
        match self.get(id) {
            Ok(NodeData::Element(_)) => 1,
            Ok(NodeData::Text(text)) => text.len(),
            Err(_) => 0,
        }
    }

    /// Size of the node's own offset space: its character count for text,
    /// the summed widths of its children for elements.
    pub fn size(&self, id: NodeId) -> usize {
        match self.get(id) {
            Ok(NodeData::Element(element)) => element.children.iter().map(|c| self.width(*c)).sum(),
            Ok(NodeData::Text(text)) => text.len(),
            Err(_) => 0,
        }
    }

    pub fn index_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        self.children(parent).iter().position(|child| *child == id)
    }

    pub fn offset_in_parent(&self, id: NodeId) -> Option<usize> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.index_to_offset(parent, index).ok()
    }

    pub fn previous_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        index.checked_sub(1).map(|i| self.children(parent)[i])
    }

    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        let parent = self.parent(id)?;
        let index = self.index_in_parent(id)?;
        self.children(parent).get(index + 1).copied()
    }

    /// Index of the child that starts at or contains `offset`.
    ///
    /// An offset equal to the element's size maps to `children.len()`.
    pub fn offset_to_index(&self, parent: NodeId, offset: usize) -> Result<usize> {
        let element = self.element(parent)?;
        let mut start = 0;
        for (index, child) in element.children.iter().enumerate() {
            let end = start + self.width(*child);
            if offset < end {
                return Ok(index);
            }
            start = end;
        }
        if offset == start {
            Ok(element.children.len())
        } else {
            Err(ModelError::out_of_range(offset, start))
        }
    }

    /// Offset at which the child with `index` starts.
    pub fn index_to_offset(&self, parent: NodeId, index: usize) -> Result<usize> {
        let element = self.element(parent)?;
        if index > element.children.len() {
            return Err(ModelError::out_of_range(index, element.children.len()));
        }
        Ok(element.children[..index].iter().map(|c| self.width(*c)).sum())
    }

    /// The child covering `offset`, if any.
    pub fn child_at_offset(&self, parent: NodeId, offset: usize) -> Result<Option<NodeId>> {
        let index = self.offset_to_index(parent, offset)?;
        Ok(self.children(parent).get(index).copied())
    }

    /// Offsets leading from the root to the boundary just before `id`.
    ///
    /// The root itself has an empty path. For an element, the returned path
    /// is also the prefix shared by every position inside it.
    pub fn path_of(&self, id: NodeId) -> Result<Vec<usize>> {
        self.entry(id)?;
        let mut path = Vec::new();
        let mut current = id;
        while let Some(parent) = self.parent(current) {
            let offset = self
                .offset_in_parent(current)
                .ok_or_else(|| ModelError::stale("node detached from its parent"))?;
            path.push(offset);
            current = parent;
        }
        if current != self.root {
            return Err(ModelError::stale(format!("node {id:?} is not attached to the root")));
        }
        path.reverse();
        Ok(path)
    }

    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors::new(self, id)
    }

    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants::new(self, id)
    }

    fn alloc(&mut self, data: NodeData) -> NodeId {
        let entry = Some(Entry { parent: None, data });
        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.entry = entry;
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    entry,
                });
                NodeId {
                    index: (self.slots.len() - 1) as u32,
                    generation: 0,
                }
            }
        }
    }

    /// Create a detached, childless element.
    pub fn create_element(&mut self, kind: ElementKind, attributes: BTreeMap<String, String>) -> NodeId {
        let mut element = ElementNode::new(kind);
        element.attributes = attributes;
        self.alloc(NodeData::Element(element))
    }

    /// Create a detached text node.
    pub fn create_text(&mut self, content: impl Into<String>, marks: MarkSet) -> NodeId {
        self.alloc(NodeData::Text(TextNode::new(content, marks)))
    }

    /// Attach a detached node as child `index` of `parent`.
    pub fn add_child(&mut self, parent: NodeId, child: NodeId, index: usize) -> Result<()> {
        if child == self.root || self.entry(child)?.parent.is_some() {
            return Err(ModelError::stale(format!("node {child:?} is already attached")));
        }
        let element = self.element_mut(parent)?;
        if index > element.children.len() {
            return Err(ModelError::out_of_range(index, element.children.len()));
        }
        element.children.insert(index, child);
        self.entry_mut(child)?.parent = Some(parent);
        Ok(())
    }

    /// Detach child `index` of `parent`. The node stays alive until it is
    /// discarded or re-attached.
    pub fn remove_child(&mut self, parent: NodeId, index: usize) -> Result<NodeId> {
        let element = self.element_mut(parent)?;
        if index >= element.children.len() {
            return Err(ModelError::out_of_range(index, element.children.len()));
        }
        let child = element.children.remove(index);
        self.entry_mut(child)?.parent = None;
        Ok(child)
    }

    /// Move children `range` of `from` to position `at` in `to`.
    pub(crate) fn move_children(
        &mut self,
        from: NodeId,
        range: std::ops::Range<usize>,
        to: NodeId,
        at: usize,
    ) -> Result<()> {
        let moved: Vec<NodeId> = {
            let element = self.element_mut(from)?;
            if range.end > element.children.len() || range.start > range.end {
                return Err(ModelError::out_of_range(range.end, element.children.len()));
            }
            element.children.drain(range).collect()
        };
        for child in &moved {
            self.entry_mut(*child)?.parent = Some(to);
        }
        let target = self.element_mut(to)?;
        let at = at.min(target.children.len());
        let tail = target.children.split_off(at);
        target.children.extend(moved);
        target.children.extend(tail);
        Ok(())
    }

    /// Free a detached subtree. Every id inside it becomes stale.
    pub fn discard(&mut self, id: NodeId) -> Result<()> {
        if id == self.root {
            return Err(ModelError::stale("the root cannot be discarded"));
        }
        if let Some(parent) = self.entry(id)?.parent {
            if let Some(index) = self.children(parent).iter().position(|c| *c == id) {
                self.remove_child(parent, index)?;
            }
        }
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            stack.extend_from_slice(self.children(current));
            let slot = &mut self.slots[current.index as usize];
            slot.entry = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(current.index);
        }
        Ok(())
    }

    /// Detach and free a node, returning its content as a fragment.
    pub fn take(&mut self, id: NodeId) -> Result<Fragment> {
        let fragment = self.to_fragment(id)?;
        self.discard(id)?;
        Ok(fragment)
    }

    pub fn to_fragment(&self, id: NodeId) -> Result<Fragment> {
        Ok(match self.get(id)? {
            NodeData::Text(text) => Fragment::Text {
                content: text.content.clone(),
                marks: text.marks.clone(),
            },
            NodeData::Element(element) => Fragment::Element {
                kind: element.kind.clone(),
                attributes: element.attributes.clone(),
                children: element
                    .children
                    .iter()
                    .map(|child| self.to_fragment(*child))
                    .collect::<Result<_>>()?,
            },
        })
    }

    /// The whole tree as a fragment.
    pub fn snapshot(&self) -> Fragment {
        self.to_fragment(self.root)
            .unwrap_or_else(|_| Fragment::root([]))
    }

    /// Build `fragment` and attach it as child `index` of `parent`.
    pub fn insert_fragment(&mut self, parent: NodeId, index: usize, fragment: &Fragment) -> Result<NodeId> {
        let len = self.element(parent)?.children.len();
        if index > len {
            return Err(ModelError::out_of_range(index, len));
        }
        let id = self.build(fragment);
        self.add_child(parent, id, index)?;
        Ok(id)
    }

    fn build(&mut self, fragment: &Fragment) -> NodeId {
        match fragment {
            Fragment::Text { content, marks } => self.create_text(content.clone(), marks.clone()),
            Fragment::Element {
                kind,
                attributes,
                children,
            } => {
                let id = self.create_element(kind.clone(), attributes.clone());
                for child in children {
                    let child_id = self.build(child);
                    if let Ok(entry) = self.entry_mut(child_id) {
                        entry.parent = Some(id);
                    }
                    if let Ok(element) = self.element_mut(id) {
                        element.children.push(child_id);
                    }
                }
                id
            }
        }
    }

    /// Deep structural comparison of `id` in this tree with `other_id` in
    /// `other` (which may be this same tree).
    pub fn same_as(&self, id: NodeId, other: &Tree, other_id: NodeId) -> bool {
        match (self.get(id), other.get(other_id)) {
            (Ok(NodeData::Text(a)), Ok(NodeData::Text(b))) => a == b,
            (Ok(NodeData::Element(a)), Ok(NodeData::Element(b))) => {
                a.same_shell(b)
                    && a.children.len() == b.children.len()
                    && a
                        .children
                        .iter()
                        .zip(&b.children)
                        .all(|(x, y)| self.same_as(*x, other, *y))
            }
            _ => false,
        }
    }

    /// Whole-tree structural comparison.
    pub fn same_tree(&self, other: &Tree) -> bool {
        self.same_as(self.root, other, other.root)
    }

    /// Split a text node at a character offset strictly inside it. The new
    /// node carries a copy of the marks and is inserted right after.
    pub fn split_text(&mut self, id: NodeId, char_offset: usize) -> Result<NodeId> {
        let text = self.text(id)?;
        let len = text.len();
        if char_offset == 0 || char_offset >= len {
            return Err(ModelError::out_of_range(char_offset, len));
        }
        let parent = self
            .parent(id)
            .ok_or_else(|| ModelError::stale("cannot split a detached text node"))?;
        let (tail, marks) = {
            let text = self.text_mut(id)?;
            let at = byte_offset(&text.content, char_offset);
            (text.content.split_off(at), text.marks.clone())
        };
        let index = self.index_in_parent(id).unwrap_or(0);
        let new_node = self.create_text(tail, marks);
        self.add_child(parent, new_node, index + 1)?;
        Ok(new_node)
    }

    /// Append the content of text node `right` to `left` and free `right`.
    pub(crate) fn merge_texts(&mut self, left: NodeId, right: NodeId) -> Result<()> {
        let content = self.text(right)?.content.clone();
        self.text_mut(left)?.content.push_str(&content);
        self.discard(right)
    }

    pub fn set_attribute(&mut self, id: NodeId, key: &str, value: Option<String>) -> Result<Option<String>> {
        let element = self.element_mut(id)?;
        Ok(match value {
            Some(value) => element.attributes.insert(key.to_string(), value),
            None => element.attributes.remove(key),
        })
    }

    /// Concatenated text below `id`.
    pub fn text_content(&self, id: NodeId) -> String {
        match self.get(id) {
            Ok(NodeData::Text(text)) => text.content.clone(),
            Ok(NodeData::Element(element)) => element
                .children
                .iter()
                .map(|child| self.text_content(*child))
                .collect(),
            Err(_) => String::new(),
        }
    }

    /// Number of live nodes, root included.
    pub fn node_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.entry.is_some()).count()
    }
}
