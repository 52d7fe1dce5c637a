//! Tree walkers.
//!
//! Every walker is a plain iterator holding its own cursor state, so calling
//! the constructor again always restarts the traversal from scratch.

use crate::model::node::NodeId;
use crate::model::range::Range;
use crate::model::tree::Tree;

/// Parent, grandparent, ... up to and including the root.
pub struct Ancestors<'a> {
    tree: &'a Tree,
    current: Option<NodeId>,
}

impl<'a> Ancestors<'a> {
    pub(crate) fn new(tree: &'a Tree, node: NodeId) -> Self {
        Self {
            tree,
            current: tree.parent(node),
        }
    }
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.current?;
        self.current = self.tree.parent(node);
        Some(node)
    }
}

/// Pre-order walk below a node, the node itself excluded.
pub struct Descendants<'a> {
    tree: &'a Tree,
    stack: Vec<NodeId>,
}

impl<'a> Descendants<'a> {
    pub(crate) fn new(tree: &'a Tree, node: NodeId) -> Self {
        let stack = tree.children(node).iter().rev().copied().collect();
        Self { tree, stack }
    }
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let node = self.stack.pop()?;
        self.stack.extend(self.tree.children(node).iter().rev());
        Some(node)
    }
}

struct Frame {
    parent: NodeId,
    prefix: Vec<usize>,
    index: usize,
    offset: usize,
}

/// Nodes lying entirely inside a range, in document order.
///
/// Partially covered elements are entered but not yielded; partially
/// covered text nodes are skipped, so callers that need every character
/// split the boundaries first.
pub struct NodesInRange<'a> {
    tree: &'a Tree,
    start: Vec<usize>,
    end: Vec<usize>,
    stack: Vec<Frame>,
}

impl<'a> NodesInRange<'a> {
    pub fn new(tree: &'a Tree, range: &Range) -> Self {
        Self {
            tree,
            start: range.start.path().to_vec(),
            end: range.end.path().to_vec(),
            stack: vec![Frame {
                parent: tree.root(),
                prefix: Vec::new(),
                index: 0,
                offset: 0,
            }],
        }
    }
}

impl Iterator for NodesInRange<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        loop {
            let frame = self.stack.last_mut()?;
            let Some(&child) = self.tree.children(frame.parent).get(frame.index) else {
                self.stack.pop();
                continue;
            };
            let width = self.tree.width(child);
            let mut child_start = frame.prefix.clone();
            child_start.push(frame.offset);
            let mut child_end = frame.prefix.clone();
            child_end.push(frame.offset + width);
            frame.index += 1;
            frame.offset += width;

            if child_end <= self.start {
                continue;
            }
            if child_start >= self.end {
                self.stack.pop();
                continue;
            }
            let covered = self.start <= child_start && child_end <= self.end;
            if self.tree.is_element(child) {
                self.stack.push(Frame {
                    parent: child,
                    prefix: child_start,
                    index: 0,
                    offset: 0,
                });
            }
            if covered {
                return Some(child);
            }
        }
    }
}

/// Text nodes entirely inside `range`, in document order.
pub fn text_nodes_in<'a>(tree: &'a Tree, range: &Range) -> impl Iterator<Item = NodeId> + 'a {
    NodesInRange::new(tree, range).filter(move |node| tree.is_text(*node))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fragment::Fragment;
    use crate::model::node::ElementKind;
    use crate::model::position::Position;
    use pretty_assertions::assert_eq;

    fn tree() -> Tree {
        Tree::from_fragment(&Fragment::root([
            Fragment::element(ElementKind::Paragraph, [Fragment::text("ab"), Fragment::text("cd")]),
            Fragment::element(ElementKind::Paragraph, [Fragment::text("ef")]),
            Fragment::text("gh"),
        ]))
        .unwrap()
    }

    fn contents(tree: &Tree, nodes: impl Iterator<Item = NodeId>) -> Vec<String> {
        nodes
            .map(|node| match tree.text(node) {
                Ok(text) => text.content.clone(),
                Err(_) => tree.element(node).unwrap().kind.tag().to_string(),
            })
            .collect()
    }

    #[test]
    fn descendants_are_preorder_and_restartable() {
        let tree = tree();
        let walk = || contents(&tree, tree.descendants(tree.root()));
        let expected = vec!["p", "ab", "cd", "p", "ef", "gh"];
        assert_eq!(walk(), expected);
        assert_eq!(walk(), expected);
    }

    #[test]
    fn ancestors_end_at_root() {
        let tree = tree();
        let paragraph = tree.children(tree.root())[0];
        let text = tree.children(paragraph)[1];
        let ancestors: Vec<NodeId> = tree.ancestors(text).collect();
        assert_eq!(ancestors, vec![paragraph, tree.root()]);
        assert_eq!(tree.ancestors(tree.root()).count(), 0);
    }

    #[test]
    fn nodes_in_range_yield_covered_nodes_only() {
        let tree = tree();
        let root = tree.root();
        // From between "ab" and "cd" to the end of the second paragraph's text.
        let range = Range::new(
            Position::from_path(&tree, root, vec![0, 2]).unwrap(),
            Position::from_path(&tree, root, vec![2]).unwrap(),
        );
        assert_eq!(
            contents(&tree, NodesInRange::new(&tree, &range)),
            vec!["cd", "p", "ef"]
        );
        assert_eq!(contents(&tree, text_nodes_in(&tree, &range)), vec!["cd", "ef"]);
    }

    #[test]
    fn partially_covered_text_is_skipped() {
        let tree = tree();
        let root = tree.root();
        let range = Range::new(
            Position::from_path(&tree, root, vec![3]).unwrap(),
            Position::from_path(&tree, root, vec![4]).unwrap(),
        );
        assert_eq!(text_nodes_in(&tree, &range).count(), 0);
    }
}
