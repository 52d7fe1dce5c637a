//! Tree surgery shared by several operations.

use log::trace;

use crate::editing::mapper::RangeMapper;
use crate::error::Result;
use crate::model::{Fragment, NodeId, Position, Tree};

/// Whether two nodes are text siblings that must not both persist.
///
/// Placeholder nodes hold a collapsed cursor's pending marks and stay
/// separate until something is typed into them or they are absorbed by
/// [`absorb_placeholder`].
pub(crate) fn mergeable(tree: &Tree, left: NodeId, right: NodeId) -> bool {
    match (tree.text(left), tree.text(right)) {
        (Ok(a), Ok(b)) => !a.is_placeholder() && !b.is_placeholder() && a.marks == b.marks,
        _ => false,
    }
}

/// Drop `node` if it is a placeholder next to text with the same marks.
/// Its pending marks are already carried by that neighbour, so only the
/// invisible character goes. The removal is recorded in `mapper`.
pub(crate) fn absorb_placeholder(tree: &mut Tree, node: NodeId, mapper: &mut RangeMapper) -> Result<bool> {
    let Ok(text) = tree.text(node) else {
        return Ok(false);
    };
    if !text.is_placeholder() {
        return Ok(false);
    }
    let redundant = [tree.previous_sibling(node), tree.next_sibling(node)]
        .into_iter()
        .flatten()
        .any(|neighbour| tree.text(neighbour).is_ok_and(|other| other.marks == text.marks));
    if !redundant {
        return Ok(false);
    }
    let Some(parent) = tree.parent(node) else {
        return Ok(false);
    };
    let path = tree.path_of(parent)?;
    let offset = tree.offset_in_parent(node).unwrap_or(0);
    trace!("absorbing placeholder {node:?} at {offset} of {path:?}");
    tree.discard(node)?;
    mapper.collapse_to_point(&path, offset, offset + 1, offset);
    Ok(true)
}

/// Absorb placeholders on either side of a boundary, then merge the text
/// meeting there. Returns where `position` ends up; any removal is appended
/// to `mapper`.
pub(crate) fn settle_at(tree: &mut Tree, position: &Position, mapper: &mut RangeMapper) -> Result<Position> {
    if position.text_node(tree)?.is_some() {
        return Ok(position.clone());
    }
    let neighbours = [position.node_before(tree)?, position.node_after(tree)?];
    let mut local = RangeMapper::new();
    for node in neighbours.into_iter().flatten() {
        if tree.contains(node) {
            absorb_placeholder(tree, node, &mut local)?;
        }
    }
    let settled = local.map_position(position);
    merge_at(tree, &settled)?;
    mapper.append(local);
    Ok(settled)
}

/// Merge a text node with its previous and next siblings where their marks
/// match. Returns the node that now holds the content. Dead ids are ignored.
pub(crate) fn merge_with_neighbours(tree: &mut Tree, node: NodeId) -> Result<NodeId> {
    if !tree.is_text(node) {
        return Ok(node);
    }
    let mut node = node;
    if let Some(previous) = tree.previous_sibling(node) {
        if mergeable(tree, previous, node) {
            trace!("merging {node:?} into {previous:?}");
            tree.merge_texts(previous, node)?;
            node = previous;
        }
    }
    if let Some(next) = tree.next_sibling(node) {
        if mergeable(tree, node, next) {
            trace!("merging {next:?} into {node:?}");
            tree.merge_texts(node, next)?;
        }
    }
    Ok(node)
}

/// Merge the two text nodes meeting at a boundary position, if they match.
pub(crate) fn merge_at(tree: &mut Tree, position: &Position) -> Result<()> {
    if position.text_node(tree)?.is_some() {
        return Ok(());
    }
    let before = position.node_before(tree)?;
    let after = position.node_after(tree)?;
    if let (Some(before), Some(after)) = (before, after) {
        if mergeable(tree, before, after) {
            trace!("merging {after:?} into {before:?} at {:?}", position.path());
            tree.merge_texts(before, after)?;
        }
    }
    Ok(())
}

/// Detach and free the children of `parent` lying in `[start, end)`,
/// returning them in order. Both offsets must be child boundaries.
pub(crate) fn remove_children(tree: &mut Tree, parent: NodeId, start: usize, end: usize) -> Result<Vec<Fragment>> {
    if start >= end {
        return Ok(Vec::new());
    }
    let from = tree.offset_to_index(parent, start)?;
    let to = tree.offset_to_index(parent, end)?;
    let doomed: Vec<NodeId> = tree.children(parent)[from..to].to_vec();
    doomed.into_iter().map(|child| tree.take(child)).collect()
}

/// Every element from the root down to the parent of `position`, each with
/// the offset the path takes through it.
pub(crate) fn chain(tree: &Tree, position: &Position) -> Result<Vec<(NodeId, usize)>> {
    position.resolve(tree)?;
    let mut levels = Vec::with_capacity(position.path().len());
    let mut parent = tree.root();
    for (depth, &offset) in position.path().iter().enumerate() {
        levels.push((parent, offset));
        if depth + 1 < position.path().len() {
            if let Some(child) = tree.child_at_offset(parent, offset)? {
                parent = child;
            }
        }
    }
    Ok(levels)
}
