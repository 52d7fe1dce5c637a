use super::OperationResult;
use super::algorithms::merge_with_neighbours;
use super::remove::remove_for_insert;
use crate::editing::mapper::RangeMapper;
use crate::error::Result;
use crate::model::node::byte_offset;
use crate::model::{Confinement, Fragment, MarkSet, NodeId, Position, Range, Tree};

/// Replace `range` with `text`.
///
/// The text lands in an existing text node wherever one touches the
/// insertion point, taking over its marks. A placeholder node next to the
/// cursor is consumed: its marks are exactly what the user asked to type
/// with.
pub(super) fn insert_text(tree: &mut Tree, range: &Range, text: &str) -> Result<OperationResult> {
    range.resolve(tree)?;
    range.confine(tree, Confinement::InlineContent)?;

    let removal = remove_for_insert(tree, range)?;
    let position = removal.default_range.start.clone();
    let mut mapper = removal.mapper;
    let len = text.chars().count();
    if len == 0 {
        return Ok(OperationResult {
            default_range: Range::collapsed(position),
            mapper,
            removed: removal.removed,
        });
    }

    let parent = position.parent(tree)?;
    let parent_path = position.parent_path().to_vec();
    let offset = position.parent_offset();
    let mut step = RangeMapper::new();

    let (touched, end) = if let Some((node, at)) = position.text_node(tree)? {
        let content = &mut tree.text_mut(node)?.content;
        let index = byte_offset(content, at);
        content.insert_str(index, text);
        step.shift(&parent_path, offset, len);
        (node, offset + len)
    } else {
        let before = position.node_before(tree)?;
        let after = position.node_after(tree)?;
        if let Some(node) = placeholder(tree, before) {
            tree.text_mut(node)?.content = text.to_string();
            step.collapse_to_point(&parent_path, offset - 1, offset, offset - 1)
                .shift(&parent_path, offset - 1, len);
            (node, offset - 1 + len)
        } else if let Some(node) = placeholder(tree, after) {
            tree.text_mut(node)?.content = text.to_string();
            step.collapse_to_point(&parent_path, offset, offset + 1, offset)
                .shift(&parent_path, offset, len);
            (node, offset + len)
        } else if let Some(node) = before.filter(|n| tree.is_text(*n)) {
            tree.text_mut(node)?.content.push_str(text);
            step.shift(&parent_path, offset, len);
            (node, offset + len)
        } else if let Some(node) = after.filter(|n| tree.is_text(*n)) {
            tree.text_mut(node)?.content.insert_str(0, text);
            step.shift(&parent_path, offset, len);
            (node, offset + len)
        } else {
            let index = tree.offset_to_index(parent, offset)?;
            let node = tree.create_text(text, MarkSet::new());
            tree.add_child(parent, node, index)?;
            step.shift(&parent_path, offset, len);
            (node, offset + len)
        }
    };
    merge_with_neighbours(tree, touched)?;
    mapper.append(step);

    Ok(OperationResult {
        default_range: Range::collapsed(position.with_offset(end)),
        mapper,
        removed: removal.removed,
    })
}

fn placeholder(tree: &Tree, node: Option<NodeId>) -> Option<NodeId> {
    node.filter(|n| tree.text(*n).is_ok_and(|t| t.is_placeholder()))
}

/// Insert detached content at `position`, splitting text there if needed.
pub(super) fn insert_nodes(tree: &mut Tree, position: &Position, nodes: &[Fragment]) -> Result<OperationResult> {
    position.resolve(tree)?;
    let width: usize = nodes.iter().map(Fragment::width).sum();
    if nodes.is_empty() {
        return Ok(OperationResult::new(
            Range::collapsed(position.clone()),
            RangeMapper::new(),
        ));
    }

    let (parent, index) = position.split_to_index(tree)?;
    let offset = position.parent_offset();
    let mut inserted = Vec::with_capacity(nodes.len());
    for (i, fragment) in nodes.iter().enumerate() {
        inserted.push(tree.insert_fragment(parent, index + i, fragment)?);
    }
    // Empty text fragments have no width and no business in the tree.
    for node in &inserted {
        if tree.text(*node).is_ok_and(|t| t.is_empty()) {
            tree.discard(*node)?;
        }
    }
    for node in inserted {
        if tree.contains(node) {
            merge_with_neighbours(tree, node)?;
        }
    }

    let mut mapper = RangeMapper::new();
    mapper.shift(position.parent_path(), offset, width);
    Ok(OperationResult::new(
        Range::new(position.clone(), position.with_offset(offset + width)),
        mapper,
    ))
}
