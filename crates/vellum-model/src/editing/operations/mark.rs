use log::debug;
use serde::{Deserialize, Serialize};

use super::OperationResult;
use super::algorithms::{absorb_placeholder, merge_at, merge_with_neighbours};
use crate::editing::mapper::RangeMapper;
use crate::error::Result;
use crate::model::{
    Confinement, INVISIBLE_SPACE, Mark, MarkAttributes, MarkSet, MarkSpec, NodeId, Range, Tree, text_nodes_in,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MarkAction {
    Add,
    Remove,
}

fn apply(marks: &mut MarkSet, spec: &MarkSpec, attributes: &MarkAttributes, action: MarkAction) {
    match action {
        MarkAction::Add => marks.add(Mark::new(spec.clone(), attributes.clone())),
        MarkAction::Remove => {
            marks.remove(spec.name(), &attributes.owner);
        }
    }
}

/// Add or remove a mark over `range`.
///
/// A collapsed range gets a placeholder text node carrying the resulting
/// mark state, and the default range is moved just after it so that the
/// next insertion types into it. A non-collapsed range has its boundaries
/// aligned to text nodes first, so no text node is ever partially marked.
/// Placeholders left behind by earlier collapsed marks are dropped once a
/// neighbour carries the same marks.
pub(super) fn mark(
    tree: &mut Tree,
    range: &Range,
    spec: &MarkSpec,
    attributes: &MarkAttributes,
    action: MarkAction,
) -> Result<OperationResult> {
    range.resolve(tree)?;
    range.confine(tree, Confinement::InlineContent)?;

    if range.is_collapsed() {
        let (parent, index) = range.start.split_to_index(tree)?;
        let reference = range
            .start
            .node_before(tree)?
            .or(range.start.node_after(tree)?);
        let mut marks = reference
            .and_then(|node| tree.text(node).ok())
            .map(|text| text.marks.clone())
            .unwrap_or_default();
        apply(&mut marks, spec, attributes, action);
        let placeholder = tree.create_text(INVISIBLE_SPACE, marks);
        tree.add_child(parent, placeholder, index)?;

        let offset = range.start.parent_offset();
        let mut mapper = RangeMapper::new();
        mapper.shift(range.start.parent_path(), offset, 1);
        debug!("{action:?} {} on a placeholder at {:?}", spec.name(), range.start.path());
        return Ok(OperationResult::new(
            Range::collapsed(range.start.with_offset(offset + 1)),
            mapper,
        ));
    }

    range.start.split(tree)?;
    range.end.split(tree)?;
    let nodes: Vec<NodeId> = text_nodes_in(tree, range).collect();
    for &node in &nodes {
        apply(&mut tree.text_mut(node)?.marks, spec, attributes, action);
    }
    debug!("{action:?} {} on {} text node(s)", spec.name(), nodes.len());

    // Placeholders inside the range, and one hop outward on each side, are
    // folded into equally marked neighbours before merging.
    let before = nodes.first().and_then(|node| tree.previous_sibling(*node));
    let after = nodes.last().and_then(|node| tree.next_sibling(*node));
    let mut mapper = RangeMapper::new();
    for node in before.into_iter().chain(nodes.iter().copied()).chain(after) {
        if tree.contains(node) {
            absorb_placeholder(tree, node, &mut mapper)?;
        }
    }
    for node in nodes {
        if tree.contains(node) {
            merge_with_neighbours(tree, node)?;
        }
    }
    let range = mapper.map_range(range);
    merge_at(tree, &range.start)?;
    merge_at(tree, &range.end)?;

    Ok(OperationResult::new(range, mapper))
}
