use super::OperationResult;
use crate::editing::mapper::RangeMapper;
use crate::error::{ModelError, Result};
use crate::model::{Position, Range, Tree};

/// Split `depth` levels of elements at `position`.
///
/// At every level the content after the split point moves into a fresh
/// element with the same kind and attributes, placed right after the
/// original. The next level up is then split between the two halves.
pub(super) fn split(tree: &mut Tree, position: &Position, depth: usize) -> Result<OperationResult> {
    let location = position.resolve(tree)?;
    let levels = position.path().len() - 1;
    if depth == 0 {
        return Err(ModelError::out_of_range(depth, levels));
    }
    if depth > levels {
        return Err(ModelError::UnconfinedRange(format!(
            "splitting {depth} level(s) at {:?} would split the root",
            position.path()
        )));
    }

    position.split(tree)?;
    let mut mapper = RangeMapper::new();
    let mut element = location.parent;
    let mut offset = location.offset;
    for _ in 0..depth {
        let parent = tree
            .parent(element)
            .ok_or_else(|| ModelError::stale("split target has no parent"))?;
        let shell = tree.element(element)?;
        let (kind, attributes) = (shell.kind.clone(), shell.attributes.clone());
        let from = tree.offset_to_index(element, offset)?;
        let count = tree.children(element).len();
        let element_offset = tree
            .offset_in_parent(element)
            .ok_or_else(|| ModelError::stale("split target has no offset"))?;
        let parent_path = tree.path_of(parent)?;

        let twin = tree.create_element(kind, attributes);
        let index = tree
            .index_in_parent(element)
            .ok_or_else(|| ModelError::stale("split target has no index"))?;
        tree.add_child(parent, twin, index + 1)?;
        tree.move_children(element, from..count, twin, 0)?;
        mapper.remap_across_split(&parent_path, element_offset, offset);

        element = parent;
        offset = element_offset + 1;
    }

    let mapped = mapper.map_position(position);
    Ok(OperationResult::new(Range::collapsed(mapped), mapper))
}
