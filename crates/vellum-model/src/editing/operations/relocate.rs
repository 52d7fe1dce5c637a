use log::debug;

use super::OperationResult;
use super::algorithms::{merge_at, settle_at};
use crate::editing::mapper::RangeMapper;
use crate::error::{ModelError, Result};
use crate::model::{Confinement, Position, Range, Tree};

/// Move the content of `range` to `target`.
///
/// Both endpoints must sit in the same element; the target may be anywhere
/// outside the moved content. Moved nodes keep their ids, and text cut by
/// an endpoint or by the target is split first. The gap left behind and
/// both edges of the content are settled the way a removal settles its cut.
pub(super) fn move_content(tree: &mut Tree, range: &Range, target: &Position) -> Result<OperationResult> {
    range.resolve(tree)?;
    target.resolve(tree)?;
    range.confine(tree, Confinement::SameParent)?;

    let parent_path = range.start.parent_path().to_vec();
    let start = range.start.parent_offset();
    let end = range.end.parent_offset();
    if range.is_collapsed() {
        return Ok(OperationResult::new(range.clone(), RangeMapper::new()));
    }
    if inside(&parent_path, start, end, target.path()) {
        return Err(ModelError::UnconfinedRange(format!(
            "target {:?} lies inside the moved content",
            target.path()
        )));
    }
    if target.parent_path() == parent_path.as_slice()
        && (target.parent_offset() == start || target.parent_offset() == end)
    {
        return Ok(OperationResult::new(range.clone(), RangeMapper::new()));
    }
    if carries_text(tree, range)? {
        Range::collapsed(target.clone()).confine(tree, Confinement::InlineContent)?;
    }

    range.end.split(tree)?;
    range.start.split(tree)?;
    let (to_parent, at) = target.split_to_index(tree)?;
    let parent = range.start.parent(tree)?;
    let from = tree.offset_to_index(parent, start)?;
    let until = tree.offset_to_index(parent, end)?;
    let at = if to_parent == parent && at >= until {
        at - (until - from)
    } else {
        at
    };
    tree.move_children(parent, from..until, to_parent, at)?;

    let mut detach = RangeMapper::new();
    detach.collapse_to_point(&parent_path, start, end, start);
    let to = detach.map_path(target.path());
    let mut mapper = RangeMapper::new();
    mapper.relocate(&parent_path, start, end, &to);
    debug!(
        "moved {} node(s) from {parent_path:?} to {to:?}",
        until - from
    );

    let landed = Position::unchecked(tree.root(), to);
    let moved = Range::new(landed.clone(), landed.with_offset(landed.parent_offset() + end - start));
    let gap = mapper.map_position(&range.start);

    let mut settle = RangeMapper::new();
    settle_at(tree, &gap, &mut settle)?;
    let moved = settle.map_range(&moved);
    merge_at(tree, &moved.start)?;
    merge_at(tree, &moved.end)?;
    mapper.append(settle);

    Ok(OperationResult::new(moved, mapper))
}

/// Whether `path` lies strictly within `[start, end)` of the element at
/// `parent`, including anything nested in a moved element.
fn inside(parent: &[usize], start: usize, end: usize, path: &[usize]) -> bool {
    let d = parent.len();
    if path.len() <= d || !path.starts_with(parent) {
        return false;
    }
    let o = path[d];
    (o > start && o < end) || (o == start && path.len() > d + 1)
}

fn carries_text(tree: &Tree, range: &Range) -> Result<bool> {
    let parent = range.start.parent(tree)?;
    let (start, end) = (range.start.parent_offset(), range.end.parent_offset());
    let mut offset = 0;
    for &child in tree.children(parent) {
        let width = tree.width(child);
        if offset < end && offset + width > start && tree.is_text(child) {
            return Ok(true);
        }
        offset += width;
    }
    Ok(false)
}
