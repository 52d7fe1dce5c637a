use log::debug;

use super::OperationResult;
use super::algorithms::{chain, merge_at, remove_children, settle_at};
use crate::editing::mapper::RangeMapper;
use crate::error::{ModelError, Result};
use crate::model::{Fragment, NodeId, Range, Tree};

/// Delete everything inside `range`.
///
/// Nodes covered entirely are removed, text straddling an endpoint is cut at
/// it. The elements holding the two endpoints are truncated but never joined.
/// Elements left empty on either side are pruned, up to but excluding the
/// lowest common ancestor of the endpoints. A placeholder left touching the
/// cut is absorbed when a neighbour carries the same marks.
pub(super) fn remove(tree: &mut Tree, range: &Range) -> Result<OperationResult> {
    cut(tree, range, true)
}

/// [`remove`] for text insertion: a placeholder at the cut is what the
/// inserted text will go into, so it is kept.
pub(super) fn remove_for_insert(tree: &mut Tree, range: &Range) -> Result<OperationResult> {
    cut(tree, range, false)
}

fn cut(tree: &mut Tree, range: &Range, absorb: bool) -> Result<OperationResult> {
    range.resolve(tree)?;
    if range.is_collapsed() {
        return Ok(OperationResult::new(range.clone(), RangeMapper::new()));
    }
    let ancestor = range.common_ancestor(tree)?;
    let start_chain = chain(tree, &range.start)?;
    let end_chain = chain(tree, &range.end)?;
    let d = start_chain
        .iter()
        .position(|(node, _)| *node == ancestor)
        .ok_or_else(|| ModelError::stale("common ancestor not on the start path"))?;

    range.end.split(tree)?;
    range.start.split(tree)?;

    let mut mapper = RangeMapper::new();
    let mut end_removed: Vec<Vec<Fragment>> = Vec::new();
    let mut start_removed: Vec<Fragment> = Vec::new();

    // End side, deepest first: everything before the end boundary.
    for &(element, offset) in end_chain[d + 1..].iter().rev() {
        let path = tree.path_of(element)?;
        end_removed.push(remove_children(tree, element, 0, offset)?);
        mapper.collapse_to_point(&path, 0, offset, 0);
    }

    // Children of the common ancestor lying fully between the two sides.
    let (_, start_offset) = start_chain[d];
    let (_, end_offset) = end_chain[d];
    let low = if start_chain.len() > d + 1 {
        start_offset + 1
    } else {
        start_offset
    };
    let ancestor_path = tree.path_of(ancestor)?;
    let middle = remove_children(tree, ancestor, low, end_offset)?;
    mapper.collapse_to_point(&ancestor_path, low, end_offset.max(low), low);

    // Start side, deepest first: everything after the start boundary.
    let deepest = start_chain.len() - 1;
    for (level, &(element, offset)) in start_chain.iter().enumerate().skip(d + 1).rev() {
        let from = if level == deepest { offset } else { offset + 1 };
        let size = tree.size(element);
        let path = tree.path_of(element)?;
        start_removed.extend(remove_children(tree, element, from, size)?);
        mapper.collapse_to_point(&path, from, size, from);
    }

    let mut pruned = 0;
    for side in [&start_chain, &end_chain] {
        for &(element, _) in side[d + 1..].iter().rev() {
            if !tree.contains(element) || tree.size(element) > 0 {
                break;
            }
            prune(tree, element, &mut mapper)?;
            pruned += 1;
        }
    }

    let start = mapper.map_position(&range.start);
    let start = if absorb {
        settle_at(tree, &start, &mut mapper)?
    } else {
        merge_at(tree, &start)?;
        start
    };

    let mut removed = start_removed;
    removed.extend(middle);
    removed.extend(end_removed.into_iter().rev().flatten());
    debug!(
        "removed {} node(s), pruned {pruned} empty element(s)",
        removed.len()
    );
    Ok(OperationResult {
        default_range: Range::collapsed(start),
        mapper,
        removed,
    })
}

fn prune(tree: &mut Tree, element: NodeId, mapper: &mut RangeMapper) -> Result<()> {
    let parent = tree
        .parent(element)
        .ok_or_else(|| ModelError::stale("pruned element has no parent"))?;
    let parent_path = tree.path_of(parent)?;
    let offset = tree
        .offset_in_parent(element)
        .ok_or_else(|| ModelError::stale("pruned element has no offset"))?;
    tree.discard(element)?;
    mapper.collapse_to_point(&parent_path, offset, offset + 1, offset);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ElementKind, INVISIBLE_SPACE, Position};
    use pretty_assertions::assert_eq;

    fn paragraph(text: &str) -> Fragment {
        Fragment::element(ElementKind::Paragraph, [Fragment::text(text)])
    }

    #[test]
    fn collapsed_range_is_a_no_op() {
        let mut tree = Tree::from_fragment(&Fragment::root([paragraph("test")])).unwrap();
        let before = tree.snapshot();
        let range = Range::from_paths(&tree, vec![0, 3], vec![0, 3]).unwrap();

        let result = remove(&mut tree, &range).unwrap();
        assert_eq!(tree.snapshot(), before);
        assert!(result.mapper.is_identity());
        assert!(result.removed.is_empty());
    }

    #[test]
    fn inside_one_text_node() {
        let mut tree = Tree::from_fragment(&Fragment::root([Fragment::text("abcdefghi")])).unwrap();
        let range = Range::from_paths(&tree, vec![3], vec![6]).unwrap();

        let result = remove(&mut tree, &range).unwrap();
        assert_eq!(tree.snapshot(), Fragment::root([Fragment::text("abcghi")]));
        assert_eq!(result.removed, vec![Fragment::text("def")]);
        assert_eq!(result.default_range.start.path(), &[3]);
        assert_eq!(result.mapper.map_path(&[8]), vec![5]);
        assert_eq!(result.mapper.map_path(&[4]), vec![3]);
    }

    #[test]
    fn across_three_siblings_keeps_the_edges_apart() {
        let mut tree = Tree::from_fragment(&Fragment::root([
            paragraph("abc"),
            paragraph("def"),
            paragraph("ghi"),
        ]))
        .unwrap();
        let range = Range::from_paths(&tree, vec![0, 1], vec![2, 2]).unwrap();

        let result = remove(&mut tree, &range).unwrap();
        assert_eq!(
            tree.snapshot(),
            Fragment::root([paragraph("a"), paragraph("i")])
        );
        assert_eq!(
            result.removed,
            vec![Fragment::text("bc"), paragraph("def"), Fragment::text("gh")]
        );
        assert_eq!(result.default_range.start.path(), &[0, 1]);
        // The end paragraph moved from offset 2 to offset 1.
        assert_eq!(result.mapper.map_path(&[2, 3]), vec![1, 1]);
    }

    #[test]
    fn emptied_elements_are_pruned_below_the_common_ancestor() {
        let mut tree = Tree::from_fragment(&Fragment::root([
            paragraph("abc"),
            paragraph("def"),
            paragraph("ghi"),
        ]))
        .unwrap();
        let range = Range::from_paths(&tree, vec![0, 1], vec![2, 3]).unwrap();

        remove(&mut tree, &range).unwrap();
        assert_eq!(tree.snapshot(), Fragment::root([paragraph("a")]));
    }

    #[test]
    fn nested_start_on_edge() {
        let mut tree = Tree::from_fragment(&Fragment::root([
            Fragment::element(ElementKind::Div, [Fragment::text("test")]),
            Fragment::text("test"),
        ]))
        .unwrap();
        let range = Range::new(
            Position::from_path(&tree, tree.root(), vec![0, 4]).unwrap(),
            Position::from_path(&tree, tree.root(), vec![3]).unwrap(),
        );

        remove(&mut tree, &range).unwrap();
        assert_eq!(
            tree.snapshot(),
            Fragment::root([
                Fragment::element(ElementKind::Div, [Fragment::text("test")]),
                Fragment::text("st"),
            ])
        );
    }

    #[test]
    fn placeholder_at_the_cut_is_absorbed() {
        let mut tree = Tree::from_fragment(&Fragment::root([
            Fragment::text("ab"),
            Fragment::text(INVISIBLE_SPACE),
            Fragment::text("cdef"),
        ]))
        .unwrap();
        let range = Range::from_paths(&tree, vec![3], vec![4]).unwrap();

        let result = remove(&mut tree, &range).unwrap();
        assert_eq!(tree.snapshot(), Fragment::root([Fragment::text("abdef")]));
        assert_eq!(result.default_range.start.path(), &[2]);
        assert_eq!(result.mapper.map_path(&[7]), vec![5]);
        assert_eq!(result.mapper.map_path(&[1]), vec![1]);
    }

    #[test]
    fn text_brought_together_is_merged() {
        let mut tree = Tree::from_fragment(&Fragment::root([
            Fragment::text("ab"),
            paragraph("x"),
            Fragment::text("cd"),
        ]))
        .unwrap();
        let range = Range::from_paths(&tree, vec![2], vec![3]).unwrap();

        remove(&mut tree, &range).unwrap();
        assert_eq!(tree.snapshot(), Fragment::root([Fragment::text("abcd")]));
        assert_eq!(tree.children(tree.root()).len(), 1);
    }
}
