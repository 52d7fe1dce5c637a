use std::collections::BTreeMap;

use super::OperationResult;
use crate::editing::mapper::RangeMapper;
use crate::error::Result;
use crate::model::{Confinement, ElementKind, Position, Range, Tree};

/// Move everything inside `range` into a new element.
pub(super) fn wrap(
    tree: &mut Tree,
    range: &Range,
    kind: &ElementKind,
    attributes: &BTreeMap<String, String>,
) -> Result<OperationResult> {
    range.resolve(tree)?;
    range.confine(tree, Confinement::SameParent)?;

    range.end.split(tree)?;
    let (parent, from) = range.start.split_to_index(tree)?;
    let start = range.start.parent_offset();
    let end = range.end.parent_offset();
    let to = tree.offset_to_index(parent, end)?;

    let wrapper = tree.create_element(kind.clone(), attributes.clone());
    tree.add_child(parent, wrapper, from)?;
    tree.move_children(parent, from + 1..to + 1, wrapper, 0)?;

    let mut mapper = RangeMapper::new();
    mapper.wrap(range.start.parent_path(), start, end);

    let mut inside = range.start.path().to_vec();
    inside.push(0);
    let inner_start = Position::unchecked(range.start.root(), inside);
    let inner_end = inner_start.with_offset(end - start);
    Ok(OperationResult::new(Range::new(inner_start, inner_end), mapper))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ModelError;
    use crate::model::Fragment;
    use pretty_assertions::assert_eq;

    #[test]
    fn wraps_a_span_of_text_and_elements() {
        let mut tree = Tree::from_fragment(&Fragment::root([
            Fragment::text("abc"),
            Fragment::element(ElementKind::Span, [Fragment::text("x")]),
            Fragment::text("def"),
        ]))
        .unwrap();
        let range = Range::from_paths(&tree, vec![1], vec![5]).unwrap();

        let result = wrap(&mut tree, &range, &ElementKind::Div, &BTreeMap::new()).unwrap();
        assert_eq!(
            tree.snapshot(),
            Fragment::root([
                Fragment::text("a"),
                Fragment::element(
                    ElementKind::Div,
                    [
                        Fragment::text("bc"),
                        Fragment::element(ElementKind::Span, [Fragment::text("x")]),
                        Fragment::text("d"),
                    ]
                ),
                Fragment::text("ef"),
            ])
        );
        assert_eq!(result.default_range.start.path(), &[1, 0]);
        assert_eq!(result.default_range.end.path(), &[1, 4]);
        assert_eq!(result.mapper.map_path(&[3, 0]), vec![1, 2, 0]);
        assert_eq!(result.mapper.map_path(&[6]), vec![3]);
    }

    #[test]
    fn endpoints_in_different_parents_are_refused() {
        let mut tree = Tree::from_fragment(&Fragment::root([
            Fragment::text("abc"),
            Fragment::element(ElementKind::Span, [Fragment::text("x")]),
        ]))
        .unwrap();
        let before = tree.snapshot();
        let range = Range::from_paths(&tree, vec![1], vec![3, 1]).unwrap();

        assert!(matches!(
            wrap(&mut tree, &range, &ElementKind::Div, &BTreeMap::new()),
            Err(ModelError::UnconfinedRange(_))
        ));
        assert_eq!(tree.snapshot(), before);
    }
}
