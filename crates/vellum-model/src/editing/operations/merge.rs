use super::OperationResult;
use super::algorithms::settle_at;
use crate::editing::mapper::RangeMapper;
use crate::error::{ModelError, Result};
use crate::model::{Position, Range, Tree};

/// Join the element after `position` into the element before it.
pub(super) fn merge(tree: &mut Tree, position: &Position) -> Result<OperationResult> {
    position.resolve(tree)?;
    if position.text_node(tree)?.is_some() {
        return Err(ModelError::IncompatibleMerge(format!(
            "{:?} lies inside text",
            position.path()
        )));
    }
    let (left, right) = match (position.node_before(tree)?, position.node_after(tree)?) {
        (Some(left), Some(right)) => (left, right),
        _ => {
            return Err(ModelError::IncompatibleMerge(format!(
                "{:?} is not between two nodes",
                position.path()
            )));
        }
    };
    let (left_element, right_element) = match (tree.element(left), tree.element(right)) {
        (Ok(l), Ok(r)) => (l, r),
        _ => {
            return Err(ModelError::IncompatibleMerge(
                "only elements can be merged".to_string(),
            ));
        }
    };
    if !left_element.same_shell(right_element) {
        return Err(ModelError::IncompatibleMerge(format!(
            "<{}> and <{}> differ in kind or attributes",
            left_element.kind.tag(),
            right_element.kind.tag()
        )));
    }

    let left_size = tree.size(left);
    let left_count = tree.children(left).len();
    let right_count = tree.children(right).len();
    tree.move_children(right, 0..right_count, left, left_count)?;
    tree.discard(right)?;

    let offset = position.parent_offset() - 1;
    let mut mapper = RangeMapper::new();
    mapper.merge(position.parent_path(), offset, left_size);

    let mut seam = position.parent_path().to_vec();
    seam.extend([offset, left_size]);
    let seam = Position::unchecked(position.root(), seam);
    let seam = settle_at(tree, &seam, &mut mapper)?;
    Ok(OperationResult::new(Range::collapsed(seam), mapper))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ElementKind, Fragment, INVISIBLE_SPACE, MarkSpec};
    use pretty_assertions::assert_eq;

    fn cell(kind: ElementKind, children: impl IntoIterator<Item = Fragment>) -> Fragment {
        Fragment::element(kind, children)
    }

    #[test]
    fn joins_children_and_merges_the_seam() {
        let mut tree = Tree::from_fragment(&Fragment::root([
            cell(ElementKind::Paragraph, [Fragment::text("ab")]),
            cell(ElementKind::Paragraph, [Fragment::text("cd"), Fragment::marked_text("e", [MarkSpec::bold()])]),
            Fragment::text("tail"),
        ]))
        .unwrap();
        let position = Position::from_path(&tree, tree.root(), vec![1]).unwrap();

        let result = merge(&mut tree, &position).unwrap();
        assert_eq!(
            tree.snapshot(),
            Fragment::root([
                cell(ElementKind::Paragraph, [Fragment::text("abcd"), Fragment::marked_text("e", [MarkSpec::bold()])]),
                Fragment::text("tail"),
            ])
        );
        assert_eq!(result.default_range.start.path(), &[0, 2]);
        assert_eq!(result.mapper.map_path(&[1, 1]), vec![0, 3]);
        assert_eq!(result.mapper.map_path(&[3]), vec![2]);
    }

    #[test]
    fn placeholder_at_the_seam_is_absorbed() {
        let mut tree = Tree::from_fragment(&Fragment::root([
            cell(ElementKind::Paragraph, [Fragment::text("ab"), Fragment::text(INVISIBLE_SPACE)]),
            cell(ElementKind::Paragraph, [Fragment::text("cd")]),
        ]))
        .unwrap();
        let position = Position::from_path(&tree, tree.root(), vec![1]).unwrap();

        let result = merge(&mut tree, &position).unwrap();
        assert_eq!(
            tree.snapshot(),
            Fragment::root([cell(ElementKind::Paragraph, [Fragment::text("abcd")])])
        );
        assert_eq!(result.default_range.start.path(), &[0, 2]);
        assert_eq!(result.mapper.map_path(&[1, 1]), vec![0, 3]);
    }

    #[test]
    fn different_kinds_are_rejected_untouched() {
        let mut tree = Tree::from_fragment(&Fragment::root([
            cell(ElementKind::TableCell, [Fragment::text("a")]),
            cell(ElementKind::TableHeader, [Fragment::text("b")]),
        ]))
        .unwrap();
        let before = tree.snapshot();
        let position = Position::from_path(&tree, tree.root(), vec![1]).unwrap();

        assert!(matches!(
            merge(&mut tree, &position),
            Err(ModelError::IncompatibleMerge(_))
        ));
        assert_eq!(tree.snapshot(), before);
    }

    #[test]
    fn different_attributes_are_rejected() {
        let mut tree = Tree::from_fragment(&Fragment::root([
            cell(ElementKind::Div, []).with_attribute("class", "a"),
            cell(ElementKind::Div, []).with_attribute("class", "b"),
        ]))
        .unwrap();
        let position = Position::from_path(&tree, tree.root(), vec![1]).unwrap();
        assert!(merge(&mut tree, &position).is_err());
    }
}
