use crate::error::{ModelError, Result};
use crate::model::node::NodeId;
use crate::model::position::Position;
use crate::model::tree::Tree;

/// What an operation needs from the range it is given.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confinement {
    /// Both endpoints in the same parent element.
    SameParent,
    /// Neither endpoint inside an element that cannot hold inline content.
    InlineContent,
}

/// An ordered pair of positions; `start <= end` always holds.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Range {
    pub start: Position,
    pub end: Position,
}

impl Range {
    /// Build a range from two positions in any order.
    pub fn new(a: Position, b: Position) -> Self {
        if b < a {
            Self { start: b, end: a }
        } else {
            Self { start: a, end: b }
        }
    }

    pub fn collapsed(position: Position) -> Self {
        Self {
            start: position.clone(),
            end: position,
        }
    }

    pub fn from_paths(tree: &Tree, start: Vec<usize>, end: Vec<usize>) -> Result<Self> {
        Ok(Self::new(
            Position::from_path(tree, tree.root(), start)?,
            Position::from_path(tree, tree.root(), end)?,
        ))
    }

    pub fn from_in_element(tree: &Tree, element: NodeId, start: usize, end: usize) -> Result<Self> {
        Ok(Self::new(
            Position::from_in_element(tree, element, start)?,
            Position::from_in_element(tree, element, end)?,
        ))
    }

    pub fn from_in_text_node(tree: &Tree, text: NodeId, start: usize, end: usize) -> Result<Self> {
        Ok(Self::new(
            Position::from_in_text_node(tree, text, start)?,
            Position::from_in_text_node(tree, text, end)?,
        ))
    }

    /// The range covering exactly one node.
    pub fn around_node(tree: &Tree, node: NodeId) -> Result<Self> {
        Ok(Self::new(
            Position::from_before_node(tree, node)?,
            Position::from_after_node(tree, node)?,
        ))
    }

    pub(crate) fn stamped(self, tree: &Tree) -> Self {
        Self {
            start: self.start.stamped(tree),
            end: self.end.stamped(tree),
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.start == self.end
    }

    /// Both endpoints still resolve in `tree`.
    pub fn resolve(&self, tree: &Tree) -> Result<()> {
        self.start.resolve(tree)?;
        self.end.resolve(tree)?;
        Ok(())
    }

    /// Lowest element containing both endpoints.
    pub fn common_ancestor(&self, tree: &Tree) -> Result<NodeId> {
        let start_parent = self.start.parent(tree)?;
        let end_parent = self.end.parent(tree)?;
        let end_chain: Vec<NodeId> = std::iter::once(end_parent)
            .chain(tree.ancestors(end_parent))
            .collect();
        std::iter::once(start_parent)
            .chain(tree.ancestors(start_parent))
            .find(|node| end_chain.contains(node))
            .ok_or_else(|| ModelError::stale("range endpoints share no ancestor"))
    }

    /// Fail with `UnconfinedRange` unless the range meets `requirement`.
    pub fn confine(&self, tree: &Tree, requirement: Confinement) -> Result<()> {
        let start_parent = self.start.parent(tree)?;
        let end_parent = self.end.parent(tree)?;
        match requirement {
            Confinement::SameParent => {
                if start_parent != end_parent {
                    return Err(ModelError::UnconfinedRange(format!(
                        "{:?} and {:?} are in different elements",
                        self.start.path(),
                        self.end.path()
                    )));
                }
            }
            Confinement::InlineContent => {
                for parent in [start_parent, end_parent] {
                    let kind = &tree.element(parent)?.kind;
                    if !kind.supports_inline() {
                        return Err(ModelError::UnconfinedRange(format!(
                            "<{}> cannot hold inline content",
                            kind.tag()
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fragment::Fragment;
    use crate::model::node::ElementKind;
    use pretty_assertions::assert_eq;

    fn tree() -> Tree {
        Tree::from_fragment(&Fragment::root([
            Fragment::element(
                ElementKind::Div,
                [
                    Fragment::element(ElementKind::Paragraph, [Fragment::text("abc")]),
                    Fragment::element(ElementKind::Paragraph, [Fragment::text("def")]),
                ],
            ),
            Fragment::element(
                ElementKind::List { ordered: false },
                [Fragment::element(ElementKind::ListItem, [Fragment::text("x")])],
            ),
        ]))
        .unwrap()
    }

    #[test]
    fn constructor_orders_endpoints() {
        let tree = tree();
        let range = Range::from_paths(&tree, vec![0, 1, 2], vec![0, 0, 1]).unwrap();
        assert_eq!(range.start.path(), &[0, 0, 1]);
        assert_eq!(range.end.path(), &[0, 1, 2]);
        assert!(!range.is_collapsed());
    }

    #[test]
    fn common_ancestor_is_lowest_shared_element() {
        let tree = tree();
        let div = tree.children(tree.root())[0];
        let first = tree.children(div)[0];

        let across = Range::from_paths(&tree, vec![0, 0, 1], vec![0, 1, 2]).unwrap();
        assert_eq!(across.common_ancestor(&tree).unwrap(), div);

        let inside = Range::from_paths(&tree, vec![0, 0, 1], vec![0, 0, 2]).unwrap();
        assert_eq!(inside.common_ancestor(&tree).unwrap(), first);

        let wide = Range::from_paths(&tree, vec![0, 0, 1], vec![1, 0, 1]).unwrap();
        assert_eq!(wide.common_ancestor(&tree).unwrap(), tree.root());
    }

    #[test]
    fn confinement_requirements() {
        let tree = tree();
        let across = Range::from_paths(&tree, vec![0, 0, 1], vec![0, 1, 2]).unwrap();
        assert!(across.confine(&tree, Confinement::InlineContent).is_ok());
        assert!(matches!(
            across.confine(&tree, Confinement::SameParent),
            Err(ModelError::UnconfinedRange(_))
        ));

        let in_list = Range::from_paths(&tree, vec![1, 0], vec![1, 1]).unwrap();
        assert!(matches!(
            in_list.confine(&tree, Confinement::InlineContent),
            Err(ModelError::UnconfinedRange(_))
        ));
    }
}
