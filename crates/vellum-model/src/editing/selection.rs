use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::editing::mapper::RangeMapper;
use crate::error::Result;
use crate::model::{ElementKind, MarkRegistry, NodeId, Position, Range, Tree, text_nodes_in};

/// Tri-state answer to "does this hold across the selection?".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyState {
    Enabled,
    Disabled,
    /// Holds for part of the selection only.
    Unknown,
}

impl PropertyState {
    fn from_counts(hits: usize, total: usize) -> Self {
        if total == 0 || hits == 0 {
            PropertyState::Disabled
        } else if hits == total {
            PropertyState::Enabled
        } else {
            PropertyState::Unknown
        }
    }

    fn from_endpoints(start: bool, end: bool) -> Self {
        match (start, end) {
            (true, true) => PropertyState::Enabled,
            (false, false) => PropertyState::Disabled,
            _ => PropertyState::Unknown,
        }
    }
}

/// Derived state toolbars and menus render from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionProperties {
    /// One entry per registered mark name.
    pub marks: BTreeMap<String, PropertyState>,
    pub in_list: PropertyState,
    pub in_table: PropertyState,
}

impl Default for SelectionProperties {
    fn default() -> Self {
        Self {
            marks: BTreeMap::new(),
            in_list: PropertyState::Disabled,
            in_table: PropertyState::Disabled,
        }
    }
}

impl SelectionProperties {
    /// State of a mark; unregistered marks read as disabled.
    pub fn mark(&self, name: &str) -> PropertyState {
        self.marks
            .get(name)
            .copied()
            .unwrap_or(PropertyState::Disabled)
    }

    pub fn derive(tree: &Tree, registry: &MarkRegistry, range: &Range) -> Result<Self> {
        let leaves = leaves(tree, range)?;
        let marks = registry
            .names()
            .into_iter()
            .map(|name| {
                let hits = leaves
                    .iter()
                    .filter(|leaf| {
                        tree.text(**leaf)
                            .is_ok_and(|text| text.marks.has_mark_name(name))
                    })
                    .count();
                (name.to_string(), PropertyState::from_counts(hits, leaves.len()))
            })
            .collect();

        let inside = |position: &Position, wanted: fn(&ElementKind) -> bool| -> Result<bool> {
            let parent = position.parent(tree)?;
            Ok(std::iter::once(parent)
                .chain(tree.ancestors(parent))
                .any(|node| tree.element(node).is_ok_and(|e| wanted(&e.kind))))
        };
        let is_table = |kind: &ElementKind| *kind == ElementKind::Table;
        Ok(Self {
            marks,
            in_list: PropertyState::from_endpoints(
                inside(&range.start, ElementKind::is_list)?,
                inside(&range.end, ElementKind::is_list)?,
            ),
            in_table: PropertyState::from_endpoints(
                inside(&range.start, is_table)?,
                inside(&range.end, is_table)?,
            ),
        })
    }
}

/// Text leaves the selection covers, even partially.
///
/// A collapsed selection looks at the text right before the cursor, or the
/// text right after it when there is none.
fn leaves(tree: &Tree, range: &Range) -> Result<Vec<NodeId>> {
    let is_text = |node: &NodeId| tree.is_text(*node);
    if range.is_collapsed() {
        let before = range.start.node_before(tree)?.filter(is_text);
        let after = range.start.node_after(tree)?.filter(is_text);
        return Ok(before.or(after).into_iter().collect());
    }
    let mut leaves = Vec::new();
    if let Some((node, _)) = range.start.text_node(tree)? {
        leaves.push(node);
    }
    leaves.extend(text_nodes_in(tree, range));
    if let Some((node, _)) = range.end.text_node(tree)? {
        if !leaves.contains(&node) {
            leaves.push(node);
        }
    }
    Ok(leaves)
}

/// The current selection: one or more ranges plus their derived properties.
#[derive(Debug, Clone, PartialEq)]
pub struct Selection {
    pub ranges: Vec<Range>,
    pub properties: SelectionProperties,
}

impl Selection {
    pub fn new(range: Range) -> Self {
        Self {
            ranges: vec![range],
            properties: SelectionProperties::default(),
        }
    }

    /// The range edits and property derivation act on.
    pub fn last_range(&self) -> Option<&Range> {
        self.ranges.last()
    }

    pub fn is_collapsed(&self) -> bool {
        self.last_range().is_none_or(Range::is_collapsed)
    }

    /// Every range still resolves in `tree`.
    pub fn is_well_behaved(&self, tree: &Tree) -> bool {
        self.ranges.iter().all(|range| range.resolve(tree).is_ok())
    }

    pub(crate) fn map(&mut self, mapper: &RangeMapper) {
        for range in &mut self.ranges {
            *range = mapper.map_range(range);
        }
    }

    pub(crate) fn refresh(&mut self, tree: &Tree, registry: &MarkRegistry) -> Result<()> {
        self.properties = match self.last_range() {
            Some(range) => SelectionProperties::derive(tree, registry, range)?,
            None => SelectionProperties::default(),
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Fragment, MarkSpec};
    use pretty_assertions::assert_eq;

    fn tree() -> Tree {
        Tree::from_fragment(&Fragment::root([
            Fragment::marked_text("abc", [MarkSpec::bold()]),
            Fragment::marked_text("def", [MarkSpec::bold(), MarkSpec::italic()]),
            Fragment::element(
                ElementKind::List { ordered: false },
                [Fragment::element(ElementKind::ListItem, [Fragment::text("x")])],
            ),
        ]))
        .unwrap()
    }

    fn derive(tree: &Tree, start: Vec<usize>, end: Vec<usize>) -> SelectionProperties {
        let range = Range::from_paths(tree, start, end).unwrap();
        SelectionProperties::derive(tree, &MarkRegistry::default(), &range).unwrap()
    }

    #[test]
    fn mixed_marks_are_unknown() {
        let tree = tree();
        let properties = derive(&tree, vec![1], vec![5]);
        assert_eq!(properties.mark("bold"), PropertyState::Enabled);
        assert_eq!(properties.mark("italic"), PropertyState::Unknown);
        assert_eq!(properties.mark("underline"), PropertyState::Disabled);
        assert_eq!(properties.in_list, PropertyState::Disabled);
    }

    #[test]
    fn collapsed_cursor_reads_the_text_before_it() {
        let tree = tree();
        assert_eq!(derive(&tree, vec![3], vec![3]).mark("italic"), PropertyState::Disabled);
        assert_eq!(derive(&tree, vec![0], vec![0]).mark("bold"), PropertyState::Enabled);
        assert_eq!(derive(&tree, vec![4], vec![4]).mark("italic"), PropertyState::Enabled);
    }

    #[test]
    fn no_text_leaves_means_disabled() {
        let tree = tree();
        let properties = derive(&tree, vec![6, 0], vec![6, 0]);
        assert_eq!(properties.mark("bold"), PropertyState::Disabled);
        assert_eq!(properties.in_list, PropertyState::Enabled);
    }

    #[test]
    fn list_membership_of_one_endpoint_is_unknown() {
        let tree = tree();
        let properties = derive(&tree, vec![2], vec![6, 0, 1]);
        assert_eq!(properties.in_list, PropertyState::Unknown);
        assert_eq!(properties.in_table, PropertyState::Disabled);
    }
}
