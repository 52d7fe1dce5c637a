use log::debug;

use super::OperationResult;
use crate::editing::mapper::RangeMapper;
use crate::error::Result;
use crate::model::{NodeId, Range, Tree};

/// Set or clear one attribute of an element. Offsets never move.
pub(super) fn set_attribute(tree: &mut Tree, node: NodeId, key: &str, value: Option<String>) -> Result<OperationResult> {
    tree.element(node)?;
    let range = if node == tree.root() {
        Range::from_in_element(tree, node, 0, 0)?
    } else {
        Range::around_node(tree, node)?
    };
    let previous = tree.set_attribute(node, key, value)?;
    debug!("attribute {key} on {node:?} (was {previous:?})");
    Ok(OperationResult::new(range, RangeMapper::new()))
}
