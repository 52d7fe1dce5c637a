//! Unit transforms of a [`Tree`].
//!
//! Each operation checks everything it needs before its first mutation, so
//! an `Err` always leaves the tree exactly as it was. On success it reports
//! a default range for the caller to continue from and a [`RangeMapper`]
//! that carries older positions across the edit.

mod algorithms;
mod attribute;
mod insert;
mod mark;
mod merge;
mod relocate;
mod remove;
mod split;
mod wrap;

use std::collections::BTreeMap;

use log::debug;

use crate::editing::mapper::RangeMapper;
use crate::editing::step::StepKind;
use crate::error::Result;
use crate::model::{ElementKind, Fragment, MarkAttributes, MarkSpec, NodeId, Position, Range, Tree};

pub use mark::MarkAction;

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// Replace `range` with `text`.
    InsertText { range: Range, text: String },
    /// Insert detached content at a position.
    InsertNodes { position: Position, nodes: Vec<Fragment> },
    Remove { range: Range },
    /// Take the content of `range` out and put it back at `target`.
    Move { range: Range, target: Position },
    /// Split `depth` levels of elements above `position`.
    Split { position: Position, depth: usize },
    /// Join the two elements meeting at `position`.
    Merge { position: Position },
    Mark {
        range: Range,
        spec: MarkSpec,
        attributes: MarkAttributes,
        action: MarkAction,
    },
    Wrap {
        range: Range,
        kind: ElementKind,
        attributes: BTreeMap<String, String>,
    },
    SetAttribute {
        node: NodeId,
        key: String,
        value: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperationResult {
    pub default_range: Range,
    pub mapper: RangeMapper,
    /// Content taken out of the tree, in document order.
    pub removed: Vec<Fragment>,
}

impl OperationResult {
    pub(crate) fn new(default_range: Range, mapper: RangeMapper) -> Self {
        Self {
            default_range,
            mapper,
            removed: Vec::new(),
        }
    }
}

impl Operation {
    pub fn add_mark(range: Range, spec: MarkSpec, attributes: MarkAttributes) -> Self {
        Operation::Mark {
            range,
            spec,
            attributes,
            action: MarkAction::Add,
        }
    }

    pub fn remove_mark(range: Range, spec: MarkSpec, attributes: MarkAttributes) -> Self {
        Operation::Mark {
            range,
            spec,
            attributes,
            action: MarkAction::Remove,
        }
    }

    /// Step name under which the operation is recorded.
    pub fn name(&self) -> &'static str {
        match self {
            Operation::InsertText { .. } => "insert-text-step",
            Operation::InsertNodes { .. } => "replace-step",
            Operation::Remove { .. } => "remove-step",
            Operation::Move { .. } => "move-step",
            Operation::Split { .. } => "split-step",
            Operation::Merge { .. } => "merge-step",
            Operation::Mark { .. } => "mark-step",
            Operation::Wrap { .. } => "wrap-step",
            Operation::SetAttribute { .. } => "attribute-step",
        }
    }

    pub fn kind(&self) -> StepKind {
        match self {
            Operation::SetAttribute { .. } => StepKind::Attribute,
            _ => StepKind::Content,
        }
    }

    /// Run the operation against `tree`. When the result's mapper moves
    /// anything the tree's revision goes up, so positions built before the
    /// call stop resolving; the default range is valid at the new revision.
    pub fn execute(&self, tree: &mut Tree) -> Result<OperationResult> {
        debug!("executing {}", self.name());
        let mut result = self.dispatch(tree)?;
        if !result.mapper.is_identity() {
            tree.bump_revision();
        }
        result.default_range = result.default_range.stamped(tree);
        Ok(result)
    }

    fn dispatch(&self, tree: &mut Tree) -> Result<OperationResult> {
        match self {
            Operation::InsertText { range, text } => insert::insert_text(tree, range, text),
            Operation::InsertNodes { position, nodes } => insert::insert_nodes(tree, position, nodes),
            Operation::Remove { range } => remove::remove(tree, range),
            Operation::Move { range, target } => relocate::move_content(tree, range, target),
            Operation::Split { position, depth } => split::split(tree, position, *depth),
            Operation::Merge { position } => merge::merge(tree, position),
            Operation::Mark {
                range,
                spec,
                attributes,
                action,
            } => mark::mark(tree, range, spec, attributes, *action),
            Operation::Wrap {
                range,
                kind,
                attributes,
            } => wrap::wrap(tree, range, kind, attributes),
            Operation::SetAttribute { node, key, value } => {
                attribute::set_attribute(tree, *node, key, value.clone())
            }
        }
    }
}
