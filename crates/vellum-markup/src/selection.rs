//! Selections expressed as character offsets into the document text.
//!
//! This is how a plain text widget or a terminal reports a selection: two
//! offsets into the concatenated content of every text node, with no notion
//! of element structure. Offsets on a boundary between two text nodes
//! resolve to the end of the earlier one.

use vellum_model::{Position, Range, SelectionAdapter, Tree};

use crate::error::{MarkupError, Result};

/// A native selection: anchor and focus as character offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextSelection {
    pub anchor: usize,
    pub focus: usize,
}

impl TextSelection {
    pub fn caret(at: usize) -> Self {
        Self { anchor: at, focus: at }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct TextOffsetAdapter;

impl TextOffsetAdapter {
    fn position_at(tree: &Tree, offset: usize) -> Result<Position> {
        let root = tree.root();
        let mut remaining = offset;
        for node in tree.descendants(root) {
            if let Ok(text) = tree.text(node) {
                let len = text.len();
                if remaining <= len {
                    return Ok(Position::from_in_text_node(tree, node, remaining)?);
                }
                remaining -= len;
            }
        }
        if offset == 0 {
            return Ok(Position::from_in_element(tree, root, 0)?);
        }
        Err(MarkupError::OffsetOutOfRange {
            offset,
            len: offset - remaining,
        })
    }

    fn offset_of(tree: &Tree, position: &Position) -> Result<usize> {
        let mut count = 0;
        for node in tree.descendants(tree.root()) {
            let Ok(text) = tree.text(node) else {
                continue;
            };
            let start = Position::from_before_node(tree, node)?;
            let end = Position::from_after_node(tree, node)?;
            if *position >= end {
                count += text.len();
            } else if *position > start {
                count += position.parent_offset() - start.parent_offset();
                break;
            } else {
                break;
            }
        }
        Ok(count)
    }
}

impl SelectionAdapter for TextOffsetAdapter {
    type Native = TextSelection;
    type Error = MarkupError;

    fn read(&self, tree: &Tree, native: &TextSelection) -> Result<Range> {
        let anchor = Self::position_at(tree, native.anchor)?;
        let focus = Self::position_at(tree, native.focus)?;
        Ok(Range::new(anchor, focus))
    }

    fn write(&self, tree: &Tree, range: &Range) -> Result<TextSelection> {
        range.resolve(tree)?;
        Ok(TextSelection {
            anchor: Self::offset_of(tree, &range.start)?,
            focus: Self::offset_of(tree, &range.end)?,
        })
    }
}
