use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::collections::BTreeMap;

use crate::model::mark::MarkSet;

/// Glyph used as the content of a text node that only exists to carry a
/// collapsed cursor and its pending mark state.
pub const INVISIBLE_SPACE: &str = "\u{200B}";

/// Handle to a node stored in a [`Tree`](crate::model::Tree).
///
/// Ids are generational: once a node is removed its slot may be reused, but
/// the old id keeps resolving to a stale-reference error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementKind {
    Root,
    Paragraph,
    Div,
    Span,
    Heading(u8),
    List { ordered: bool },
    ListItem,
    Table,
    TableBody,
    TableRow,
    TableCell,
    TableHeader,
    Link,
    Custom(String),
}

impl ElementKind {
    /// The element name. Headings outside `1..=6` keep their level, so
    /// they never read back as another heading.
    pub fn tag(&self) -> Cow<'_, str> {
        let tag = match self {
            ElementKind::Root => "modelRoot",
            ElementKind::Paragraph => "p",
            ElementKind::Div => "div",
            ElementKind::Span => "span",
            ElementKind::Heading(1) => "h1",
            ElementKind::Heading(2) => "h2",
            ElementKind::Heading(3) => "h3",
            ElementKind::Heading(4) => "h4",
            ElementKind::Heading(5) => "h5",
            ElementKind::Heading(6) => "h6",
            ElementKind::Heading(level) => return Cow::Owned(format!("h{level}")),
            ElementKind::List { ordered: true } => "ol",
            ElementKind::List { ordered: false } => "ul",
            ElementKind::ListItem => "li",
            ElementKind::Table => "table",
            ElementKind::TableBody => "tbody",
            ElementKind::TableRow => "tr",
            ElementKind::TableCell => "td",
            ElementKind::TableHeader => "th",
            ElementKind::Link => "a",
            ElementKind::Custom(tag) => tag,
        };
        Cow::Borrowed(tag)
    }

    pub fn from_tag(tag: &str) -> Self {
        match tag.to_ascii_lowercase().as_str() {
            "modelroot" => ElementKind::Root,
            "p" => ElementKind::Paragraph,
            "div" => ElementKind::Div,
            "span" => ElementKind::Span,
            "h1" => ElementKind::Heading(1),
            "h2" => ElementKind::Heading(2),
            "h3" => ElementKind::Heading(3),
            "h4" => ElementKind::Heading(4),
            "h5" => ElementKind::Heading(5),
            "h6" => ElementKind::Heading(6),
            "ol" => ElementKind::List { ordered: true },
            "ul" => ElementKind::List { ordered: false },
            "li" => ElementKind::ListItem,
            "table" => ElementKind::Table,
            "tbody" => ElementKind::TableBody,
            "tr" => ElementKind::TableRow,
            "td" => ElementKind::TableCell,
            "th" => ElementKind::TableHeader,
            "a" => ElementKind::Link,
            _ => ElementKind::Custom(tag.to_string()),
        }
    }

    pub fn is_table_cell(&self) -> bool {
        matches!(self, ElementKind::TableCell | ElementKind::TableHeader)
    }

    pub fn is_list(&self) -> bool {
        matches!(self, ElementKind::List { .. })
    }

    /// Whether inline content (text, marks) may live directly in this element.
    pub fn supports_inline(&self) -> bool {
        !matches!(
            self,
            ElementKind::Table | ElementKind::TableBody | ElementKind::TableRow | ElementKind::List { .. }
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementNode {
    pub kind: ElementKind,
    pub attributes: BTreeMap<String, String>,
    pub(crate) children: Vec<NodeId>,
}

impl ElementNode {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            attributes: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// Same kind and attributes: the shell of the element without content.
    pub fn same_shell(&self, other: &ElementNode) -> bool {
        self.kind == other.kind && self.attributes == other.attributes
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextNode {
    pub content: String,
    pub marks: MarkSet,
}

impl TextNode {
    pub fn new(content: impl Into<String>, marks: MarkSet) -> Self {
        Self {
            content: content.into(),
            marks,
        }
    }

    /// Length in characters, which is the node's width in offset space.
    pub fn len(&self) -> usize {
        self.content.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }

    pub fn is_placeholder(&self) -> bool {
        self.content == INVISIBLE_SPACE
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeData {
    Element(ElementNode),
    Text(TextNode),
}

impl NodeData {
    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            NodeData::Element(element) => Some(element),
            NodeData::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            NodeData::Text(text) => Some(text),
            NodeData::Element(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, NodeData::Text(_))
    }

    pub fn is_element(&self) -> bool {
        matches!(self, NodeData::Element(_))
    }
}

/// Byte index of the `char_offset`-th character of `s` (or `s.len()`).
pub(crate) fn byte_offset(s: &str, char_offset: usize) -> usize {
    s.char_indices()
        .nth(char_offset)
        .map(|(index, _)| index)
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case(ElementKind::Heading(1), "h1")]
    #[case(ElementKind::Heading(6), "h6")]
    #[case(ElementKind::Heading(0), "h0")]
    #[case(ElementKind::Heading(7), "h7")]
    #[case(ElementKind::List { ordered: true }, "ol")]
    #[case(ElementKind::Custom("aside".into()), "aside")]
    fn tags_name_the_element(#[case] kind: ElementKind, #[case] tag: &str) {
        assert_eq!(kind.tag(), tag);
    }

    #[rstest]
    #[case("H2", ElementKind::Heading(2))]
    #[case("h6", ElementKind::Heading(6))]
    #[case("h0", ElementKind::Custom("h0".into()))]
    #[case("h7", ElementKind::Custom("h7".into()))]
    fn only_real_headings_parse_as_headings(#[case] tag: &str, #[case] kind: ElementKind) {
        assert_eq!(ElementKind::from_tag(tag), kind);
    }

    #[test]
    fn out_of_range_headings_do_not_collide() {
        let written = ElementKind::Heading(9).tag().into_owned();
        assert_ne!(ElementKind::from_tag(&written), ElementKind::Heading(6));
        assert_eq!(ElementKind::from_tag(&written).tag(), written);
    }
}
