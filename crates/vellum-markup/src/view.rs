//! The view tree: what markup parses into and what the writer produces.
//!
//! A [`ViewNode`] is deliberately dumb. It knows tags, attributes and text,
//! nothing about marks or offsets; the [reader](crate::reader) and
//! [writer](crate::writer) translate between it and the model.

use std::fmt::Write as _;

use crate::parser::is_void;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewNode {
    Element(ViewElement),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewElement {
    pub tag: String,
    /// Attributes in the order they were written.
    pub attributes: Vec<(String, String)>,
    pub children: Vec<ViewNode>,
}

impl ViewElement {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, replacing an existing one of the same name.
    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name, value)),
        }
    }

    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = ViewNode>) -> Self {
        self.children = children.into_iter().collect();
        self
    }
}

impl ViewNode {
    pub fn element(tag: impl Into<String>, children: impl IntoIterator<Item = ViewNode>) -> Self {
        ViewNode::Element(ViewElement::new(tag).with_children(children))
    }

    pub fn text(text: impl Into<String>) -> Self {
        ViewNode::Text(text.into())
    }

    pub fn as_element(&self) -> Option<&ViewElement> {
        match self {
            ViewNode::Element(element) => Some(element),
            ViewNode::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            ViewNode::Text(text) => Some(text),
            ViewNode::Element(_) => None,
        }
    }

    pub fn children(&self) -> &[ViewNode] {
        match self {
            ViewNode::Element(element) => &element.children,
            ViewNode::Text(_) => &[],
        }
    }

    /// Follow a path of child indices down from this node.
    pub fn at_path(&self, path: &[usize]) -> Option<&ViewNode> {
        path.iter()
            .try_fold(self, |node, &index| node.children().get(index))
    }

    /// Whitespace-only text that contains a line break: indentation between
    /// tags rather than content.
    pub fn is_blank(&self) -> bool {
        matches!(self, ViewNode::Text(text) if text.contains('\n') && text.trim().is_empty())
    }

    pub fn text_content(&self) -> String {
        match self {
            ViewNode::Text(text) => text.clone(),
            ViewNode::Element(element) => element.children.iter().map(ViewNode::text_content).collect(),
        }
    }
}

/// Serialize a view tree back to markup, escaping text and attribute values.
pub fn to_markup(node: &ViewNode) -> String {
    let mut out = String::new();
    write_node(&mut out, node);
    out
}

fn write_node(out: &mut String, node: &ViewNode) {
    match node {
        ViewNode::Text(text) => out.push_str(&html_escape::encode_text(text)),
        ViewNode::Element(element) => {
            let _ = write!(out, "<{}", element.tag);
            for (key, value) in &element.attributes {
                let _ = write!(out, " {key}=\"{}\"", html_escape::encode_double_quoted_attribute(value));
            }
            out.push('>');
            if is_void(&element.tag) && element.children.is_empty() {
                return;
            }
            for child in &element.children {
                write_node(out, child);
            }
            let _ = write!(out, "</{}>", element.tag);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_element;
    use pretty_assertions::assert_eq;

    #[test]
    fn markup_escapes_text_and_attributes() {
        let node = ViewNode::Element(
            ViewElement::new("span")
                .with_attribute("title", "say \"hi\" & go")
                .with_children([ViewNode::text("1 < 2")]),
        );

        insta::assert_snapshot!(to_markup(&node), @r#"<span title="say &quot;hi&quot; &amp; go">1 &lt; 2</span>"#);
    }

    #[test]
    fn markup_reparses_to_the_same_view() {
        let source = r#"<div class="a"><p>x<br>y</p><ul><li>one</li></ul></div>"#;
        let node = parse_element(source).unwrap();
        assert_eq!(to_markup(&node), source);
        assert_eq!(parse_element(&to_markup(&node)).unwrap(), node);
    }

    #[test]
    fn at_path_walks_children() {
        let node = ViewNode::element("div", [ViewNode::element("p", [ViewNode::text("x")])]);
        assert_eq!(node.at_path(&[0, 0]), Some(&ViewNode::text("x")));
        assert_eq!(node.at_path(&[1]), None);
        assert_eq!(node.at_path(&[]), Some(&node));
    }
}
