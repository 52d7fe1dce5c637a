/*!
# Model Fixtures

A compact markup notation for building model trees exactly as written,
mostly for tests:

```text
<modelRoot>
  <p __id="first">
    plain
    <text __marks="bold,italic">both</text>
    <text __marks="underline@spellcheck" __id="typo">teh</text>
  </p>
</modelRoot>
```

- Element tags map onto element kinds (`modelRoot` is the root).
- `<text>` is a text node. Its `__marks` lists mark names, each optionally
  followed by `@owner`.
- Bare text is an unmarked text node.
- `__id` names a node so the test can look it up afterwards.
- Whitespace-only text containing a line break is indentation and ignored.

Unlike [`HtmlReader`](crate::HtmlReader) nothing is merged or normalized, so
fixtures can describe trees an edit would never leave behind.

[`to_vdom`] writes a tree back in the same notation, which makes it the
natural format for snapshot assertions.
*/

use std::collections::HashMap;
use std::fmt::Write as _;

use vellum_model::{
    CORE_OWNER, ElementKind, INVISIBLE_SPACE, Mark, MarkAttributes, MarkRegistry, MarkSet, NodeData, NodeId, Tree,
};

use crate::error::{MarkupError, Result};
use crate::parser::parse_element;
use crate::view::{ViewElement, ViewNode};

pub const ID_ATTRIBUTE: &str = "__id";
pub const MARKS_ATTRIBUTE: &str = "__marks";
pub const TEXT_TAG: &str = "text";

/// A tree built from fixture markup, with its named nodes.
#[derive(Debug, Clone)]
pub struct Fixture {
    pub tree: Tree,
    ids: HashMap<String, NodeId>,
}

impl Fixture {
    /// The node declared with `__id="name"`.
    pub fn id(&self, name: &str) -> Option<NodeId> {
        self.ids.get(name).copied()
    }

    pub fn into_tree(self) -> Tree {
        self.tree
    }
}

/// Build a tree from fixture markup, resolving marks with the default
/// registry.
pub fn vdom(markup: &str) -> Result<Fixture> {
    vdom_with(&MarkRegistry::default(), markup)
}

pub fn vdom_with(registry: &MarkRegistry, markup: &str) -> Result<Fixture> {
    let ViewNode::Element(root_view) = parse_element(markup)? else {
        return Err(MarkupError::NotASingleRoot { count: 0 });
    };

    let mut fixture = Fixture {
        tree: Tree::new(),
        ids: HashMap::new(),
    };
    let root = fixture.tree.root();
    {
        let element = fixture.tree.element_mut(root)?;
        element.kind = ElementKind::from_tag(&root_view.tag);
        element.attributes = plain_attributes(&root_view);
    }
    fixture.name(root, &root_view);
    fixture.children(registry, root, &root_view.children)?;
    Ok(fixture)
}

impl Fixture {
    fn name(&mut self, node: NodeId, view: &ViewElement) {
        if let Some(id) = view.attribute(ID_ATTRIBUTE) {
            self.ids.insert(id.to_string(), node);
        }
    }

    fn children(&mut self, registry: &MarkRegistry, parent: NodeId, children: &[ViewNode]) -> Result<()> {
        for child in children {
            let node = match child {
                ViewNode::Text(_) if child.is_blank() => continue,
                ViewNode::Text(text) => self.tree.create_text(text.as_str(), MarkSet::new()),
                ViewNode::Element(element) if element.tag == TEXT_TAG => {
                    let content = text_only(element)?;
                    let marks = element
                        .attribute(MARKS_ATTRIBUTE)
                        .map(|list| parse_marks(registry, list))
                        .unwrap_or_default();
                    let node = self.tree.create_text(content, marks);
                    self.name(node, element);
                    node
                }
                ViewNode::Element(element) => {
                    let node = self
                        .tree
                        .create_element(ElementKind::from_tag(&element.tag), plain_attributes(element));
                    self.name(node, element);
                    self.children(registry, node, &element.children)?;
                    node
                }
            };
            let at = self.tree.children(parent).len();
            self.tree.add_child(parent, node, at)?;
        }
        Ok(())
    }
}

fn plain_attributes(element: &ViewElement) -> std::collections::BTreeMap<String, String> {
    element
        .attributes
        .iter()
        .filter(|(key, _)| !key.starts_with("__"))
        .cloned()
        .collect()
}

fn text_only(element: &ViewElement) -> Result<String> {
    let mut content = String::new();
    for child in &element.children {
        match child {
            ViewNode::Text(text) => content.push_str(text),
            ViewNode::Element(nested) => {
                return Err(MarkupError::NestedInText {
                    tag: nested.tag.clone(),
                });
            }
        }
    }
    Ok(content)
}

fn parse_marks(registry: &MarkRegistry, list: &str) -> MarkSet {
    list.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (name, owner) = entry.split_once('@').unwrap_or((entry, CORE_OWNER));
            Mark::new(registry.resolve(name), MarkAttributes::owned_by(owner))
        })
        .collect()
}

/// Write a tree in fixture notation.
///
/// Text is written bare when it carries no marks and does not follow
/// another text node; placeholders are written as `&#x200B;` so they stay
/// visible.
pub fn to_vdom(tree: &Tree) -> String {
    let mut out = String::new();
    write_node(&mut out, tree, tree.root(), false);
    out
}

fn write_node(out: &mut String, tree: &Tree, id: NodeId, after_text: bool) {
    match tree.get(id) {
        Ok(NodeData::Element(element)) => {
            let tag = element.kind.tag();
            let _ = write!(out, "<{tag}");
            for (key, value) in &element.attributes {
                let _ = write!(out, " {key}=\"{}\"", html_escape::encode_double_quoted_attribute(value));
            }
            out.push('>');
            let mut previous_text = false;
            for &child in tree.children(id) {
                write_node(out, tree, child, previous_text);
                previous_text = tree.is_text(child);
            }
            let _ = write!(out, "</{tag}>");
        }
        Ok(NodeData::Text(text)) => {
            let content = html_escape::encode_text(&text.content).replace(INVISIBLE_SPACE, "&#x200B;");
            if text.marks.is_empty() && !after_text && !text.is_placeholder() {
                out.push_str(&content);
                return;
            }
            let marks: Vec<String> = text
                .marks
                .iter()
                .map(|mark| match mark.owner() {
                    CORE_OWNER => mark.name().to_string(),
                    owner => format!("{}@{owner}", mark.name()),
                })
                .collect();
            if marks.is_empty() {
                let _ = write!(out, "<{TEXT_TAG}>{content}</{TEXT_TAG}>");
            } else {
                let _ = write!(
                    out,
                    "<{TEXT_TAG} {MARKS_ATTRIBUTE}=\"{}\">{content}</{TEXT_TAG}>",
                    marks.join(",")
                );
            }
        }
        Err(_) => {}
    }
}
