//! Reading a view tree into a model tree.
//!
//! Mark elements disappear: their content is read into the enclosing model
//! element with the mark added to every text node inside. All other
//! elements become model elements. Neighbouring text that ends up with the
//! same marks is merged as it is read, so `<b>a</b><b>b</b>` yields a single
//! bold `ab` text node.
//!
//! Every model node is bound to the path of the view node it came from. A
//! merged text node keeps the binding of its first piece.

use log::debug;
use vellum_model::{
    ElementKind, INVISIBLE_SPACE, MarkSet, ModelError, NodeBindings, NodeId, Parsed, Reader, Tree,
};

use crate::error::{MarkupError, Result};
use crate::marks::MarkTags;
use crate::parser::parse_element;
use crate::view::ViewNode;

/// Child indices leading from the view root to a view node.
pub type ViewPath = Vec<usize>;

#[derive(Debug, Clone, Default)]
pub struct HtmlReader {
    tags: MarkTags,
}

impl HtmlReader {
    pub fn new(tags: MarkTags) -> Self {
        Self { tags }
    }

    /// Parse markup text and read it in one go.
    pub fn read_str(&self, markup: &str) -> Result<Parsed<ViewPath>> {
        let view = parse_element(markup)?;
        self.parse(&view)
    }
}

impl Reader<ViewNode> for HtmlReader {
    type Handle = ViewPath;
    type Error = MarkupError;

    fn parse(&self, view: &ViewNode) -> Result<Parsed<ViewPath>> {
        let ViewNode::Element(root_view) = view else {
            return Err(ModelError::WrongNodeType { expected: "element" }.into());
        };

        let mut read = Read {
            tags: &self.tags,
            tree: Tree::new(),
            bindings: NodeBindings::new(),
        };
        let root = read.tree.root();
        read.tree.element_mut(root)?.attributes = root_view.attributes.iter().cloned().collect();
        read.bindings.bind(root, Vec::new());
        read.children(root, &root_view.children, &mut Vec::new(), &MarkSet::new())?;

        debug!(
            "read <{}> into {} model nodes",
            root_view.tag,
            read.tree.node_count()
        );
        Ok(Parsed {
            tree: read.tree,
            bindings: read.bindings,
        })
    }
}

struct Read<'a> {
    tags: &'a MarkTags,
    tree: Tree,
    bindings: NodeBindings<ViewPath>,
}

impl Read<'_> {
    fn children(&mut self, parent: NodeId, children: &[ViewNode], path: &mut ViewPath, marks: &MarkSet) -> Result<()> {
        for (index, child) in children.iter().enumerate() {
            path.push(index);
            match child {
                ViewNode::Text(_) if child.is_blank() => {}
                ViewNode::Text(text) => self.text(parent, text, path, marks)?,
                ViewNode::Element(element) => match self.tags.mark_of(element) {
                    Some(mark) => {
                        let mut inner = marks.clone();
                        inner.add(mark);
                        self.children(parent, &element.children, path, &inner)?;
                    }
                    None => {
                        let kind = ElementKind::from_tag(&element.tag);
                        let node = self
                            .tree
                            .create_element(kind, element.attributes.iter().cloned().collect());
                        let at = self.tree.children(parent).len();
                        self.tree.add_child(parent, node, at)?;
                        self.bindings.bind(node, path.clone());
                        self.children(node, &element.children, path, marks)?;
                    }
                },
            }
            path.pop();
        }
        Ok(())
    }

    fn text(&mut self, parent: NodeId, text: &str, path: &ViewPath, marks: &MarkSet) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        let last = self.tree.children(parent).last().copied();
        if let Some(previous) = last.and_then(|id| self.tree.text_mut(id).ok()) {
            if !previous.is_placeholder() && text != INVISIBLE_SPACE && previous.marks == *marks {
                previous.content.push_str(text);
                return Ok(());
            }
        }
        let node = self.tree.create_text(text, marks.clone());
        let at = self.tree.children(parent).len();
        self.tree.add_child(parent, node, at)?;
        self.bindings.bind(node, path.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vellum_model::{CORE_OWNER, Fragment, MarkSpec};

    fn read(markup: &str) -> Parsed<ViewPath> {
        HtmlReader::default().read_str(markup).unwrap()
    }

    #[test]
    fn mark_elements_become_marks() {
        let parsed = read("<div><p>plain <b>bold <i>both</i></b></p></div>");

        assert_eq!(
            parsed.tree.snapshot(),
            Fragment::root([Fragment::element(
                ElementKind::Paragraph,
                [
                    Fragment::text("plain "),
                    Fragment::marked_text("bold ", [MarkSpec::bold()]),
                    Fragment::marked_text("both", [MarkSpec::bold(), MarkSpec::italic()]),
                ]
            )])
        );
    }

    #[test]
    fn neighbouring_text_with_equal_marks_is_merged() {
        let parsed = read("<div><b>a</b><strong>b</strong>c</div>");
        let root = parsed.tree.root();

        assert_eq!(parsed.tree.children(root).len(), 2);
        assert_eq!(parsed.tree.text_content(root), "abc");
    }

    #[test]
    fn placeholders_stay_separate() {
        let parsed = read("<div><b>a</b><b>\u{200B}</b></div>");
        assert_eq!(parsed.tree.children(parsed.tree.root()).len(), 2);
    }

    #[test]
    fn owner_comes_from_data_set_by() {
        let parsed = read(r#"<div><u data-set-by="spellcheck">teh</u></div>"#);
        let text = parsed.tree.children(parsed.tree.root())[0];

        let marks = &parsed.tree.text(text).unwrap().marks;
        assert!(marks.get("underline", "spellcheck").is_some());
        assert!(marks.get("underline", CORE_OWNER).is_none());
    }

    #[test]
    fn bindings_point_at_view_paths() {
        let parsed = read("<div><p><b>x</b>y</p><ul><li>z</li></ul></div>");
        let tree = &parsed.tree;
        let root = tree.root();
        let paragraph = tree.children(root)[0];
        let list_item = tree.children(tree.children(root)[1])[0];

        assert_eq!(parsed.bindings.view_of(root), Some(&vec![]));
        assert_eq!(parsed.bindings.view_of(paragraph), Some(&vec![0]));
        assert_eq!(parsed.bindings.view_of(tree.children(paragraph)[0]), Some(&vec![0, 0, 0]));
        assert_eq!(parsed.bindings.model_of(&vec![1, 0]), Some(list_item));
    }

    #[test]
    fn indentation_between_blocks_is_ignored() {
        let parsed = read("<div>\n  <p>a</p>\n  <p>b</p>\n</div>");
        assert_eq!(parsed.tree.children(parsed.tree.root()).len(), 2);
    }

    #[test]
    fn text_root_is_rejected() {
        let error = HtmlReader::default().parse(&ViewNode::text("x")).unwrap_err();
        assert_eq!(
            error,
            MarkupError::Model(ModelError::WrongNodeType { expected: "element" })
        );
    }
}
