//! Writing a model tree out as a view tree.
//!
//! Marks are nested outermost-first by descending priority. Consecutive
//! text nodes whose outermost mark is the same share one wrapper, and the
//! grouping repeats one level further in for whatever is inside it:
//!
//! ```text
//! "ab" {italic, bold}, "cd" {italic}   ->   <em><strong>ab</strong>cd</em>
//! ```

use vellum_model::{Mark, NodeData, NodeId, TextNode, Tree, Writer};

use crate::marks::MarkTags;
use crate::view::{ViewElement, ViewNode, to_markup};

#[derive(Debug, Clone)]
pub struct HtmlWriter {
    tags: MarkTags,
    root_tag: String,
}

impl Default for HtmlWriter {
    fn default() -> Self {
        Self::new(MarkTags::default())
    }
}

impl HtmlWriter {
    pub fn new(tags: MarkTags) -> Self {
        Self {
            tags,
            root_tag: "div".to_string(),
        }
    }

    /// Tag of the element the model root is written as.
    pub fn with_root_tag(mut self, tag: impl Into<String>) -> Self {
        self.root_tag = tag.into();
        self
    }

    /// Write the tree and serialize the result.
    pub fn write_str(&self, tree: &Tree) -> String {
        to_markup(&self.write(tree))
    }

    fn children(&self, tree: &Tree, parent: NodeId) -> Vec<ViewNode> {
        let mut out = Vec::new();
        let mut run: Vec<&TextNode> = Vec::new();
        for &child in tree.children(parent) {
            match tree.get(child) {
                Ok(NodeData::Text(text)) => run.push(text),
                Ok(NodeData::Element(element)) => {
                    self.flush(&mut run, &mut out);
                    let mut view = ViewElement::new(element.kind.tag());
                    view.attributes = element
                        .attributes
                        .iter()
                        .map(|(k, v)| (k.clone(), v.clone()))
                        .collect();
                    view.children = self.children(tree, child);
                    out.push(ViewNode::Element(view));
                }
                Err(_) => {}
            }
        }
        self.flush(&mut run, &mut out);
        out
    }

    fn flush(&self, run: &mut Vec<&TextNode>, out: &mut Vec<ViewNode>) {
        if run.is_empty() {
            return;
        }
        let layered: Vec<(&str, Vec<&Mark>)> = run
            .drain(..)
            .map(|text| (text.content.as_str(), text.marks.by_priority()))
            .collect();
        out.extend(self.nest(&layered, 0));
    }

    fn nest(&self, texts: &[(&str, Vec<&Mark>)], depth: usize) -> Vec<ViewNode> {
        let mut out = Vec::new();
        let mut i = 0;
        while i < texts.len() {
            match texts[i].1.get(depth) {
                None => {
                    out.push(ViewNode::text(texts[i].0));
                    i += 1;
                }
                Some(mark) => {
                    let end = i + texts[i..]
                        .iter()
                        .take_while(|(_, marks)| marks.get(depth) == Some(mark))
                        .count();
                    let mut wrapper = self.tags.element_for(mark);
                    wrapper.children = self.nest(&texts[i..end], depth + 1);
                    out.push(ViewNode::Element(wrapper));
                    i = end;
                }
            }
        }
        out
    }
}

impl Writer<ViewNode> for HtmlWriter {
    fn write(&self, tree: &Tree) -> ViewNode {
        let root = tree.root();
        let mut element = ViewElement::new(self.root_tag.as_str());
        if let Ok(data) = tree.element(root) {
            element.attributes = data.attributes.iter().map(|(k, v)| (k.clone(), v.clone())).collect();
        }
        element.children = self.children(tree, root);
        ViewNode::Element(element)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vellum_model::{ElementKind, Fragment, MarkSpec};

    fn write(fragment: Fragment) -> String {
        HtmlWriter::default().write_str(&Tree::from_fragment(&fragment).unwrap())
    }

    #[test]
    fn marks_nest_by_priority() {
        let markup = write(Fragment::root([Fragment::marked_text(
            "x",
            [MarkSpec::bold(), MarkSpec::highlighted(), MarkSpec::italic()],
        )]));

        insta::assert_snapshot!(markup, @r#"<div><span data-editor-highlight="true"><em><strong>x</strong></em></span></div>"#);
    }

    #[test]
    fn shared_outer_mark_shares_its_wrapper() {
        let markup = write(Fragment::root([Fragment::element(
            ElementKind::Paragraph,
            [
                Fragment::text("a"),
                Fragment::marked_text("b", [MarkSpec::italic(), MarkSpec::bold()]),
                Fragment::marked_text("c", [MarkSpec::italic()]),
                Fragment::marked_text("d", [MarkSpec::italic(), MarkSpec::underline()]),
                Fragment::text("e"),
            ],
        )]));

        insta::assert_snapshot!(markup, @"<div><p>a<em><strong>b</strong>c</em><u><em>d</em></u>e</p></div>");
    }

    #[test]
    fn root_tag_and_attributes() {
        let tree = Tree::from_fragment(
            &Fragment::root([Fragment::text("x")]).with_attribute("lang", "en"),
        )
        .unwrap();
        let markup = HtmlWriter::default().with_root_tag("article").write_str(&tree);

        insta::assert_snapshot!(markup, @r#"<article lang="en">x</article>"#);
    }
}
