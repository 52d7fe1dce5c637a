//! How marks look in markup.
//!
//! | mark            | written as                           | also read from          |
//! |-----------------|--------------------------------------|-------------------------|
//! | `bold`          | `<strong>`                           | `<b>`                   |
//! | `italic`        | `<em>`                               | `<i>`                   |
//! | `underline`     | `<u>`                                |                         |
//! | `strikethrough` | `<s>`                                | `<del>`, `<strike>`     |
//! | `highlighted`   | `<span data-editor-highlight="true">`|                         |
//! | anything else   | `<span data-mark="name">`            | a tag given to [`MarkTags::with_tag`] |
//!
//! The owner of a mark travels as `data-set-by` (omitted for the core
//! owner); the remaining mark attributes travel as `data-*`.

use log::{debug, warn};
use vellum_model::{CORE_OWNER, Mark, MarkAttributes, MarkKind, MarkRegistry};

use crate::view::ViewElement;

pub const MARK_ATTRIBUTE: &str = "data-mark";
pub const HIGHLIGHT_ATTRIBUTE: &str = "data-editor-highlight";
pub const OWNER_ATTRIBUTE: &str = "data-set-by";

/// Mapping between marks and the elements that carry them.
#[derive(Debug, Clone, Default)]
pub struct MarkTags {
    registry: MarkRegistry,
    /// `(tag, mark name)` pairs for marks with their own element.
    custom: Vec<(String, String)>,
}

impl MarkTags {
    pub fn new(registry: MarkRegistry) -> Self {
        Self {
            registry,
            custom: Vec::new(),
        }
    }

    /// Write mark `name` as `<tag>` and read `<tag>` back as that mark.
    pub fn with_tag(mut self, name: impl Into<String>, tag: impl Into<String>) -> Self {
        let tag = tag.into().to_ascii_lowercase();
        let name = name.into();
        self.custom.retain(|(t, n)| *t != tag && *n != name);
        self.custom.push((tag, name));
        self
    }

    pub fn registry(&self) -> &MarkRegistry {
        &self.registry
    }

    /// The mark an element stands for, or `None` for a structural element.
    pub fn mark_of(&self, element: &ViewElement) -> Option<Mark> {
        let tag = element.tag.to_ascii_lowercase();
        let name = self
            .custom
            .iter()
            .find(|(t, _)| *t == tag)
            .map(|(_, name)| name.as_str())
            .or(match tag.as_str() {
                "strong" | "b" => Some("bold"),
                "em" | "i" => Some("italic"),
                "u" => Some("underline"),
                "s" | "del" | "strike" => Some("strikethrough"),
                "span" if element.attribute(HIGHLIGHT_ATTRIBUTE).is_some() => Some("highlighted"),
                _ => None,
            })
            .or(element.attribute(MARK_ATTRIBUTE))?;

        let mut attributes = MarkAttributes::default();
        for (key, value) in &element.attributes {
            let key = key.to_ascii_lowercase();
            if key == MARK_ATTRIBUTE || key == HIGHLIGHT_ATTRIBUTE {
                continue;
            }
            if key == OWNER_ATTRIBUTE {
                attributes.owner = value.clone();
            } else if let Some(extra) = key.strip_prefix("data-") {
                attributes.extra.insert(extra.to_string(), value.clone());
            } else {
                debug!("dropping attribute {key:?} of <{tag}> read as {name}");
            }
        }
        Some(Mark::new(self.registry.resolve(name), attributes))
    }

    /// The element a mark is written as, without children.
    pub fn element_for(&self, mark: &Mark) -> ViewElement {
        let custom = self.custom.iter().find(|(_, n)| n == mark.name());
        let mut element = match (custom, &mark.spec.kind) {
            (Some((tag, _)), _) => ViewElement::new(tag.as_str()),
            (None, MarkKind::Bold) => ViewElement::new("strong"),
            (None, MarkKind::Italic) => ViewElement::new("em"),
            (None, MarkKind::Underline) => ViewElement::new("u"),
            (None, MarkKind::Strikethrough) => ViewElement::new("s"),
            (None, MarkKind::Highlighted) => ViewElement::new("span").with_attribute(HIGHLIGHT_ATTRIBUTE, "true"),
            (None, _) => ViewElement::new("span").with_attribute(MARK_ATTRIBUTE, mark.name()),
        };
        if mark.owner() != CORE_OWNER {
            element.set_attribute(OWNER_ATTRIBUTE, mark.owner());
        }
        for (key, value) in &mark.attributes.extra {
            let name = format!("data-{key}");
            if reserved(&name) {
                warn!("not writing attribute {key:?} of {}: it would clash with {name}", mark.name());
                continue;
            }
            element.set_attribute(name, value.as_str());
        }
        element
    }
}

/// Attributes that say which mark an element is, or who set it.
fn reserved(name: &str) -> bool {
    [MARK_ATTRIBUTE, HIGHLIGHT_ATTRIBUTE, OWNER_ATTRIBUTE]
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use vellum_model::MarkSpec;

    #[rstest]
    #[case(ViewElement::new("b"), Some("bold"))]
    #[case(ViewElement::new("STRONG"), Some("bold"))]
    #[case(ViewElement::new("i"), Some("italic"))]
    #[case(ViewElement::new("del"), Some("strikethrough"))]
    #[case(ViewElement::new("span").with_attribute("data-editor-highlight", "true"), Some("highlighted"))]
    #[case(ViewElement::new("span").with_attribute("data-mark", "comment"), Some("comment"))]
    #[case(ViewElement::new("span"), None)]
    #[case(ViewElement::new("p"), None)]
    fn recognises_mark_elements(#[case] element: ViewElement, #[case] expected: Option<&str>) {
        let tags = MarkTags::default();
        assert_eq!(tags.mark_of(&element).as_ref().map(Mark::name), expected);
    }

    #[test]
    fn owner_and_data_attributes_round_trip() {
        let tags = MarkTags::default();
        let mark = Mark::new(
            MarkSpec::underline(),
            MarkAttributes::owned_by("spellcheck").with("word", "teh"),
        );

        let element = tags.element_for(&mark);
        assert_eq!(
            element.attributes,
            vec![
                ("data-set-by".to_string(), "spellcheck".to_string()),
                ("data-word".to_string(), "teh".to_string()),
            ]
        );
        assert_eq!(tags.mark_of(&element), Some(mark));
    }

    #[test]
    fn extra_attributes_cannot_rename_or_reown_a_mark() {
        let tags = MarkTags::default();
        let comment = tags.registry().resolve("comment");
        let mark = Mark::new(
            comment.clone(),
            MarkAttributes::owned_by("review")
                .with("mark", "bold")
                .with("Set-By", "someone-else")
                .with("editor-highlight", "true")
                .with("thread", "7"),
        );

        let element = tags.element_for(&mark);
        assert_eq!(
            element.attributes,
            vec![
                ("data-mark".to_string(), "comment".to_string()),
                ("data-set-by".to_string(), "review".to_string()),
                ("data-thread".to_string(), "7".to_string()),
            ]
        );
        assert_eq!(
            tags.mark_of(&element),
            Some(Mark::new(comment, MarkAttributes::owned_by("review").with("thread", "7")))
        );
    }

    #[test]
    fn custom_tags_win_both_ways() {
        let mut registry = MarkRegistry::default();
        registry.register(MarkSpec::with_priority(MarkKind::Custom("code".into()), 700));
        let tags = MarkTags::new(registry).with_tag("code", "code");

        let mark = tags.mark_of(&ViewElement::new("code")).unwrap();
        assert_eq!(mark.priority(), 700);
        assert_eq!(tags.element_for(&mark).tag, "code");
    }
}
