//! Owned, detached subtrees.
//!
//! A [`Fragment`] is the form content takes outside a [`Tree`]: it is what
//! tests and readers build, what insert operations consume and what remove
//! operations hand back. Derived equality on fragments is deep structural
//! equality, so two fragments compare equal exactly when the trees they
//! describe are `same_as` each other.
//!
//! [`Tree`]: crate::model::Tree

use std::collections::BTreeMap;

use crate::model::mark::{Mark, MarkSet, MarkSpec};
use crate::model::node::{ElementKind, INVISIBLE_SPACE};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fragment {
    Element {
        kind: ElementKind,
        attributes: BTreeMap<String, String>,
        children: Vec<Fragment>,
    },
    Text {
        content: String,
        marks: MarkSet,
    },
}

impl Fragment {
    pub fn element(kind: ElementKind, children: impl IntoIterator<Item = Fragment>) -> Self {
        Fragment::Element {
            kind,
            attributes: BTreeMap::new(),
            children: children.into_iter().collect(),
        }
    }

    pub fn root(children: impl IntoIterator<Item = Fragment>) -> Self {
        Self::element(ElementKind::Root, children)
    }

    pub fn text(content: impl Into<String>) -> Self {
        Fragment::Text {
            content: content.into(),
            marks: MarkSet::new(),
        }
    }

    pub fn marked_text(content: impl Into<String>, marks: impl IntoIterator<Item = MarkSpec>) -> Self {
        Fragment::Text {
            content: content.into(),
            marks: marks.into_iter().map(Mark::core).collect(),
        }
    }

    pub fn placeholder() -> Self {
        Self::text(INVISIBLE_SPACE)
    }

    /// Set an attribute on an element fragment; a no-op on text.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Fragment::Element { attributes, .. } = &mut self {
            attributes.insert(key.into(), value.into());
        }
        self
    }

    /// Width in the parent's offset space.
    pub fn width(&self) -> usize {
        match self {
            Fragment::Element { .. } => 1,
            Fragment::Text { content, .. } => content.chars().count(),
        }
    }

    /// Concatenated text content of the fragment.
    pub fn text_content(&self) -> String {
        match self {
            Fragment::Text { content, .. } => content.clone(),
            Fragment::Element { children, .. } => {
                children.iter().map(Fragment::text_content).collect()
            }
        }
    }
}
