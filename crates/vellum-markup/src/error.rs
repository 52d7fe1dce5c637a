use thiserror::Error;
use vellum_model::ModelError;

/// Everything that can go wrong between markup text and a model tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MarkupError {
    #[error("unexpected character {found:?} at byte {offset}")]
    UnexpectedCharacter { found: String, offset: usize },

    #[error("malformed tag {text:?} at byte {offset}")]
    MalformedTag { text: String, offset: usize },

    #[error("closing </{found}> at byte {offset} does not match open <{expected}>")]
    MismatchedClose {
        expected: String,
        found: String,
        offset: usize,
    },

    #[error("closing </{tag}> at byte {offset} has no open tag")]
    UnbalancedClose { tag: String, offset: usize },

    #[error("<{tag}> is never closed")]
    Unclosed { tag: String },

    #[error("expected a single root element, found {count} top-level nodes")]
    NotASingleRoot { count: usize },

    #[error("<text> may only contain text, found <{tag}>")]
    NestedInText { tag: String },

    #[error("text offset {offset} is past the end of the document ({len} characters)")]
    OffsetOutOfRange { offset: usize, len: usize },

    #[error(transparent)]
    Model(#[from] ModelError),
}

pub type Result<T, E = MarkupError> = std::result::Result<T, E>;
