use thiserror::Error;

/// Errors raised by the document model and its operations.
///
/// Every operation validates its input before touching the tree, so any of
/// these errors means the tree is exactly as it was before the call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ModelError {
    #[error("Stale reference: {0}")]
    StaleReference(String),

    #[error("Range is not confined: {0}")]
    UnconfinedRange(String),

    #[error("Index {index} out of range (maximum {max})")]
    IndexOutOfRange { index: usize, max: usize },

    #[error("Incompatible merge: {0}")]
    IncompatibleMerge(String),

    #[error("Node is not inside a table")]
    NotInTable,

    #[error("Expected {expected} node")]
    WrongNodeType { expected: &'static str },
}

impl ModelError {
    pub(crate) fn stale(what: impl Into<String>) -> Self {
        ModelError::StaleReference(what.into())
    }

    pub(crate) fn out_of_range(index: usize, max: usize) -> Self {
        ModelError::IndexOutOfRange { index, max }
    }
}

pub type Result<T, E = ModelError> = std::result::Result<T, E>;
