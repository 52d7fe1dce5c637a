pub mod editing;
pub mod error;
pub mod model;

// Re-export key types for easier usage
pub use editing::*;
pub use error::{ModelError, Result};
pub use model::*;
