/*!
 * # Editing
 *
 * Everything that changes a [`Tree`](crate::model::Tree) lives here.
 *
 * ## Layers
 *
 * - **`operations`**: the `Operation` enum. Each variant validates its
 *   input, mutates the tree and reports a default range plus a mapper.
 * - **`mapper`**: `RangeMapper`, the record of how offsets moved. Mappers
 *   compose by concatenation, so a whole transaction has one mapper too.
 * - **`step`**: classified, timestamped records of applied operations.
 * - **`document`**: `Document` and `Transaction`, the single entry point for
 *   edits, with atomic commit and document-owned listeners.
 * - **`selection`**: the live selection and its derived tri-state flags.
 * - **`collaborators`**: `Reader`, `Writer` and `SelectionAdapter`, the
 *   traits view layers implement.
 *
 * ## Usage Pattern
 *
 * ```rust
 * use vellum_model::editing::*;
 * use vellum_model::model::*;
 *
 * let mut doc = Document::from_fragment(&Fragment::root([Fragment::text("abcdefghi")])).unwrap();
 *
 * // Bold the middle, then type over the end of it.
 * doc.transact("core", |tx| {
 *     let range = Range::from_paths(tx.tree(), vec![3], vec![6])?;
 *     let marked = tx.apply(Operation::add_mark(range, MarkSpec::bold(), MarkAttributes::default()))?;
 *     let end = Range::collapsed(marked.default_range.end.clone());
 *     tx.apply(Operation::InsertText { range: end, text: "!".into() })?;
 *     Ok(())
 * })
 * .unwrap();
 *
 * assert_eq!(doc.tree().text_content(doc.tree().root()), "abcdef!ghi");
 * ```
 */

pub mod collaborators;
pub mod document;
pub mod mapper;
pub mod operations;
pub mod selection;
pub mod step;

pub use collaborators::{NodeBindings, Parsed, Reader, SelectionAdapter, Writer};
pub use document::{Document, ListenerId, Transaction};
pub use mapper::{MapRule, RangeMapper, ScopedRule};
pub use operations::{MarkAction, Operation, OperationResult};
pub use selection::{PropertyState, Selection, SelectionProperties};
pub use step::{Step, StepEvent, StepKind, StepResult};
