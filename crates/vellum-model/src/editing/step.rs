use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::editing::mapper::RangeMapper;
use crate::model::{Fragment, Range};

/// What a step may have changed, used to decide who needs to hear about it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StepKind {
    /// Structural or text edits. Moves content, so the selection is remapped.
    Content,
    /// Attribute-only edits. Offsets never move.
    Attribute,
    /// Selection changes only.
    Selection,
    /// Opaque steps recorded by plugins; the core does not interpret them.
    Plugin,
}

impl StepKind {
    pub fn modifies_content(self) -> bool {
        matches!(self, StepKind::Content | StepKind::Attribute)
    }

    pub fn modifies_selection(self) -> bool {
        matches!(self, StepKind::Content | StepKind::Selection)
    }
}

/// One applied unit of change inside a transaction.
#[derive(Debug, Clone)]
pub struct Step {
    pub id: Uuid,
    pub name: String,
    pub kind: StepKind,
    /// Who asked for the change (a plugin name, "core", ...).
    pub actor: String,
    pub timestamp: SystemTime,
    pub mapper: RangeMapper,
    pub default_range: Option<Range>,
    pub removed: Vec<Fragment>,
    /// Free-form payload of plugin steps.
    pub payload: Option<String>,
}

impl Step {
    pub(crate) fn new(name: impl Into<String>, kind: StepKind, actor: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            kind,
            actor: actor.into(),
            timestamp: SystemTime::now(),
            mapper: RangeMapper::new(),
            default_range: None,
            removed: Vec::new(),
            payload: None,
        }
    }
}

/// Result of [`Document::apply_step`](crate::editing::Document::apply_step).
#[derive(Debug, Clone)]
pub struct StepResult {
    pub step: Step,
    /// Document version after the step was committed.
    pub version: u64,
}

/// What listeners receive for every committed step.
#[derive(Debug, Clone)]
pub struct StepEvent {
    pub step: Step,
    pub content_changed: bool,
    pub selection_changed: bool,
    pub version: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(StepKind::Content, true, true)]
    #[case(StepKind::Attribute, true, false)]
    #[case(StepKind::Selection, false, true)]
    #[case(StepKind::Plugin, false, false)]
    fn classification(#[case] kind: StepKind, #[case] content: bool, #[case] selection: bool) {
        assert_eq!(kind.modifies_content(), content);
        assert_eq!(kind.modifies_selection(), selection);
    }

    #[test]
    fn steps_get_distinct_ids() {
        let a = Step::new("mark-step", StepKind::Content, "core");
        let b = Step::new("mark-step", StepKind::Content, "core");
        assert_ne!(a.id, b.id);
    }
}
