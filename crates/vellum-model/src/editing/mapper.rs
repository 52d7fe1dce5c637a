//! Position translation across edits.
//!
//! Every operation records how it moved content as a list of rules. A rule
//! is scoped to one element, named by its path, and only touches positions
//! inside that element. Rules run in the order they were recorded, each one
//! in the coordinates that were current when its edit happened, so composing
//! two mappers is plain concatenation.

use log::trace;

use crate::model::position::Position;
use crate::model::range::Range;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapRule {
    /// `delta` offsets were inserted at `at`. Offsets at or after `at` move
    /// right, so a position at the insertion point ends up after the new
    /// content.
    Shift { at: usize, delta: usize },
    /// `[start, end)` was deleted. Positions inside it, including anything
    /// nested in deleted elements, land on `point`.
    CollapseToPoint { start: usize, end: usize, point: usize },
    /// The element at `offset` was split at its child offset `at`; content
    /// from `at` on now lives in a new element at `offset + 1`.
    Split { offset: usize, at: usize },
    /// The element at `offset + 1` was merged into the element at `offset`,
    /// whose size was `size` before the merge.
    Merge { offset: usize, size: usize },
    /// `[start, end)` was moved into a new element placed at `start`.
    Wrap { start: usize, end: usize },
    /// `[start, end)` was taken out and reinserted at `to`, a full path
    /// given in the coordinates left after the removal. Positions inside
    /// the content travel with it.
    Move { start: usize, end: usize, to: Vec<usize> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopedRule {
    pub parent: Vec<usize>,
    pub rule: MapRule,
}

impl ScopedRule {
    fn map(&self, path: &[usize]) -> Option<Vec<usize>> {
        if let MapRule::Move { start, end, ref to } = self.rule {
            return map_moved(&self.parent, start, end, to, path);
        }
        let d = self.parent.len();
        if path.len() <= d || !path.starts_with(&self.parent) {
            return None;
        }
        let o = path[d];
        let deeper = path.len() > d + 1;
        let mut out = path.to_vec();
        match self.rule {
            MapRule::Shift { at, delta } => {
                if o < at {
                    return None;
                }
                out[d] = o + delta;
            }
            MapRule::CollapseToPoint { start, end, point } => {
                if o < start {
                    return None;
                }
                if o < end || (o == end && !deeper && start < end) {
                    out.truncate(d + 1);
                    out[d] = point;
                } else {
                    out[d] = o - (end - start);
                }
            }
            MapRule::Split { offset, at } => {
                if o > offset {
                    out[d] = o + 1;
                } else if o == offset && deeper && path[d + 1] >= at {
                    out[d] = offset + 1;
                    out[d + 1] -= at;
                } else {
                    return None;
                }
            }
            MapRule::Merge { offset, size } => {
                if o == offset + 1 {
                    out[d] = offset;
                    if deeper {
                        out[d + 1] += size;
                    } else {
                        out.push(size);
                    }
                } else if o > offset + 1 {
                    out[d] = o - 1;
                } else {
                    return None;
                }
            }
            MapRule::Move { .. } => return None,
            MapRule::Wrap { start, end } => {
                if o < start || (o == start && !deeper) {
                    return None;
                }
                if o < end {
                    out[d] = start;
                    out.insert(d + 1, o - start);
                } else if o == end && !deeper {
                    out[d] = start + 1;
                } else {
                    out[d] = o - (end - start) + 1;
                }
            }
        }
        Some(out)
    }
}

fn map_moved(parent: &[usize], start: usize, end: usize, to: &[usize], path: &[usize]) -> Option<Vec<usize>> {
    let (&at, to_parent) = to.split_last()?;
    let d = parent.len();
    let width = end - start;
    let mut out = path.to_vec();
    if path.len() > d && path.starts_with(parent) {
        let o = path[d];
        let deeper = path.len() > d + 1;
        if (o > start && o < end) || (o == start && deeper) {
            let mut moved = to_parent.to_vec();
            moved.push(at + o - start);
            moved.extend_from_slice(&path[d + 1..]);
            return Some(moved);
        }
        if o >= end {
            out[d] = o - width;
        }
    }
    let td = to_parent.len();
    if out.len() > td && out.starts_with(to_parent) && out[td] >= at {
        out[td] += width;
    }
    (out != path).then_some(out)
}

/// An ordered list of [`ScopedRule`]s.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RangeMapper {
    rules: Vec<ScopedRule>,
}

impl RangeMapper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_identity(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rules(&self) -> &[ScopedRule] {
        &self.rules
    }

    pub fn push(&mut self, parent: &[usize], rule: MapRule) -> &mut Self {
        self.rules.push(ScopedRule {
            parent: parent.to_vec(),
            rule,
        });
        self
    }

    pub fn shift(&mut self, parent: &[usize], at: usize, delta: usize) -> &mut Self {
        if delta == 0 {
            return self;
        }
        self.push(parent, MapRule::Shift { at, delta })
    }

    pub fn collapse_to_point(&mut self, parent: &[usize], start: usize, end: usize, point: usize) -> &mut Self {
        if start >= end {
            return self;
        }
        self.push(parent, MapRule::CollapseToPoint { start, end, point })
    }

    pub fn remap_across_split(&mut self, parent: &[usize], offset: usize, at: usize) -> &mut Self {
        self.push(parent, MapRule::Split { offset, at })
    }

    pub fn merge(&mut self, parent: &[usize], offset: usize, size: usize) -> &mut Self {
        self.push(parent, MapRule::Merge { offset, size })
    }

    pub fn wrap(&mut self, parent: &[usize], start: usize, end: usize) -> &mut Self {
        self.push(parent, MapRule::Wrap { start, end })
    }

    pub fn relocate(&mut self, parent: &[usize], start: usize, end: usize, to: &[usize]) -> &mut Self {
        if start >= end {
            return self;
        }
        self.push(
            parent,
            MapRule::Move {
                start,
                end,
                to: to.to_vec(),
            },
        )
    }

    /// A mapper equivalent to applying `self`, then `other`.
    pub fn compose(&self, other: &RangeMapper) -> RangeMapper {
        let mut rules = self.rules.clone();
        rules.extend(other.rules.iter().cloned());
        RangeMapper { rules }
    }

    pub fn append(&mut self, other: RangeMapper) {
        self.rules.extend(other.rules);
    }

    pub fn map_path(&self, path: &[usize]) -> Vec<usize> {
        let mut current = path.to_vec();
        for rule in &self.rules {
            if let Some(mapped) = rule.map(&current) {
                trace!("{:?} under {:?}: {:?} -> {:?}", rule.rule, rule.parent, current, mapped);
                current = mapped;
            }
        }
        current
    }

    pub fn map_position(&self, position: &Position) -> Position {
        Position::unchecked(position.root(), self.map_path(position.path()))
    }

    pub fn map_range(&self, range: &Range) -> Range {
        Range::new(self.map_position(&range.start), self.map_position(&range.end))
    }
}
