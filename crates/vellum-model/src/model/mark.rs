//! Inline marks (bold, italic, ...) and the per-text-node [`MarkSet`].
//!
//! A mark is identified by its `(name, owner)` key. The owner records which
//! actor set the mark so that two plugins can apply the same kind of mark
//! independently; marks set by the editor itself use [`CORE_OWNER`].
//!
//! Rendering nests marks by descending priority: the mark with the highest
//! priority becomes the outermost wrapper. Ties keep insertion order.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Owner tag used when a mark is not set by a specific actor.
pub const CORE_OWNER: &str = "core";

/// The kinds of marks the model knows about.
///
/// `Custom` is the escape hatch for marks registered at runtime, e.g. from
/// configuration.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MarkKind {
    Bold,
    Italic,
    Underline,
    Strikethrough,
    Highlighted,
    InlineRdfa,
    Custom(String),
}

impl MarkKind {
    pub fn name(&self) -> &str {
        match self {
            MarkKind::Bold => "bold",
            MarkKind::Italic => "italic",
            MarkKind::Underline => "underline",
            MarkKind::Strikethrough => "strikethrough",
            MarkKind::Highlighted => "highlighted",
            MarkKind::InlineRdfa => "inline-rdfa",
            MarkKind::Custom(name) => name,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "bold" => MarkKind::Bold,
            "italic" => MarkKind::Italic,
            "underline" => MarkKind::Underline,
            "strikethrough" => MarkKind::Strikethrough,
            "highlighted" => MarkKind::Highlighted,
            "inline-rdfa" => MarkKind::InlineRdfa,
            other => MarkKind::Custom(other.to_string()),
        }
    }

    pub fn default_priority(&self) -> i32 {
        match self {
            MarkKind::Highlighted => 1000,
            MarkKind::Strikethrough => 400,
            MarkKind::Underline => 300,
            MarkKind::Italic => 200,
            MarkKind::Bold => 100,
            MarkKind::Custom(_) => 50,
            MarkKind::InlineRdfa => 10,
        }
    }
}

/// Static description of a mark: what it is and where it nests.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkSpec {
    pub kind: MarkKind,
    pub priority: i32,
}

impl MarkSpec {
    pub fn new(kind: MarkKind) -> Self {
        let priority = kind.default_priority();
        Self { kind, priority }
    }

    pub fn with_priority(kind: MarkKind, priority: i32) -> Self {
        Self { kind, priority }
    }

    pub fn bold() -> Self {
        Self::new(MarkKind::Bold)
    }

    pub fn italic() -> Self {
        Self::new(MarkKind::Italic)
    }

    pub fn underline() -> Self {
        Self::new(MarkKind::Underline)
    }

    pub fn strikethrough() -> Self {
        Self::new(MarkKind::Strikethrough)
    }

    pub fn highlighted() -> Self {
        Self::new(MarkKind::Highlighted)
    }

    pub fn name(&self) -> &str {
        self.kind.name()
    }
}

/// Attributes carried by a mark instance.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkAttributes {
    pub owner: String,
    #[serde(default)]
    pub extra: BTreeMap<String, String>,
}

impl Default for MarkAttributes {
    fn default() -> Self {
        Self {
            owner: CORE_OWNER.to_string(),
            extra: BTreeMap::new(),
        }
    }
}

impl MarkAttributes {
    pub fn owned_by(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            extra: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }
}

/// Identity of a mark inside a [`MarkSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkKey<'a> {
    pub name: &'a str,
    pub owner: &'a str,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Mark {
    pub spec: MarkSpec,
    pub attributes: MarkAttributes,
}

impl Mark {
    pub fn new(spec: MarkSpec, attributes: MarkAttributes) -> Self {
        Self { spec, attributes }
    }

    /// A mark of the given spec owned by [`CORE_OWNER`].
    pub fn core(spec: MarkSpec) -> Self {
        Self::new(spec, MarkAttributes::default())
    }

    pub fn name(&self) -> &str {
        self.spec.name()
    }

    pub fn priority(&self) -> i32 {
        self.spec.priority
    }

    pub fn owner(&self) -> &str {
        &self.attributes.owner
    }

    pub fn key(&self) -> MarkKey<'_> {
        MarkKey {
            name: self.name(),
            owner: self.owner(),
        }
    }
}

/// The marks applied to one text node, unique by `(name, owner)`.
///
/// Equality is set equality: two sets holding the same marks in a different
/// insertion order are equal. This is what text merging compares.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarkSet {
    marks: Vec<Mark>,
}

impl MarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.marks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }

    /// Insert a mark. A mark with the same key is replaced in place.
    pub fn add(&mut self, mark: Mark) {
        match self.marks.iter().position(|m| m.key() == mark.key()) {
            Some(index) => self.marks[index] = mark,
            None => self.marks.push(mark),
        }
    }

    /// Remove the mark with the given name and owner, returning it.
    pub fn remove(&mut self, name: &str, owner: &str) -> Option<Mark> {
        let key = MarkKey { name, owner };
        let index = self.marks.iter().position(|m| m.key() == key)?;
        Some(self.marks.remove(index))
    }

    pub fn get(&self, name: &str, owner: &str) -> Option<&Mark> {
        let key = MarkKey { name, owner };
        self.marks.iter().find(|m| m.key() == key)
    }

    pub fn contains(&self, mark: &Mark) -> bool {
        self.marks.iter().any(|m| m == mark)
    }

    /// Whether any mark with this name is present, regardless of owner.
    pub fn has_mark_name(&self, name: &str) -> bool {
        self.marks.iter().any(|m| m.name() == name)
    }

    /// Marks in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Mark> {
        self.marks.iter()
    }

    /// Marks ordered outermost first: descending priority, ties in
    /// insertion order.
    pub fn by_priority(&self) -> Vec<&Mark> {
        let mut sorted: Vec<&Mark> = self.marks.iter().collect();
        sorted.sort_by(|a, b| b.priority().cmp(&a.priority()));
        sorted
    }
}

impl PartialEq for MarkSet {
    fn eq(&self, other: &Self) -> bool {
        self.marks.len() == other.marks.len() && self.marks.iter().all(|m| other.contains(m))
    }
}

impl Eq for MarkSet {}

impl FromIterator<Mark> for MarkSet {
    fn from_iter<T: IntoIterator<Item = Mark>>(iter: T) -> Self {
        let mut set = MarkSet::new();
        for mark in iter {
            set.add(mark);
        }
        set
    }
}

/// Known mark specs by name.
///
/// Readers use the registry to resolve mark names found in external trees,
/// and selection derivation reports one tri-state flag per registered mark.
#[derive(Debug, Clone)]
pub struct MarkRegistry {
    specs: HashMap<String, MarkSpec>,
}

impl Default for MarkRegistry {
    fn default() -> Self {
        let mut registry = Self {
            specs: HashMap::new(),
        };
        for kind in [
            MarkKind::Bold,
            MarkKind::Italic,
            MarkKind::Underline,
            MarkKind::Strikethrough,
            MarkKind::Highlighted,
            MarkKind::InlineRdfa,
        ] {
            registry.register(MarkSpec::new(kind));
        }
        registry
    }
}

impl MarkRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a spec, replacing any spec with the same name.
    pub fn register(&mut self, spec: MarkSpec) {
        self.specs.insert(spec.name().to_string(), spec);
    }

    pub fn get(&self, name: &str) -> Option<&MarkSpec> {
        self.specs.get(name)
    }

    /// Spec for `name`, falling back to the kind's default priority for
    /// unregistered names.
    pub fn resolve(&self, name: &str) -> MarkSpec {
        self.get(name)
            .cloned()
            .unwrap_or_else(|| MarkSpec::new(MarkKind::from_name(name)))
    }

    /// Registered mark names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.specs.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn add_replaces_mark_with_same_key() {
        let mut set = MarkSet::new();
        set.add(Mark::core(MarkSpec::bold()));
        set.add(Mark::new(
            MarkSpec::bold(),
            MarkAttributes::default().with("weight", "900"),
        ));

        assert_eq!(set.len(), 1);
        let mark = set.get("bold", CORE_OWNER).unwrap();
        assert_eq!(mark.attributes.extra.get("weight").map(String::as_str), Some("900"));
    }

    #[test]
    fn same_name_different_owner_coexist() {
        let mut set = MarkSet::new();
        set.add(Mark::core(MarkSpec::bold()));
        set.add(Mark::new(MarkSpec::bold(), MarkAttributes::owned_by("plugin")));

        assert_eq!(set.len(), 2);
        assert!(set.remove("bold", "plugin").is_some());
        assert!(set.has_mark_name("bold"));
        assert!(set.remove("bold", "plugin").is_none());
    }

    #[test]
    fn equality_ignores_insertion_order() {
        let a: MarkSet = [Mark::core(MarkSpec::bold()), Mark::core(MarkSpec::italic())]
            .into_iter()
            .collect();
        let b: MarkSet = [Mark::core(MarkSpec::italic()), Mark::core(MarkSpec::bold())]
            .into_iter()
            .collect();
        let c: MarkSet = [Mark::core(MarkSpec::italic())].into_iter().collect();

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn by_priority_orders_outermost_first_with_stable_ties() {
        let set: MarkSet = [
            Mark::core(MarkSpec::bold()),
            Mark::core(MarkSpec::with_priority(MarkKind::Custom("a".into()), 200)),
            Mark::core(MarkSpec::strikethrough()),
            Mark::core(MarkSpec::italic()),
            Mark::core(MarkSpec::underline()),
        ]
        .into_iter()
        .collect();

        let names: Vec<&str> = set.by_priority().iter().map(|m| m.name()).collect();
        assert_eq!(names, vec!["strikethrough", "underline", "a", "italic", "bold"]);
    }

    #[test]
    fn registry_resolves_custom_names() {
        let mut registry = MarkRegistry::new();
        registry.register(MarkSpec::with_priority(MarkKind::Custom("comment".into()), 700));

        assert_eq!(registry.resolve("comment").priority, 700);
        assert_eq!(registry.resolve("bold"), MarkSpec::bold());
        assert_eq!(registry.resolve("unknown").priority, 50);
        assert!(registry.names().contains(&"comment"));
    }
}
