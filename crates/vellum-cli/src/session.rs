//! An open document plus the markup front end it was read through.

use std::collections::BTreeMap;

use anyhow::{Context, Result, anyhow};
use log::{debug, info};
use vellum_config::Config;
use vellum_markup::{HtmlReader, HtmlWriter, MarkTags, TextOffsetAdapter, TextSelection};
use vellum_model::{
    Document, ElementKind, MarkAttributes, Operation, Position, PropertyState, Range, SelectionAdapter,
};

use crate::script::Command;

pub struct Session {
    document: Document,
    writer: HtmlWriter,
    owner: String,
}

impl Session {
    pub fn open(markup: &str, config: &Config) -> Result<Self> {
        let registry = config.registry();
        let tags = config
            .mark_tags()
            .fold(MarkTags::new(registry.clone()), |tags, (name, tag)| tags.with_tag(name, tag));

        let parsed = HtmlReader::new(tags.clone())
            .read_str(markup)
            .context("failed to read document")?;
        let mut document = Document::with_registry(parsed.tree, registry);
        document.on_step_applied(|event| {
            debug!(
                "{} by {} (version {}, content changed: {})",
                event.step.name, event.step.actor, event.version, event.content_changed
            );
        });
        info!("opened document with {} nodes", document.tree().node_count());

        Ok(Self {
            document,
            writer: HtmlWriter::new(tags),
            owner: config.default_owner.clone(),
        })
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Run one command, returning a report for `print`.
    pub fn run(&mut self, command: &Command) -> Result<Option<String>> {
        match command {
            Command::Select { anchor, focus } => {
                let native = TextSelection {
                    anchor: *anchor,
                    focus: *focus,
                };
                let range = TextOffsetAdapter.read(self.document.tree(), &native)?;
                self.select(range)?;
            }
            Command::SelectPath { start, end } => {
                let range = Range::from_paths(self.document.tree(), start.clone(), end.clone())?;
                self.select(range)?;
            }
            Command::Mark { name } => {
                let spec = self.document.registry().resolve(name);
                let range = self.selected()?;
                self.edit(Operation::add_mark(range, spec, MarkAttributes::owned_by(&self.owner)))?;
            }
            Command::Unmark { name } => {
                let spec = self.document.registry().resolve(name);
                let range = self.selected()?;
                self.edit(Operation::remove_mark(range, spec, MarkAttributes::owned_by(&self.owner)))?;
            }
            Command::Type { text } => {
                let range = self.selected()?;
                self.edit(Operation::InsertText {
                    range,
                    text: text.clone(),
                })?;
            }
            Command::Delete => {
                let range = self.selected()?;
                self.edit(Operation::Remove { range })?;
            }
            Command::Split { depth } => {
                let position = self.selected()?.start;
                self.edit(Operation::Split {
                    position,
                    depth: *depth,
                })?;
            }
            Command::Merge { path } => {
                let tree = self.document.tree();
                let position = Position::from_path(tree, tree.root(), path.clone())?;
                self.edit(Operation::Merge { position })?;
            }
            Command::Move { target } => {
                let range = self.selected()?;
                let tree = self.document.tree();
                let target = Position::from_path(tree, tree.root(), target.clone())?;
                self.edit(Operation::Move { range, target })?;
            }
            Command::Wrap { tag } => {
                let range = self.selected()?;
                self.edit(Operation::Wrap {
                    range,
                    kind: ElementKind::from_tag(tag),
                    attributes: BTreeMap::new(),
                })?;
            }
            Command::Set { key, value } => {
                let node = self.selected()?.start.parent(self.document.tree())?;
                self.edit(Operation::SetAttribute {
                    node,
                    key: key.clone(),
                    value: value.clone(),
                })?;
            }
            Command::Print => return self.report().map(Some),
        }
        Ok(None)
    }

    fn selected(&self) -> Result<Range> {
        self.document
            .current_selection()
            .last_range()
            .cloned()
            .ok_or_else(|| anyhow!("nothing is selected"))
    }

    fn select(&mut self, range: Range) -> Result<()> {
        self.document.transact(&self.owner, |tx| tx.select(range))?;
        Ok(())
    }

    /// Apply an operation and move the selection to where it left off.
    /// Attribute changes keep the selection where it was.
    fn edit(&mut self, operation: Operation) -> Result<()> {
        let reselect = !matches!(operation, Operation::SetAttribute { .. });
        self.document.transact(&self.owner, |tx| {
            let result = tx.apply(operation)?;
            if reselect {
                tx.select(result.default_range)?;
            }
            Ok(())
        })?;
        Ok(())
    }

    pub fn markup(&self) -> String {
        self.writer.write_str(self.document.tree())
    }

    /// The markup followed by the selection and what holds across it.
    pub fn report(&self) -> Result<String> {
        let tree = self.document.tree();
        let selection = self.document.current_selection();
        let range = selection
            .last_range()
            .ok_or_else(|| anyhow!("nothing is selected"))?;
        let offsets = TextOffsetAdapter.write(tree, range)?;

        let properties = &selection.properties;
        let marks: Vec<String> = properties
            .marks
            .iter()
            .filter_map(|(name, state)| match state {
                PropertyState::Enabled => Some(name.clone()),
                PropertyState::Unknown => Some(format!("{name}?")),
                PropertyState::Disabled => None,
            })
            .collect();

        Ok(format!(
            "{}\nselection: {}..{} ({:?}..{:?})\nmarks: {}\nlist: {:?}, table: {:?}",
            self.markup(),
            offsets.anchor,
            offsets.focus,
            range.start.path(),
            range.end.path(),
            if marks.is_empty() { "-".to_string() } else { marks.join(" ") },
            properties.in_list,
            properties.in_table,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::script::parse_script;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use vellum_config::MarkConfig;

    fn run(markup: &str, script: &str, config: &Config) -> Session {
        let mut session = Session::open(markup, config).unwrap();
        for (_, command) in parse_script(script).unwrap() {
            session.run(&command).unwrap();
        }
        session
    }

    #[rstest]
    #[case("select 0 5\nmark bold", "<div><p><strong>Hello</strong> world</p></div>")]
    #[case("select 6 11\ntype there", "<div><p>Hello there</p></div>")]
    #[case("select 5 11\ndelete", "<div><p>Hello</p></div>")]
    #[case("select 5\nsplit", "<div><p>Hello</p><p> world</p></div>")]
    #[case("select 5\nsplit\nmerge 1", "<div><p>Hello world</p></div>")]
    #[case("select 0 6\nmove 0.0.11", "<div><p>worldHello </p></div>")]
    #[case("select 0 5\nwrap span", "<div><p><span>Hello</span> world</p></div>")]
    #[case("select 2\nset class intro", r#"<div><p class="intro">Hello world</p></div>"#)]
    fn commands_edit_the_document(#[case] script: &str, #[case] expected: &str) {
        let session = run("<div><p>Hello world</p></div>", script, &Config::default());
        assert_eq!(session.markup(), expected);
    }

    #[test]
    fn typing_continues_after_the_inserted_text() {
        let session = run(
            "<div><p>ab</p></div>",
            "select 1\ntype X\ntype Y",
            &Config::default(),
        );
        assert_eq!(session.markup(), "<div><p>aXYb</p></div>");
    }

    #[test]
    fn report_shows_selection_and_properties() {
        let mut session = run(
            "<div><p>ab<b>cd</b></p><ul><li>ef</li></ul></div>",
            "select 1 3",
            &Config::default(),
        );
        let report = session.run(&Command::Print).unwrap().unwrap();

        insta::assert_snapshot!(report, @r"
        <div><p>ab<strong>cd</strong></p><ul><li>ef</li></ul></div>
        selection: 1..3 ([0, 1]..[0, 3])
        marks: bold?
        list: Disabled, table: Disabled
        ");
    }

    #[test]
    fn configured_marks_use_their_tag_and_owner() {
        let config = Config {
            default_owner: "review".to_string(),
            marks: vec![MarkConfig {
                name: "comment".to_string(),
                priority: None,
                tag: Some("mark".to_string()),
            }],
            ..Config::default()
        };
        let session = run("<div><p>Hello world</p></div>", "select 6 11\nmark comment", &config);

        assert_eq!(
            session.markup(),
            r#"<div><p>Hello <mark data-set-by="review">world</mark></p></div>"#
        );
    }

    #[test]
    fn unmark_removes_only_the_named_mark() {
        let session = run(
            "<div><p><b><i>both</i></b></p></div>",
            "select 0 4\nunmark bold",
            &Config::default(),
        );
        assert_eq!(session.markup(), "<div><p><em>both</em></p></div>");
    }

    #[test]
    fn failed_command_leaves_the_document_alone() {
        let mut session = Session::open("<div><p>Hello</p></div>", &Config::default()).unwrap();
        let before = session.document().version();

        assert!(session.run(&Command::Select { anchor: 0, focus: 40 }).is_err());
        assert!(session.run(&Command::Merge { path: vec![0] }).is_err());

        assert_eq!(session.document().version(), before);
        assert_eq!(session.markup(), "<div><p>Hello</p></div>");
    }

    #[test]
    fn open_rejects_bad_markup() {
        let error = Session::open("<div><p>oops</div>", &Config::default())
            .err()
            .unwrap();
        assert!(format!("{error:#}").starts_with("failed to read document"));
    }
}
