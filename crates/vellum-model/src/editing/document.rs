use log::{debug, warn};

use crate::editing::collaborators::{NodeBindings, Reader};
use crate::editing::mapper::RangeMapper;
use crate::editing::operations::{Operation, OperationResult};
use crate::editing::selection::Selection;
use crate::editing::step::{Step, StepEvent, StepKind, StepResult};
use crate::error::{ModelError, Result};
use crate::model::{
    ElementKind, Fragment, MarkRegistry, NodeData, NodeId, Position, Range, Tree,
};

/// Handle returned by [`Document::on_step_applied`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(&StepEvent)>;

/// A document: the tree, its selection and everyone listening for changes.
///
/// ## Transactions
///
/// All edits go through [`Document::transact`] (or its one-step shorthand
/// [`Document::apply_step`]). A transaction works on a private copy of the
/// tree and selection:
///
/// 1. Each operation runs against the working copy and records a [`Step`]
/// 2. The working selection is carried across every step by its mapper
/// 3. If the closure returns `Err`, the copy is dropped and the document is
///    exactly as it was
/// 4. On `Ok`, the copy replaces the live tree, selection properties are
///    recomputed and listeners hear about every step in order
///
/// ## Listeners
///
/// Listeners are owned by the document. There is no process-wide bus; a
/// listener only ever hears about the document it was registered on.
///
/// ```rust
/// # use vellum_model::{Document, Fragment, Operation, Range, MarkSpec, MarkAttributes};
/// let mut doc = Document::from_fragment(&Fragment::root([Fragment::text("hello")])).unwrap();
/// let range = Range::from_paths(doc.tree(), vec![0], vec![5]).unwrap();
/// let result = doc
///     .apply_step(Operation::add_mark(range, MarkSpec::bold(), MarkAttributes::default()), "core")
///     .unwrap();
/// assert_eq!(result.version, 1);
/// ```
pub struct Document {
    tree: Tree,
    selection: Selection,
    registry: MarkRegistry,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
    version: u64,
}

impl std::fmt::Debug for Document {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Document")
            .field("tree", &self.tree)
            .field("selection", &self.selection)
            .field("listeners", &self.listeners.len())
            .field("version", &self.version)
            .finish()
    }
}

impl Document {
    pub fn new(tree: Tree) -> Self {
        Self::with_registry(tree, MarkRegistry::default())
    }

    pub fn with_registry(tree: Tree, registry: MarkRegistry) -> Self {
        let start = Position::unchecked(tree.root(), vec![0]);
        let mut selection = Selection::new(Range::collapsed(start));
        if let Err(err) = selection.refresh(&tree, &registry) {
            warn!("initial selection properties unavailable: {err}");
        }
        Self {
            tree,
            selection,
            registry,
            listeners: Vec::new(),
            next_listener: 0,
            version: 0,
        }
    }

    pub fn from_fragment(fragment: &Fragment) -> Result<Self> {
        Ok(Self::new(Tree::from_fragment(fragment)?))
    }

    /// Read a document from a view, returning the reader's bindings too.
    pub fn load<V, R: Reader<V>>(reader: &R, view: &V) -> std::result::Result<(Self, NodeBindings<R::Handle>), R::Error> {
        let parsed = reader.parse(view)?;
        Ok((Self::new(parsed.tree), parsed.bindings))
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn registry(&self) -> &MarkRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut MarkRegistry {
        &mut self.registry
    }

    pub fn current_selection(&self) -> &Selection {
        &self.selection
    }

    pub fn position(&self, path: Vec<usize>) -> Result<Position> {
        Position::from_path(&self.tree, self.tree.root(), path)
    }

    pub fn position_in_text(&self, text: NodeId, offset: usize) -> Result<Position> {
        Position::from_in_text_node(&self.tree, text, offset)
    }

    /// Nodes matching `predicate`, root first, in document order. Nothing
    /// is visited until the iterator is pulled.
    pub fn query<'a, P>(&'a self, predicate: P) -> impl Iterator<Item = NodeId> + 'a
    where
        P: Fn(&NodeData) -> bool + 'a,
    {
        let tree = &self.tree;
        std::iter::once(tree.root())
            .chain(tree.descendants(tree.root()))
            .filter(move |node| tree.get(*node).is_ok_and(&predicate))
    }

    pub fn on_step_applied(&mut self, listener: impl FnMut(&StepEvent) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Returns whether a listener was registered under `id`.
    pub fn remove_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(listener, _)| *listener != id);
        self.listeners.len() != before
    }

    /// Run one operation as its own transaction.
    pub fn apply_step(&mut self, operation: Operation, actor: &str) -> Result<StepResult> {
        let ((), mut steps) = self.run(actor, |tx| tx.apply(operation).map(|_| ()))?;
        let step = steps
            .pop()
            .ok_or_else(|| ModelError::stale("transaction recorded no step"))?;
        Ok(StepResult {
            step,
            version: self.version,
        })
    }

    pub fn transact<T>(&mut self, actor: &str, f: impl FnOnce(&mut Transaction<'_>) -> Result<T>) -> Result<T> {
        self.run(actor, f).map(|(value, _)| value)
    }

    fn run<T>(
        &mut self,
        actor: &str,
        f: impl FnOnce(&mut Transaction<'_>) -> Result<T>,
    ) -> Result<(T, Vec<Step>)> {
        let mut tx = Transaction {
            tree: self.tree.clone(),
            selection: self.selection.clone(),
            registry: &self.registry,
            actor: actor.to_string(),
            steps: Vec::new(),
            mapper: RangeMapper::new(),
        };
        let value = match f(&mut tx) {
            Ok(value) => value,
            Err(err) => {
                debug!("transaction by {actor} rolled back: {err}");
                return Err(err);
            }
        };
        let Transaction {
            tree,
            mut selection,
            steps,
            ..
        } = tx;

        if let Err(err) = selection.refresh(&tree, &self.registry) {
            warn!("selection did not survive the transaction ({err}), resetting it");
            selection = Selection::new(Range::collapsed(Position::unchecked(tree.root(), vec![0])));
            selection.refresh(&tree, &self.registry)?;
        }
        self.tree = tree;
        self.selection = selection;

        for step in &steps {
            self.version += 1;
            let event = StepEvent {
                step: step.clone(),
                content_changed: step.kind.modifies_content(),
                selection_changed: step.kind.modifies_selection(),
                version: self.version,
            };
            for (_, listener) in &mut self.listeners {
                listener(&event);
            }
        }
        debug!(
            "committed {} step(s) by {actor}, now at version {}",
            steps.len(),
            self.version
        );
        Ok((value, steps))
    }
}

/// The working state of an open transaction.
pub struct Transaction<'d> {
    tree: Tree,
    selection: Selection,
    registry: &'d MarkRegistry,
    actor: String,
    steps: Vec<Step>,
    mapper: RangeMapper,
}

impl Transaction<'_> {
    /// The working tree, including every step applied so far.
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn registry(&self) -> &MarkRegistry {
        self.registry
    }

    /// Everything applied so far as one mapper.
    pub fn mapper(&self) -> &RangeMapper {
        &self.mapper
    }

    /// Carry a position from before the transaction to the working tree.
    pub fn map_position(&self, position: &Position) -> Position {
        self.mapper.map_position(position)
    }

    pub fn map_range(&self, range: &Range) -> Range {
        self.mapper.map_range(range)
    }

    pub fn apply(&mut self, operation: Operation) -> Result<OperationResult> {
        let result = operation.execute(&mut self.tree)?;
        let kind = operation.kind();
        let mut step = Step::new(operation.name(), kind, &self.actor);
        step.mapper = result.mapper.clone();
        step.default_range = Some(result.default_range.clone());
        step.removed = result.removed.clone();

        if kind.modifies_selection() {
            self.selection.map(&result.mapper);
        }
        self.mapper.append(result.mapper.clone());
        debug!("{} applied by {}", step.name, step.actor);
        self.steps.push(step);
        Ok(result)
    }

    /// Replace the selection.
    pub fn select(&mut self, range: Range) -> Result<()> {
        range.resolve(&self.tree)?;
        let mut step = Step::new("selection-step", StepKind::Selection, &self.actor);
        step.default_range = Some(range.clone());
        self.selection.ranges = vec![range];
        self.steps.push(step);
        Ok(())
    }

    /// Record an opaque step on behalf of a plugin.
    pub fn plugin(&mut self, name: &str, payload: impl Into<String>) {
        let mut step = Step::new("plugin-step", StepKind::Plugin, &self.actor);
        step.payload = Some(format!("{name}: {}", payload.into()));
        self.steps.push(step);
    }

    /// Insert an empty row at `index`, shaped like its neighbour.
    pub fn insert_row(&mut self, table: NodeId, index: usize) -> Result<OperationResult> {
        let rows = self.tree.table_rows(table)?;
        if index > rows.len() {
            return Err(ModelError::out_of_range(index, rows.len()));
        }
        let width = self.tree.dimensions(table)?.x.max(1);
        let cells: Vec<Fragment> = match rows.get(index).or(rows.last()) {
            Some(&template) => {
                let template_cells = self.tree.row_cells(template);
                (0..width)
                    .map(|x| {
                        let kind = template_cells
                            .get(x)
                            .and_then(|cell| self.tree.element(*cell).ok())
                            .map(|cell| cell.kind.clone())
                            .unwrap_or(ElementKind::TableCell);
                        Fragment::element(kind, [])
                    })
                    .collect()
            }
            None => (0..width)
                .map(|_| Fragment::element(ElementKind::TableCell, []))
                .collect(),
        };
        let position = match rows.get(index) {
            Some(&row) => Position::from_before_node(&self.tree, row)?,
            None => match rows.last() {
                Some(&row) => Position::from_after_node(&self.tree, row)?,
                None => Position::from_in_element(&self.tree, table, self.tree.size(table))?,
            },
        };
        self.apply(Operation::InsertNodes {
            position,
            nodes: vec![Fragment::element(ElementKind::TableRow, cells)],
        })
    }

    /// Insert an empty cell at column `index` of every row.
    pub fn insert_column(&mut self, table: NodeId, index: usize) -> Result<()> {
        let dimensions = self.tree.dimensions(table)?;
        if index > dimensions.x {
            return Err(ModelError::out_of_range(index, dimensions.x));
        }
        for row in self.tree.table_rows(table)? {
            let cells = self.tree.row_cells(row);
            let neighbour = cells.get(index).or(cells.last()).copied();
            let kind = neighbour
                .and_then(|cell| self.tree.element(cell).ok())
                .map(|cell| cell.kind.clone())
                .unwrap_or(ElementKind::TableCell);
            let position = match (cells.get(index), cells.last()) {
                (Some(&cell), _) => Position::from_before_node(&self.tree, cell)?,
                (None, Some(&cell)) => Position::from_after_node(&self.tree, cell)?,
                (None, None) => Position::from_in_element(&self.tree, row, self.tree.size(row))?,
            };
            self.apply(Operation::InsertNodes {
                position,
                nodes: vec![Fragment::element(kind, [])],
            })?;
        }
        Ok(())
    }

    pub fn remove_row(&mut self, table: NodeId, index: usize) -> Result<OperationResult> {
        let rows = self.tree.table_rows(table)?;
        let row = *rows
            .get(index)
            .ok_or(ModelError::out_of_range(index, rows.len()))?;
        let range = Range::around_node(&self.tree, row)?;
        self.apply(Operation::Remove { range })
    }

    pub fn remove_column(&mut self, table: NodeId, index: usize) -> Result<()> {
        let dimensions = self.tree.dimensions(table)?;
        if index >= dimensions.x {
            return Err(ModelError::out_of_range(index, dimensions.x));
        }
        for row in self.tree.table_rows(table)? {
            if let Some(&cell) = self.tree.row_cells(row).get(index) {
                let range = Range::around_node(&self.tree, cell)?;
                self.apply(Operation::Remove { range })?;
            }
        }
        Ok(())
    }

    pub fn remove_table(&mut self, table: NodeId) -> Result<OperationResult> {
        self.tree.table_rows(table)?;
        let range = Range::around_node(&self.tree, table)?;
        self.apply(Operation::Remove { range })
    }
}
