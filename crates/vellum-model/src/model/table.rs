//! Row/column addressing for table elements.
//!
//! A table's rows are its `TableRow` children, either directly or through a
//! single `TableBody` level. Dimensions are read off the structure every time
//! they are asked for, so they can never disagree with the tree.

use crate::error::{ModelError, Result};
use crate::model::node::{ElementKind, NodeId};
use crate::model::tree::Tree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    /// Widest row, in cells.
    pub x: usize,
    /// Number of rows.
    pub y: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellIndex {
    pub x: usize,
    pub y: usize,
}

impl Tree {
    fn kind_of(&self, node: NodeId) -> Option<&ElementKind> {
        self.element(node).ok().map(|element| &element.kind)
    }

    fn expect_table(&self, table: NodeId) -> Result<()> {
        match self.kind_of(table) {
            Some(ElementKind::Table) => Ok(()),
            _ if !self.contains(table) => Err(ModelError::stale(format!("table {table:?}"))),
            _ => Err(ModelError::NotInTable),
        }
    }

    /// Rows of a table in document order.
    pub fn table_rows(&self, table: NodeId) -> Result<Vec<NodeId>> {
        self.expect_table(table)?;
        let mut rows = Vec::new();
        for &child in self.children(table) {
            match self.kind_of(child) {
                Some(ElementKind::TableRow) => rows.push(child),
                Some(ElementKind::TableBody) => rows.extend(
                    self.children(child)
                        .iter()
                        .copied()
                        .filter(|row| self.kind_of(*row) == Some(&ElementKind::TableRow)),
                ),
                _ => {}
            }
        }
        Ok(rows)
    }

    /// Cells of a row, headers included.
    pub fn row_cells(&self, row: NodeId) -> Vec<NodeId> {
        self.children(row)
            .iter()
            .copied()
            .filter(|cell| self.kind_of(*cell).is_some_and(ElementKind::is_table_cell))
            .collect()
    }

    pub fn cell(&self, table: NodeId, x: usize, y: usize) -> Result<NodeId> {
        let rows = self.table_rows(table)?;
        let row = *rows.get(y).ok_or(ModelError::out_of_range(y, rows.len()))?;
        let cells = self.row_cells(row);
        cells
            .get(x)
            .copied()
            .ok_or(ModelError::out_of_range(x, cells.len()))
    }

    pub fn dimensions(&self, table: NodeId) -> Result<Dimensions> {
        let rows = self.table_rows(table)?;
        let x = rows
            .iter()
            .map(|row| self.row_cells(*row).len())
            .max()
            .unwrap_or(0);
        Ok(Dimensions { x, y: rows.len() })
    }

    /// Nearest table containing `node`, the node itself included.
    pub fn enclosing_table(&self, node: NodeId) -> Result<NodeId> {
        self.get(node)?;
        std::iter::once(node)
            .chain(self.ancestors(node))
            .find(|n| self.kind_of(*n) == Some(&ElementKind::Table))
            .ok_or(ModelError::NotInTable)
    }

    /// Grid coordinates of the cell containing `node`.
    pub fn cell_index(&self, node: NodeId) -> Result<CellIndex> {
        self.get(node)?;
        let cell = std::iter::once(node)
            .chain(self.ancestors(node))
            .find(|n| self.kind_of(*n).is_some_and(ElementKind::is_table_cell))
            .ok_or(ModelError::NotInTable)?;
        let row = self.parent(cell).ok_or(ModelError::NotInTable)?;
        let table = self.enclosing_table(row)?;
        let y = self
            .table_rows(table)?
            .iter()
            .position(|r| *r == row)
            .ok_or(ModelError::NotInTable)?;
        let x = self
            .row_cells(row)
            .iter()
            .position(|c| *c == cell)
            .ok_or(ModelError::NotInTable)?;
        Ok(CellIndex { x, y })
    }
}
