//! Data-grid column registry that column hooks contribute to.

use std::fmt;
use std::sync::RwLock;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use hookhub_core::error::AppError;
use hookhub_core::result::AppResult;

use crate::ids::HookId;

/// A column definition. `id` must be unique within a grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Column {
    /// Unique column identifier.
    pub id: String,
    /// Header label.
    pub label: String,
    /// Whether the column can be sorted on.
    #[serde(default)]
    pub sortable: bool,
    /// Whether the column shrinks to fit its content.
    #[serde(default)]
    pub shrink: bool,
}

impl Column {
    /// Creates a non-sortable column.
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            sortable: false,
            shrink: false,
        }
    }

    /// Marks the column as sortable.
    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }
}

/// Column collaborator for a tabular view type.
pub trait ColumnRegistry: Send + Sync + fmt::Debug {
    /// Returns the name of the grid type.
    fn grid_name(&self) -> &str;

    /// Adds a column on behalf of `owner`. A column whose id is already
    /// registered is a configuration error.
    fn add_column(&self, column: Column, owner: Option<HookId>) -> AppResult<()>;

    /// Removes a column by id. With an `owner`, only a column added by that
    /// owner is removed. Returns `false` if nothing was removed.
    fn remove_column(&self, column_id: &str, owner: Option<HookId>) -> bool;
}

/// In-memory column registry for one grid type.
#[derive(Debug)]
pub struct DataGrid {
    name: String,
    columns: RwLock<IndexMap<String, (Column, Option<HookId>)>>,
}

impl DataGrid {
    /// Creates a grid type with its built-in columns.
    pub fn new(name: impl Into<String>, builtin: Vec<Column>) -> Self {
        let columns = builtin
            .into_iter()
            .map(|c| (c.id.clone(), (c, None)))
            .collect();
        Self {
            name: name.into(),
            columns: RwLock::new(columns),
        }
    }

    /// Returns the columns in registration order.
    pub fn columns(&self) -> Vec<Column> {
        self.columns
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .values()
            .map(|(column, _)| column.clone())
            .collect()
    }

    /// Returns the column with this id.
    pub fn column(&self, column_id: &str) -> Option<Column> {
        self.columns
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(column_id)
            .map(|(column, _)| column.clone())
    }

    /// Returns the hook that added the column, if any.
    pub fn owner(&self, column_id: &str) -> Option<HookId> {
        self.columns
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(column_id)
            .and_then(|(_, owner)| *owner)
    }
}

impl ColumnRegistry for DataGrid {
    fn grid_name(&self) -> &str {
        &self.name
    }

    fn add_column(&self, column: Column, owner: Option<HookId>) -> AppResult<()> {
        let mut columns = self.columns.write().unwrap_or_else(|e| e.into_inner());

        if columns.contains_key(&column.id) {
            return Err(AppError::configuration(format!(
                "Column '{}' is already registered on grid '{}'",
                column.id, self.name
            )));
        }

        debug!(grid = %self.name, column = %column.id, "Column added");
        columns.insert(column.id.clone(), (column, owner));
        Ok(())
    }

    fn remove_column(&self, column_id: &str, owner: Option<HookId>) -> bool {
        let mut columns = self.columns.write().unwrap_or_else(|e| e.into_inner());
        let owned = match (columns.get(column_id), owner) {
            (None, _) => false,
            (Some(_), None) => true,
            (Some((_, current)), Some(owner)) => *current == Some(owner),
        };
        let removed = owned && columns.shift_remove(column_id).is_some();
        debug!(grid = %self.name, column = %column_id, removed = removed, "Column removed");
        removed
    }
}
