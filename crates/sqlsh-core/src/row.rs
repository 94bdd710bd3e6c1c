//! Result set rows and column metadata.

use crate::value::Value;
use std::sync::Arc;

/// One result column: its name and the type it was declared with, if the
/// database reports one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub decl_type: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            decl_type: None,
        }
    }

    /// Attach a declared type.
    pub fn decl_type(mut self, decl_type: impl Into<String>) -> Self {
        self.decl_type = Some(decl_type.into());
        self
    }
}

/// Column metadata shared across all rows in a result set.
///
/// Names may repeat (`SELECT a, a FROM t`); each keeps its own position.
#[derive(Debug, Clone, Default)]
pub struct ColumnInfo {
    columns: Vec<Column>,
}

impl ColumnInfo {
    /// Create column info from column descriptions, in result order.
    pub fn new(columns: Vec<Column>) -> Self {
        Self { columns }
    }

    /// Create column info from bare names (no declared types).
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(names.into_iter().map(Column::new).collect())
    }

    /// Get the number of columns.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if there are no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Get the declared type of a column by index.
    pub fn decl_type_at(&self, index: usize) -> Option<&str> {
        self.columns.get(index).and_then(|c| c.decl_type.as_deref())
    }

    /// Column names in result order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

/// A single row returned from a database query.
#[derive(Debug, Clone)]
pub struct Row {
    values: Vec<Value>,
    columns: Arc<ColumnInfo>,
}

impl Row {
    /// Create a row with shared column metadata.
    pub fn with_columns(columns: Arc<ColumnInfo>, values: Vec<Value>) -> Self {
        Self { values, columns }
    }

    /// Get the shared column metadata.
    pub fn column_info(&self) -> Arc<ColumnInfo> {
        Arc::clone(&self.columns)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Get a value by column index.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }
}
