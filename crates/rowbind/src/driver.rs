//! Driver contract: connect, prepare, execute.
//!
//! The mapping core never talks to a database directly. It prepares SQL with
//! `?` placeholders on a [`Connection`] and executes the resulting
//! [`Statement`] with positional [`Value`] binds. Drivers translate
//! placeholders and values to their wire format.

use crate::error::OrmResult;
use crate::value::Value;
use std::future::Future;
use std::sync::Arc;

/// Opens connections.
pub trait Driver: Send + Sync {
    type Connection: Connection;

    /// Driver name used in diagnostics (e.g. `"postgres"`).
    fn name(&self) -> &str;

    /// Open a new connection. Fails with [`OrmError::Connection`](crate::OrmError::Connection).
    fn connect(&self) -> impl Future<Output = OrmResult<Self::Connection>> + Send;
}

/// An open database handle.
pub trait Connection: Send + Sync {
    type Statement: Statement;

    /// Prepare `sql`. Fails with [`OrmError::Prepare`](crate::OrmError::Prepare).
    fn prepare(&self, sql: &str) -> impl Future<Output = OrmResult<Self::Statement>> + Send;
}

/// A prepared statement.
pub trait Statement: Send {
    /// The SQL text as handed to [`Connection::prepare`].
    fn sql(&self) -> &str;

    /// Execute with positional binds. Fails with [`OrmError::Execute`](crate::OrmError::Execute).
    fn execute(&mut self, binds: &[Value]) -> impl Future<Output = OrmResult<ResultSet>> + Send;
}

/// One result row: column name -> value.
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<Value>,
}

impl Row {
    /// Build a row. `values` line up with `columns` by position; a column
    /// without a value reads as absent.
    pub fn new(columns: Arc<[String]>, values: Vec<Value>) -> Self {
        Self { columns, values }
    }

    /// Build a standalone row from `(column, value)` pairs.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        let (columns, values): (Vec<String>, Vec<Value>) = pairs
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .unzip();
        Self::new(columns.into(), values)
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn contains(&self, column: &str) -> bool {
        self.get(column).is_some()
    }

    /// Value of `column`, if the row has it.
    pub fn get(&self, column: &str) -> Option<&Value> {
        self.position(column).and_then(|i| self.values.get(i))
    }

    /// Value at column index `idx`.
    pub fn get_index(&self, idx: usize) -> Option<&Value> {
        self.values.get(idx)
    }

    /// Take the value of `column`, leaving `Null` behind.
    pub fn take(&mut self, column: &str) -> Option<Value> {
        let i = self.position(column)?;
        self.values.get_mut(i).map(std::mem::take)
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    fn position(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }
}

/// Rows returned by [`Statement::execute`], in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResultSet {
    columns: Arc<[String]>,
    rows: Vec<Row>,
}

impl ResultSet {
    /// An empty result (what INSERT/UPDATE return).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a result set from column names and row values.
    pub fn new(columns: Vec<String>, rows: Vec<Vec<Value>>) -> Self {
        let columns: Arc<[String]> = columns.into();
        let rows = rows
            .into_iter()
            .map(|values| Row::new(Arc::clone(&columns), values))
            .collect();
        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Row at `idx`.
    pub fn get(&self, idx: usize) -> Option<&Row> {
        self.rows.get(idx)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Row> {
        self.rows.iter()
    }

    /// First column of the first row.
    pub fn first_value(&self) -> Option<&Value> {
        self.rows.first().and_then(|r| r.get_index(0))
    }
}

impl IntoIterator for ResultSet {
    type Item = Row;
    type IntoIter = std::vec::IntoIter<Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a> IntoIterator for &'a ResultSet {
    type Item = &'a Row;
    type IntoIter = std::slice::Iter<'a, Row>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
