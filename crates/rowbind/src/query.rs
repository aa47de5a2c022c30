//! SELECT over a model's table.

use crate::condition::{ConditionBuilder, Group, Terms};
use crate::driver::Driver;
use crate::error::OrmResult;
use crate::instance::Instance;
use crate::model::Model;
use crate::record::Record;
use crate::sql;
use crate::value::Value;

/// A SELECT being assembled against a [`Model`].
///
/// Predicate methods delegate to [`ConditionBuilder`]; `row()` and `rows()`
/// consume the query.
///
/// ```ignore
/// let adults = users
///     .select()
///     .gte([("age", 18)])
///     .or()
///     .with([("role", "admin")])
///     .rows()
///     .await?;
/// ```
#[must_use = "a Select does nothing until row() or rows() is awaited"]
pub struct Select<'m, D: Driver, R: Record> {
    model: &'m Model<D, R>,
    conditions: ConditionBuilder,
}

macro_rules! delegate_predicates {
    ($($(#[$doc:meta])* $name:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name(mut self, terms: impl Into<Terms>) -> Self {
                self.conditions = self.conditions.$name(terms);
                self
            }
        )*
    };
}

impl<'m, D: Driver, R: Record> Select<'m, D, R> {
    pub(crate) fn new(model: &'m Model<D, R>, conditions: ConditionBuilder) -> Self {
        Self { model, conditions }
    }

    delegate_predicates!(
        /// `column = ?` group.
        with,
        /// `column != ?` group.
        not,
        /// `column > ?` group.
        gt,
        /// `column < ?` group.
        lt,
        /// `column >= ?` group.
        gte,
        /// `column <= ?` group.
        lte,
        /// `column LIKE ?` group.
        like,
    );

    /// Join the next group with AND.
    pub fn and(mut self) -> Self {
        self.conditions = self.conditions.and();
        self
    }

    /// Join the next group with OR.
    pub fn or(mut self) -> Self {
        self.conditions = self.conditions.or();
        self
    }

    /// Append a group of explicit `(column, op, value)` conditions.
    pub fn filter(mut self, group: Group) -> Self {
        self.conditions = self.conditions.filter(group);
        self
    }

    /// The SQL `rows()` would run.
    pub fn to_sql(&self) -> String {
        sql::select(self.model.table(), self.conditions.clause(), None)
    }

    /// Bound values in placeholder order.
    pub fn binds(&self) -> &[Value] {
        self.conditions.binds()
    }

    /// Fetch the first matching row, or `None` when nothing matches.
    pub async fn row(self) -> OrmResult<Option<Instance<R>>> {
        let model = self.model;
        let (clause, binds) = self.conditions.into_parts()?;
        let sql = sql::select(model.table(), &clause, Some(1));
        let rows = model.execute(&sql, &binds).await?;
        rows.get(0).map(|row| model.hydrate(row)).transpose()
    }

    /// Fetch every matching row, in result order.
    pub async fn rows(self) -> OrmResult<Vec<Instance<R>>> {
        let model = self.model;
        let (clause, binds) = self.conditions.into_parts()?;
        let sql = sql::select(model.table(), &clause, None);
        let rows = model.execute(&sql, &binds).await?;
        rows.iter().map(|row| model.hydrate(row)).collect()
    }
}
