//! Parameterized WHERE clause assembly.
//!
//! [`ConditionBuilder`] collects predicate groups. Each call (`with`, `not`,
//! `gt`, ...) appends one parenthesized group with one `column OP ?` term per
//! pair; terms inside a group are joined with AND, or with OR when the group
//! is built with [`Terms::any`]. Consecutive groups are joined with AND unless
//! [`ConditionBuilder::or`] (or [`ConditionBuilder::and`]) was called just
//! before.
//!
//! ```ignore
//! use rowbind::{ConditionBuilder, Terms};
//!
//! let cb = ConditionBuilder::new()
//!     .with([("status", "active")])
//!     .or()
//!     .gt(Terms::any([("score", 90), ("bonus", 10)]));
//!
//! assert_eq!(cb.clause(), "WHERE (status = ?) OR (score > ? OR bonus > ?)");
//! ```
//!
//! Bind values are kept in declaration order, one per placeholder.

use crate::error::{OrmError, OrmResult};
use crate::ident::is_valid_ident;
use crate::value::Value;

/// Comparison operator of a single term.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Op {
    /// `=`
    Eq,
    /// `!=`
    Ne,
    /// `>`
    Gt,
    /// `<`
    Lt,
    /// `>=`
    Gte,
    /// `<=`
    Lte,
    /// `LIKE`
    Like,
}

impl Op {
    pub fn as_sql(self) -> &'static str {
        match self {
            Op::Eq => "=",
            Op::Ne => "!=",
            Op::Gt => ">",
            Op::Lt => "<",
            Op::Gte => ">=",
            Op::Lte => "<=",
            Op::Like => "LIKE",
        }
    }
}

/// Logical connective between terms or groups.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Join {
    #[default]
    And,
    Or,
}

impl Join {
    pub fn as_sql(self) -> &'static str {
        match self {
            Join::And => "AND",
            Join::Or => "OR",
        }
    }
}

/// One `column OP ?` term with its bound value.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub column: String,
    pub op: Op,
    pub value: Value,
}

impl Condition {
    pub fn new(column: impl Into<String>, op: Op, value: impl Into<Value>) -> Self {
        Self {
            column: column.into(),
            op,
            value: value.into(),
        }
    }
}

impl<K: Into<String>, V: Into<Value>> From<(K, Op, V)> for Condition {
    fn from((column, op, value): (K, Op, V)) -> Self {
        Condition::new(column, op, value)
    }
}

/// A group of explicit conditions, possibly mixing operators.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    conditions: Vec<Condition>,
    join: Join,
}

impl Group {
    /// Terms joined with AND.
    pub fn all<I, C>(conditions: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Condition>,
    {
        Self {
            conditions: conditions.into_iter().map(Into::into).collect(),
            join: Join::And,
        }
    }

    /// Terms joined with OR.
    pub fn any<I, C>(conditions: I) -> Self
    where
        I: IntoIterator<Item = C>,
        C: Into<Condition>,
    {
        Self {
            join: Join::Or,
            ..Self::all(conditions)
        }
    }

    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }
}

/// `(column, value)` pairs for a single-operator call such as `with` or `gt`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Terms {
    pairs: Vec<(String, Value)>,
    join: Join,
}

impl Terms {
    /// Pairs joined with AND.
    pub fn all<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            pairs: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            join: Join::And,
        }
    }

    /// Pairs joined with OR.
    pub fn any<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Value>,
    {
        Self {
            join: Join::Or,
            ..Self::all(pairs)
        }
    }

    fn with_op(self, op: Op) -> Group {
        Group {
            conditions: self
                .pairs
                .into_iter()
                .map(|(column, value)| Condition { column, op, value })
                .collect(),
            join: self.join,
        }
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Terms {
    fn from(pairs: [(K, V); N]) -> Self {
        Terms::all(pairs)
    }
}

impl<K: Into<String>, V: Into<Value>> From<Vec<(K, V)>> for Terms {
    fn from(pairs: Vec<(K, V)>) -> Self {
        Terms::all(pairs)
    }
}

impl<K: Into<String>, V: Into<Value>> From<(K, V)> for Terms {
    fn from(pair: (K, V)) -> Self {
        Terms::all([pair])
    }
}

/// Incrementally built WHERE clause.
#[derive(Debug, Clone, Default)]
pub struct ConditionBuilder {
    /// `WHERE ...` fragment, empty until the first predicate.
    clause: String,
    /// Bound values, one per `?` in `clause`, in order.
    binds: Vec<Value>,
    /// Connector requested by `and()` / `or()` for the next group.
    pending: Option<Join>,
    /// First invalid column name seen (validated at build time).
    build_error: Option<String>,
}

impl ConditionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Equality group: `(a = ? AND b = ?)`.
    pub fn with(self, terms: impl Into<Terms>) -> Self {
        self.filter(terms.into().with_op(Op::Eq))
    }

    /// Inequality group: `(a != ?)`.
    pub fn not(self, terms: impl Into<Terms>) -> Self {
        self.filter(terms.into().with_op(Op::Ne))
    }

    pub fn gt(self, terms: impl Into<Terms>) -> Self {
        self.filter(terms.into().with_op(Op::Gt))
    }

    pub fn lt(self, terms: impl Into<Terms>) -> Self {
        self.filter(terms.into().with_op(Op::Lt))
    }

    pub fn gte(self, terms: impl Into<Terms>) -> Self {
        self.filter(terms.into().with_op(Op::Gte))
    }

    pub fn lte(self, terms: impl Into<Terms>) -> Self {
        self.filter(terms.into().with_op(Op::Lte))
    }

    pub fn like(self, terms: impl Into<Terms>) -> Self {
        self.filter(terms.into().with_op(Op::Like))
    }

    /// Join the next group with AND.
    pub fn and(mut self) -> Self {
        self.pending = Some(Join::And);
        self
    }

    /// Join the next group with OR.
    pub fn or(mut self) -> Self {
        self.pending = Some(Join::Or);
        self
    }

    /// Append a group of explicit `(column, op, value)` conditions.
    ///
    /// An empty group appends nothing and leaves a pending `and()`/`or()` in place.
    pub fn filter(mut self, group: Group) -> Self {
        self.push_group(group);
        self
    }

    /// Non-consuming form of [`ConditionBuilder::filter`].
    pub fn push_group(&mut self, group: Group) {
        if group.is_empty() {
            return;
        }

        let joiner = self.pending.take().unwrap_or_default();
        if self.clause.is_empty() {
            self.clause.push_str("WHERE ");
        } else {
            self.clause.push(' ');
            self.clause.push_str(joiner.as_sql());
            self.clause.push(' ');
        }

        let sep = format!(" {} ", group.join.as_sql());
        let mut terms = Vec::with_capacity(group.conditions.len());
        for cond in group.conditions {
            if !is_valid_ident(&cond.column) && self.build_error.is_none() {
                self.build_error = Some(format!(
                    "condition column '{}' is not a valid identifier",
                    cond.column
                ));
            }
            terms.push(format!("{} {} ?", cond.column, cond.op.as_sql()));
            self.binds.push(cond.value);
        }

        self.clause.push('(');
        self.clause.push_str(&terms.join(&sep));
        self.clause.push(')');
    }

    /// True if no predicate has been added.
    pub fn is_empty(&self) -> bool {
        self.clause.is_empty()
    }

    /// The `WHERE ...` fragment, or an empty string.
    pub fn clause(&self) -> &str {
        &self.clause
    }

    /// Bound values in placeholder order.
    pub fn binds(&self) -> &[Value] {
        &self.binds
    }

    /// Report the first invalid column name, if any.
    pub fn check(&self) -> OrmResult<()> {
        match &self.build_error {
            Some(msg) => Err(OrmError::invalid_field(msg.clone())),
            None => Ok(()),
        }
    }

    /// Consume the builder into `(clause, binds)`.
    pub fn into_parts(self) -> OrmResult<(String, Vec<Value>)> {
        self.check()?;
        Ok((self.clause, self.binds))
    }
}
