//! Insert-or-update resolution.
//!
//! Saving happens in two phases. [`SavePlan::build`] reads the instance,
//! applies save hooks and decides between INSERT and UPDATE without touching
//! the database or the instance. [`save`] then executes the plan, clears the
//! instance's `new_item` flag and, for inserts with an auto-generated key,
//! queries the key back.
//!
//! Key recovery selects the key column filtered by every value just written.
//! It picks the wrong row when those values do not identify the new row
//! uniquely.

use crate::config::{KeyBinding, ModelConfig};
use crate::driver::Driver;
use crate::error::{OrmError, OrmResult};
use crate::instance::Instance;
use crate::model::Model;
use crate::record::Record;
use crate::schema::Schema;
use crate::sql;
use crate::value::Value;

/// Statement kind chosen for a save.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Insert,
    Update,
}

/// The resolved write for one instance.
#[derive(Debug, Clone, PartialEq)]
pub struct SavePlan {
    kind: SaveKind,
    table: String,
    columns: Vec<String>,
    values: Vec<Value>,
    primary_key: String,
    key_value: Option<Value>,
    key_binding: KeyBinding,
    /// Attribute receiving the recovered key, when the key is auto-generated.
    recover_into: Option<String>,
}

impl SavePlan {
    /// Resolve the write for `instance`.
    ///
    /// Fails with [`OrmError::MissingPrimaryKey`],
    /// [`OrmError::RequiredFieldMissing`] or [`OrmError::InvalidSaveState`];
    /// hook errors are returned as-is.
    pub fn build<R: Record>(
        schema: &Schema,
        config: &ModelConfig,
        table: &str,
        instance: &Instance<R>,
    ) -> OrmResult<Self> {
        let primary_key = schema.primary_key();
        let new_item = instance.is_new();

        let mut is_insert = new_item;
        let mut recover_into = None;
        let mut key_value = None;
        let mut columns = Vec::new();
        let mut values = Vec::new();

        for field in schema.fields() {
            let current = instance.get(&field.attr).unwrap_or_default();
            let value = schema.hooks().save(&field.attr, current)?;

            if field.column == primary_key {
                if value.is_defined() {
                    key_value = Some(value.clone());
                    if !new_item {
                        continue;
                    }
                } else if field.auto {
                    is_insert = true;
                    recover_into = Some(field.attr.clone());
                    continue;
                } else {
                    return Err(OrmError::MissingPrimaryKey(field.attr.clone()));
                }
            } else if value.is_null() {
                if field.required {
                    return Err(OrmError::RequiredFieldMissing(field.attr.clone()));
                }
                continue;
            }

            columns.push(field.column.clone());
            values.push(value);
        }

        if columns.is_empty() || columns.len() != values.len() {
            return Err(OrmError::InvalidSaveState {
                columns: columns.len(),
                values: values.len(),
            });
        }

        let kind = if is_insert {
            SaveKind::Insert
        } else {
            if key_value.is_none() {
                return Err(OrmError::MissingPrimaryKey(primary_key.to_string()));
            }
            SaveKind::Update
        };

        if !config.recover_generated_key {
            recover_into = None;
        }

        Ok(Self {
            kind,
            table: table.to_string(),
            columns,
            values,
            primary_key: primary_key.to_string(),
            key_value,
            key_binding: config.key_binding,
            recover_into,
        })
    }

    pub fn kind(&self) -> SaveKind {
        self.kind
    }

    pub fn is_insert(&self) -> bool {
        self.kind == SaveKind::Insert
    }

    /// Columns written, in field declaration order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Values written, aligned with [`SavePlan::columns`].
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Primary-key value read from the instance, if defined.
    pub fn key_value(&self) -> Option<&Value> {
        self.key_value.as_ref()
    }

    /// The INSERT or UPDATE statement and its binds.
    pub fn statement(&self) -> (String, Vec<Value>) {
        match self.kind {
            SaveKind::Insert => (
                sql::insert(&self.table, &self.columns),
                self.values.clone(),
            ),
            SaveKind::Update => {
                let key = self.key_value.clone().unwrap_or_default();
                match self.key_binding {
                    KeyBinding::Interpolate => (
                        sql::update(
                            &self.table,
                            &self.columns,
                            &self.primary_key,
                            &key.to_sql_literal(),
                        ),
                        self.values.clone(),
                    ),
                    KeyBinding::Bind => {
                        let mut binds = self.values.clone();
                        binds.push(key);
                        (
                            sql::update(&self.table, &self.columns, &self.primary_key, "?"),
                            binds,
                        )
                    }
                }
            }
        }
    }

    /// The key query-back statement, for inserts with an auto-generated key.
    pub fn recovery_statement(&self) -> Option<(String, Vec<Value>)> {
        self.recover_into.as_ref()?;
        Some((
            sql::select_key(&self.table, &self.primary_key, &self.columns),
            self.values.clone(),
        ))
    }
}

/// Persist `instance` through `model`.
///
/// On any failure before the write succeeds the instance is left unchanged.
pub async fn save<D, R>(model: &Model<D, R>, instance: &mut Instance<R>) -> OrmResult<()>
where
    D: Driver,
    R: Record,
{
    let plan = SavePlan::build(model.schema(), model.config(), model.table(), instance)?;

    let (sql, binds) = plan.statement();
    model.execute(&sql, &binds).await?;
    instance.mark_saved();

    if let (Some(attr), Some((sql, binds))) = (plan.recover_into.as_deref(), plan.recovery_statement())
    {
        let rows = model.execute(&sql, &binds).await?;
        let key = rows.first_value().cloned().ok_or_else(|| {
            OrmError::not_found(format!(
                "inserted row in {} not found while recovering {}",
                model.table(),
                plan.primary_key
            ))
        })?;
        instance.set(attr, key)?;
    }

    Ok(())
}
