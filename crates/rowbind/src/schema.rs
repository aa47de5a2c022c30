//! Per-type mapping metadata, resolved once at registration.

use crate::config::ModelConfig;
use crate::error::{OrmError, OrmResult};
use crate::field::{Field, normalize};
use crate::ident::check_ident;
use crate::record::{Hooks, Record};

/// Normalized fields, primary key and hooks of a record type.
#[derive(Debug, Clone)]
pub struct Schema {
    type_name: &'static str,
    fields: Vec<Field>,
    primary_key: String,
    hooks: Hooks,
}

impl Schema {
    /// Resolve the schema of `R` with the default model configuration.
    pub fn of<R: Record>() -> OrmResult<Self> {
        Self::resolve::<R>(&ModelConfig::default())
    }

    /// Resolve the schema of `R`.
    ///
    /// Fails with [`OrmError::MissingFieldMetadata`] when `R` declares no
    /// fields and with [`OrmError::DuplicatePrimaryKey`] when more than one
    /// field is marked primary.
    pub fn resolve<R: Record>(config: &ModelConfig) -> OrmResult<Self> {
        let specs = R::field_specs();
        if specs.is_empty() {
            return Err(OrmError::MissingFieldMetadata(R::type_name()));
        }

        check_ident(&config.default_primary_key, "default primary key")?;

        let fields = specs.iter().map(normalize).collect::<OrmResult<Vec<_>>>()?;

        let mut primary: Option<&Field> = None;
        for field in fields.iter().filter(|f| f.primary) {
            if let Some(first) = primary {
                return Err(OrmError::DuplicatePrimaryKey {
                    first: first.attr.clone(),
                    second: field.attr.clone(),
                });
            }
            primary = Some(field);
        }
        let primary_key = primary
            .map(|f| f.column.clone())
            .unwrap_or_else(|| config.default_primary_key.clone());

        Ok(Self {
            type_name: R::type_name(),
            fields,
            primary_key,
            hooks: R::hooks(),
        })
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Normalized fields in declaration order.
    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    /// Primary-key column name.
    pub fn primary_key(&self) -> &str {
        &self.primary_key
    }

    /// The field mapped to the primary-key column, if the type declares one.
    pub fn primary_field(&self) -> Option<&Field> {
        self.fields.iter().find(|f| f.column == self.primary_key)
    }

    pub fn hooks(&self) -> &Hooks {
        &self.hooks
    }

    /// Comma-separated column list in declaration order.
    pub fn column_list(&self) -> String {
        self.fields
            .iter()
            .map(|f| f.column.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}
