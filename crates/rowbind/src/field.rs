//! Field descriptors: how a record attribute maps to a table column.
//!
//! A row type declares an ordered list of [`FieldSpec`]s. Each spec is
//! normalized into a [`Field`] exactly once, by [`normalize`]; the mapper and
//! the save path both work from normalized fields only.
//!
//! ```ignore
//! use rowbind::{ColumnOptions, FieldSpec};
//!
//! let specs = vec![
//!     FieldSpec::with("id", ColumnOptions::new().primary().auto()),
//!     FieldSpec::name("title"),
//!     FieldSpec::column("author", "author_name"),
//! ];
//! ```

use crate::error::{OrmError, OrmResult};
use crate::ident::check_ident;

/// Flag set attached to a mapped field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnOptions {
    /// Column name; defaults to the attribute name.
    pub column: Option<String>,
    /// Field is the primary key.
    pub primary: bool,
    /// Field value is generated by the database on insert.
    pub auto: bool,
    /// Field must be defined when saving.
    pub required: bool,
}

impl ColumnOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(mut self, column: impl Into<String>) -> Self {
        self.column = Some(column.into());
        self
    }

    pub fn primary(mut self) -> Self {
        self.primary = true;
        self
    }

    pub fn auto(mut self) -> Self {
        self.auto = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// Options half of an attribute/options pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldOptions {
    /// Bare column name.
    Column(String),
    /// Column override plus flags.
    Flags(ColumnOptions),
}

impl From<ColumnOptions> for FieldOptions {
    fn from(opts: ColumnOptions) -> Self {
        FieldOptions::Flags(opts)
    }
}

/// A field descriptor as declared by a row type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldSpec {
    /// Attribute and column share one name; no flags.
    Name(String),
    /// Attribute name plus options.
    Mapped(String, FieldOptions),
}

impl FieldSpec {
    /// Simple field: attribute name == column name.
    pub fn name(attr: impl Into<String>) -> Self {
        FieldSpec::Name(attr.into())
    }

    /// Attribute stored under a different column name.
    pub fn column(attr: impl Into<String>, column: impl Into<String>) -> Self {
        FieldSpec::Mapped(attr.into(), FieldOptions::Column(column.into()))
    }

    /// Attribute with explicit options.
    pub fn with(attr: impl Into<String>, options: impl Into<FieldOptions>) -> Self {
        FieldSpec::Mapped(attr.into(), options.into())
    }

    /// Parse a field spec from its JSON form.
    ///
    /// Accepted shapes:
    /// - `"name"`
    /// - `{"attr": "column"}`
    /// - `{"attr": {"column": "c", "primary": true, "auto": true, "required": true}}`
    ///
    /// Every other shape is rejected with [`OrmError::InvalidFieldSpec`].
    pub fn from_json(value: &serde_json::Value) -> OrmResult<Self> {
        use serde_json::Value as Json;

        match value {
            Json::String(name) => Ok(FieldSpec::Name(name.clone())),
            Json::Object(map) if map.len() == 1 => {
                let Some((attr, options)) = map.iter().next() else {
                    return Err(OrmError::invalid_field("empty field object"));
                };
                let options = match options {
                    Json::String(column) => FieldOptions::Column(column.clone()),
                    Json::Object(opts) => {
                        let mut parsed = ColumnOptions::new();
                        for (key, v) in opts {
                            match (key.as_str(), v) {
                                ("column", Json::String(c)) => parsed.column = Some(c.clone()),
                                ("primary", v) => parsed.primary = json_flag(attr, key, v)?,
                                ("auto", v) => parsed.auto = json_flag(attr, key, v)?,
                                ("required", v) => parsed.required = json_flag(attr, key, v)?,
                                _ => {
                                    return Err(OrmError::invalid_field(format!(
                                        "field '{attr}': unsupported option '{key}' = {v}"
                                    )));
                                }
                            }
                        }
                        FieldOptions::Flags(parsed)
                    }
                    other => {
                        return Err(OrmError::invalid_field(format!(
                            "field '{attr}': options must be a column name or an object, got {other}"
                        )));
                    }
                };
                Ok(FieldSpec::Mapped(attr.clone(), options))
            }
            other => Err(OrmError::invalid_field(format!(
                "expected a name or a single-key object, got {other}"
            ))),
        }
    }

    /// Parse a JSON array of field specs.
    pub fn list_from_json(value: &serde_json::Value) -> OrmResult<Vec<Self>> {
        match value {
            serde_json::Value::Array(items) => items.iter().map(Self::from_json).collect(),
            other => Err(OrmError::invalid_field(format!(
                "expected an array of field specs, got {other}"
            ))),
        }
    }
}

fn json_flag(attr: &str, key: &str, v: &serde_json::Value) -> OrmResult<bool> {
    match v {
        serde_json::Value::Bool(b) => Ok(*b),
        serde_json::Value::Number(n) if n.is_i64() || n.is_u64() => Ok(n.as_i64() != Some(0)),
        _ => Err(OrmError::invalid_field(format!(
            "field '{attr}': option '{key}' must be a boolean or an integer"
        ))),
    }
}

impl From<&str> for FieldSpec {
    fn from(name: &str) -> Self {
        FieldSpec::name(name)
    }
}

/// A normalized field descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Attribute name on the record.
    pub attr: String,
    /// Column name in the table.
    pub column: String,
    pub primary: bool,
    pub auto: bool,
    pub required: bool,
}

impl Field {
    /// Convert back into the most explicit spec form.
    pub fn to_spec(&self) -> FieldSpec {
        FieldSpec::Mapped(
            self.attr.clone(),
            FieldOptions::Flags(ColumnOptions {
                column: Some(self.column.clone()),
                primary: self.primary,
                auto: self.auto,
                required: self.required,
            }),
        )
    }
}

impl From<&Field> for FieldSpec {
    fn from(field: &Field) -> Self {
        field.to_spec()
    }
}

/// Normalize a field spec.
///
/// The column defaults to the attribute name. Both names must be valid SQL
/// identifiers.
pub fn normalize(spec: &FieldSpec) -> OrmResult<Field> {
    let field = match spec {
        FieldSpec::Name(name) => Field {
            attr: name.clone(),
            column: name.clone(),
            primary: false,
            auto: false,
            required: false,
        },
        FieldSpec::Mapped(attr, FieldOptions::Column(column)) => Field {
            attr: attr.clone(),
            column: column.clone(),
            primary: false,
            auto: false,
            required: false,
        },
        FieldSpec::Mapped(attr, FieldOptions::Flags(opts)) => Field {
            attr: attr.clone(),
            column: opts.column.clone().unwrap_or_else(|| attr.clone()),
            primary: opts.primary,
            auto: opts.auto,
            required: opts.required,
        },
    };

    check_ident(&field.attr, "attribute")?;
    check_ident(&field.column, "column")?;
    Ok(field)
}
