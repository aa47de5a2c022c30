//! The row-type contract.

use crate::error::OrmResult;
use crate::field::FieldSpec;
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;

/// A value transform applied when loading from or saving to the database.
pub type HookFn = fn(Value) -> OrmResult<Value>;

/// Per-attribute load/save hooks.
///
/// # Example
///
/// ```ignore
/// fn tags_in(v: Value) -> OrmResult<Value> { /* "a,b" -> ["a","b"] */ }
/// fn tags_out(v: Value) -> OrmResult<Value> { /* ["a","b"] -> "a,b" */ }
///
/// Hooks::new().on_load("tags", tags_in).on_save("tags", tags_out)
/// ```
#[derive(Clone, Default)]
pub struct Hooks {
    load: HashMap<String, HookFn>,
    save: HashMap<String, HookFn>,
}

impl Hooks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a hook run on the raw column value before it is assigned to `attr`.
    pub fn on_load(mut self, attr: impl Into<String>, hook: HookFn) -> Self {
        self.load.insert(attr.into(), hook);
        self
    }

    /// Register a hook run on the attribute value before it is written.
    pub fn on_save(mut self, attr: impl Into<String>, hook: HookFn) -> Self {
        self.save.insert(attr.into(), hook);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.load.is_empty() && self.save.is_empty()
    }

    /// Apply the load hook for `attr`, if any.
    pub fn load(&self, attr: &str, value: Value) -> OrmResult<Value> {
        match self.load.get(attr) {
            Some(hook) => hook(value),
            None => Ok(value),
        }
    }

    /// Apply the save hook for `attr`, if any.
    pub fn save(&self, attr: &str, value: Value) -> OrmResult<Value> {
        match self.save.get(attr) {
            Some(hook) => hook(value),
            None => Ok(value),
        }
    }
}

impl fmt::Debug for Hooks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut load: Vec<_> = self.load.keys().collect();
        let mut save: Vec<_> = self.save.keys().collect();
        load.sort();
        save.sort();
        f.debug_struct("Hooks")
            .field("load", &load)
            .field("save", &save)
            .finish()
    }
}

/// A row type bound to table columns.
///
/// Usually implemented with `#[derive(Record)]`. Hand-written impls match on
/// the attribute name:
///
/// ```ignore
/// #[derive(Default)]
/// struct Tag { id: Option<i64>, label: Option<String> }
///
/// impl Record for Tag {
///     fn field_specs() -> Vec<FieldSpec> {
///         vec![
///             FieldSpec::with("id", ColumnOptions::new().primary().auto()),
///             FieldSpec::name("label"),
///         ]
///     }
///
///     fn get(&self, attr: &str) -> Option<Value> {
///         match attr {
///             "id" => Some(self.id.into()),
///             "label" => Some(self.label.clone().into()),
///             _ => None,
///         }
///     }
///
///     fn set(&mut self, attr: &str, value: Value) -> OrmResult<bool> {
///         match attr {
///             "id" => self.id = assign("id", value)?,
///             "label" => self.label = assign("label", value)?,
///             _ => return Ok(false),
///         }
///         Ok(true)
///     }
/// }
/// ```
pub trait Record: Default + Send + Sync + 'static {
    /// Ordered field descriptors. An empty list is rejected at registration.
    fn field_specs() -> Vec<FieldSpec>;

    /// Current value of `attr`, or `None` if the type has no such attribute.
    fn get(&self, attr: &str) -> Option<Value>;

    /// Assign `value` to `attr`. Returns `Ok(false)` if there is no such attribute.
    fn set(&mut self, attr: &str, value: Value) -> OrmResult<bool>;

    /// Load/save hooks keyed by attribute name.
    fn hooks() -> Hooks {
        Hooks::new()
    }

    /// Type name used in diagnostics.
    fn type_name() -> &'static str {
        std::any::type_name::<Self>()
    }
}

/// Convert `value` for assignment to `attr`, mapping type mismatches to
/// [`OrmError::Decode`](crate::OrmError::Decode).
pub fn assign<T: crate::value::FromValue>(attr: &str, value: Value) -> OrmResult<T> {
    T::from_value(value).map_err(|e| crate::error::OrmError::decode(attr, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OrmError;

    fn upper(v: Value) -> OrmResult<Value> {
        match v {
            Value::Text(s) => Ok(Value::Text(s.to_uppercase())),
            other => Ok(other),
        }
    }

    fn reject(_: Value) -> OrmResult<Value> {
        Err(OrmError::decode("name", "rejected"))
    }

    #[test]
    fn hooks_apply_per_attribute() {
        let hooks = Hooks::new().on_load("name", upper).on_save("code", reject);
        assert_eq!(
            hooks.load("name", Value::from("ab")).unwrap(),
            Value::from("AB")
        );
        assert_eq!(
            hooks.load("other", Value::from("ab")).unwrap(),
            Value::from("ab")
        );
        assert!(hooks.save("code", Value::Null).is_err());
        assert_eq!(hooks.save("name", Value::Int(1)).unwrap(), Value::Int(1));
    }

    #[test]
    fn assign_reports_attribute() {
        let err = assign::<i64>("age", Value::from("x")).unwrap_err();
        match err {
            OrmError::Decode { column, .. } => assert_eq!(column, "age"),
            other => panic!("unexpected error: {other}"),
        }
    }
}
