//! SQL identifier checks.
//!
//! Attribute, column and table names are spliced into generated SQL, so they
//! must be plain identifiers: `[A-Za-z_][A-Za-z0-9_]*`. Table names may be
//! schema-qualified (`public.users`).

use crate::error::{OrmError, OrmResult};

/// Returns true if `s` is a plain, unquoted SQL identifier.
pub fn is_valid_ident(s: &str) -> bool {
    let mut chars = s.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !(first.is_ascii_alphabetic() || first == '_') {
        return false;
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Validate a column or attribute name.
pub(crate) fn check_ident(s: &str, what: &str) -> OrmResult<()> {
    if is_valid_ident(s) {
        Ok(())
    } else {
        Err(OrmError::invalid_field(format!(
            "{what} '{s}' is not a valid identifier (expected [A-Za-z_][A-Za-z0-9_]*)"
        )))
    }
}

/// Validate a table name, allowing `schema.table`.
pub(crate) fn check_table(s: &str) -> OrmResult<()> {
    let valid = !s.is_empty() && s.split('.').all(is_valid_ident) && s.split('.').count() <= 2;
    if valid {
        Ok(())
    } else {
        Err(OrmError::Config(format!(
            "table name '{s}' is not a valid identifier"
        )))
    }
}
