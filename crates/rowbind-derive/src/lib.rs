//! Derive macro for rowbind
//!
//! Provides `#[derive(Record)]`.

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod attrs;
mod record;

/// Derive the `Record` trait for a struct with named fields.
///
/// # Example
///
/// ```ignore
/// use rowbind::Record;
///
/// #[derive(Debug, Default, Record)]
/// struct User {
///     #[orm(primary, auto)]
///     id: Option<i64>,
///     #[orm(required)]
///     username: Option<String>,
///     #[orm(column = "email_address")]
///     email: Option<String>,
///     #[orm(on_load = "trim", on_save = "trim")]
///     bio: Option<String>,
///     #[orm(skip)]
///     cached: Option<String>,
/// }
/// ```
///
/// # Attributes
///
/// - `#[orm(column = "name")]` - Map field to a different column name
/// - `#[orm(primary)]` - Mark field as the primary key (at most one)
/// - `#[orm(auto)]` - Key is generated by the database and read back after insert
/// - `#[orm(required)]` - Saving fails while the field is undefined
/// - `#[orm(on_load = "path")]` - `fn(Value) -> OrmResult<Value>` applied when hydrating
/// - `#[orm(on_save = "path")]` - `fn(Value) -> OrmResult<Value>` applied when saving
/// - `#[orm(skip)]` - Not mapped; the field keeps its `Default` value on hydrate
///
/// Mapped field types must convert into `rowbind::Value` and implement
/// `rowbind::FromValue`. Use `Option<T>` for fields that may be undefined.
#[proc_macro_derive(Record, attributes(orm))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    record::expand(input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
