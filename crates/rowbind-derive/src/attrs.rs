//! Field-level `#[orm(...)]` attribute parsing.

use proc_macro2::Span;
use syn::{Error, Result};

/// Check that `name` is a plain SQL identifier (`[A-Za-z_][A-Za-z0-9_]*`).
///
/// Generated SQL splices attribute and column names in unquoted, so this
/// mirrors the runtime check in `rowbind::ident` at compile time.
pub(crate) fn sql_ident(name: &str, span: Span, what: &str) -> Result<String> {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(Error::new(
            span,
            format!("{what} '{name}' is not a valid identifier (expected [A-Za-z_][A-Za-z0-9_]*)"),
        ));
    }
    Ok(name.to_string())
}

/// Options collected from every `#[orm(...)]` on one field.
#[derive(Default)]
pub(crate) struct FieldAttr {
    pub column: Option<String>,
    pub primary: bool,
    pub auto: bool,
    pub required: bool,
    pub skip: bool,
    pub on_load: Option<syn::Path>,
    pub on_save: Option<syn::Path>,
}

impl FieldAttr {
    pub(crate) fn from_field(field: &syn::Field) -> Result<Self> {
        let mut out = FieldAttr::default();
        for attr in &field.attrs {
            if !attr.path().is_ident("orm") {
                continue;
            }
            let parsed: FieldAttr = attr.parse_args()?;
            out.merge(parsed);
        }
        if out.skip && out.configures_mapping() {
            return Err(Error::new_spanned(
                field,
                "#[orm(skip)] cannot be combined with other orm attributes",
            ));
        }
        Ok(out)
    }

    fn merge(&mut self, other: FieldAttr) {
        self.primary |= other.primary;
        self.auto |= other.auto;
        self.required |= other.required;
        self.skip |= other.skip;
        if other.column.is_some() {
            self.column = other.column;
        }
        if other.on_load.is_some() {
            self.on_load = other.on_load;
        }
        if other.on_save.is_some() {
            self.on_save = other.on_save;
        }
    }

    /// Whether anything beyond a column rename was given.
    pub(crate) fn has_flags(&self) -> bool {
        self.primary || self.auto || self.required
    }

    fn configures_mapping(&self) -> bool {
        self.has_flags()
            || self.column.is_some()
            || self.on_load.is_some()
            || self.on_save.is_some()
    }
}

impl syn::parse::Parse for FieldAttr {
    fn parse(input: syn::parse::ParseStream) -> Result<Self> {
        let mut attr = FieldAttr::default();

        loop {
            if input.is_empty() {
                break;
            }

            let ident: syn::Ident = input.parse()?;
            match ident.to_string().as_str() {
                "primary" => attr.primary = true,
                "auto" => attr.auto = true,
                "required" => attr.required = true,
                "skip" => attr.skip = true,
                "column" => {
                    let _: syn::Token![=] = input.parse()?;
                    let value: syn::LitStr = input.parse()?;
                    attr.column = Some(sql_ident(value.value().trim(), value.span(), "column")?);
                }
                "on_load" => {
                    let _: syn::Token![=] = input.parse()?;
                    let value: syn::LitStr = input.parse()?;
                    attr.on_load = Some(value.parse()?);
                }
                "on_save" => {
                    let _: syn::Token![=] = input.parse()?;
                    let value: syn::LitStr = input.parse()?;
                    attr.on_save = Some(value.parse()?);
                }
                other => {
                    return Err(Error::new(
                        ident.span(),
                        format!(
                            "unknown orm attribute '{other}' (expected column, primary, auto, required, on_load, on_save or skip)"
                        ),
                    ));
                }
            }

            if input.peek(syn::Token![,]) {
                let _: syn::Token![,] = input.parse()?;
            } else {
                break;
            }
        }

        Ok(attr)
    }
}
