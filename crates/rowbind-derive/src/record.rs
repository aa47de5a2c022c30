//! Record derive macro implementation

use crate::attrs::{FieldAttr, sql_ident};
use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Result};

struct MappedField {
    ident: syn::Ident,
    attr: String,
    options: FieldAttr,
}

pub fn expand(input: DeriveInput) -> Result<TokenStream> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    &input,
                    "Record can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                &input,
                "Record can only be derived for structs",
            ));
        }
    };

    let mut mapped = Vec::new();
    let mut primary: Option<String> = None;
    for field in fields {
        let options = FieldAttr::from_field(field)?;
        let Some(ident) = field.ident.clone() else {
            continue;
        };
        if options.skip {
            continue;
        }

        let attr = sql_ident(&ident.unraw().to_string(), ident.span(), "field")?;
        if options.primary {
            if let Some(first) = &primary {
                return Err(syn::Error::new_spanned(
                    field,
                    format!("only one field can be #[orm(primary)]; '{first}' already is"),
                ));
            }
            primary = Some(attr.clone());
        }
        mapped.push(MappedField {
            ident,
            attr,
            options,
        });
    }

    if mapped.is_empty() {
        return Err(syn::Error::new_spanned(
            &input,
            "Record requires at least one mapped field",
        ));
    }

    let specs: Vec<_> = mapped.iter().map(field_spec).collect();

    let get_arms: Vec<_> = mapped
        .iter()
        .map(|f| {
            let ident = &f.ident;
            let attr = &f.attr;
            quote! {
                #attr => ::core::option::Option::Some(
                    ::rowbind::Value::from(::core::clone::Clone::clone(&self.#ident))
                ),
            }
        })
        .collect();

    let set_arms: Vec<_> = mapped
        .iter()
        .map(|f| {
            let ident = &f.ident;
            let attr = &f.attr;
            quote! {
                #attr => self.#ident = ::rowbind::assign(attr, value)?,
            }
        })
        .collect();

    let hook_calls: Vec<_> = mapped
        .iter()
        .flat_map(|f| {
            let attr = &f.attr;
            let load = f.options.on_load.as_ref().map(|path| {
                quote! { .on_load(#attr, #path as ::rowbind::HookFn) }
            });
            let save = f.options.on_save.as_ref().map(|path| {
                quote! { .on_save(#attr, #path as ::rowbind::HookFn) }
            });
            load.into_iter().chain(save)
        })
        .collect();

    let hooks_fn = if hook_calls.is_empty() {
        quote! {}
    } else {
        quote! {
            fn hooks() -> ::rowbind::Hooks {
                ::rowbind::Hooks::new() #(#hook_calls)*
            }
        }
    };

    Ok(quote! {
        impl #impl_generics ::rowbind::Record for #name #ty_generics #where_clause {
            fn field_specs() -> ::std::vec::Vec<::rowbind::FieldSpec> {
                ::std::vec![#(#specs),*]
            }

            fn get(&self, attr: &str) -> ::core::option::Option<::rowbind::Value> {
                match attr {
                    #(#get_arms)*
                    _ => ::core::option::Option::None,
                }
            }

            fn set(
                &mut self,
                attr: &str,
                value: ::rowbind::Value,
            ) -> ::rowbind::OrmResult<bool> {
                match attr {
                    #(#set_arms)*
                    _ => return ::core::result::Result::Ok(false),
                }
                ::core::result::Result::Ok(true)
            }

            #hooks_fn
        }
    })
}

fn field_spec(field: &MappedField) -> TokenStream {
    let attr = &field.attr;
    let opts = &field.options;

    if !opts.has_flags() {
        return match &opts.column {
            Some(column) => quote! { ::rowbind::FieldSpec::column(#attr, #column) },
            None => quote! { ::rowbind::FieldSpec::name(#attr) },
        };
    }

    let column = opts.column.as_ref().map(|c| quote! { .column(#c) });
    let primary = opts.primary.then(|| quote! { .primary() });
    let auto = opts.auto.then(|| quote! { .auto() });
    let required = opts.required.then(|| quote! { .required() });
    quote! {
        ::rowbind::FieldSpec::with(
            #attr,
            ::rowbind::ColumnOptions::new() #column #primary #auto #required,
        )
    }
}
