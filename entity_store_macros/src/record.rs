use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Field, Fields, FieldsNamed, Ident, LitStr, Token};

pub fn derive_record(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);

    match expand(&input) {
        Ok(tokens) => TokenStream::from(tokens),
        Err(err) => TokenStream::from(err.to_compile_error()),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let collection = extract_collection(input)?;
    let fields = named_fields(input)?;

    let id_field = find_field(fields, "id")?.ok_or_else(|| {
        syn::Error::new_spanned(
            name,
            "Record derive: no field marked with #[record(id)] and no field named `id`",
        )
    })?;
    let id_key = serialized_name(fields, &id_field)?;
    let created_at = find_field(fields, "created_at")?;
    let updated_at = find_field(fields, "updated_at")?;

    let created_at_methods = created_at.map(|field| {
        quote! {
            fn created_at(&self) -> ::core::option::Option<::entity_store::Timestamp> {
                self.#field
            }

            fn set_created_at(&mut self, at: ::entity_store::Timestamp) {
                self.#field = ::core::option::Option::Some(at);
            }
        }
    });

    let updated_at_methods = updated_at.map(|field| {
        quote! {
            fn updated_at(&self) -> ::core::option::Option<::entity_store::Timestamp> {
                self.#field
            }

            fn set_updated_at(&mut self, at: ::entity_store::Timestamp) {
                self.#field = ::core::option::Option::Some(at);
            }
        }
    });

    Ok(quote! {
        impl #impl_generics ::entity_store::Record for #name #ty_generics #where_clause {
            const COLLECTION: &'static str = #collection;
            const ID_KEY: &'static str = #id_key;

            fn id(&self) -> &str {
                &self.#id_field
            }

            fn set_id(&mut self, id: ::std::string::String) {
                self.#id_field = id;
            }

            #created_at_methods
            #updated_at_methods
        }
    })
}

fn named_fields(input: &DeriveInput) -> syn::Result<&FieldsNamed> {
    if let Data::Struct(data_struct) = &input.data {
        if let Fields::Named(fields) = &data_struct.fields {
            return Ok(fields);
        }
    }

    Err(syn::Error::new_spanned(
        &input.ident,
        "Record derive: only structs with named fields are supported",
    ))
}

fn extract_collection(input: &DeriveInput) -> syn::Result<String> {
    for attr in &input.attrs {
        if !attr.path().is_ident("record") {
            continue;
        }

        let mut collection = None;
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("collection") {
                let value: LitStr = meta.value()?.parse()?;
                collection = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("expected `collection = \"...\"`"))
            }
        })?;

        if let Some(c) = collection {
            return Ok(c);
        }
    }

    let name = input.ident.to_string();
    Ok(format!("{}s", to_snake_case(&name)))
}

/// Finds the field tagged `#[record(<role>)]`, falling back to a field named
/// after the role.
fn find_field(fields: &FieldsNamed, role: &str) -> syn::Result<Option<Ident>> {
    for field in &fields.named {
        for attr in &field.attrs {
            if !attr.path().is_ident("record") {
                continue;
            }

            let mut tagged = false;
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident(role) {
                    tagged = true;
                }
                Ok(())
            })?;

            if tagged {
                return Ok(field.ident.clone());
            }
        }
    }

    Ok(fields
        .named
        .iter()
        .filter_map(|field| field.ident.as_ref())
        .find(|ident| *ident == role)
        .cloned())
}

/// The key serde writes for `ident`: its `#[serde(rename = "...")]` value,
/// or the field name.
fn serialized_name(fields: &FieldsNamed, ident: &Ident) -> syn::Result<String> {
    let field: Option<&Field> = fields.named.iter().find(|f| f.ident.as_ref() == Some(ident));
    let mut name = ident.to_string();

    for attr in field.into_iter().flat_map(|f| &f.attrs) {
        if !attr.path().is_ident("serde") {
            continue;
        }

        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") && meta.input.peek(Token![=]) {
                let value: LitStr = meta.value()?.parse()?;
                name = value.value();
            } else if meta.input.peek(Token![=]) {
                let _: syn::Expr = meta.value()?.parse()?;
            } else if meta.input.peek(syn::token::Paren) {
                let content;
                syn::parenthesized!(content in meta.input);
                let _: TokenStream2 = content.parse()?;
            }
            Ok(())
        })?;
    }

    Ok(name)
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, ch) in s.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.extend(ch.to_lowercase());
        } else {
            result.push(ch);
        }
    }
    result
}
