//! Utility functions for procedural macros
//!
//! This module contains type inspection helpers used by the derive macros.

use proc_macro2::TokenStream;
use quote::quote;
use syn::Type;

/// Check if a type is an Option<T>
pub fn is_option_type(ty: &Type) -> bool {
    match ty {
        Type::Path(type_path) => {
            let path = &type_path.path;
            if path.segments.len() == 1 {
                let segment = &path.segments[0];
                segment.ident == "Option"
            } else {
                false
            }
        }
        _ => false,
    }
}

/// Unwrap `Option<T>` to `T`, returning the type itself otherwise
pub fn inner_type(ty: &Type) -> &Type {
    if let Type::Path(type_path) = ty {
        let path = &type_path.path;
        if path.segments.len() == 1 {
            let segment = &path.segments[0];
            if segment.ident == "Option" {
                if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                    if let Some(syn::GenericArgument::Type(inner)) = args.args.first() {
                        return inner;
                    }
                }
            }
        }
    }
    ty
}

/// Name of the Arrow data type a field of this Rust type is decoded from
pub fn arrow_type_name(ty: &Type) -> &'static str {
    if let Type::Path(type_path) = inner_type(ty) {
        if let Some(segment) = type_path.path.segments.last() {
            let ident = segment.ident.to_string();
            return match ident.as_str() {
                "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" => "Int64",
                "f32" | "f64" => "Float64",
                "bool" => "Boolean",
                "NaiveDate" => "Date32",
                _ => "Utf8",
            };
        }
    }

    // Anything unrecognised is read as text
    "Utf8"
}

/// Arrow `DataType` expression for a field of this Rust type
pub fn arrow_data_type(ty: &Type) -> TokenStream {
    match arrow_type_name(ty) {
        "Int64" => quote! { ::arrow::datatypes::DataType::Int64 },
        "Float64" => quote! { ::arrow::datatypes::DataType::Float64 },
        "Boolean" => quote! { ::arrow::datatypes::DataType::Boolean },
        "Date32" => quote! { ::arrow::datatypes::DataType::Date32 },
        _ => quote! { ::arrow::datatypes::DataType::Utf8 },
    }
}

/// Table name used when no `#[table(name = ...)]` is given: `TransferRow` -> `transfer`
pub fn default_table_name(struct_name: &str) -> String {
    let base = struct_name.strip_suffix("Row").unwrap_or(struct_name);
    let mut name = String::with_capacity(base.len() + 4);
    for (i, ch) in base.chars().enumerate() {
        if ch.is_uppercase() {
            if i > 0 {
                name.push('_');
            }
            name.extend(ch.to_lowercase());
        } else {
            name.push(ch);
        }
    }
    name
}
