//! TableSchema derive macro implementation
//!
//! This module contains the implementation of the TableSchema derive macro,
//! which maps a row struct onto the columns of an input table.

use darling::{ast, FromDeriveInput, FromField};
use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

use crate::utils;

/// Receiver for the struct that derives `TableSchema`
#[derive(Debug, FromDeriveInput)]
#[darling(attributes(table), supports(struct_named))]
struct TableSchemaReceiver {
    /// The struct identifier
    ident: syn::Ident,
    /// Table name from the #[table(name = "...")] attribute
    #[darling(default)]
    name: Option<String>,
    /// The struct data with parsed fields
    data: ast::Data<(), TableFieldReceiver>,
}

/// Receiver for the fields in the struct
#[derive(Debug, FromField)]
struct TableFieldReceiver {
    /// The field identifier
    ident: Option<syn::Ident>,
    /// The field type
    ty: syn::Type,
}

/// Process the TableSchema derive macro
pub fn process_derive_table_schema(input: TokenStream) -> TokenStream {
    // Parse the input tokens into a syntax tree
    let input = parse_macro_input!(input as DeriveInput);

    // Parse with darling
    let receiver = match TableSchemaReceiver::from_derive_input(&input) {
        Ok(receiver) => receiver,
        Err(err) => return err.write_errors().into(),
    };

    let table_name = receiver
        .name
        .clone()
        .unwrap_or_else(|| utils::default_table_name(&receiver.ident.to_string()));

    // Extract the fields
    let ast::Data::Struct(fields) = &receiver.data else {
        unreachable!("Darling ensures this is a struct")
    };

    TokenStream::from(generate_table_impl(&receiver.ident, &table_name, fields))
}

/// Generate the `TableSchema` implementation
fn generate_table_impl(
    struct_name: &syn::Ident,
    table_name: &str,
    fields: &ast::Fields<TableFieldReceiver>,
) -> proc_macro2::TokenStream {
    let column_names: Vec<String> = fields
        .iter()
        .filter_map(|field| field.ident.as_ref().map(ToString::to_string))
        .collect();

    let arrow_fields = fields.iter().filter_map(|field| {
        let column = field.ident.as_ref()?.to_string();
        let data_type = utils::arrow_data_type(&field.ty);
        let nullable = utils::is_option_type(&field.ty);
        Some(quote! {
            ::arrow::datatypes::Field::new(#column, #data_type, #nullable)
        })
    });

    quote! {
        impl crate::reader::schema::TableSchema for #struct_name {
            const TABLE_NAME: &'static str = #table_name;

            const REQUIRED_COLUMNS: &'static [&'static str] = &[#(#column_names),*];

            fn arrow_schema() -> ::arrow::datatypes::Schema {
                ::arrow::datatypes::Schema::new(vec![
                    #(#arrow_fields),*
                ])
            }
        }
    }
}
