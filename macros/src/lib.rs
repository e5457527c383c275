//! Procedural macros for the infection-clusters crate
//!
//! This crate provides the `TableSchema` derive, which turns a plain row
//! struct into a description of the tabular input it is decoded from.

use proc_macro::TokenStream;

// Import modules
mod table_schema;
mod utils;


/// Derive macro for describing an input table
///
/// Generates an implementation of `crate::reader::schema::TableSchema` with
/// the table name, the list of required columns (one per struct field, in
/// declaration order) and an Arrow schema used to normalize loaded batches.
///
/// # Example
///
/// ```ignore
/// #[derive(TableSchema, Deserialize)]
/// #[table(name = "transfers")]
/// struct TransferRow {
///     patient_id: Option<String>,
///     location: Option<String>,
///     date: Option<String>,
/// }
/// ```
#[proc_macro_derive(TableSchema, attributes(table))]
pub fn derive_table_schema(input: TokenStream) -> TokenStream {
    table_schema::process_derive_table_schema(input)
}
