mod record;

use proc_macro::TokenStream;

/// Derive macro for implementing the `Record` trait.
///
/// # Usage
///
/// ```ignore
/// #[derive(Clone, Serialize, Deserialize, Record)]
/// #[record(collection = "users")]
/// struct User {
///     id: String,
///     name: String,
///     #[serde(rename = "createdAt")]
///     created_at: Option<Timestamp>,
///     #[serde(rename = "updatedAt")]
///     updated_at: Option<Timestamp>,
/// }
/// ```
///
/// Attributes:
/// - `#[record(collection = "...")]` on the struct sets the collection name.
///   Defaults to the snake_case struct name plus `s`.
/// - `#[record(id)]` marks the identifier field. Defaults to a field named `id`.
/// - `#[record(created_at)]` / `#[record(updated_at)]` mark the timestamp
///   fields. Default to fields with those names; both are optional.
#[proc_macro_derive(Record, attributes(record))]
pub fn derive_record(input: TokenStream) -> TokenStream {
    record::derive_record(input)
}
