//! Procedural macros for sieve.
//!
//! # Macros
//!
//! - [`UpdateSet`] - Derive `UpdateRecord` so a struct can drive partial updates
//!
//! # Example
//!
//! ```rust,ignore
//! #[derive(sieve::UpdateSet)]
//! struct User {
//!     id: i64,
//!     name: Option<String>,
//!     tags: Vec<String>,
//!     #[sieve(column = "mail")]
//!     email: Option<String>,
//!     created: i64,
//!     modified: i64,
//! }
//! ```

use proc_macro::TokenStream;
use syn::{DeriveInput, parse_macro_input};

mod derive;

/// Derive `sieve::update::UpdateRecord`.
///
/// Fields are listed in declaration order. By default:
/// - `Option<T>` and `Vec<T>` fields are written when set (a `Vec` must be non-empty)
/// - fields named `id`, `created` or `deleted` are never written
/// - a field named `modified` is always written with the current time
/// - any other field is left out
///
/// # Attributes
///
/// ## Struct-level
/// - `#[sieve(crate = "path")]` - Path to the crate exporting `update` (default `::sieve`)
///
/// ## Field-level
/// - `#[sieve(immutable)]` - Never write this field
/// - `#[sieve(modified)]` - Treat as the modification timestamp
/// - `#[sieve(column = "name")]` - Use an explicit column name
/// - `#[sieve(skip)]` - Leave the field out entirely
#[proc_macro_derive(UpdateSet, attributes(sieve))]
pub fn derive_update_set(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);

    match derive::derive_update_set_impl(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}
