//! Mapping declared field names to storage column names.

use convert_case::{Case, Casing};

/// Maps a field's declared name to its column name.
///
/// Implementations must be pure: the same input always yields the same name.
pub trait FieldNamer {
    /// Column name for a declared field name.
    fn field_name(&self, raw: &str) -> String;
}

/// `snake_case` column names (`UserID` becomes `user_id`).
#[derive(Debug, Clone, Copy, Default)]
pub struct SnakeCaseNamer;

impl FieldNamer for SnakeCaseNamer {
    fn field_name(&self, raw: &str) -> String {
        raw.to_case(Case::Snake)
    }
}

/// Uses the declared name unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityNamer;

impl FieldNamer for IdentityNamer {
    fn field_name(&self, raw: &str) -> String {
        raw.to_string()
    }
}

impl<F> FieldNamer for F
where
    F: Fn(&str) -> String,
{
    fn field_name(&self, raw: &str) -> String {
        self(raw)
    }
}
