//! Table name to moniker mapping.

use super::NameOverride;
use heck::ToUpperCamelCase;

/// Default moniker algorithm.
///
/// Lower-cases the table name first so only separators start a new word.
pub fn default_moniker(table: &str) -> String {
    table.to_lowercase().to_upper_camel_case()
}

/// Moniker for `table`, preferring a non-empty override.
pub fn table_to_moniker(table: &str, overrides: Option<&NameOverride>) -> String {
    overrides
        .and_then(|o| o.lookup(table))
        .unwrap_or_else(|| default_moniker(table))
}

/// Whether `segment` is an ASCII identifier.
pub fn is_identifier(segment: &str) -> bool {
    let mut chars = segment.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

/// Whether `moniker` names a class: `::` separated identifiers.
pub fn is_valid_moniker(moniker: &str) -> bool {
    moniker.split("::").all(is_identifier)
}

/// Whether `moniker` is a single alphanumeric word that inflects cleanly.
pub fn is_plain_moniker(moniker: &str) -> bool {
    !moniker.is_empty() && moniker.chars().all(char::is_alphanumeric)
}
