//! Table selection.

use crate::warning::{Warning, Warnings};
use regex::Regex;

/// Filter and sort the catalog's tables.
///
/// `include` keeps only matching names, then `exclude` drops matching names.
/// Patterns are unanchored searches. The returned list is sorted and
/// de-duplicated; an empty result is reported as a warning, never an error.
pub fn select_tables(
    all_tables: impl IntoIterator<Item = String>,
    include: Option<&Regex>,
    exclude: Option<&Regex>,
    warnings: &mut Warnings,
) -> Vec<String> {
    let mut tables: Vec<String> = all_tables.into_iter().collect();
    if tables.is_empty() {
        warnings.push(Warning::NoTablesFound);
        return tables;
    }

    if let Some(pattern) = include {
        tables.retain(|t| pattern.is_match(t));
    }
    if let Some(pattern) = exclude {
        tables.retain(|t| !pattern.is_match(t));
    }

    if tables.is_empty() {
        warnings.push(Warning::AllTablesExcluded);
        return tables;
    }

    tables.sort();
    tables.dedup();
    tracing::debug!(count = tables.len(), "selected tables");
    tables
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_sorted_without_filters() {
        let mut warnings = Warnings::new();
        let selected = select_tables(names(&["foo", "bar", "baz"]), None, None, &mut warnings);

        assert_eq!(selected, names(&["bar", "baz", "foo"]));
        assert!(warnings.is_empty());
    }

    #[test]
    fn test_include_then_exclude() {
        let include = Regex::new("^luser").unwrap();
        let exclude = Regex::new("opts$").unwrap();
        let mut warnings = Warnings::new();

        let selected = select_tables(
            names(&["luser_opts", "luser", "other", "luser_group"]),
            Some(&include),
            Some(&exclude),
            &mut warnings,
        );

        assert_eq!(selected, names(&["luser", "luser_group"]));
    }

    #[test]
    fn test_include_matches_nothing() {
        let include = Regex::new("^nope").unwrap();
        let mut warnings = Warnings::new();

        let selected = select_tables(names(&["foo"]), Some(&include), None, &mut warnings);

        assert!(selected.is_empty());
        assert!(warnings.contains(&Warning::AllTablesExcluded));
    }

    #[test]
    fn test_empty_catalog() {
        let mut warnings = Warnings::new();
        let selected = select_tables(Vec::new(), None, None, &mut warnings);

        assert!(selected.is_empty());
        assert!(warnings.contains(&Warning::NoTablesFound));
    }

    #[test]
    fn test_unanchored_match() {
        let exclude = Regex::new("tmp").unwrap();
        let mut warnings = Warnings::new();

        let selected = select_tables(
            names(&["a_tmp_b", "keep"]),
            None,
            Some(&exclude),
            &mut warnings,
        );

        assert_eq!(selected, names(&["keep"]));
    }
}
