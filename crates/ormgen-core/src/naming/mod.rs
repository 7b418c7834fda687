//! Table and relationship naming.
//!
//! Two mappings live here:
//! - table name -> moniker (class identifier)
//! - moniker -> relationship accessor name, through an [`Inflector`]
//!
//! Both can be overridden by an explicit map or a function; an override
//! that yields a non-empty name always wins over the default algorithm.

mod inflect;
mod moniker;

pub use inflect::{EnglishInflector, Inflector, LegacyInflector};
pub use moniker::{
    default_moniker, is_identifier, is_plain_moniker, is_valid_moniker, table_to_moniker,
};

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Direction of a relationship accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Cardinality {
    /// The owner row references one remote row.
    ToOne,
    /// Many remote rows reference the owner row.
    ToMany,
}

/// A caller supplied name override.
#[derive(Clone)]
pub enum NameOverride {
    /// Explicit lookup table.
    Map(HashMap<String, String>),
    /// Function returning `None` (or an empty string) to fall back to the default.
    Func(Arc<dyn Fn(&str) -> Option<String> + Send + Sync>),
}

impl NameOverride {
    /// Build a map override from pairs.
    pub fn map(pairs: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>) -> Self {
        NameOverride::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// Build a function override.
    pub fn func(f: impl Fn(&str) -> Option<String> + Send + Sync + 'static) -> Self {
        NameOverride::Func(Arc::new(f))
    }

    /// Look up `key`, ignoring empty results.
    pub fn lookup(&self, key: &str) -> Option<String> {
        let found = match self {
            NameOverride::Map(map) => map.get(key).cloned(),
            NameOverride::Func(f) => f(key),
        };
        found.filter(|name| !name.is_empty())
    }
}

impl fmt::Debug for NameOverride {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NameOverride::Map(map) => f.debug_tuple("Map").field(map).finish(),
            NameOverride::Func(_) => f.write_str("Func(..)"),
        }
    }
}

/// Naming policy for one run: inflector plus overrides.
pub struct NameMapper {
    inflector: Box<dyn Inflector>,
    moniker_map: Option<NameOverride>,
    plural: Option<NameOverride>,
    singular: Option<NameOverride>,
}

impl NameMapper {
    /// Create a mapper using `inflector` and no overrides.
    pub fn new(inflector: Box<dyn Inflector>) -> Self {
        Self {
            inflector,
            moniker_map: None,
            plural: None,
            singular: None,
        }
    }

    /// Set the table -> moniker override.
    pub fn with_moniker_map(mut self, overrides: Option<NameOverride>) -> Self {
        self.moniker_map = overrides;
        self
    }

    /// Set the plural override.
    pub fn with_plural(mut self, overrides: Option<NameOverride>) -> Self {
        self.plural = overrides;
        self
    }

    /// Set the singular override.
    pub fn with_singular(mut self, overrides: Option<NameOverride>) -> Self {
        self.singular = overrides;
        self
    }

    /// Moniker for `table`.
    pub fn moniker(&self, table: &str) -> String {
        table_to_moniker(table, self.moniker_map.as_ref())
    }

    /// Plural form of `word`, override first.
    pub fn to_plural(&self, word: &str) -> String {
        self.plural
            .as_ref()
            .and_then(|o| o.lookup(word))
            .unwrap_or_else(|| self.inflector.to_plural(word))
    }

    /// Singular form of `word`, override first.
    pub fn to_singular(&self, word: &str) -> String {
        self.singular
            .as_ref()
            .and_then(|o| o.lookup(word))
            .unwrap_or_else(|| self.inflector.to_singular(word))
    }

    /// Default accessor name for a relationship towards `moniker`.
    ///
    /// The moniker is lower-cased, then pluralized for to-many and
    /// singularized for to-one accessors.
    pub fn relationship_name(&self, moniker: &str, cardinality: Cardinality) -> String {
        let word = moniker.to_lowercase();
        match cardinality {
            Cardinality::ToMany => self.to_plural(&word),
            Cardinality::ToOne => self.to_singular(&word),
        }
    }
}

impl Default for NameMapper {
    fn default() -> Self {
        Self::new(Box::new(EnglishInflector))
    }
}

impl fmt::Debug for NameMapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameMapper")
            .field("moniker_map", &self.moniker_map)
            .field("plural", &self.plural)
            .field("singular", &self.singular)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relationship_names() {
        let mapper = NameMapper::default();
        assert_eq!(mapper.relationship_name("Bar", Cardinality::ToMany), "bars");
        assert_eq!(mapper.relationship_name("Foo", Cardinality::ToOne), "foo");
        assert_eq!(
            mapper.relationship_name("Categories", Cardinality::ToOne),
            "category"
        );
    }

    #[test]
    fn test_plural_override_map_wins() {
        let mapper = NameMapper::default().with_plural(Some(NameOverride::map([("bar", "barz")])));
        assert_eq!(mapper.relationship_name("Bar", Cardinality::ToMany), "barz");
        assert_eq!(mapper.relationship_name("Baz", Cardinality::ToMany), "bazes");
    }

    #[test]
    fn test_override_function_falls_back_on_empty() {
        let mapper = NameMapper::default().with_singular(Some(NameOverride::func(|w| {
            if w == "geese" {
                Some("goosey".to_string())
            } else {
                Some(String::new())
            }
        })));
        assert_eq!(mapper.to_singular("geese"), "goosey");
        assert_eq!(mapper.to_singular("bars"), "bar");
    }

    #[test]
    fn test_legacy_inflector_is_swappable() {
        let mapper = NameMapper::new(Box::new(LegacyInflector));
        assert_eq!(
            mapper.relationship_name("Category", Cardinality::ToMany),
            "categorys"
        );
    }
}
