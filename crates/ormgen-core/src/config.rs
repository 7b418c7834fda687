//! Loader configuration.
//!
//! [`LoaderOptions`] is the programmatic form and accepts function-valued
//! overrides. [`LoaderConfig`] is the file form, deserialized from JSON,
//! where overrides can only be maps.

use crate::emit::DumpPolicy;
use crate::error::{Error, Result};
use crate::naming::{
    is_identifier, EnglishInflector, Inflector, LegacyInflector, NameMapper, NameOverride,
};
use crate::schema::Composition;
use crate::warning::Warning;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Namespace used when none is configured.
pub const DEFAULT_SCHEMA_NAME: &str = "schema";

/// Options for one loader run.
#[derive(Debug, Clone)]
pub struct LoaderOptions {
    /// Namespace classes are placed in, e.g. `my_app::schema`.
    pub schema_name: String,
    /// Infer relationships from foreign keys.
    pub relationships: bool,
    /// Only tables matching this pattern are loaded.
    pub constraint: Option<Regex>,
    /// Tables matching this pattern are skipped.
    pub exclude: Option<Regex>,
    pub moniker_map: Option<NameOverride>,
    pub inflect_plural: Option<NameOverride>,
    pub inflect_singular: Option<NameOverride>,
    /// Modules every class brings into scope.
    pub additional_classes: Vec<String>,
    /// Mixins composed after `left_base_classes`.
    pub additional_base_classes: Vec<String>,
    /// Mixins composed first.
    pub left_base_classes: Vec<String>,
    pub components: Vec<String>,
    pub resultset_components: Vec<String>,
    /// Use naive `s` inflection instead of the English rules.
    pub legacy_default_inflections: bool,
    /// Write artifacts here.
    pub dump_directory: Option<PathBuf>,
    /// Render the operation log as trace lines.
    pub debug: bool,
    /// Delete existing artifacts before dumping.
    pub really_erase_my_files: bool,
    /// Rewrite generated regions of existing artifacts in place.
    pub merge_existing: bool,
    /// Directories searched for hand-written class extensions.
    pub extension_dirs: Vec<PathBuf>,
    pub(crate) deprecations: Vec<Warning>,
}

impl LoaderOptions {
    /// Create options for `schema_name` with everything else at its default.
    pub fn new(schema_name: impl Into<String>) -> Self {
        Self {
            schema_name: schema_name.into(),
            relationships: false,
            constraint: None,
            exclude: None,
            moniker_map: None,
            inflect_plural: None,
            inflect_singular: None,
            additional_classes: Vec::new(),
            additional_base_classes: Vec::new(),
            left_base_classes: Vec::new(),
            components: Vec::new(),
            resultset_components: Vec::new(),
            legacy_default_inflections: false,
            dump_directory: None,
            debug: false,
            really_erase_my_files: false,
            merge_existing: false,
            extension_dirs: Vec::new(),
            deprecations: Vec::new(),
        }
    }

    pub fn with_relationships(mut self, enabled: bool) -> Self {
        self.relationships = enabled;
        self
    }

    pub fn with_constraint(mut self, pattern: Regex) -> Self {
        self.constraint = Some(pattern);
        self
    }

    pub fn with_exclude(mut self, pattern: Regex) -> Self {
        self.exclude = Some(pattern);
        self
    }

    pub fn with_moniker_map(mut self, overrides: NameOverride) -> Self {
        self.moniker_map = Some(overrides);
        self
    }

    pub fn with_inflect_plural(mut self, overrides: NameOverride) -> Self {
        self.inflect_plural = Some(overrides);
        self
    }

    pub fn with_inflect_singular(mut self, overrides: NameOverride) -> Self {
        self.inflect_singular = Some(overrides);
        self
    }

    pub fn with_additional_classes(
        mut self,
        classes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.additional_classes = classes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_additional_base_classes(
        mut self,
        classes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.additional_base_classes = classes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_left_base_classes(
        mut self,
        classes: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.left_base_classes = classes.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_components(mut self, components: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.components = components.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_resultset_components(
        mut self,
        components: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.resultset_components = components.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_legacy_default_inflections(mut self, enabled: bool) -> Self {
        self.legacy_default_inflections = enabled;
        self
    }

    pub fn with_dump_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.dump_directory = Some(dir.into());
        self
    }

    pub fn with_debug(mut self, enabled: bool) -> Self {
        self.debug = enabled;
        self
    }

    pub fn with_really_erase_my_files(mut self, enabled: bool) -> Self {
        self.really_erase_my_files = enabled;
        self
    }

    pub fn with_merge_existing(mut self, enabled: bool) -> Self {
        self.merge_existing = enabled;
        self
    }

    /// Add a directory to search for class extensions.
    pub fn with_extension_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.extension_dirs.push(dir.into());
        self
    }

    /// Deprecation warnings raised while building these options.
    pub fn deprecations(&self) -> &[Warning] {
        &self.deprecations
    }

    /// Check the options are consistent.
    pub fn validate(&self) -> Result<()> {
        if !self.schema_name.split("::").all(is_identifier) {
            return Err(Error::Config(format!(
                "invalid schema name `{}`",
                self.schema_name
            )));
        }
        if self.really_erase_my_files && self.merge_existing {
            return Err(Error::Config(
                "`really_erase_my_files` and `merge_existing` are mutually exclusive".to_string(),
            ));
        }
        Ok(())
    }

    /// Inflector selected by `legacy_default_inflections`.
    pub fn inflector(&self) -> Box<dyn Inflector> {
        if self.legacy_default_inflections {
            Box::new(LegacyInflector)
        } else {
            Box::new(EnglishInflector)
        }
    }

    /// Name mapper with the configured overrides around `inflector`.
    pub fn name_mapper_with(&self, inflector: Box<dyn Inflector>) -> NameMapper {
        NameMapper::new(inflector)
            .with_moniker_map(self.moniker_map.clone())
            .with_plural(self.inflect_plural.clone())
            .with_singular(self.inflect_singular.clone())
    }

    pub fn name_mapper(&self) -> NameMapper {
        self.name_mapper_with(self.inflector())
    }

    /// Composition applied to every class. `left_base_classes` come first.
    pub fn composition(&self) -> Composition {
        Composition {
            uses: self.additional_classes.clone(),
            mixins: self
                .left_base_classes
                .iter()
                .chain(&self.additional_base_classes)
                .cloned()
                .collect(),
            components: self.components.clone(),
            resultset_components: self.resultset_components.clone(),
        }
    }

    pub fn dump_policy(&self) -> DumpPolicy {
        if self.really_erase_my_files {
            DumpPolicy::Erase
        } else if self.merge_existing {
            DumpPolicy::Merge
        } else {
            DumpPolicy::Refuse
        }
    }
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self::new(DEFAULT_SCHEMA_NAME)
    }
}

/// File form of [`LoaderOptions`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoaderConfig {
    pub schema_name: Option<String>,
    pub relationships: bool,
    pub constraint: Option<String>,
    pub exclude: Option<String>,
    pub moniker_map: Option<HashMap<String, String>>,
    pub inflect_plural: Option<HashMap<String, String>>,
    pub inflect_singular: Option<HashMap<String, String>>,
    /// Deprecated alias of `inflect_plural`.
    pub inflect_map: Option<HashMap<String, String>>,
    pub additional_classes: Vec<String>,
    pub additional_base_classes: Vec<String>,
    pub left_base_classes: Vec<String>,
    pub components: Vec<String>,
    pub resultset_components: Vec<String>,
    pub legacy_default_inflections: bool,
    pub dump_directory: Option<PathBuf>,
    pub debug: bool,
    pub really_erase_my_files: bool,
    /// Deprecated alias of `really_erase_my_files`.
    pub dump_overwrite: Option<bool>,
    pub merge_existing: bool,
    pub extension_dirs: Vec<PathBuf>,
}

impl LoaderConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    /// Compile patterns and resolve deprecated keys.
    ///
    /// A deprecated key is honored only when its replacement is unset; either
    /// way a deprecation warning is carried into the run.
    pub fn into_options(self) -> Result<LoaderOptions> {
        let mut options =
            LoaderOptions::new(self.schema_name.unwrap_or_else(|| DEFAULT_SCHEMA_NAME.into()));

        options.relationships = self.relationships;
        options.constraint = self.constraint.as_deref().map(Regex::new).transpose()?;
        options.exclude = self.exclude.as_deref().map(Regex::new).transpose()?;
        options.moniker_map = self.moniker_map.map(NameOverride::Map);
        options.inflect_singular = self.inflect_singular.map(NameOverride::Map);

        let mut plural = self.inflect_plural;
        if let Some(map) = self.inflect_map {
            options.deprecations.push(Warning::DeprecatedOption {
                option: "inflect_map".to_string(),
                replacement: "inflect_plural".to_string(),
            });
            if plural.is_none() {
                plural = Some(map);
            }
        }
        options.inflect_plural = plural.map(NameOverride::Map);

        options.really_erase_my_files = self.really_erase_my_files;
        if let Some(overwrite) = self.dump_overwrite {
            options.deprecations.push(Warning::DeprecatedOption {
                option: "dump_overwrite".to_string(),
                replacement: "really_erase_my_files".to_string(),
            });
            options.really_erase_my_files |= overwrite;
        }

        options.additional_classes = self.additional_classes;
        options.additional_base_classes = self.additional_base_classes;
        options.left_base_classes = self.left_base_classes;
        options.components = self.components;
        options.resultset_components = self.resultset_components;
        options.legacy_default_inflections = self.legacy_default_inflections;
        options.dump_directory = self.dump_directory;
        options.debug = self.debug;
        options.merge_existing = self.merge_existing;
        options.extension_dirs = self.extension_dirs;

        options.validate()?;
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = LoaderOptions::default();
        assert_eq!(options.schema_name, "schema");
        assert!(!options.relationships);
        assert_eq!(options.dump_policy(), DumpPolicy::Refuse);
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_invalid_schema_name() {
        for name in ["", "my app", "my_app::", "1schema"] {
            let err = LoaderOptions::new(name).validate().unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{name}");
        }
        assert!(LoaderOptions::new("my_app::schema").validate().is_ok());
    }

    #[test]
    fn test_erase_and_merge_conflict() {
        let options = LoaderOptions::default()
            .with_really_erase_my_files(true)
            .with_merge_existing(true);
        assert!(matches!(options.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_composition_order() {
        let composition = LoaderOptions::default()
            .with_left_base_classes(["Left"])
            .with_additional_base_classes(["Extra"])
            .with_additional_classes(["helpers"])
            .composition();

        assert_eq!(composition.mixins, vec!["Left", "Extra"]);
        assert_eq!(composition.uses, vec!["helpers"]);
    }

    #[test]
    fn test_config_from_json() {
        let config = LoaderConfig::from_json(
            r#"{
                "schema_name": "my_app::schema",
                "relationships": true,
                "constraint": "^lu",
                "moniker_map": { "luser": "User" },
                "dump_directory": "out"
            }"#,
        )
        .unwrap();
        let options = config.into_options().unwrap();

        assert_eq!(options.schema_name, "my_app::schema");
        assert!(options.relationships);
        assert!(options.constraint.as_ref().unwrap().is_match("luser"));
        assert_eq!(options.name_mapper().moniker("luser"), "User");
        assert_eq!(options.dump_directory, Some(PathBuf::from("out")));
        assert!(options.deprecations.is_empty());
    }

    #[test]
    fn test_unknown_key_rejected() {
        let err = LoaderConfig::from_json(r#"{ "relationship": true }"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_bad_pattern() {
        let config = LoaderConfig::from_json(r#"{ "exclude": "(" }"#).unwrap();
        assert!(matches!(config.into_options(), Err(Error::Pattern(_))));
    }

    #[test]
    fn test_deprecated_keys() {
        let config = LoaderConfig::from_json(
            r#"{ "inflect_map": { "datum": "data" }, "dump_overwrite": true }"#,
        )
        .unwrap();
        let options = config.into_options().unwrap();

        assert!(options.really_erase_my_files);
        assert_eq!(options.name_mapper().to_plural("datum"), "data");
        assert_eq!(
            options.deprecations(),
            &[
                Warning::DeprecatedOption {
                    option: "inflect_map".to_string(),
                    replacement: "inflect_plural".to_string(),
                },
                Warning::DeprecatedOption {
                    option: "dump_overwrite".to_string(),
                    replacement: "really_erase_my_files".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_replacement_wins_over_deprecated_key() {
        let config = LoaderConfig::from_json(
            r#"{ "inflect_plural": { "datum": "datums" }, "inflect_map": { "datum": "data" } }"#,
        )
        .unwrap();
        let options = config.into_options().unwrap();

        assert_eq!(options.name_mapper().to_plural("datum"), "datums");
        assert_eq!(options.deprecations().len(), 1);
    }

    #[test]
    fn test_legacy_inflector() {
        let options = LoaderOptions::default().with_legacy_default_inflections(true);
        assert_eq!(options.name_mapper().to_plural("person"), "persons");
        assert_eq!(LoaderOptions::default().name_mapper().to_plural("person"), "people");
    }
}
