//! Mapping of namespaces and monikers to dump-relative file paths.
//!
//! `my_app::schema` lives in `my_app/schema.rs` and its class `LuserGroup`
//! in `my_app/schema/luser_group.rs`.

use heck::ToSnakeCase;
use std::path::PathBuf;

/// Module name holding the class `moniker`.
pub fn module_name(moniker: &str) -> String {
    moniker.replace("::", "_").to_snake_case()
}

fn namespace_dir(namespace: &str) -> PathBuf {
    namespace
        .split("::")
        .filter(|s| !s.is_empty())
        .map(|s| s.to_snake_case())
        .collect()
}

/// Path of the schema-level artifact.
pub fn schema_file(namespace: &str) -> PathBuf {
    namespace_dir(namespace).with_extension("rs")
}

/// Path of one class artifact.
pub fn class_file(namespace: &str, moniker: &str) -> PathBuf {
    namespace_dir(namespace).join(format!("{}.rs", module_name(moniker)))
}
