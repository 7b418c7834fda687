//! Text rendering of dump artifacts.

use super::layout;
use crate::schema::{ClassDescriptor, SchemaOp, SchemaRegistry};
use std::fmt;
use std::path::PathBuf;

/// Start of the line closing the generated region.
pub const MARKER_PREFIX: &str = "// DO NOT MODIFY THIS OR ANYTHING ABOVE! checksum:";

/// Custom region written into fresh artifacts.
pub(crate) const DEFAULT_CUSTOM: &str =
    "\n// Custom code below this line is preserved by merge runs.\n";

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn checksum(text: &str) -> String {
    hex::encode(blake3::hash(text.as_bytes()).as_bytes())
}

/// The generated region of one artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Path relative to the dump directory.
    pub path: PathBuf,
    /// Everything above the marker line.
    pub generated: String,
}

impl GeneratedFile {
    pub fn checksum(&self) -> String {
        checksum(&self.generated)
    }

    /// Generated region, marker line, then `custom`.
    pub fn contents(&self, custom: &str) -> String {
        format!("{}{}{}\n{}", self.generated, MARKER_PREFIX, self.checksum(), custom)
    }
}

/// An existing artifact split at its marker line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MarkedContent<'a> {
    pub generated: &'a str,
    pub checksum: &'a str,
    /// Everything after the marker line.
    pub custom: &'a str,
}

impl MarkedContent<'_> {
    /// Whether the generated region still matches its recorded checksum.
    pub fn is_intact(&self) -> bool {
        checksum(self.generated) == self.checksum
    }
}

/// Split `content` at the first marker line, if any.
pub fn split_marker(content: &str) -> Option<MarkedContent<'_>> {
    let mut offset = 0;
    for line in content.split_inclusive('\n') {
        if let Some(rest) = line.strip_prefix(MARKER_PREFIX) {
            return Some(MarkedContent {
                generated: &content[..offset],
                checksum: rest.trim_end(),
                custom: &content[offset + line.len()..],
            });
        }
        offset += line.len();
    }
    None
}

/// Source text of a class artifact's generated region.
struct ClassSource<'a>(&'a ClassDescriptor);

impl fmt::Display for ClassSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let class = self.0;
        writeln!(f, "// @generated by ormgen {VERSION}")?;
        writeln!(f, "// Class {} for table `{}`", class.class_path(), class.table)?;
        writeln!(f)?;
        writeln!(f, "use ormgen_core::emit::ClassBuilder;")?;
        writeln!(f)?;
        writeln!(f, "pub fn register(class: &mut dyn ClassBuilder) {{")?;
        for op in class.ops() {
            writeln!(f, "    class.{op};")?;
        }
        writeln!(f, "}}")?;

        if let Some(extension) = &class.extension {
            let path = extension.path.display();
            writeln!(f)?;
            writeln!(f, "// Lines loaded from '{path}'")?;
            f.write_str(&extension.content)?;
            if !extension.content.ends_with('\n') {
                writeln!(f)?;
            }
            writeln!(f, "// End of lines loaded from '{path}'")?;
        }
        writeln!(f)
    }
}

/// Source text of the schema artifact's generated region.
struct SchemaSource<'a>(&'a SchemaRegistry);

impl fmt::Display for SchemaSource<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let registry = self.0;
        let ops = registry.ops();
        writeln!(f, "// @generated by ormgen {VERSION}")?;
        writeln!(f, "// Schema {}", registry.namespace())?;
        writeln!(f)?;
        writeln!(f, "use ormgen_core::emit::SchemaSink;")?;
        writeln!(f)?;

        for op in &ops {
            let SchemaOp::LoadClass { module, .. } = op;
            writeln!(f, "pub mod {module};")?;
        }
        if !ops.is_empty() {
            writeln!(f)?;
        }

        writeln!(f, "pub fn register(schema: &mut dyn SchemaSink) {{")?;
        for op in &ops {
            let SchemaOp::LoadClass { module, .. } = op;
            writeln!(f, "    {module}::register(schema.{op});")?;
        }
        writeln!(f, "}}")?;
        writeln!(f)
    }
}

/// Render one class artifact from its operation log.
pub fn render_class(class: &ClassDescriptor) -> GeneratedFile {
    GeneratedFile {
        path: layout::class_file(&class.namespace, &class.moniker),
        generated: ClassSource(class).to_string(),
    }
}

/// Render the schema artifact.
pub fn render_schema(registry: &SchemaRegistry) -> GeneratedFile {
    GeneratedFile {
        path: layout::schema_file(registry.namespace()),
        generated: SchemaSource(registry).to_string(),
    }
}

/// Schema artifact first, then classes in moniker order.
pub fn render_all(registry: &SchemaRegistry) -> Vec<GeneratedFile> {
    std::iter::once(render_schema(registry))
        .chain(registry.classes().map(render_class))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::UniqueConstraint;
    use crate::extension::Extension;
    use pretty_assertions::assert_eq;

    fn foo() -> ClassDescriptor {
        let mut class = ClassDescriptor::new("Foo", "my_app::schema", "foo");
        class.bind_table();
        class.add_columns(vec!["id".to_string(), "name".to_string()]);
        class.set_primary_key(vec!["id".to_string()]);
        class.add_unique_constraint(UniqueConstraint::new("foo_name_key", ["name"]));
        class
    }

    #[test]
    fn test_render_class() {
        let file = render_class(&foo());

        assert_eq!(file.path, PathBuf::from("my_app/schema/foo.rs"));
        assert_eq!(
            file.generated,
            format!(
                r#"// @generated by ormgen {VERSION}
// Class my_app::schema::Foo for table `foo`

use ormgen_core::emit::ClassBuilder;

pub fn register(class: &mut dyn ClassBuilder) {{
    class.table("foo");
    class.add_columns(&["id", "name"]);
    class.set_primary_key(&["id"]);
    class.add_unique_constraint("foo_name_key", &["name"]);
}}

"#
            )
        );
    }

    #[test]
    fn test_render_schema() {
        let mut registry = SchemaRegistry::new("my_app::schema");
        registry.register(foo()).unwrap();
        registry
            .register(ClassDescriptor::new("LuserGroup", "my_app::schema", "luser_group"))
            .unwrap();

        let file = render_schema(&registry);

        assert_eq!(file.path, PathBuf::from("my_app/schema.rs"));
        assert!(file.generated.contains("pub mod foo;\npub mod luser_group;\n"));
        assert!(file.generated.contains(
            r#"    luser_group::register(schema.load_class("my_app::schema::LuserGroup"));"#
        ));
    }

    #[test]
    fn test_render_empty_schema() {
        let file = render_schema(&SchemaRegistry::new("s"));

        assert_eq!(
            file.generated,
            format!(
                r#"// @generated by ormgen {VERSION}
// Schema s

use ormgen_core::emit::SchemaSink;

pub fn register(schema: &mut dyn SchemaSink) {{
}}

"#
            )
        );
    }

    #[test]
    fn test_extension_is_inlined() {
        let mut class = foo();
        class.extension = Some(Extension {
            path: PathBuf::from("ext/foo.rs"),
            content: "pub fn shout() {}".to_string(),
        });

        let generated = render_class(&class).generated;
        assert!(generated.contains(
            "// Lines loaded from 'ext/foo.rs'\npub fn shout() {}\n// End of lines loaded from 'ext/foo.rs'\n"
        ));
    }

    #[test]
    fn test_marker_round_trip() {
        let file = render_class(&foo());
        let contents = file.contents("\nfn custom() {}\n");

        let split = split_marker(&contents).unwrap();
        assert_eq!(split.generated, file.generated);
        assert_eq!(split.custom, "\nfn custom() {}\n");
        assert!(split.is_intact());
    }

    #[test]
    fn test_tampered_region_detected() {
        let contents = render_class(&foo()).contents(DEFAULT_CUSTOM);
        let tampered = contents.replacen("\"name\"", "\"nom\"", 1);

        assert!(!split_marker(&tampered).unwrap().is_intact());
        assert!(split_marker("no marker here\n").is_none());
    }
}
