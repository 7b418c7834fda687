//! Trace rendering of the operation log.

use super::Emitter;
use crate::error::Result;
use crate::schema::SchemaRegistry;

/// Renders every recorded operation as `path::method(args)`.
///
/// Each line is logged at debug level and returned.
#[derive(Debug, Default, Clone, Copy)]
pub struct DebugEmitter;

impl DebugEmitter {
    pub fn new() -> Self {
        Self
    }

    /// Trace lines for `registry`: schema operations first, then each class.
    pub fn lines(registry: &SchemaRegistry) -> Vec<String> {
        let mut lines: Vec<String> = registry
            .ops()
            .iter()
            .map(|op| format!("{}::{}", registry.namespace(), op))
            .collect();

        for class in registry.classes() {
            let path = class.class_path();
            lines.extend(class.ops().iter().map(|op| format!("{path}::{op}")));
        }
        lines
    }
}

impl Emitter for DebugEmitter {
    type Output = Vec<String>;

    fn emit(&mut self, registry: &SchemaRegistry) -> Result<Vec<String>> {
        let lines = Self::lines(registry);
        for line in &lines {
            tracing::debug!(target: "ormgen::trace", "{line}");
        }
        Ok(lines)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emit::render::render_class;
    use crate::schema::ClassDescriptor;

    #[test]
    fn test_trace_lines() {
        let mut registry = SchemaRegistry::new("s");
        let mut foo = ClassDescriptor::new("Foo", "s", "foo");
        foo.bind_table();
        foo.add_columns(vec!["id".to_string()]);
        registry.register(foo).unwrap();

        let lines = DebugEmitter::new().emit(&registry).unwrap();
        assert_eq!(
            lines,
            vec![
                r#"s::load_class("s::Foo")"#,
                r#"s::Foo::table("foo")"#,
                r#"s::Foo::add_columns(&["id"])"#,
            ]
        );
    }

    #[test]
    fn test_trace_matches_dump_body() {
        let mut registry = SchemaRegistry::new("s");
        let mut foo = ClassDescriptor::new("Foo", "s", "foo");
        foo.bind_table();
        foo.add_columns(vec!["id".to_string(), "name".to_string()]);
        foo.set_primary_key(vec!["id".to_string()]);
        registry.register(foo).unwrap();

        let generated = render_class(registry.class("Foo").unwrap()).generated;
        for line in DebugEmitter::lines(&registry).iter().skip(1) {
            let call = line.trim_start_matches("s::Foo::");
            assert!(generated.contains(&format!("    class.{call};\n")), "{call}");
        }
    }
}
