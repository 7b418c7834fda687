//! Emission of a built schema.
//!
//! Three emitters replay the same operation log:
//! - [`DumpEmitter`] writes one artifact per class plus a schema artifact
//! - [`DebugEmitter`] renders trace lines
//! - [`LiveEmitter`] drives a runtime implementing [`SchemaSink`]

mod debug;
mod dump;
pub mod layout;
mod render;

pub use debug::DebugEmitter;
pub use dump::{DumpEmitter, DumpPolicy, DumpReport};
pub use render::{render_all, split_marker, GeneratedFile, MarkedContent, MARKER_PREFIX};

use crate::error::Result;
use crate::schema::SchemaRegistry;

/// Runtime-side class construction, one method per recorded operation.
///
/// Dumped artifacts call these methods directly, so the signatures are part
/// of the generated code's contract. Join pairs are `(self column, foreign column)`.
pub trait ClassBuilder {
    fn use_classes(&mut self, classes: &[&str]);
    fn apply_mixins(&mut self, mixins: &[&str]);
    fn load_components(&mut self, components: &[&str]);
    fn load_resultset_components(&mut self, components: &[&str]);
    fn table(&mut self, table: &str);
    fn add_columns(&mut self, columns: &[&str]);
    fn set_primary_key(&mut self, columns: &[&str]);
    fn add_unique_constraint(&mut self, name: &str, columns: &[&str]);
    fn belongs_to(&mut self, name: &str, target: &str, join: &[(&str, &str)]);
    fn has_many(&mut self, name: &str, target: &str, join: &[(&str, &str)]);
}

/// Runtime-side schema registration.
pub trait SchemaSink {
    /// Create (or fetch) the class at `class_path` for population.
    fn load_class(&mut self, class_path: &str) -> &mut dyn ClassBuilder;
}

/// Something that consumes a finished registry.
pub trait Emitter {
    type Output;

    fn emit(&mut self, registry: &SchemaRegistry) -> Result<Self::Output>;
}

/// Replays the registry into a live runtime.
pub struct LiveEmitter<'a> {
    sink: &'a mut dyn SchemaSink,
}

impl<'a> LiveEmitter<'a> {
    pub fn new(sink: &'a mut dyn SchemaSink) -> Self {
        Self { sink }
    }
}

impl Emitter for LiveEmitter<'_> {
    type Output = usize;

    /// Returns the number of classes loaded.
    fn emit(&mut self, registry: &SchemaRegistry) -> Result<usize> {
        let ops = registry.ops();
        for (op, class) in ops.iter().zip(registry.classes()) {
            op.apply(&mut *self.sink, class.ops());
        }
        Ok(ops.len())
    }
}
