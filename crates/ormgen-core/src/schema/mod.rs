//! Class descriptors, the schema registry and the operation log.

mod builder;
mod class;
mod ops;
mod registry;

pub use builder::{attach_extensions, SchemaBuilder};
pub use class::{
    ClassDescriptor, Composition, JoinColumn, RelationshipAccessor, RelationshipKind,
};
pub use ops::{ClassOp, SchemaOp};
pub use registry::SchemaRegistry;
