// Column schema registry
//
// Declarative per-column contracts (declared type, unit, sentinel error value,
// inclusive numeric bounds) that drive every cleaning stage.

pub mod column;
pub mod registry;

pub use column::{ColumnSchema, DeclaredType};
pub use registry::{SchemaError, SchemaRegistry};
