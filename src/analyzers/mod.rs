//! Model extraction from the archive: per-method static analysis and
//! class model building.

pub mod class;
pub mod method;

pub use class::{build_classes, BuiltClass};
pub use method::{analyze_method, MethodScope};
