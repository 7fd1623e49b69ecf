// Export modules for library usage
pub mod analyzers;
pub mod catalog;
pub mod classify;
pub mod cli;
pub mod config;
pub mod core;
pub mod driver;
pub mod error;
pub mod normalize;
pub mod primitives;
pub mod report;
pub mod xml;

// Re-export commonly used types
pub use crate::classify::{classify_class, classify_method};
pub use crate::config::{Context, StereotypeConfig, DEFAULT_METHODS_PER_CLASS_THRESHOLD};
pub use crate::core::{
    ClassModel, ClassNames, ClassStereotype, InheritanceVisibility, Language, Method,
    MethodStereotype, StructureKind, Taxonomy, Variable,
};
pub use crate::driver::{annotate, AnnotatedArchive};
pub use crate::error::EngineError;
pub use crate::primitives::PrimitiveTable;
pub use crate::report::ArchiveReport;
