//! Domain error types for the stereotype engine.
//!
//! Fatal conditions (malformed archive, unusable side files) get their own
//! variants; everything else flows through `anyhow` at the application
//! boundary. XPath *evaluation* failures are deliberately not represented
//! here: at every call site an evaluation error is folded into "no results",
//! since absence of a match is semantically meaningful.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// The input archive failed to parse or is not a parsed-source archive.
    #[error("malformed archive: {0}")]
    MalformedArchive(String),

    /// A unit element in archive position lacks the mandatory language tag.
    #[error("malformed archive: unit {0} has no language attribute")]
    MissingLanguage(usize),

    /// The primitive-type file could not be parsed.
    #[error("invalid primitive table {path}: {reason}")]
    InvalidPrimitives { path: PathBuf, reason: String },

    /// A custom primitive table leaves a supported language without entries.
    #[error("primitive table is missing entries for language {0}")]
    PrimitivesMissingLanguage(&'static str),

    /// The taxonomy file could not be parsed.
    #[error("invalid stereotype taxonomy {path}: {reason}")]
    InvalidTaxonomy { path: PathBuf, reason: String },

    /// A computed label is not part of the loaded taxonomy.
    #[error("computed stereotype '{0}' is outside the loaded taxonomy")]
    UnknownLabel(String),

    /// Serialisation of the annotated copy failed.
    #[error("failed to serialise annotated archive: {0}")]
    Serialise(String),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl EngineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
