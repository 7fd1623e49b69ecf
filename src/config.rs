//! Engine configuration and the injected context.
//!
//! The context bundles everything that was once global in annotation
//! tools of this kind: the primitive table, the taxonomy and the
//! large-class threshold. It is passed to every builder and classifier,
//! keeping the engine reentrant and letting tests construct contexts
//! directly.

use crate::core::Taxonomy;
use crate::error::EngineError;
use crate::primitives::PrimitiveTable;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Method count above which a class qualifies for `large-class`.
pub const DEFAULT_METHODS_PER_CLASS_THRESHOLD: usize = 21;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StereotypeConfig {
    #[serde(default = "default_threshold")]
    pub methods_per_class_threshold: usize,
    /// Replaces the built-in primitive table when set.
    #[serde(default)]
    pub primitives_path: Option<PathBuf>,
    /// Replaces the built-in stereotype taxonomy when set.
    #[serde(default)]
    pub stereotypes_path: Option<PathBuf>,
}

fn default_threshold() -> usize {
    DEFAULT_METHODS_PER_CLASS_THRESHOLD
}

impl Default for StereotypeConfig {
    fn default() -> Self {
        Self {
            methods_per_class_threshold: default_threshold(),
            primitives_path: None,
            stereotypes_path: None,
        }
    }
}

/// Read-only state shared by the whole run.
#[derive(Clone, Debug)]
pub struct Context {
    pub primitives: PrimitiveTable,
    pub taxonomy: Taxonomy,
    pub methods_per_class_threshold: usize,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            primitives: PrimitiveTable::built_in(),
            taxonomy: Taxonomy::built_in(),
            methods_per_class_threshold: DEFAULT_METHODS_PER_CLASS_THRESHOLD,
        }
    }
}

impl Context {
    pub fn from_config(config: &StereotypeConfig) -> Result<Context, EngineError> {
        let primitives = match &config.primitives_path {
            Some(path) => PrimitiveTable::load(path)?,
            None => PrimitiveTable::built_in(),
        };
        let taxonomy = match &config.stereotypes_path {
            Some(path) => Taxonomy::load(path)?,
            None => Taxonomy::built_in(),
        };
        Ok(Context {
            primitives,
            taxonomy,
            methods_per_class_threshold: config.methods_per_class_threshold,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_uses_built_ins() {
        let ctx = Context::from_config(&StereotypeConfig::default()).unwrap();
        assert_eq!(ctx.methods_per_class_threshold, 21);
        assert!(ctx.taxonomy.contains("get"));
    }

    #[test]
    fn custom_threshold_survives() {
        let config = StereotypeConfig {
            methods_per_class_threshold: 5,
            ..StereotypeConfig::default()
        };
        let ctx = Context::from_config(&config).unwrap();
        assert_eq!(ctx.methods_per_class_threshold, 5);
    }

    #[test]
    fn missing_primitives_file_is_fatal() {
        let config = StereotypeConfig {
            primitives_path: Some(PathBuf::from("/nonexistent/primitives.txt")),
            ..StereotypeConfig::default()
        };
        assert!(Context::from_config(&config).is_err());
    }
}
