//! The closed label set stereotype output is validated against.

use crate::core::{ClassStereotype, MethodStereotype};
use crate::error::EngineError;
use std::collections::BTreeSet;
use std::path::Path;

/// The set of admissible labels. The built-in taxonomy is the union of the
/// method and class label enums; a side file can replace it, in which case
/// every computed label must still be a member.
#[derive(Clone, Debug)]
pub struct Taxonomy {
    labels: BTreeSet<String>,
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::built_in()
    }
}

impl Taxonomy {
    pub fn built_in() -> Taxonomy {
        let mut labels = BTreeSet::new();
        labels.extend(MethodStereotype::ALL.iter().map(|l| l.as_str().to_string()));
        labels.extend(ClassStereotype::ALL.iter().map(|l| l.as_str().to_string()));
        Taxonomy { labels }
    }

    /// Load a taxonomy file: one label per line, `#` comments, blank lines
    /// ignored.
    pub fn load(path: &Path) -> Result<Taxonomy, EngineError> {
        let text = std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
        let labels: BTreeSet<String> = text
            .lines()
            .map(|line| line.split('#').next().unwrap_or("").trim())
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect();
        if labels.is_empty() {
            return Err(EngineError::InvalidTaxonomy {
                path: path.to_path_buf(),
                reason: "file contains no labels".to_string(),
            });
        }
        Ok(Taxonomy { labels })
    }

    pub fn contains(&self, label: &str) -> bool {
        self.labels.contains(label)
    }

    /// Check every label in a computed list against the taxonomy.
    pub fn validate<'a>(
        &self,
        labels: impl IntoIterator<Item = &'a str>,
    ) -> Result<(), EngineError> {
        for label in labels {
            if !self.contains(label) {
                return Err(EngineError::UnknownLabel(label.to_string()));
            }
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
