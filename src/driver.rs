//! The archive driver: walks units in document order, builds class
//! models, runs both classifiers, and emits the annotated copy plus the
//! summary report.

use crate::analyzers::build_classes;
use crate::catalog;
use crate::classify::{classify_class, classify_method};
use crate::config::Context;
use crate::core::{join_labels, Language, STEREOTYPE_ATTR};
use crate::error::EngineError;
use crate::report::ArchiveReport;
use crate::xml::Archive;
use std::collections::BTreeMap;
use xot::Node;

#[derive(Debug)]
pub struct AnnotatedArchive {
    /// The serialised copy of the input with `stereotype` attributes.
    pub xml: String,
    pub report: ArchiveReport,
}

/// Per-unit mapping from element XPath to the annotation applied there.
/// The serialiser consults it (via `apply`) before the copy is emitted.
#[derive(Debug, Default)]
struct AnnotationMap {
    by_unit: BTreeMap<usize, BTreeMap<String, (Node, String)>>,
}

impl AnnotationMap {
    fn insert(&mut self, unit_index: usize, xpath: String, node: Node, labels: String) {
        self.by_unit
            .entry(unit_index)
            .or_default()
            .insert(xpath, (node, labels));
    }

    fn apply(&self, archive: &mut Archive) {
        for annotations in self.by_unit.values() {
            for (node, labels) in annotations.values() {
                archive.set_attribute(*node, STEREOTYPE_ATTR, labels);
            }
        }
    }
}

/// Annotate a parsed-source archive. Fatal errors surface as
/// `EngineError`; unknown-language units are skipped with a warning.
pub fn annotate(input: &str, ctx: &Context) -> Result<AnnotatedArchive, EngineError> {
    let mut archive = Archive::parse(input)?;
    let units = collect_units(&mut archive)?;

    let mut annotations = AnnotationMap::default();
    let mut report = ArchiveReport::default();

    for (unit_index, unit) in units.iter().enumerate() {
        let language_tag = archive
            .attribute(*unit, "language")
            .unwrap_or_default();
        let Some(language) = Language::from_unit_attr(&language_tag) else {
            log::warn!("skipping unit {unit_index}: unknown language '{language_tag}'");
            continue;
        };
        let filename = archive.attribute(*unit, "filename");
        report.start_unit(unit_index, language, filename);

        let class_nodes = archive.nodes(catalog::class_locator(language), *unit);
        log::debug!(
            "unit {unit_index} ({language}): {} class elements",
            class_nodes.len()
        );

        let mut built = build_classes(&mut archive, ctx, language, unit_index, &class_nodes);
        for class in &mut built {
            for method in &mut class.model.methods {
                method.stereotypes = classify_method(method, language);
                ctx.taxonomy
                    .validate(method.stereotypes.iter().map(|l| l.as_str()))?;
            }
            class.model.stereotypes =
                classify_class(&class.model, ctx.methods_per_class_threshold);
            ctx.taxonomy
                .validate(class.model.stereotypes.iter().map(|l| l.as_str()))?;

            let class_labels = class.model.label_string();
            for &occurrence in &class.occurrences {
                annotations.insert(
                    unit_index,
                    archive.node_xpath(occurrence),
                    occurrence,
                    class_labels.clone(),
                );
            }
            for (method, &node) in class.model.methods.iter().zip(&class.method_nodes) {
                annotations.insert(
                    unit_index,
                    method.xpath.clone(),
                    node,
                    join_labels(method.stereotypes.iter().map(|l| l.as_str())),
                );
            }
            report.record_class(unit_index, &class.model);
        }
    }

    annotations.apply(&mut archive);
    Ok(AnnotatedArchive {
        xml: archive.to_xml()?,
        report,
    })
}

/// The units of the archive: the root element when it is itself a tagged
/// unit, otherwise its direct `unit` children. A child unit without a
/// language attribute makes the archive malformed.
fn collect_units(archive: &mut Archive) -> Result<Vec<Node>, EngineError> {
    let root = archive.root_element();
    if archive.element_name(root) != "unit" {
        return Err(EngineError::MalformedArchive(format!(
            "root element is '{}', expected 'unit'",
            archive.element_name(root)
        )));
    }
    if archive.attribute(root, "language").is_some() {
        return Ok(vec![root]);
    }
    let children = archive.nodes(catalog::UNIT_CHILDREN, root);
    if children.is_empty() {
        return Err(EngineError::MalformedArchive(
            "archive root carries no language attribute and no nested units".to_string(),
        ));
    }
    for (index, unit) in children.iter().enumerate() {
        if archive.attribute(*unit, "language").is_none() {
            return Err(EngineError::MissingLanguage(index));
        }
    }
    Ok(children)
}
