//! The optional JSON summary report.

use crate::core::{ClassModel, Language};
use serde::Serialize;
use std::collections::BTreeMap;
use std::io::Write;

#[derive(Debug, Default, Serialize)]
pub struct ArchiveReport {
    pub units: Vec<UnitReport>,
    /// Archive-wide method label counts.
    pub method_totals: BTreeMap<String, usize>,
    /// Archive-wide class label counts.
    pub class_totals: BTreeMap<String, usize>,
}

#[derive(Debug, Serialize)]
pub struct UnitReport {
    pub index: usize,
    pub language: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    pub classes: Vec<ClassReport>,
}

#[derive(Debug, Serialize)]
pub struct ClassReport {
    pub name: String,
    pub xpaths: Vec<String>,
    pub stereotypes: Vec<String>,
    pub methods: Vec<MethodReport>,
}

#[derive(Debug, Serialize)]
pub struct MethodReport {
    pub name: String,
    pub xpath: String,
    pub stereotypes: Vec<String>,
}

impl ArchiveReport {
    pub fn start_unit(&mut self, index: usize, language: Language, filename: Option<String>) {
        self.units.push(UnitReport {
            index,
            language: language.as_str().to_string(),
            filename,
            classes: Vec::new(),
        });
    }

    /// Record a classified class under the most recently started unit.
    pub fn record_class(&mut self, unit_index: usize, model: &ClassModel) {
        for label in &model.stereotypes {
            *self
                .class_totals
                .entry(label.as_str().to_string())
                .or_default() += 1;
        }

        let methods = model
            .methods
            .iter()
            .map(|method| {
                for label in &method.stereotypes {
                    *self
                        .method_totals
                        .entry(label.as_str().to_string())
                        .or_default() += 1;
                }
                MethodReport {
                    name: method.name.clone(),
                    xpath: method.xpath.clone(),
                    stereotypes: method.stereotypes.iter().map(|l| l.to_string()).collect(),
                }
            })
            .collect();

        let class = ClassReport {
            name: model.names.trimmed.clone(),
            xpaths: model
                .xpaths_by_unit
                .get(&unit_index)
                .cloned()
                .unwrap_or_default(),
            stereotypes: model.stereotypes.iter().map(|l| l.to_string()).collect(),
            methods,
        };
        if let Some(unit) = self.units.last_mut() {
            unit.classes.push(class);
        }
    }

    pub fn write_json<W: Write>(&self, mut writer: W) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ClassStereotype, Method, MethodStereotype};

    #[test]
    fn totals_accumulate_across_classes() {
        let mut report = ArchiveReport::default();
        report.start_unit(0, Language::Java, Some("A.java".to_string()));

        let mut model = ClassModel::default();
        model.names.trimmed = "A".to_string();
        model.stereotypes = vec![ClassStereotype::DataClass, ClassStereotype::SmallClass];
        model.methods.push(Method {
            name: "getX".to_string(),
            stereotypes: vec![MethodStereotype::Get],
            ..Method::default()
        });
        report.record_class(0, &model);
        report.record_class(0, &model);

        assert_eq!(report.class_totals["data-class"], 2);
        assert_eq!(report.method_totals["get"], 2);
        assert_eq!(report.units[0].classes.len(), 2);
    }

    #[test]
    fn report_serialises_to_json() {
        let mut report = ArchiveReport::default();
        report.start_unit(0, Language::Cpp, None);
        let mut out = Vec::new();
        report.write_json(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("\"language\": \"C++\""));
    }
}
