//! Class model building.
//!
//! For each class element located in a unit, runs the catalog queries to
//! assemble names, parents, attributes and methods, delegating per-method
//! analysis to `analyzers::method`. C# partial classes accumulate into one
//! model per unit; a bookmark of the attribute count before each
//! occurrence keeps names and types aligned by position.

use crate::analyzers::method::{analyze_method, preceded_by_new, MethodScope};
use crate::catalog::{self, QueryKind};
use crate::config::Context;
use crate::core::{
    ClassModel, ClassNames, InheritanceVisibility, Language, StructureKind, Variable,
};
use crate::normalize::{self, PrevTypeResolver};
use crate::xml::Archive;
use std::collections::{HashMap, HashSet};
use xot::Node;

/// A built model together with the nodes annotations are written to.
#[derive(Debug)]
pub struct BuiltClass {
    pub model: ClassModel,
    /// The class element occurrences (several for a partial class).
    pub occurrences: Vec<Node>,
    /// One node per entry of `model.methods`, in the same order.
    pub method_nodes: Vec<Node>,
}

/// Build the class models of one unit. Class nodes arrive in document
/// order; C# occurrences sharing a non-empty trimmed name merge into a
/// single model.
pub fn build_classes(
    archive: &mut Archive,
    ctx: &Context,
    language: Language,
    unit_index: usize,
    class_nodes: &[Node],
) -> Vec<BuiltClass> {
    let mut built: Vec<BuiltClass> = Vec::new();
    let mut by_name: HashMap<String, usize> = HashMap::new();

    for &node in class_nodes {
        let names = class_names(archive, language, node);
        let merge_target = (language == Language::CSharp && !names.trimmed.is_empty())
            .then(|| by_name.get(&names.trimmed).copied())
            .flatten();

        match merge_target {
            Some(index) => extend_class(archive, ctx, language, unit_index, &mut built[index], node),
            None => {
                if language == Language::CSharp && !names.trimmed.is_empty() {
                    by_name.insert(names.trimmed.clone(), built.len());
                }
                let class = start_class(archive, ctx, language, unit_index, names, node);
                built.push(class);
            }
        }
    }

    for class in &mut built {
        finish_methods(archive, ctx, language, class);
    }
    built
}

fn start_class(
    archive: &mut Archive,
    ctx: &Context,
    language: Language,
    unit_index: usize,
    names: ClassNames,
    node: Node,
) -> BuiltClass {
    let mut model = ClassModel {
        names,
        ..ClassModel::default()
    };
    model
        .attributes
        .insert(Variable::this().name.clone(), Variable::this());

    let kind = archive
        .first_node(catalog::xpath(language, QueryKind::ClassType), node)
        .map(|class_node| StructureKind::from_element_name(&archive.element_name(class_node)));
    model.kind = kind;

    let mut class = BuiltClass {
        model,
        occurrences: Vec::new(),
        method_nodes: Vec::new(),
    };
    extend_class(archive, ctx, language, unit_index, &mut class, node);
    class
}

/// Fold one class element occurrence into the model: parents, attributes
/// (aligned from the current count onward) and method nodes. Method
/// subtrees are only analysed in `finish_methods`, once the full method
/// name set is known.
fn extend_class(
    archive: &mut Archive,
    ctx: &Context,
    language: Language,
    unit_index: usize,
    class: &mut BuiltClass,
    node: Node,
) {
    let model = &mut class.model;
    let xpath = archive.node_xpath(node);
    model.xpaths_by_unit.entry(unit_index).or_default().push(xpath);
    class.occurrences.push(node);

    collect_parents(archive, language, model, node);

    let bare = model.names.bare.clone();
    collect_attributes(
        archive,
        ctx,
        language,
        &bare,
        node,
        QueryKind::AttributeName,
        QueryKind::AttributeType,
        &mut model.attributes,
    );
    collect_attributes(
        archive,
        ctx,
        language,
        &bare,
        node,
        QueryKind::NonPrivateAttributeName,
        QueryKind::NonPrivateAttributeType,
        &mut model.non_private_attributes,
    );

    let method_nodes = archive.nodes(catalog::xpath(language, QueryKind::Method), node);
    class.method_nodes.extend(method_nodes);
    if language == Language::CSharp {
        for property in archive.nodes(catalog::xpath(language, QueryKind::Property), node) {
            for accessor in
                archive.nodes(catalog::xpath(language, QueryKind::PropertyMethod), property)
            {
                class.method_nodes.push(accessor);
            }
        }
    }
}

fn class_names(archive: &mut Archive, language: Language, node: Node) -> ClassNames {
    let raw = archive
        .first_string(catalog::xpath(language, QueryKind::ClassName), node)
        .unwrap_or_default();
    if raw.trim().is_empty() {
        return ClassNames::default();
    }
    let trimmed = normalize::trim(&raw).to_string();
    ClassNames {
        generics_stripped: normalize::remove_between_commas(&trimmed),
        bare: normalize::base_identifier(&trimmed, language),
        raw,
        trimmed,
    }
}

fn collect_parents(archive: &mut Archive, language: Language, model: &mut ClassModel, node: Node) {
    let default_visibility = match (language, model.kind) {
        (Language::Cpp, Some(StructureKind::Class)) => InheritanceVisibility::Private,
        _ => InheritanceVisibility::Public,
    };
    for parent in archive.nodes(catalog::xpath(language, QueryKind::ParentName), node) {
        // C++ parents are `super` elements carrying specifier + name; the
        // other languages resolve directly to name elements.
        let (name, visibility) = match archive.first_node("./name", parent) {
            Some(name_node) => {
                let spec = archive
                    .first_string("./specifier", parent)
                    .map(|s| s.trim().to_string());
                let visibility = match spec.as_deref() {
                    Some("public") => InheritanceVisibility::Public,
                    Some("protected") => InheritanceVisibility::Protected,
                    Some("private") => InheritanceVisibility::Private,
                    _ => default_visibility,
                };
                (archive.text(name_node), visibility)
            }
            None => (archive.text(parent), InheritanceVisibility::Public),
        };
        let name = normalize::trim(&name).to_string();
        if !name.is_empty() {
            model.parents.insert(name, visibility);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn collect_attributes(
    archive: &mut Archive,
    ctx: &Context,
    language: Language,
    bare_class_name: &str,
    node: Node,
    name_kind: QueryKind,
    type_kind: QueryKind,
    into: &mut HashMap<String, Variable>,
) {
    let name_nodes = archive.nodes(catalog::xpath(language, name_kind), node);
    let type_nodes = archive.nodes(catalog::xpath(language, type_kind), node);
    let mut resolver = PrevTypeResolver::new();

    for (index, name_node) in name_nodes.iter().enumerate() {
        let name = normalize::strip_array_suffix(normalize::trim(&archive.text(*name_node))).to_string();
        let declared = match type_nodes.get(index) {
            Some(type_node) if archive.attribute(*type_node, "ref").as_deref() == Some("prev") => {
                resolver.resolve(None)
            }
            Some(type_node) => resolver.resolve(Some(archive.text(*type_node))),
            None => resolver.resolve(None),
        };
        if name.is_empty() {
            continue;
        }
        let is_non_primitive =
            !declared.trim().is_empty() && !ctx.primitives.is_primitive(&declared, language);
        let base = normalize::base_identifier(&declared, language);
        let variable = Variable {
            name: name.clone(),
            type_name: declared,
            is_non_primitive,
            is_external_non_primitive: is_non_primitive
                && (bare_class_name.is_empty() || base != bare_class_name),
        };
        into.insert(name, variable);
    }
}

/// Attributes whose declaration initialiser constructs an object; feeds
/// the factory return analysis.
fn constructor_initialized_attributes(
    archive: &mut Archive,
    language: Language,
    occurrences: &[Node],
) -> HashSet<String> {
    let mut initialized = HashSet::new();
    for &node in occurrences {
        for name_node in archive.nodes(catalog::xpath(language, QueryKind::AttributeName), node) {
            let Some(decl) = archive.parent(name_node) else {
                continue;
            };
            let has_new_init = archive
                .nodes(".//call", decl)
                .into_iter()
                .any(|call| preceded_by_new(archive, call));
            if has_new_init {
                initialized.insert(normalize::trim(&archive.text(name_node)).to_string());
            }
        }
    }
    initialized
}

/// Analyse every collected method node against the completed attribute and
/// method-name sets.
fn finish_methods(archive: &mut Archive, ctx: &Context, language: Language, class: &mut BuiltClass) {
    let mut method_names: HashSet<String> = HashSet::new();
    for &node in &class.method_nodes {
        if let Some(name) = archive.first_string("./name", node) {
            method_names.insert(normalize::trim(&name).to_string());
        }
    }

    let ctor_initialized =
        constructor_initialized_attributes(archive, language, &class.occurrences);

    let attributes = class.model.attributes.clone();
    let bare = class.model.names.bare.clone();
    let scope = MethodScope {
        language,
        class_bare_name: &bare,
        attributes: &attributes,
        method_names: &method_names,
        ctor_initialized_attributes: &ctor_initialized,
    };

    for &node in &class.method_nodes {
        let synthetic_return = property_return_type(archive, language, node);
        let method = analyze_method(archive, ctx, &scope, node, synthetic_return.as_deref());
        if method.is_constructor_or_destructor {
            class.model.constructor_destructor_count += 1;
        }
        class.model.methods.push(method);
    }
}

/// For a C# property accessor, the synthetic return type is the declared
/// property type.
fn property_return_type(archive: &mut Archive, language: Language, node: Node) -> Option<String> {
    if language != Language::CSharp {
        return None;
    }
    let block = archive.parent(node)?;
    let property = archive.parent(block)?;
    if archive.element_name(property) != "property" {
        return None;
    }
    archive.first_string(catalog::xpath(language, QueryKind::PropertyType), property)
}
