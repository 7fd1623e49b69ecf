//! Per-method static analysis.
//!
//! Runs fixed XPath sub-queries against one method subtree and folds the
//! results into the `Method` model: parameters, locals, return
//! expressions, call categorisation, attribute reads and writes,
//! const-ness and the factory predicates. The archive dialect keeps
//! expressions flat (operands are direct children of `expr`), which the
//! scans below rely on.

use crate::catalog;
use crate::config::Context;
use crate::core::{Language, Method, Variable, THIS_ATTRIBUTE};
use crate::normalize::{self, PrevTypeResolver};
use crate::xml::Archive;
use std::collections::{HashMap, HashSet};
use xot::Node;

/// What the enclosing class contributes to the analysis of one method.
pub struct MethodScope<'a> {
    pub language: Language,
    pub class_bare_name: &'a str,
    /// Attribute name to variable, `this` sentinel included.
    pub attributes: &'a HashMap<String, Variable>,
    /// Names of all methods of the class, for intra-class call detection.
    pub method_names: &'a HashSet<String>,
    /// Attributes whose declaration initialiser is a constructor call.
    pub ctor_initialized_attributes: &'a HashSet<String>,
}

const RETURNS: &str = "./block//return";
const CALLS: &str = "./block//call";
const EXPRS: &str = "./block//expr";
const LOCAL_DECLS: &str = "./block//decl_stmt/decl";
const PARAM_DECLS: &str = "./parameter_list/parameter/decl";

/// Assignment operators that make the preceding name a write target.
const ASSIGN_OPS: &[&str] = &[
    "=", "+=", "-=", "*=", "/=", "%=", "&=", "|=", "^=", "<<=", ">>=",
];

pub fn analyze_method(
    archive: &mut Archive,
    ctx: &Context,
    scope: &MethodScope<'_>,
    node: Node,
    synthetic_return: Option<&str>,
) -> Method {
    let mut method = Method::default();
    let language = scope.language;

    let element = archive.element_name(node);
    method.is_constructor_or_destructor = matches!(element.as_str(), "constructor" | "destructor");
    method.is_destructor = element == "destructor";

    method.xpath = archive.node_xpath(node);
    method.name = archive
        .first_string("./name", node)
        .map(|n| normalize::trim(&n).to_string())
        .unwrap_or_default();

    method.parameters_text = archive
        .first_string("./parameter_list", node)
        .unwrap_or_default();
    method.is_copy_constructor = method.is_constructor_or_destructor
        && !method.is_destructor
        && !scope.class_bare_name.is_empty()
        && method.parameters_text.contains(scope.class_bare_name);

    method.return_type_raw = match synthetic_return {
        Some(declared) => declared.to_string(),
        None => archive.first_string("./type", node).unwrap_or_default(),
    };
    method.return_type_parsed = normalize::base_identifier(&method.return_type_raw, language);
    method.returns_void_ptr = is_void_pointer(&method.return_type_raw);
    method.is_const = language == Language::Cpp
        && archive
            .strings("./specifier", node)
            .iter()
            .any(|s| s.trim() == "const");

    method.parameters = declared_variables(archive, ctx, scope, node, PARAM_DECLS);
    method.locals = declared_variables(archive, ctx, scope, node, LOCAL_DECLS);
    method.is_empty_body = body_is_empty(archive, node);

    let ctor_locals = constructor_initialized_locals(archive, node, ctx, scope);
    let scan = scan_expressions(archive, node);
    let calls = scan_calls(archive, scope, node);
    let returns = scan_returns(archive, scope, node, &ctor_locals);

    method.intra_calls = calls.intra;
    method.member_calls = calls.member;
    method.constructor_calls = calls.constructor;
    method.external_method_calls = count_external_method_calls(&calls, &method);
    // Receivers that resolve to nothing known (qualified free functions,
    // statics on other classes) count as free-function calls.
    method.external_function_calls = calls.external_function
        + (calls.candidate_receivers.len() - method.external_method_calls);

    method.uses_attribute = scan.uses_this
        || calls.receivers_on_attributes
        || scan
            .referenced
            .iter()
            .any(|name| scope.attributes.contains_key(name));

    method.returns_attribute = returns.simple_attribute;
    method.returns_complex = returns.complex;
    method.is_factory = returns.constructor_returns > 0;
    method.is_strict_factory =
        returns.total > 0 && returns.constructor_returns == returns.total;

    let written_attributes: HashSet<&String> = scan
        .written
        .iter()
        .filter(|name| *name != THIS_ATTRIBUTE && scope.attributes.contains_key(*name))
        .collect();
    method.attributes_modified = written_attributes.len();

    let local_types: HashMap<&str, &Variable> = method
        .parameters
        .iter()
        .chain(method.locals.iter())
        .map(|v| (v.name.as_str(), v))
        .collect();

    method.ref_param_modified = method.parameters.iter().any(|param| {
        is_mutable_reference(&param.type_name, language) && scan.written.contains(&param.name)
    });
    method.external_local_or_param_modified = scan
        .written
        .iter()
        .filter_map(|name| local_types.get(name.as_str()))
        .any(|var| var.is_external_non_primitive);

    method.uses_external_attribute = scan
        .referenced
        .iter()
        .chain(calls.attribute_receivers.iter())
        .filter_map(|name| scope.attributes.get(name))
        .any(|var| var.is_external_non_primitive);
    method.has_external_parameter = method
        .parameters
        .iter()
        .any(|v| v.is_external_non_primitive);
    method.has_external_local = method.locals.iter().any(|v| v.is_external_non_primitive);
    method.returns_external = !method.return_type_raw.trim().is_empty()
        && !ctx
            .primitives
            .is_primitive(&method.return_type_raw, language)
        && external_to_class(&method.return_type_parsed, scope);

    method
}

fn external_to_class(base: &str, scope: &MethodScope<'_>) -> bool {
    scope.class_bare_name.is_empty() || base != scope.class_bare_name
}

/// `void*` (any pointer depth) for the languages that have it.
fn is_void_pointer(raw_type: &str) -> bool {
    let squeezed: String = raw_type.chars().filter(|c| !c.is_whitespace()).collect();
    squeezed.starts_with("void*")
}

fn is_mutable_reference(type_name: &str, language: Language) -> bool {
    match language {
        Language::Cpp => type_name.contains('&') && !type_name.contains("const"),
        Language::CSharp => {
            let words: Vec<&str> = type_name.split_whitespace().collect();
            words.contains(&"ref") || words.contains(&"out")
        }
        Language::Java => false,
    }
}

fn make_variable(ctx: &Context, scope: &MethodScope<'_>, name: String, type_name: String) -> Variable {
    let is_non_primitive = !type_name.trim().is_empty()
        && !ctx.primitives.is_primitive(&type_name, scope.language);
    let base = normalize::base_identifier(&type_name, scope.language);
    Variable {
        is_external_non_primitive: is_non_primitive && external_to_class(&base, scope),
        is_non_primitive,
        name,
        type_name,
    }
}

fn declared_variables(
    archive: &mut Archive,
    ctx: &Context,
    scope: &MethodScope<'_>,
    node: Node,
    query: &str,
) -> Vec<Variable> {
    let mut resolver = PrevTypeResolver::new();
    let mut variables = Vec::new();
    for decl in archive.nodes(query, node) {
        let name = archive
            .first_string("./name", decl)
            .map(|n| normalize::strip_array_suffix(normalize::trim(&n)).to_string())
            .unwrap_or_default();
        let declared = match archive.first_node("./type", decl) {
            Some(type_node) if archive.attribute(type_node, "ref").as_deref() == Some("prev") => {
                resolver.resolve(None)
            }
            Some(type_node) => resolver.resolve(Some(archive.text(type_node))),
            None => resolver.resolve(None),
        };
        if name.is_empty() && declared.is_empty() {
            continue;
        }
        variables.push(make_variable(ctx, scope, name, declared));
    }
    variables
}

/// A body is empty when it holds nothing but comments. A missing body
/// (abstract or interface method) counts as empty too.
fn body_is_empty(archive: &mut Archive, node: Node) -> bool {
    match archive.first_node("./block", node) {
        Some(block) => archive
            .child_elements(block)
            .iter()
            .all(|child| archive.element_name(*child) == "comment"),
        None => true,
    }
}

/// Split a (possibly qualified) name element into its identifier segments:
/// `this->count` gives `["this", "count"]`, a plain `total` gives
/// `["total"]`.
fn name_segments(archive: &Archive, name_node: Node) -> Vec<String> {
    let parts: Vec<String> = archive
        .child_elements(name_node)
        .into_iter()
        .filter(|child| archive.element_name(*child) == "name")
        .map(|child| normalize::trim(&archive.text(child)).to_string())
        .collect();
    if parts.is_empty() {
        vec![normalize::trim(&archive.text(name_node)).to_string()]
    } else {
        parts
    }
}

/// The identifiers a name expression reads: the head segment, or for a
/// `this`-qualified access both the sentinel and the member.
fn referenced_identifiers(segments: &[String]) -> Vec<String> {
    match segments.first().map(String::as_str) {
        Some(THIS_ATTRIBUTE) => {
            let mut out = vec![THIS_ATTRIBUTE.to_string()];
            if let Some(member) = segments.get(1) {
                out.push(member.clone());
            }
            out
        }
        Some(head) => vec![head.to_string()],
        None => Vec::new(),
    }
}

/// The identifier an assignment to this name actually mutates: the head
/// segment, unless the access is `this`-qualified.
fn written_identifier(segments: &[String]) -> Option<String> {
    match segments.first().map(String::as_str) {
        Some(THIS_ATTRIBUTE) => segments.get(1).cloned(),
        Some(head) => Some(head.to_string()),
        None => None,
    }
}

#[derive(Default)]
struct ExpressionScan {
    referenced: HashSet<String>,
    written: HashSet<String>,
    uses_this: bool,
}

fn scan_expressions(archive: &mut Archive, node: Node) -> ExpressionScan {
    let mut scan = ExpressionScan::default();
    for expr in archive.nodes(EXPRS, node) {
        let children = archive.child_elements(expr);
        for (index, child) in children.iter().enumerate() {
            match archive.element_name(*child).as_str() {
                "name" => {
                    let segments = name_segments(archive, *child);
                    for identifier in referenced_identifiers(&segments) {
                        if identifier == THIS_ATTRIBUTE {
                            scan.uses_this = true;
                        }
                        scan.referenced.insert(identifier);
                    }
                    if followed_by_assignment(archive, &children, index) {
                        if let Some(target) = written_identifier(&segments) {
                            scan.written.insert(target);
                        }
                    }
                }
                "operator" => {
                    // Prefix increment/decrement.
                    let op = archive.text(*child);
                    let op = op.trim();
                    if (op == "++" || op == "--") && index + 1 < children.len() {
                        let next = children[index + 1];
                        if archive.element_name(next) == "name" {
                            let segments = name_segments(archive, next);
                            if let Some(target) = written_identifier(&segments) {
                                scan.written.insert(target);
                            }
                        }
                    }
                }
                _ => {}
            }
        }
    }
    scan
}

fn followed_by_assignment(archive: &Archive, children: &[Node], index: usize) -> bool {
    let Some(next) = children.get(index + 1) else {
        return false;
    };
    if archive.element_name(*next) != "operator" {
        return false;
    }
    let op = archive.text(*next);
    let op = op.trim();
    ASSIGN_OPS.contains(&op) || op == "++" || op == "--"
}

#[derive(Default)]
struct CallScan {
    intra: usize,
    member: usize,
    constructor: usize,
    external_function: usize,
    /// Receivers that resolve to locals or parameters, by name; settled
    /// into external-method or free-function calls once the declared
    /// types are known.
    candidate_receivers: Vec<String>,
    /// Attribute names used as call receivers.
    attribute_receivers: Vec<String>,
    receivers_on_attributes: bool,
}

fn scan_calls(archive: &mut Archive, scope: &MethodScope<'_>, node: Node) -> CallScan {
    let mut scan = CallScan::default();
    for call in archive.nodes(CALLS, node) {
        let Some(name_node) = archive.first_node("./name", call) else {
            continue;
        };
        let full_name: String = archive
            .text(name_node)
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        if catalog::is_ignored_call(scope.language, &full_name) {
            continue;
        }
        if preceded_by_new(archive, call) {
            scan.constructor += 1;
            continue;
        }

        let segments = name_segments(archive, name_node);
        if segments.len() <= 1 {
            let callee = segments.first().cloned().unwrap_or_default();
            if scope.method_names.contains(&callee) {
                scan.intra += 1;
            } else {
                scan.external_function += 1;
            }
            continue;
        }

        let receiver = segments[0].as_str();
        if receiver == THIS_ATTRIBUTE {
            scan.intra += 1;
            scan.receivers_on_attributes = true;
        } else if scope.attributes.contains_key(receiver) {
            scan.member += 1;
            scan.receivers_on_attributes = true;
            scan.attribute_receivers.push(receiver.to_string());
        } else {
            scan.candidate_receivers.push(receiver.to_string());
        }
    }
    scan
}

/// Settle receiver-based candidates: a receiver declared as an external
/// non-primitive local or parameter is an external method call.
fn count_external_method_calls(calls: &CallScan, method: &Method) -> usize {
    let external_names: HashSet<&str> = method
        .parameters
        .iter()
        .chain(method.locals.iter())
        .filter(|v| v.is_external_non_primitive)
        .map(|v| v.name.as_str())
        .collect();
    calls
        .candidate_receivers
        .iter()
        .filter(|receiver| external_names.contains(receiver.as_str()))
        .count()
}

/// Whether the nearest preceding sibling element of a call is the `new`
/// operator, marking a constructor invocation.
pub(crate) fn preceded_by_new(archive: &Archive, call: Node) -> bool {
    let Some(parent) = archive.parent(call) else {
        return false;
    };
    let mut previous: Option<Node> = None;
    for child in archive.child_elements(parent) {
        if child == call {
            break;
        }
        previous = Some(child);
    }
    match previous {
        Some(node) => {
            archive.element_name(node) == "operator" && archive.text(node).trim() == "new"
        }
        None => false,
    }
}

/// Locals whose initialiser is a constructor invocation, plus (C++) direct
/// initialisation with an argument list on a non-primitive type.
fn constructor_initialized_locals(
    archive: &mut Archive,
    node: Node,
    ctx: &Context,
    scope: &MethodScope<'_>,
) -> HashSet<String> {
    let mut initialized = HashSet::new();
    for decl in archive.nodes(LOCAL_DECLS, node) {
        let Some(name) = archive.first_string("./name", decl) else {
            continue;
        };
        let name = normalize::trim(&name).to_string();
        let by_new = archive
            .nodes(".//call", decl)
            .into_iter()
            .any(|call| preceded_by_new(archive, call));
        let by_direct_init = scope.language == Language::Cpp
            && archive.first_node("./argument_list", decl).is_some()
            && archive
                .first_string("./type", decl)
                .map(|t| !ctx.primitives.is_primitive(&t, scope.language))
                .unwrap_or(false);
        if by_new || by_direct_init {
            initialized.insert(name);
        }
    }
    initialized
}

#[derive(Default)]
struct ReturnScan {
    total: usize,
    simple_attribute: bool,
    complex: bool,
    constructor_returns: usize,
}

fn scan_returns(
    archive: &mut Archive,
    scope: &MethodScope<'_>,
    node: Node,
    ctor_locals: &HashSet<String>,
) -> ReturnScan {
    let mut scan = ReturnScan::default();
    for ret in archive.nodes(RETURNS, node) {
        let Some(expr) = archive.first_node("./expr", ret) else {
            continue; // bare `return;`
        };
        scan.total += 1;

        let children = archive.child_elements(expr);
        let simple_name = match children.as_slice() {
            [only] if archive.element_name(*only) == "name" => Some(*only),
            _ => None,
        };

        match simple_name {
            Some(name_node) => {
                let segments = name_segments(archive, name_node);
                let target = match segments.as_slice() {
                    [single] if single != THIS_ATTRIBUTE => Some(single.clone()),
                    [this, member] if this == THIS_ATTRIBUTE => Some(member.clone()),
                    _ => None,
                };
                match target {
                    Some(name) if scope.attributes.contains_key(&name) => {
                        scan.simple_attribute = true;
                        if scope.ctor_initialized_attributes.contains(&name) {
                            scan.constructor_returns += 1;
                        }
                    }
                    Some(name) => {
                        scan.complex = true;
                        if ctor_locals.contains(&name) {
                            scan.constructor_returns += 1;
                        }
                    }
                    None => scan.complex = true, // `return this;` and friends
                }
            }
            None => {
                scan.complex = true;
                let creates = archive
                    .nodes(".//call", expr)
                    .into_iter()
                    .any(|call| preceded_by_new(archive, call));
                if creates {
                    scan.constructor_returns += 1;
                }
            }
        }
    }
    scan
}
