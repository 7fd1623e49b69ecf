//! The ordered method stereotype rule set.
//!
//! Rules run in a fixed order and accumulate labels; only the
//! constructor/destructor rule preempts the rest. `incidental` and
//! `stateless` describe methods nothing else captured, so they apply only
//! when no earlier rule fired.

use crate::catalog;
use crate::core::{Language, Method, MethodStereotype};

pub fn classify_method(method: &Method, language: Language) -> Vec<MethodStereotype> {
    if method.is_constructor_or_destructor {
        let label = if method.is_destructor {
            MethodStereotype::Destructor
        } else if method.is_copy_constructor {
            MethodStereotype::CopyConstructor
        } else {
            MethodStereotype::Constructor
        };
        return vec![label];
    }

    let mut labels = Vec::new();
    let accessor_context = method.uses_attribute || method.intra_calls >= 1;

    if method.returns_attribute && !returns_plain_void(method) {
        labels.push(MethodStereotype::Get);
    }

    let is_boolean = catalog::boolean_types(language).contains(&method.return_type_parsed.as_str());
    if is_boolean && method.returns_complex && accessor_context {
        labels.push(MethodStereotype::Predicate);
    }

    // `void*` is neither void nor boolean here.
    let has_property_type = !method.return_type_parsed.is_empty()
        && !is_boolean
        && (method.return_type_parsed != "void" || method.returns_void_ptr)
        && method.return_type_parsed != "Void";
    if has_property_type && method.returns_complex && accessor_context && !method.is_strict_factory
    {
        labels.push(MethodStereotype::Property);
    }

    if returns_plain_void(method) && method.ref_param_modified && accessor_context {
        labels.push(MethodStereotype::VoidAccessor);
    }

    let collaborative_calls = method.intra_calls + method.member_calls;
    if method.attributes_modified == 1 && collaborative_calls <= 1 {
        labels.push(MethodStereotype::Set);
    }

    let command_shape = method.attributes_modified >= 2
        || (method.attributes_modified == 1 && collaborative_calls >= 2)
        || (method.attributes_modified == 0 && collaborative_calls >= 1);
    let mutability_ok = !method.is_const
        || (language == Language::Cpp && method.attributes_modified >= 2);
    if command_shape && mutability_ok {
        if returns_plain_void(method) {
            labels.push(MethodStereotype::Command);
        } else if matches!(language, Language::Cpp | Language::CSharp) {
            labels.push(MethodStereotype::NonVoidCommand);
        }
    }

    if method.is_factory || method.is_strict_factory {
        labels.push(MethodStereotype::Factory);
    }

    if !method.is_empty_body {
        let no_state = method.attributes_modified == 0
            && method.intra_calls == 0
            && method.member_calls == 0;
        let is_factory_method = labels.contains(&MethodStereotype::Factory);
        if no_state && method.external_method_calls == 0 && method.external_function_calls >= 1 {
            labels.push(MethodStereotype::Wrapper);
        } else if no_state
            && (method.external_method_calls >= 1 || method.external_local_or_param_modified)
        {
            labels.push(MethodStereotype::Controller);
        } else if !is_factory_method
            && (method.uses_external_attribute
                || method.has_external_local
                || method.has_external_parameter
                || method.returns_external
                || (method.returns_void_ptr && language != Language::Java))
        {
            // A factory's constructed return type is its product, not a
            // collaboration.
            labels.push(MethodStereotype::Collaborator);
        }
    }

    if labels.is_empty() && !method.is_empty_body && !method.uses_attribute {
        let any_call = method.intra_calls
            + method.member_calls
            + method.constructor_calls
            + method.external_function_calls
            + method.external_method_calls;
        if any_call == 0 {
            labels.push(MethodStereotype::Incidental);
        } else if method.intra_calls == 0
            && method.member_calls == 0
            && method.constructor_calls
                + method.external_function_calls
                + method.external_method_calls
                >= 1
        {
            labels.push(MethodStereotype::Stateless);
        }
    }

    if method.is_empty_body {
        labels.push(MethodStereotype::Empty);
    }

    if labels.is_empty() {
        labels.push(MethodStereotype::Unclassified);
    }
    labels
}

/// `void` but not `void*`; C# also spells it `Void`.
fn returns_plain_void(method: &Method) -> bool {
    !method.returns_void_ptr
        && (method.return_type_parsed == "void" || method.return_type_parsed == "Void")
}
