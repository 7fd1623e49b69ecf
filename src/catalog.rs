//! XPath catalog: the per-language map from semantic query kind to XPath
//! expression, plus the remaining per-language syntax tables (class
//! locators, ignored calls, boolean type names). All knowledge of the
//! archive's element vocabulary lives in this module.
//!
//! The archive dialect is namespace-free srcML-shaped XML: `unit`
//! elements carry a `language` attribute and contain `class` / `struct` /
//! `interface` elements whose members sit in a `block`. C++ members are
//! wrapped in access-specifier sections (`public` / `private` /
//! `protected`, with `type="default"` when implicit); C#/Java members
//! carry their specifiers inside the declaration type. Multi-declarator
//! fields share a type through `<type ref="prev"/>` back-references.

use crate::core::Language;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum QueryKind {
    ClassName,
    ClassType,
    ParentName,
    AttributeName,
    AttributeType,
    NonPrivateAttributeName,
    NonPrivateAttributeType,
    Method,
    Property,
    PropertyType,
    PropertyMethod,
}

static CPP_QUERIES: &[(QueryKind, &str)] = &[
    (QueryKind::ClassName, "./name"),
    (QueryKind::ClassType, "."),
    (QueryKind::ParentName, "./super_list/super"),
    (
        QueryKind::AttributeName,
        "./block/*[self::public or self::private or self::protected]/decl_stmt/decl/name",
    ),
    (
        QueryKind::AttributeType,
        "./block/*[self::public or self::private or self::protected]/decl_stmt/decl/type",
    ),
    (
        QueryKind::NonPrivateAttributeName,
        "./block/*[self::public or self::protected]/decl_stmt/decl/name",
    ),
    (
        QueryKind::NonPrivateAttributeType,
        "./block/*[self::public or self::protected]/decl_stmt/decl/type",
    ),
    (
        QueryKind::Method,
        "./block/*[self::public or self::private or self::protected]/*[self::function or self::constructor or self::destructor]",
    ),
    // C++ has no property construct; the queries are defined but match
    // nothing in well-formed input.
    (QueryKind::Property, "./block/property"),
    (QueryKind::PropertyType, "./type"),
    (QueryKind::PropertyMethod, "./block/function"),
];

static CSHARP_QUERIES: &[(QueryKind, &str)] = &[
    (QueryKind::ClassName, "./name"),
    (QueryKind::ClassType, "."),
    (QueryKind::ParentName, "./super_list/super/name"),
    (QueryKind::AttributeName, "./block/decl_stmt/decl/name"),
    (QueryKind::AttributeType, "./block/decl_stmt/decl/type"),
    (
        QueryKind::NonPrivateAttributeName,
        "./block/decl_stmt/decl[not(type/specifier[.='private'])]/name",
    ),
    (
        QueryKind::NonPrivateAttributeType,
        "./block/decl_stmt/decl[not(type/specifier[.='private'])]/type",
    ),
    (
        QueryKind::Method,
        "./block/*[self::function or self::constructor or self::destructor]",
    ),
    (QueryKind::Property, "./block/property"),
    (QueryKind::PropertyType, "./type"),
    (QueryKind::PropertyMethod, "./block/function"),
];

static JAVA_QUERIES: &[(QueryKind, &str)] = &[
    (QueryKind::ClassName, "./name"),
    (QueryKind::ClassType, "."),
    (
        QueryKind::ParentName,
        "./super_list/extends/name | ./super_list/implements/name",
    ),
    (QueryKind::AttributeName, "./block/decl_stmt/decl/name"),
    (QueryKind::AttributeType, "./block/decl_stmt/decl/type"),
    (
        QueryKind::NonPrivateAttributeName,
        "./block/decl_stmt/decl[not(type/specifier[.='private'])]/name",
    ),
    (
        QueryKind::NonPrivateAttributeType,
        "./block/decl_stmt/decl[not(type/specifier[.='private'])]/type",
    ),
    (
        QueryKind::Method,
        "./block/*[self::function or self::constructor]",
    ),
    (QueryKind::Property, "./block/property"),
    (QueryKind::PropertyType, "./type"),
    (QueryKind::PropertyMethod, "./block/function"),
];

/// Resolve the XPath for a semantic query in a language. The tables above
/// are exhaustive over `QueryKind`, so the lookup cannot fail.
pub fn xpath(language: Language, kind: QueryKind) -> &'static str {
    let table = match language {
        Language::Cpp => CPP_QUERIES,
        Language::CSharp => CSHARP_QUERIES,
        Language::Java => JAVA_QUERIES,
    };
    table
        .iter()
        .find(|(k, _)| *k == kind)
        .map(|(_, expr)| *expr)
        .expect("query table covers every kind")
}

/// Locate the class-like elements of a unit, nested ones included.
pub fn class_locator(language: Language) -> &'static str {
    match language {
        Language::Cpp => ".//class | .//struct",
        Language::CSharp => ".//class | .//struct | .//interface",
        Language::Java => ".//class | .//interface",
    }
}

/// Units of an archive: the root when it is itself a tagged unit,
/// otherwise its direct `unit` children.
pub const UNIT_CHILDREN: &str = "./unit";

/// Calls that never count toward any call counter. Matched against the
/// full (qualified) call name after whitespace removal.
pub fn is_ignored_call(language: Language, full_name: &str) -> bool {
    let ignored: &[&str] = match language {
        Language::Cpp => &[
            "std::move",
            "move",
            "std::forward",
            "sizeof",
            "typeid",
            "assert",
            "static_cast",
            "dynamic_cast",
            "reinterpret_cast",
            "const_cast",
        ],
        Language::CSharp => &[
            "nameof",
            "typeof",
            "Debug.Assert",
            "Debug.WriteLine",
            "Console.Write",
            "Console.WriteLine",
        ],
        Language::Java => &[
            "assert",
            "System.out.print",
            "System.out.println",
            "System.err.println",
            "Objects.requireNonNull",
            "super",
        ],
    };
    ignored.contains(&full_name)
}

/// Return types the predicate rule accepts as boolean.
pub fn boolean_types(language: Language) -> &'static [&'static str] {
    match language {
        Language::Cpp => &["bool"],
        Language::CSharp => &["bool", "Boolean"],
        Language::Java => &["boolean"],
    }
}
