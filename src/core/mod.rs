//! Core data model: languages, stereotype labels, and the class/method
//! shapes the analyses fill in.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

pub mod taxonomy;

pub use taxonomy::Taxonomy;

/// Name of the attribute added to class and method elements in the
/// annotated copy of the archive.
pub const STEREOTYPE_ATTR: &str = "stereotype";

/// Sentinel attribute name standing in for the `this`/`self` receiver.
/// Every class's attribute map contains it; method analysis treats a bare
/// `this` reference as a use of this pseudo-attribute.
pub const THIS_ATTRIBUTE: &str = "this";

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Language {
    Cpp,
    CSharp,
    Java,
}

impl Language {
    /// Parse the `language` attribute of a unit element. Anything outside
    /// the supported set yields `None`; the caller skips the unit.
    pub fn from_unit_attr(value: &str) -> Option<Language> {
        match value.trim() {
            "C++" => Some(Language::Cpp),
            "C#" => Some(Language::CSharp),
            "Java" => Some(Language::Java),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Cpp => "C++",
            Language::CSharp => "C#",
            Language::Java => "Java",
        }
    }

    /// The namespace / package separator used in qualified names.
    pub fn namespace_separator(&self) -> &'static str {
        match self {
            Language::Cpp => "::",
            Language::CSharp | Language::Java => ".",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Method-level stereotype labels. The order of variants is the order the
/// classification rules run in; label lists preserve it.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum MethodStereotype {
    Constructor,
    CopyConstructor,
    Destructor,
    Get,
    Predicate,
    Property,
    VoidAccessor,
    Set,
    Command,
    NonVoidCommand,
    Factory,
    Wrapper,
    Controller,
    Collaborator,
    Incidental,
    Stateless,
    Empty,
    Unclassified,
}

impl MethodStereotype {
    pub const ALL: &'static [MethodStereotype] = &[
        MethodStereotype::Constructor,
        MethodStereotype::CopyConstructor,
        MethodStereotype::Destructor,
        MethodStereotype::Get,
        MethodStereotype::Predicate,
        MethodStereotype::Property,
        MethodStereotype::VoidAccessor,
        MethodStereotype::Set,
        MethodStereotype::Command,
        MethodStereotype::NonVoidCommand,
        MethodStereotype::Factory,
        MethodStereotype::Wrapper,
        MethodStereotype::Controller,
        MethodStereotype::Collaborator,
        MethodStereotype::Incidental,
        MethodStereotype::Stateless,
        MethodStereotype::Empty,
        MethodStereotype::Unclassified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MethodStereotype::Constructor => "constructor",
            MethodStereotype::CopyConstructor => "copy-constructor",
            MethodStereotype::Destructor => "destructor",
            MethodStereotype::Get => "get",
            MethodStereotype::Predicate => "predicate",
            MethodStereotype::Property => "property",
            MethodStereotype::VoidAccessor => "void-accessor",
            MethodStereotype::Set => "set",
            MethodStereotype::Command => "command",
            MethodStereotype::NonVoidCommand => "non-void-command",
            MethodStereotype::Factory => "factory",
            MethodStereotype::Wrapper => "wrapper",
            MethodStereotype::Controller => "controller",
            MethodStereotype::Collaborator => "collaborator",
            MethodStereotype::Incidental => "incidental",
            MethodStereotype::Stateless => "stateless",
            MethodStereotype::Empty => "empty",
            MethodStereotype::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for MethodStereotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Class-level stereotype labels, in rule-table order.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum ClassStereotype {
    Entity,
    MinimalEntity,
    DataProvider,
    Commander,
    Boundary,
    Factory,
    Controller,
    PureController,
    LargeClass,
    LazyClass,
    Degenerate,
    DataClass,
    SmallClass,
    Empty,
    Unclassified,
}

impl ClassStereotype {
    pub const ALL: &'static [ClassStereotype] = &[
        ClassStereotype::Entity,
        ClassStereotype::MinimalEntity,
        ClassStereotype::DataProvider,
        ClassStereotype::Commander,
        ClassStereotype::Boundary,
        ClassStereotype::Factory,
        ClassStereotype::Controller,
        ClassStereotype::PureController,
        ClassStereotype::LargeClass,
        ClassStereotype::LazyClass,
        ClassStereotype::Degenerate,
        ClassStereotype::DataClass,
        ClassStereotype::SmallClass,
        ClassStereotype::Empty,
        ClassStereotype::Unclassified,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ClassStereotype::Entity => "entity",
            ClassStereotype::MinimalEntity => "minimal-entity",
            ClassStereotype::DataProvider => "data-provider",
            ClassStereotype::Commander => "commander",
            ClassStereotype::Boundary => "boundary",
            ClassStereotype::Factory => "factory",
            ClassStereotype::Controller => "controller",
            ClassStereotype::PureController => "pure-controller",
            ClassStereotype::LargeClass => "large-class",
            ClassStereotype::LazyClass => "lazy-class",
            ClassStereotype::Degenerate => "degenerate",
            ClassStereotype::DataClass => "data-class",
            ClassStereotype::SmallClass => "small-class",
            ClassStereotype::Empty => "empty",
            ClassStereotype::Unclassified => "unclassified",
        }
    }
}

impl fmt::Display for ClassStereotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MethodStereotype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|v| v.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown method stereotype '{s}'"))
    }
}

impl FromStr for ClassStereotype {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .iter()
            .find(|v| v.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown class stereotype '{s}'"))
    }
}

/// Join a label sequence into the attribute value form.
pub fn join_labels<S: AsRef<str>>(labels: impl IntoIterator<Item = S>) -> String {
    labels
        .into_iter()
        .map(|l| l.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}

/// C++/C#/Java structure kind; `struct` changes C++ default visibility.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum StructureKind {
    Class,
    Struct,
    Interface,
}

impl StructureKind {
    pub fn from_element_name(name: &str) -> StructureKind {
        match name {
            "struct" => StructureKind::Struct,
            "interface" => StructureKind::Interface,
            _ => StructureKind::Class,
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum InheritanceVisibility {
    Public,
    Protected,
    Private,
}

/// The four name forms a class is known by. All empty for anonymous
/// structures.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassNames {
    /// Name exactly as written in the source.
    pub raw: String,
    /// Whitespace-trimmed form.
    pub trimmed: String,
    /// Trimmed form with generic argument contents removed (brackets kept).
    pub generics_stripped: String,
    /// Bare identifier: no qualifiers, no generics. Used to recognise
    /// constructors and copy-constructor parameter types.
    pub bare: String,
}

impl ClassNames {
    pub fn is_anonymous(&self) -> bool {
        self.bare.is_empty()
    }
}

/// A declared variable: attribute, local, or parameter.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub type_name: String,
    /// Base identifier of the type is not in the primitive table.
    pub is_non_primitive: bool,
    /// Non-primitive and the base identifier differs from the enclosing
    /// class's bare name.
    pub is_external_non_primitive: bool,
}

impl Variable {
    /// The reserved sentinel standing in for the receiver object.
    pub fn this() -> Variable {
        Variable {
            name: THIS_ATTRIBUTE.to_string(),
            ..Variable::default()
        }
    }
}

/// Everything the method analyser derives from one method subtree.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Method {
    pub name: String,
    /// Positional XPath locating the method element within its unit.
    pub xpath: String,
    pub return_type_raw: String,
    /// Base form of the return type: qualifiers, generics, reference
    /// markers and array suffixes removed.
    pub return_type_parsed: String,
    /// Raw text of the parameter list, used only to recognise the
    /// copy-constructor signature.
    pub parameters_text: String,
    pub parameters: Vec<Variable>,
    pub locals: Vec<Variable>,

    pub is_const: bool,
    pub is_constructor_or_destructor: bool,
    pub is_destructor: bool,
    pub is_copy_constructor: bool,
    /// Body holds no non-comment statements.
    pub is_empty_body: bool,

    /// Some expression references an attribute name (including bare `this`).
    pub uses_attribute: bool,
    /// At least one return whose sole subexpression is an attribute name
    /// (excluding `this`).
    pub returns_attribute: bool,
    /// At least one return with a non-simple expression.
    pub returns_complex: bool,
    /// Distinct attributes assigned to.
    pub attributes_modified: usize,

    /// Calls to other methods of the same class (no receiver, or `this`).
    pub intra_calls: usize,
    /// Calls dispatched through an attribute.
    pub member_calls: usize,
    pub constructor_calls: usize,
    pub external_function_calls: usize,
    /// Calls on locals or parameters of external non-primitive type.
    pub external_method_calls: usize,

    pub is_factory: bool,
    pub is_strict_factory: bool,

    /// A referenced attribute has external non-primitive type.
    pub uses_external_attribute: bool,
    pub has_external_local: bool,
    pub has_external_parameter: bool,
    /// Return type is external non-primitive.
    pub returns_external: bool,
    /// Return type is `void*` (C++/C#); distinct from plain `void`.
    pub returns_void_ptr: bool,

    /// A parameter passed by non-const reference is assigned to.
    pub ref_param_modified: bool,
    /// An external non-primitive local or parameter is assigned to.
    pub external_local_or_param_modified: bool,

    pub stereotypes: Vec<MethodStereotype>,
}

impl Method {
    pub fn has(&self, label: MethodStereotype) -> bool {
        self.stereotypes.contains(&label)
    }

    pub fn label_string(&self) -> String {
        join_labels(self.stereotypes.iter().map(|s| s.as_str()))
    }
}

/// The class model the builder assembles and the classifiers annotate.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ClassModel {
    pub names: ClassNames,
    pub kind: Option<StructureKind>,
    pub parents: HashMap<String, InheritanceVisibility>,
    /// Attribute name to variable; always contains the `this` sentinel.
    pub attributes: HashMap<String, Variable>,
    pub non_private_attributes: HashMap<String, Variable>,
    pub methods: Vec<Method>,
    /// Unit index to the XPaths of this class's element occurrences
    /// (several for C# partial classes).
    pub xpaths_by_unit: BTreeMap<usize, Vec<String>>,
    pub stereotypes: Vec<ClassStereotype>,
    /// Methods flagged constructor/destructor; excluded from class-level
    /// denominators.
    pub constructor_destructor_count: usize,
}

impl ClassModel {
    pub fn label_string(&self) -> String {
        join_labels(self.stereotypes.iter().map(|s| s.as_str()))
    }
}
