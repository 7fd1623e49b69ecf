//! Name and type normalisation.
//!
//! Pure string functions shared by the model builders: whitespace trimming,
//! qualifier stripping, generic-argument handling, array-suffix trimming,
//! and the reduction of a declared type to the bare identifier the
//! primitive table is keyed by.

use crate::core::Language;

pub fn trim(s: &str) -> &str {
    s.trim()
}

pub fn rtrim(s: &str) -> &str {
    s.trim_end()
}

/// Drop everything up to and including the last namespace/package separator
/// (`::` for C++, `.` for C#/Java). A generic argument list is preserved:
/// only the qualifier head before the first `<` is considered, so
/// `std::vector<std::string>` becomes `vector<std::string>`.
pub fn remove_namespace(s: &str, language: Language) -> String {
    let sep = language.namespace_separator();
    let head_end = s.find('<').unwrap_or(s.len());
    let head = &s[..head_end];
    match head.rfind(sep) {
        Some(pos) => s[pos + sep.len()..].to_string(),
        None => s.to_string(),
    }
}

/// Strip generic argument contents while keeping the brackets:
/// `Map<String, Integer>` becomes `Map<>`. Text after the closing bracket
/// is preserved.
pub fn remove_between_commas(s: &str) -> String {
    let Some(open) = s.find('<') else {
        return s.to_string();
    };
    let Some(close) = s.rfind('>') else {
        return s.to_string();
    };
    if close < open {
        return s.to_string();
    }
    format!("{}<>{}", &s[..open], &s[close + 1..])
}

/// C++ array declarators carry the extent with the name; truncate at the
/// first `[`. Other languages keep their `[]` type suffix handling in
/// `base_identifier`.
pub fn strip_array_suffix(s: &str) -> &str {
    match s.find('[') {
        Some(pos) => rtrim(&s[..pos]),
        None => s,
    }
}

/// Declaration qualifiers that never contribute to the base identifier.
fn is_qualifier(word: &str, language: Language) -> bool {
    let shared = matches!(word, "const" | "static" | "final");
    let per_language = match language {
        Language::Cpp => matches!(
            word,
            "virtual"
                | "inline"
                | "mutable"
                | "volatile"
                | "constexpr"
                | "typename"
                | "struct"
                | "class"
                | "enum"
                | "union"
                | "register"
                | "extern"
        ),
        Language::CSharp => matches!(word, "readonly" | "ref" | "out" | "in" | "params" | "this"),
        Language::Java => matches!(word, "transient" | "volatile" | "synchronized"),
    };
    shared || per_language
}

/// Reduce a declared type to the bare identifier used for primitive-table
/// lookup and class-name comparison: qualifiers, namespace prefixes,
/// generic arguments, reference/pointer sigils and array suffixes all
/// removed. `unsigned long` reduces to `long`; `const std::vector<int>&`
/// to `vector`.
pub fn base_identifier(s: &str, language: Language) -> String {
    // Generic arguments go first: whitespace inside them must not split
    // the type into words.
    let head = match (s.find('<'), s.rfind('>')) {
        (Some(open), Some(close)) if close > open => format!("{}{}", &s[..open], &s[close + 1..]),
        _ => s.to_string(),
    };
    let no_sigils: String = head
        .chars()
        .map(|c| if matches!(c, '*' | '&' | '^' | '?') { ' ' } else { c })
        .collect();
    let no_arrays = no_sigils.replace("[]", " ");
    let no_arrays = strip_array_suffix(&no_arrays);

    let mut candidate = "";
    for word in no_arrays.split_whitespace() {
        if is_qualifier(word, language) {
            continue;
        }
        candidate = word;
    }
    remove_namespace(candidate, language)
}

/// Resolve `<type ref="prev"/>` back-references across a declarator
/// sequence: carries the last concrete type forward so `int x, y;` gives
/// both declarators the type `int`.
#[derive(Debug, Default)]
pub struct PrevTypeResolver {
    last: Option<String>,
}

impl PrevTypeResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// `raw` is the type text, `None` when the element was a bare
    /// back-reference. Returns the effective type for this declarator.
    pub fn resolve(&mut self, raw: Option<String>) -> String {
        match raw {
            Some(t) if !t.trim().is_empty() => {
                let t = trim(&t).to_string();
                self.last = Some(t.clone());
                t
            }
            _ => self.last.clone().unwrap_or_default(),
        }
    }
}
