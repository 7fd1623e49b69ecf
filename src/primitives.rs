//! Per-language primitive type table.
//!
//! Lookup is by normalised base identifier only: no generics, no
//! pointer/reference sigils, no namespace qualifier. `void` is primitive;
//! the `void*` special case belongs to the classifier, not this table.

use crate::core::Language;
use crate::error::EngineError;
use crate::normalize;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};
use std::path::Path;

const CPP_PRIMITIVES: &[&str] = &[
    "void", "bool", "char", "wchar_t", "char8_t", "char16_t", "char32_t", "short", "int", "long",
    "float", "double", "signed", "unsigned", "size_t", "ssize_t", "ptrdiff_t", "int8_t", "int16_t",
    "int32_t", "int64_t", "uint8_t", "uint16_t", "uint32_t", "uint64_t", "intptr_t", "uintptr_t",
    "string", "wstring", "auto",
];

const CSHARP_PRIMITIVES: &[&str] = &[
    "void", "bool", "byte", "sbyte", "char", "decimal", "double", "float", "int", "uint", "nint",
    "nuint", "long", "ulong", "short", "ushort", "string", "object", "var", "Boolean", "Byte",
    "SByte", "Char", "Decimal", "Double", "Single", "Int16", "Int32", "Int64", "UInt16", "UInt32",
    "UInt64", "String", "Object", "Void",
];

const JAVA_PRIMITIVES: &[&str] = &[
    "void", "boolean", "byte", "char", "short", "int", "long", "float", "double", "String",
    "Boolean", "Byte", "Character", "Short", "Integer", "Long", "Float", "Double", "Void",
];

static BUILT_IN: Lazy<PrimitiveTable> = Lazy::new(|| {
    let mut by_language = HashMap::new();
    for (language, names) in [
        (Language::Cpp, CPP_PRIMITIVES),
        (Language::CSharp, CSHARP_PRIMITIVES),
        (Language::Java, JAVA_PRIMITIVES),
    ] {
        by_language.insert(
            language,
            names.iter().map(|s| s.to_string()).collect::<HashSet<_>>(),
        );
    }
    PrimitiveTable { by_language }
});

#[derive(Clone, Debug)]
pub struct PrimitiveTable {
    by_language: HashMap<Language, HashSet<String>>,
}

impl PrimitiveTable {
    pub fn built_in() -> PrimitiveTable {
        BUILT_IN.clone()
    }

    /// Load a replacement table from a side file. Format: section headers
    /// naming the language (`[C++]`, `[C#]`, `[Java]`), one identifier per
    /// line below each, `#` comments. Every supported language must end up
    /// with at least one entry.
    pub fn load(path: &Path) -> Result<PrimitiveTable, EngineError> {
        let text = std::fs::read_to_string(path).map_err(|e| EngineError::io(path, e))?;
        let table = Self::parse(&text).map_err(|reason| EngineError::InvalidPrimitives {
            path: path.to_path_buf(),
            reason,
        })?;
        table.require_all_languages()?;
        Ok(table)
    }

    fn parse(text: &str) -> Result<PrimitiveTable, String> {
        let mut by_language: HashMap<Language, HashSet<String>> = HashMap::new();
        let mut current: Option<Language> = None;

        for (number, line) in text.lines().enumerate() {
            let line = line.split('#').next().unwrap_or("").trim();
            if line.is_empty() {
                continue;
            }
            if let Some(header) = line.strip_prefix('[').and_then(|l| l.strip_suffix(']')) {
                let language = Language::from_unit_attr(header)
                    .ok_or_else(|| format!("line {}: unknown language '{header}'", number + 1))?;
                current = Some(language);
                by_language.entry(language).or_default();
                continue;
            }
            let Some(language) = current else {
                return Err(format!("line {}: identifier before any [language] header", number + 1));
            };
            by_language
                .entry(language)
                .or_default()
                .insert(line.to_string());
        }

        Ok(PrimitiveTable { by_language })
    }

    fn require_all_languages(&self) -> Result<(), EngineError> {
        for language in [Language::Cpp, Language::CSharp, Language::Java] {
            match self.by_language.get(&language) {
                Some(set) if !set.is_empty() => {}
                _ => return Err(EngineError::PrimitivesMissingLanguage(language.as_str())),
            }
        }
        Ok(())
    }

    /// Whether the declared type's base identifier is primitive for the
    /// language. The empty type (missing declarations, unresolved
    /// back-references) counts as primitive so it never feeds the
    /// non-primitive analyses.
    pub fn is_primitive(&self, declared_type: &str, language: Language) -> bool {
        let base = normalize::base_identifier(declared_type, language);
        if base.is_empty() {
            return true;
        }
        self.by_language
            .get(&language)
            .map(|set| set.contains(&base))
            .unwrap_or(false)
    }
}
