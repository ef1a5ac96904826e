//! Identifier and type helpers for the generated Python source.
//!
//! Tool names, argument names, and model names come straight from the spec
//! document, so each one is mapped to a valid, non-shadowing Python identifier
//! before it reaches the template.

use indexmap::IndexMap;
use std::collections::HashSet;

use crate::openapi::SemanticType;

/// Python hard keywords
const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global",
    "if", "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return",
    "try", "while", "with", "yield",
];

/// Module-level names the generated server defines or imports
pub const MODULE_NAMES: &[&str] = &[
    "FastMCP", "BaseModel", "ConfigDict", "Field", "ValidationError", "HTTPAdapter", "Retry",
    "requests", "os", "re", "mcp", "_session", "_PayloadModel", "_create_session_with_retries",
    "_extract_path_params",
];

/// Builtins referenced inside generated tool bodies
pub const BODY_BUILTINS: &[&str] = &[
    "dict", "getattr", "isinstance", "str", "type", "Exception", "TypeError", "ValueError",
];

pub fn is_python_keyword(s: &str) -> bool {
    PYTHON_KEYWORDS.contains(&s)
}

/// Maps an arbitrary string to a valid Python identifier.
///
/// Characters outside `[A-Za-z0-9_]` become `_`, a leading digit gets a `_`
/// prefix, and keywords get a `_` suffix.
///
/// # Examples
/// ```
/// use mcpforge::generation::utils::sanitize_python_identifier;
///
/// assert_eq!(sanitize_python_identifier("X-Request-Id"), "X_Request_Id");
/// assert_eq!(sanitize_python_identifier("class"), "class_");
/// assert_eq!(sanitize_python_identifier("2fa"), "_2fa");
/// ```
pub fn sanitize_python_identifier(s: &str) -> String {
    let mut ident: String = s
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
        .collect();

    if ident.is_empty() {
        return "arg".to_string();
    }
    if ident.starts_with(|c: char| c.is_ascii_digit()) {
        ident.insert(0, '_');
    }
    if is_python_keyword(&ident) {
        ident.push('_');
    }
    ident
}

/// Pydantic treats leading underscores as private attributes, so field
/// identifiers never start with one
pub fn sanitize_field_identifier(s: &str) -> String {
    let ident = sanitize_python_identifier(s);
    let trimmed = ident.trim_start_matches('_');
    if trimmed.is_empty() {
        return "field".to_string();
    }
    if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
        return format!("field_{trimmed}");
    }
    // trimming may have exposed a keyword such as `_class` -> `class`
    if is_python_keyword(trimmed) {
        return format!("{trimmed}_");
    }
    trimmed.to_string()
}

/// Hands out identifiers that are unique within one scope
#[derive(Debug, Default, Clone)]
pub struct IdentAllocator {
    taken: HashSet<String>,
}

impl IdentAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_reserved<I, S>(reserved: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            taken: reserved.into_iter().map(Into::into).collect(),
        }
    }

    pub fn reserve(&mut self, ident: impl Into<String>) {
        self.taken.insert(ident.into());
    }

    pub fn is_taken(&self, ident: &str) -> bool {
        self.taken.contains(ident)
    }

    /// Sanitize `raw` and add `_2`, `_3`, ... until it is free
    pub fn allocate(&mut self, raw: &str) -> String {
        self.allocate_sanitized(sanitize_python_identifier(raw))
    }

    /// Like [`allocate`](Self::allocate) for an identifier that is already valid
    pub fn allocate_sanitized(&mut self, base: String) -> String {
        if self.taken.insert(base.clone()) {
            return base;
        }
        let mut counter = 2;
        loop {
            let candidate = format!("{base}_{counter}");
            if self.taken.insert(candidate.clone()) {
                return candidate;
            }
            counter += 1;
        }
    }
}

/// Python annotation for a semantic type.
///
/// `classes` maps emitted model identifiers to their Python class names; a
/// model that is not emitted degrades to `dict`. With `forward_refs` model
/// names are quoted so a class may refer to one defined after it.
pub fn python_type(
    ty: &SemanticType,
    classes: &IndexMap<String, String>,
    forward_refs: bool,
) -> String {
    match ty {
        SemanticType::Text => "str".to_string(),
        SemanticType::Integer => "int".to_string(),
        SemanticType::Float => "float".to_string(),
        SemanticType::Boolean => "bool".to_string(),
        SemanticType::Dynamic => "dict".to_string(),
        SemanticType::List(None) => "list".to_string(),
        SemanticType::List(Some(inner)) => {
            format!("list[{}]", python_type(inner, classes, forward_refs))
        }
        SemanticType::Model(name) => match classes.get(name) {
            Some(class) if forward_refs => format!("\"{class}\""),
            Some(class) => class.clone(),
            None => "dict".to_string(),
        },
    }
}
