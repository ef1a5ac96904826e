//! Sanitizers for text spliced into generated Python source
//!
//! Every value taken from the spec document reaches the template either as a
//! Python string literal or as docstring text; nothing is inserted raw.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value as JsonValue;

static SMART_PUNCTUATION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\u{2018}\u{2019}\u{201C}\u{201D}\u{2014}]").expect("valid regex"));

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Quote a string as a Python string literal.
///
/// JSON string syntax is a subset of Python's, so the JSON encoding is used.
///
/// # Examples
/// ```
/// use mcpforge::generation::sanitizers::python_literal;
///
/// assert_eq!(python_literal("say \"hi\""), r#""say \"hi\"""#);
/// ```
pub fn python_literal(s: &str) -> String {
    JsonValue::String(s.to_string()).to_string()
}

/// Quote a list of strings as a Python list literal
pub fn python_list_literal<S: AsRef<str>>(items: &[S]) -> String {
    JsonValue::Array(
        items
            .iter()
            .map(|s| JsonValue::String(s.as_ref().to_string()))
            .collect(),
    )
    .to_string()
}

/// Collapse text into a single line that is safe inside `"""..."""`.
///
/// Smart quotes and em-dashes become ASCII, whitespace runs collapse, and
/// backslashes and double quotes are escaped. Empty input yields `fallback`.
pub fn docstring(input: &str, fallback: &str) -> String {
    let ascii = SMART_PUNCTUATION.replace_all(input, |caps: &regex::Captures| match &caps[0] {
        "\u{2018}" | "\u{2019}" => "'",
        "\u{201C}" | "\u{201D}" => "\"",
        "\u{2014}" => "-",
        _ => "",
    });
    let collapsed = WHITESPACE.replace_all(ascii.trim(), " ");

    if collapsed.is_empty() {
        return if fallback.is_empty() {
            String::new()
        } else {
            docstring(fallback, "")
        };
    }
    collapsed.replace('\\', "\\\\").replace('"', "\\\"")
}
