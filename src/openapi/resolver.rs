//! In-document `$ref` resolution.
//!
//! Only pointers rooted at `#/` are followed. External files and URLs are not
//! fetched; callers fall back to a placeholder named after the last segment.

use serde_json::Value as JsonValue;

use crate::core::error::{Error, Result};

/// Resolves `$ref` pointers against a document root
#[derive(Debug, Clone, Copy)]
pub struct RefResolver<'a> {
    root: &'a JsonValue,
}

impl<'a> RefResolver<'a> {
    pub fn new(root: &'a JsonValue) -> Self {
        Self { root }
    }

    /// Walk the pointer through nested mappings.
    ///
    /// Returns `None` for unsupported pointer forms, missing segments, or a
    /// target that is not a mapping.
    pub fn resolve(&self, reference: &str) -> Option<&'a JsonValue> {
        let pointer = reference.strip_prefix("#/")?;
        let mut current = self.root;

        for segment in pointer.split('/') {
            let key = unescape_segment(segment);
            current = current.as_object()?.get(key.as_str())?;
        }

        current.is_object().then_some(current)
    }

    /// Resolve `node` if it is a `$ref` wrapper, otherwise hand it back unchanged
    pub fn resolve_node(&self, node: &'a JsonValue) -> Option<&'a JsonValue> {
        match ref_of(node) {
            Some(reference) => self.resolve(reference),
            None => Some(node),
        }
    }
}

/// The `$ref` string of a schema node, if it has one
pub fn ref_of(node: &JsonValue) -> Option<&str> {
    node.get("$ref").and_then(JsonValue::as_str)
}

/// Type name used when a pointer cannot be resolved: its final path segment
pub fn fallback_name(reference: &str) -> Option<String> {
    reference
        .rsplit('/')
        .next()
        .filter(|segment| !segment.is_empty())
        .map(unescape_segment)
}

fn unescape_segment(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

/// The chain of pointers currently being expanded.
///
/// Entering a pointer that is already on the chain means the references loop
/// back on themselves.
#[derive(Debug, Default)]
pub struct ResolutionChain {
    active: Vec<String>,
}

impl ResolutionChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enter(&mut self, reference: &str) -> Result<()> {
        if self.active.iter().any(|r| r == reference) {
            return Err(Error::CircularReference {
                reference: reference.to_string(),
            });
        }
        self.active.push(reference.to_string());
        Ok(())
    }

    pub fn leave(&mut self) {
        self.active.pop();
    }

    pub fn depth(&self) -> usize {
        self.active.len()
    }
}
