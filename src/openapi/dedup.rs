//! Structural deduplication of body and response models.
//!
//! A `ModelRegistry` lives for exactly one parse call. Two field maps with the
//! same (name, type) pairs, in any order, share one model.

use indexmap::IndexMap;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use tracing::debug;

use super::fields::FieldMap;
use super::types::Model;
use crate::core::utils::{class_identifier, title_case};

/// Canonical content hash of a field map
pub fn fingerprint(fields: &FieldMap) -> String {
    let mut pairs: Vec<(&str, String)> = fields
        .iter()
        .map(|(name, ty)| (name.as_str(), ty.to_string()))
        .collect();
    pairs.sort();

    let mut hasher = Sha256::new();
    for (name, ty) in pairs {
        hasher.update(name.as_bytes());
        hasher.update([0x1f]);
        hasher.update(ty.as_bytes());
        hasher.update([0x1e]);
    }
    hex::encode(hasher.finalize())
}

/// Resource-derived model name: the tool name's last `_` segment, title-cased
pub fn resource_name(tool_name: &str) -> String {
    let last = tool_name.rsplit('_').next().unwrap_or(tool_name);
    class_identifier(&title_case(last), "Model")
}

/// Per-parse table from fingerprint to model identifier
#[derive(Debug, Default)]
pub struct ModelRegistry {
    by_fingerprint: HashMap<String, String>,
    models: IndexMap<String, Model>,
}

impl ModelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the identifier of the model with these fields, creating it on
    /// first sight under a name derived from `owner_tool`
    pub fn intern(&mut self, owner_tool: &str, fields: FieldMap) -> String {
        let key = fingerprint(&fields);
        if let Some(existing) = self.by_fingerprint.get(&key) {
            debug!(model = %existing, tool = %owner_tool, "Reusing structurally identical model");
            return existing.clone();
        }

        let name = self.unique_name(&resource_name(owner_tool));
        debug!(model = %name, tool = %owner_tool, fields = fields.len(), "Registered model");
        self.models.insert(name.clone(), Model::new(name.clone(), fields));
        self.by_fingerprint.insert(key, name.clone());
        name
    }

    /// Register a `{data: dynamic}` model for a declared but field-less schema.
    ///
    /// Placeholders are never shared between operations.
    pub fn placeholder(&mut self, base: &str) -> String {
        let name = self.unique_name(&class_identifier(base, "Model"));
        self.models.insert(name.clone(), Model::placeholder(name.clone()));
        name
    }

    pub fn get(&self, name: &str) -> Option<&Model> {
        self.models.get(name)
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn into_models(self) -> IndexMap<String, Model> {
        self.models
    }

    fn unique_name(&self, base: &str) -> String {
        let mut candidate = base.to_string();
        let mut counter = 1;
        while self.models.contains_key(&candidate) {
            candidate = format!("{base}{counter}");
            counter += 1;
        }
        candidate
    }
}
