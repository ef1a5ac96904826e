//! Spec parser: turns an OpenAPI 3.0 or Swagger 2.0 document into tools and
//! deduplicated models.
//!
//! Document-level problems (undecodable text, missing `servers`, `host`,
//! `schemes`, or `basePath`, circular references) are fatal. Everything else
//! degrades to a best-effort placeholder so a usable `ParseResult` always comes
//! out of a valid document.

use indexmap::IndexMap;
use serde_json::{Map, Value as JsonValue};
use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::dedup::ModelRegistry;
use super::document::{self, Dialect, SpecDocument};
use super::fields::{FieldExtractor, FieldMap};
use super::resolver::RefResolver;
use super::type_mapper::{TypeMapper, type_tag};
use super::types::{AuthScheme, HttpMethod, ParseResult, SemanticType, Tool};
use crate::core::error::Result;
use crate::core::utils::title_case_joined;

/// Success codes tried, in order, when looking for a response schema
const RESPONSE_CODES: [&str; 4] = ["200", "201", "202", "204"];

static EMPTY: JsonValue = JsonValue::Null;

/// Parses spec documents into a `ParseResult`.
///
/// Every call starts from a fresh model registry, so nothing leaks between
/// documents.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpecParser;

impl SpecParser {
    pub fn new() -> Self {
        Self
    }

    /// Decode and parse spec text (JSON or YAML)
    pub fn parse_str(&self, text: &str) -> Result<ParseResult> {
        match document::decode(text)? {
            Some(root) => self.parse_value(&root),
            None => {
                debug!("Empty spec document, nothing to parse");
                Ok(ParseResult::default())
            }
        }
    }

    /// Parse an already decoded document
    pub fn parse_value(&self, root: &JsonValue) -> Result<ParseResult> {
        if root.is_null() {
            return Ok(ParseResult::default());
        }

        let doc = SpecDocument::new(root)?;
        let resolver = RefResolver::new(root);
        let mapper = TypeMapper::new(resolver);
        let mut run = ParseRun {
            auth: doc.auth_scheme(),
            doc: &doc,
            resolver,
            mapper,
            extractor: FieldExtractor::new(mapper),
            registry: ModelRegistry::new(),
            tool_names: HashSet::new(),
            tools: Vec::new(),
        };

        if let Some(paths) = doc.paths() {
            for (path, path_item) in paths {
                run.parse_path(path, path_item)?;
            }
        }

        let result = ParseResult {
            tools: run.tools,
            models: run.registry.into_models(),
        };
        info!(
            dialect = ?doc.dialect,
            tools = result.tools.len(),
            models = result.models.len(),
            "Parsed spec document"
        );
        Ok(result)
    }
}

/// State of one parse call
struct ParseRun<'a, 'd> {
    doc: &'d SpecDocument<'a>,
    auth: AuthScheme,
    resolver: RefResolver<'a>,
    mapper: TypeMapper<'a>,
    extractor: FieldExtractor<'a>,
    registry: ModelRegistry,
    tool_names: HashSet<String>,
    tools: Vec<Tool>,
}

impl<'a> ParseRun<'a, '_> {
    fn parse_path(&mut self, path: &str, path_item: &'a JsonValue) -> Result<()> {
        let Some(item) = path_item.as_object() else {
            warn!(path, "Path item is not a mapping, skipping");
            return Ok(());
        };

        for (key, operation) in item {
            let Some(method) = HttpMethod::from_key(key) else {
                continue;
            };
            let Some(operation) = operation.as_object() else {
                warn!(path, method = %method, "Operation is not a mapping, skipping");
                continue;
            };
            let tool = self.parse_operation(path, method, item, operation)?;
            self.tools.push(tool);
        }

        Ok(())
    }

    fn parse_operation(
        &mut self,
        path: &str,
        method: HttpMethod,
        path_item: &'a Map<String, JsonValue>,
        operation: &'a Map<String, JsonValue>,
    ) -> Result<Tool> {
        let name = self.tool_name(path, method, operation);
        let mut tool = Tool {
            name: name.clone(),
            url: format!("{}{}", self.doc.base_url, path),
            method,
            auth: self.auth.clone(),
            args: IndexMap::new(),
            body_model: None,
            response_model: None,
            has_query_params: false,
            has_file_fields: false,
            desc: operation
                .get("summary")
                .and_then(JsonValue::as_str)
                .filter(|summary| !summary.is_empty())
                .map(String::from)
                .unwrap_or_else(|| format!("{method} {path}")),
        };

        let mut body_fields = FieldMap::new();
        let mut has_body = false;

        for param in self.parameters(path_item, operation) {
            let Some(param_name) = param.get("name").and_then(JsonValue::as_str) else {
                warn!(tool = %name, "Parameter without a name, skipping");
                continue;
            };

            match param.get("in").and_then(JsonValue::as_str) {
                Some(location @ ("path" | "query" | "header")) => {
                    let param_type = self.parameter_type(param)?;
                    tool.args.insert(param_name.to_string(), param_type);
                    if location == "query" {
                        tool.has_query_params = true;
                    }
                }
                Some("body") => {
                    has_body = true;
                    body_fields = self
                        .extractor
                        .extract(param.get("schema").unwrap_or(&EMPTY))?;
                }
                Some("formData") => {
                    has_body = true;
                    let field_type = self.form_field_type(param)?;
                    body_fields.insert(param_name.to_string(), field_type);
                }
                other => {
                    debug!(tool = %name, param = param_name, location = ?other, "Ignoring parameter");
                }
            }
        }

        if self.doc.dialect.is_openapi() {
            if let Some(request_body) = operation.get("requestBody") {
                has_body = true;
                let schema = self.request_body_schema(request_body);
                body_fields = self.extractor.extract(schema.unwrap_or(&EMPTY))?;
            }
        }

        if has_body {
            let model = if body_fields.is_empty() {
                let placeholder = self
                    .registry
                    .placeholder(&format!("{}Request", title_case_joined(&name)));
                warn!(tool = %name, model = %placeholder, "Request body has no fields, using generic model");
                placeholder
            } else {
                self.registry.intern(&name, body_fields.clone())
            };
            tool.set_body_model(&model);
            tool.has_file_fields = body_fields.contains_key("file");
        }

        if let Some(schema) = self.response_schema(operation) {
            let response_fields = self.extractor.extract(schema)?;
            let model = if response_fields.is_empty() {
                let placeholder = self
                    .registry
                    .placeholder(&format!("{}Response", title_case_joined(&name)));
                warn!(tool = %name, model = %placeholder, "Response schema has no fields, using generic model");
                placeholder
            } else {
                self.registry.intern(&name, response_fields)
            };
            tool.response_model = Some(model);
        }

        debug!(
            tool = %tool.name,
            method = %tool.method,
            args = tool.args.len(),
            body_model = ?tool.body_model,
            response_model = ?tool.response_model,
            "Extracted tool"
        );
        Ok(tool)
    }

    /// `operationId`, else `{method}_{path}` with slashes joined by `_` and
    /// braces dropped. Repeated names get a numeric suffix.
    fn tool_name(
        &mut self,
        path: &str,
        method: HttpMethod,
        operation: &Map<String, JsonValue>,
    ) -> String {
        let base = operation
            .get("operationId")
            .and_then(JsonValue::as_str)
            .filter(|id| !id.is_empty())
            .map(String::from)
            .unwrap_or_else(|| {
                let flat = path
                    .trim_matches('/')
                    .replace('/', "_")
                    .replace(['{', '}'], "");
                format!("{}_{}", method.as_lower(), flat)
            });

        if self.tool_names.insert(base.clone()) {
            return base;
        }

        let mut counter = 2;
        loop {
            let candidate = format!("{base}_{counter}");
            if self.tool_names.insert(candidate.clone()) {
                warn!(tool = %base, renamed = %candidate, "Duplicate tool name, adding suffix");
                return candidate;
            }
            counter += 1;
        }
    }

    /// Path-level parameters followed by operation parameters; an operation
    /// parameter replaces a path-level one with the same name and location
    fn parameters(
        &self,
        path_item: &'a Map<String, JsonValue>,
        operation: &'a Map<String, JsonValue>,
    ) -> Vec<&'a JsonValue> {
        let mut merged: IndexMap<(String, String), &'a JsonValue> = IndexMap::new();
        let declared = [path_item.get("parameters"), operation.get("parameters")];

        for list in declared.into_iter().flatten().filter_map(JsonValue::as_array) {
            for raw in list {
                let Some(param) = self.resolver.resolve_node(raw) else {
                    warn!(parameter = ?raw.get("$ref"), "Unresolvable parameter $ref, skipping");
                    continue;
                };
                let key = (
                    param.get("in").and_then(JsonValue::as_str).unwrap_or_default().to_string(),
                    param.get("name").and_then(JsonValue::as_str).unwrap_or_default().to_string(),
                );
                merged.insert(key, param);
            }
        }

        merged.into_values().collect()
    }

    fn parameter_type(&self, param: &JsonValue) -> Result<SemanticType> {
        if let Some(schema) = param.get("schema").filter(|s| is_non_empty_mapping(s)) {
            return self.mapper.map_schema(schema);
        }
        self.form_field_type(param)
    }

    /// Type of a parameter declared without a `schema` (Swagger style)
    fn form_field_type(&self, param: &JsonValue) -> Result<SemanticType> {
        if type_tag(param) == Some("array") && param.get("items").is_some() {
            return self.mapper.map_schema(param);
        }
        Ok(SemanticType::from_type_tag(type_tag(param).unwrap_or("string")))
    }

    /// JSON content is preferred; otherwise the first declared media type
    fn request_body_schema(&self, request_body: &'a JsonValue) -> Option<&'a JsonValue> {
        let Some(body) = self.resolver.resolve_node(request_body) else {
            warn!("Unresolvable requestBody $ref, body has no fields");
            return None;
        };
        let content = body.get("content").and_then(JsonValue::as_object)?;
        content
            .get("application/json")
            .or_else(|| content.values().next())
            .and_then(|media| media.get("schema"))
    }

    /// First success response carrying a non-empty schema.
    ///
    /// For OpenAPI a response without any content entry lets the scan move on
    /// to the next code; a Swagger response settles the scan either way.
    fn response_schema(&self, operation: &'a Map<String, JsonValue>) -> Option<&'a JsonValue> {
        let responses = operation.get("responses").and_then(JsonValue::as_object)?;

        let schema = RESPONSE_CODES.iter().find_map(|code| {
            let raw = responses.get(*code)?;
            let response = self.resolver.resolve_node(raw).unwrap_or_else(|| {
                warn!(code, "Unresolvable response $ref");
                &EMPTY
            });

            match self.doc.dialect {
                Dialect::OpenApi3 => {
                    let content = response.get("content").and_then(JsonValue::as_object)?;
                    let media = content
                        .get("application/json")
                        .or_else(|| content.values().next())?;
                    Some(media.get("schema"))
                }
                Dialect::Swagger2 => Some(response.get("schema")),
            }
        })??;

        is_non_empty_mapping(schema).then_some(schema)
    }
}

fn is_non_empty_mapping(value: &JsonValue) -> bool {
    value.as_object().is_some_and(|map| !map.is_empty())
}
