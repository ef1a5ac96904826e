//! Schema node to `SemanticType` mapping

use serde_json::Value as JsonValue;
use tracing::warn;

use super::resolver::{RefResolver, ResolutionChain, fallback_name, ref_of};
use super::types::SemanticType;
use crate::core::error::Result;

/// The primitive type tag of a schema node.
///
/// OpenAPI 3.1 allows `type` to be an array such as `["string", "null"]`; the
/// first non-null entry is used.
pub fn type_tag(schema: &JsonValue) -> Option<&str> {
    match schema.get("type")? {
        JsonValue::String(tag) => Some(tag.as_str()),
        JsonValue::Array(tags) => tags
            .iter()
            .filter_map(JsonValue::as_str)
            .find(|tag| *tag != "null"),
        _ => None,
    }
}

/// Maps schema nodes to semantic types, following `$ref`s through a resolver
#[derive(Debug, Clone, Copy)]
pub struct TypeMapper<'a> {
    resolver: RefResolver<'a>,
}

impl<'a> TypeMapper<'a> {
    pub fn new(resolver: RefResolver<'a>) -> Self {
        Self { resolver }
    }

    pub fn resolver(&self) -> RefResolver<'a> {
        self.resolver
    }

    /// Map one schema node
    pub fn map_schema(&self, schema: &JsonValue) -> Result<SemanticType> {
        self.map_in_chain(schema, &mut ResolutionChain::new())
    }

    fn map_in_chain(&self, schema: &JsonValue, chain: &mut ResolutionChain) -> Result<SemanticType> {
        let Some(node) = schema.as_object().filter(|node| !node.is_empty()) else {
            return Ok(SemanticType::Text);
        };

        if let Some(reference) = ref_of(schema) {
            return match self.resolver.resolve(reference) {
                Some(resolved) => {
                    chain.enter(reference)?;
                    let mapped = self.map_in_chain(resolved, chain);
                    chain.leave();
                    mapped
                }
                None => {
                    warn!(reference, "Unresolvable $ref, using placeholder type");
                    Ok(fallback_name(reference)
                        .map(SemanticType::Model)
                        .unwrap_or(SemanticType::Dynamic))
                }
            };
        }

        match type_tag(schema) {
            Some("array") => {
                let inner = match node.get("items") {
                    Some(items) => self.map_in_chain(items, chain)?,
                    None => SemanticType::Text,
                };
                Ok(SemanticType::list_of(inner))
            }
            Some("object") => Ok(SemanticType::Dynamic),
            Some(tag) => Ok(SemanticType::from_type_tag(tag)),
            None => Ok(SemanticType::Text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::Error;
    use serde_json::json;

    fn map(doc: &JsonValue, schema: JsonValue) -> Result<SemanticType> {
        TypeMapper::new(RefResolver::new(doc)).map_schema(&schema)
    }

    #[test]
    fn test_primitives() {
        let doc = json!({});
        assert_eq!(map(&doc, json!({"type": "string"})).unwrap(), SemanticType::Text);
        assert_eq!(map(&doc, json!({"type": "integer"})).unwrap(), SemanticType::Integer);
        assert_eq!(map(&doc, json!({"type": "number", "format": "double"})).unwrap(), SemanticType::Float);
        assert_eq!(map(&doc, json!({"type": "boolean"})).unwrap(), SemanticType::Boolean);
        assert_eq!(map(&doc, json!({"type": "file"})).unwrap(), SemanticType::Text);
    }

    #[test]
    fn test_empty_and_untyped_schemas_are_text() {
        let doc = json!({});
        assert_eq!(map(&doc, json!({})).unwrap(), SemanticType::Text);
        assert_eq!(map(&doc, JsonValue::Null).unwrap(), SemanticType::Text);
        assert_eq!(map(&doc, json!({"description": "free form"})).unwrap(), SemanticType::Text);
        assert_eq!(map(&doc, json!({"type": "uuid"})).unwrap(), SemanticType::Text);
    }

    #[test]
    fn test_arrays_recurse_into_items() {
        let doc = json!({});
        assert_eq!(
            map(&doc, json!({"type": "array", "items": {"type": "integer"}})).unwrap(),
            SemanticType::list_of(SemanticType::Integer)
        );
        assert_eq!(
            map(&doc, json!({"type": "array", "items": {"type": "array", "items": {"type": "boolean"}}})).unwrap(),
            SemanticType::list_of(SemanticType::list_of(SemanticType::Boolean))
        );
        assert_eq!(
            map(&doc, json!({"type": "array"})).unwrap(),
            SemanticType::list_of(SemanticType::Text)
        );
    }

    #[test]
    fn test_objects_are_dynamic_even_with_properties() {
        let doc = json!({});
        assert_eq!(map(&doc, json!({"type": "object"})).unwrap(), SemanticType::Dynamic);
        assert_eq!(
            map(&doc, json!({"type": "object", "properties": {"a": {"type": "string"}}})).unwrap(),
            SemanticType::Dynamic
        );
    }

    #[test]
    fn test_nullable_type_arrays() {
        let doc = json!({});
        assert_eq!(map(&doc, json!({"type": ["null", "integer"]})).unwrap(), SemanticType::Integer);
        assert_eq!(map(&doc, json!({"type": ["null"]})).unwrap(), SemanticType::Text);
    }

    #[test]
    fn test_refs_resolve_and_recurse() {
        let doc = json!({
            "components": {"schemas": {
                "Id": {"type": "integer"},
                "Ids": {"type": "array", "items": {"$ref": "#/components/schemas/Id"}},
                "Pet": {"type": "object", "properties": {"name": {"type": "string"}}}
            }}
        });
        assert_eq!(map(&doc, json!({"$ref": "#/components/schemas/Id"})).unwrap(), SemanticType::Integer);
        assert_eq!(
            map(&doc, json!({"$ref": "#/components/schemas/Ids"})).unwrap(),
            SemanticType::list_of(SemanticType::Integer)
        );
        assert_eq!(map(&doc, json!({"$ref": "#/components/schemas/Pet"})).unwrap(), SemanticType::Dynamic);
    }

    #[test]
    fn test_unresolvable_ref_falls_back_to_last_segment() {
        let doc = json!({});
        assert_eq!(
            map(&doc, json!({"$ref": "#/definitions/Order"})).unwrap(),
            SemanticType::Model("Order".to_string())
        );
        assert_eq!(
            map(&doc, json!({"$ref": "common.yaml#/definitions/Address"})).unwrap(),
            SemanticType::Model("Address".to_string())
        );
        assert_eq!(map(&doc, json!({"$ref": "#/definitions/"})).unwrap(), SemanticType::Dynamic);
    }

    #[test]
    fn test_self_referencing_array_is_circular() {
        let doc = json!({
            "definitions": {"Tree": {"type": "array", "items": {"$ref": "#/definitions/Tree"}}}
        });
        let err = map(&doc, json!({"$ref": "#/definitions/Tree"})).unwrap_err();
        assert!(matches!(err, Error::CircularReference { .. }));
    }

    #[test]
    fn test_mutual_alias_refs_are_circular() {
        let doc = json!({
            "definitions": {
                "A": {"$ref": "#/definitions/B"},
                "B": {"$ref": "#/definitions/A"}
            }
        });
        let err = map(&doc, json!({"$ref": "#/definitions/A"})).unwrap_err();
        assert!(matches!(err, Error::CircularReference { .. }));
    }

    #[test]
    fn test_repeated_sibling_refs_are_not_circular() {
        let doc = json!({
            "definitions": {
                "Id": {"type": "string"},
                "Pair": {"type": "array", "items": {"$ref": "#/definitions/Id"}}
            }
        });
        let mapper = TypeMapper::new(RefResolver::new(&doc));
        for _ in 0..3 {
            assert_eq!(
                mapper.map_schema(&json!({"$ref": "#/definitions/Pair"})).unwrap(),
                SemanticType::list_of(SemanticType::Text)
            );
        }
    }
}
