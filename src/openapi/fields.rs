//! Object schema field extraction

use indexmap::IndexMap;
use serde_json::Value as JsonValue;
use tracing::warn;

use super::resolver::{ResolutionChain, ref_of};
use super::type_mapper::TypeMapper;
use super::types::SemanticType;
use crate::core::error::Result;

/// Ordered field name to semantic type mapping of one schema
pub type FieldMap = IndexMap<String, SemanticType>;

/// Flattens object schemas into field maps
#[derive(Debug, Clone, Copy)]
pub struct FieldExtractor<'a> {
    mapper: TypeMapper<'a>,
}

impl<'a> FieldExtractor<'a> {
    pub fn new(mapper: TypeMapper<'a>) -> Self {
        Self { mapper }
    }

    /// Extract the fields of `schema` in declaration order.
    ///
    /// A `$ref` is resolved first and an unresolvable one yields no fields.
    /// `allOf` members contribute their fields ahead of the schema's own
    /// `properties`. Field types come from the type mapper, so they are always
    /// normalized semantic types.
    pub fn extract(&self, schema: &JsonValue) -> Result<FieldMap> {
        let mut fields = FieldMap::new();
        self.extract_into(schema, &mut fields, &mut ResolutionChain::new())?;
        Ok(fields)
    }

    fn extract_into(
        &self,
        schema: &JsonValue,
        fields: &mut FieldMap,
        chain: &mut ResolutionChain,
    ) -> Result<()> {
        if !schema.is_object() {
            return Ok(());
        }

        if let Some(reference) = ref_of(schema) {
            let Some(resolved) = self.mapper.resolver().resolve(reference) else {
                warn!(reference, "Unresolvable $ref, schema contributes no fields");
                return Ok(());
            };
            chain.enter(reference)?;
            let extracted = self.extract_into(resolved, fields, chain);
            chain.leave();
            return extracted;
        }

        if let Some(members) = schema.get("allOf").and_then(JsonValue::as_array) {
            for member in members {
                self.extract_into(member, fields, chain)?;
            }
        }

        if let Some(properties) = schema.get("properties").and_then(JsonValue::as_object) {
            for (name, property) in properties {
                let field_type = self.mapper.map_schema(property)?;
                fields.insert(name.clone(), field_type);
            }
        }

        Ok(())
    }
}
