//! OpenAPI 3.0 / Swagger 2.0 front end.
//!
//! Raw spec text goes in, a [`ParseResult`] of tools and deduplicated models
//! comes out. Everything here is synchronous and works purely over in-memory
//! document trees.

pub mod dedup;
pub mod document;
pub mod fields;
pub mod parser;
pub mod resolver;
pub mod type_mapper;
pub mod types;

pub use document::Dialect;
pub use parser::SpecParser;
pub use types::{
    AuthScheme, HttpMethod, Model, ParseResult, Prompt, SemanticType, Tool, required_secrets,
};

/// Parse spec text in one call
pub fn parse_spec(text: &str) -> crate::core::error::Result<ParseResult> {
    SpecParser::new().parse_str(text)
}
