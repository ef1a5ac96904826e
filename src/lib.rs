//! mcpforge compiles OpenAPI 3.0 and Swagger 2.0 documents into MCP tool
//! servers.
//!
//! The pipeline is spec text -> [`openapi::SpecParser`] ->
//! [`openapi::ParseResult`] -> [`generation::generate_server_code`] -> server
//! source. Everything else (loaders, prompt synthesis, the workflow session,
//! output writing) wraps that core.
//!
//! ```
//! use mcpforge::generation::generate_server_code;
//! use mcpforge::openapi::parse_spec;
//!
//! let parsed = parse_spec(r#"{
//!     "openapi": "3.0.0",
//!     "servers": [{"url": "https://api.example.com"}],
//!     "paths": {"/health": {"get": {"operationId": "health"}}}
//! }"#).unwrap();
//!
//! let source = generate_server_code("status", &parsed.tools, &[], &parsed.models).unwrap();
//! assert!(source.contains("@mcp.tool(name=\"health\")"));
//! ```
#![deny(unsafe_code)]

pub mod application;
pub mod core;
pub mod generation;
pub mod infrastructure;
pub mod openapi;
pub mod prompts;
