//! Generation domain module - turns parsed tools into server source
//!
//! Parsed tools, models and prompts are flattened into a render context,
//! rendered through a [`ServerRenderer`], and packaged as artifacts.

pub mod context;
pub mod orchestrator;
pub mod renderer;
pub mod sanitizers;
pub mod types;
pub mod utils;

pub use context::ServerContext;
pub use orchestrator::{ENV_EXAMPLE_FILE, GenerationOrchestrator, GenerationRequest};
pub use renderer::{FastMcpRenderer, ServerRenderer, TemplateSource};
pub use types::*;

use indexmap::IndexMap;

use crate::core::error::Result;
use crate::openapi::{Model, Prompt, Tool};

/// Render a complete server module with the embedded template.
///
/// Only models referenced by some tool are emitted, in first-reference order.
pub fn generate_server_code(
    api_name: &str,
    tools: &[Tool],
    prompts: &[Prompt],
    models: &IndexMap<String, Model>,
) -> Result<String> {
    let context = ServerContext::build(api_name, tools, prompts, models);
    FastMcpRenderer::embedded()?.render(&context)
}
