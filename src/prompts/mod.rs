//! Prompt records: authored prompt files and LLM synthesis

pub mod response_parser;
pub mod synthesizer;

pub use response_parser::parse_prompt_records;
pub use synthesizer::{PromptSynthesizer, Provider, build_user_message};

use std::path::Path;
use tracing::debug;

use crate::core::error::{Error, Result};
use crate::openapi::Prompt;

/// Load authored prompts from a JSON array of `{name, args, text, desc}`
pub fn load_prompts_file(path: &Path) -> Result<Vec<Prompt>> {
    let content = std::fs::read_to_string(path)?;
    let prompts = parse_prompts_json(&content)
        .map_err(|e| Error::config(format!("Invalid prompts file {}: {e}", path.display())))?;
    debug!(path = %path.display(), prompts = prompts.len(), "Loaded prompts file");
    Ok(prompts)
}

pub fn parse_prompts_json(content: &str) -> Result<Vec<Prompt>> {
    let prompts: Vec<Prompt> = serde_json::from_str(content)?;
    if let Some(unnamed) = prompts.iter().position(|p| p.name.trim().is_empty()) {
        return Err(Error::config(format!("prompt #{} has no name", unnamed + 1)));
    }
    Ok(prompts)
}
