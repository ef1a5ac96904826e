//! Configuration for a generation run.
//!
//! Values come from an optional TOML file and are then overridden by CLI flags.
//!
//! ```toml
//! api_name = "petstore"
//! spec_source = "https://petstore.swagger.io/v2/swagger.json"
//! output_dir = "out"
//! exclude_operations = ["deletePet"]
//!
//! [prompt_synthesis]
//! enabled = true
//! provider = "groq"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::core::error::{Error, Result};
use crate::prompts::Provider;

/// Default API name when none is configured
pub const DEFAULT_API_NAME: &str = "mcp_server";

/// Settings for the external prompt synthesizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptSynthesisConfig {
    pub enabled: bool,
    pub provider: Provider,
    /// Overrides the provider's default model
    pub model: Option<String>,
    /// Overrides the provider's default endpoint
    pub base_url: Option<String>,
    /// Environment variable holding the API key
    pub api_key_env: Option<String>,
    pub timeout_secs: u64,
}

impl PromptSynthesisConfig {
    pub fn api_key_env(&self) -> &str {
        self.api_key_env
            .as_deref()
            .unwrap_or_else(|| self.provider.default_api_key_env())
    }
}

impl Default for PromptSynthesisConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            provider: Provider::default(),
            model: None,
            base_url: None,
            api_key_env: None,
            timeout_secs: 60,
        }
    }
}

/// Configuration of one generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_name: String,
    /// Local path or http(s) URL of the spec document
    pub spec_source: Option<String>,
    pub output_dir: PathBuf,
    /// Directory holding a custom `server.py.tera`
    pub template_dir: Option<PathBuf>,
    /// Keep only these operations; empty keeps everything
    pub include_operations: Vec<String>,
    pub exclude_operations: Vec<String>,
    /// JSON file with authored prompts
    pub prompts_file: Option<PathBuf>,
    pub prompt_synthesis: PromptSynthesisConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_name: DEFAULT_API_NAME.to_string(),
            spec_source: None,
            output_dir: PathBuf::from("."),
            template_dir: None,
            include_operations: Vec::new(),
            exclude_operations: Vec::new(),
            prompts_file: None,
            prompt_synthesis: PromptSynthesisConfig::default(),
        }
    }
}

/// Values given on the command line; `None` and empty lists leave the
/// configured value alone
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub api_name: Option<String>,
    pub spec_source: Option<String>,
    pub output_dir: Option<PathBuf>,
    pub template_dir: Option<PathBuf>,
    pub include_operations: Vec<String>,
    pub exclude_operations: Vec<String>,
    pub prompts_file: Option<PathBuf>,
    pub auto_prompts: bool,
    pub provider: Option<Provider>,
}

impl Config {
    /// Read a TOML config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::config(format!("Failed to read config {}: {e}", path.display()))
        })?;
        Self::from_toml(&content)
            .map_err(|e| Error::config(format!("{}: {e}", path.display())))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse config: {e}")))
    }

    /// Apply CLI overrides on top of this config
    pub fn merge_cli(mut self, cli: CliOverrides) -> Self {
        if let Some(api_name) = cli.api_name {
            self.api_name = api_name;
        }
        if cli.spec_source.is_some() {
            self.spec_source = cli.spec_source;
        }
        if let Some(output_dir) = cli.output_dir {
            self.output_dir = output_dir;
        }
        if cli.template_dir.is_some() {
            self.template_dir = cli.template_dir;
        }
        if !cli.include_operations.is_empty() {
            self.include_operations = cli.include_operations;
        }
        if !cli.exclude_operations.is_empty() {
            self.exclude_operations = cli.exclude_operations;
        }
        if cli.prompts_file.is_some() {
            self.prompts_file = cli.prompts_file;
        }
        if cli.auto_prompts {
            self.prompt_synthesis.enabled = true;
        }
        if let Some(provider) = cli.provider {
            self.prompt_synthesis.provider = provider;
        }
        self
    }

    pub fn validate(&self) -> Result<()> {
        validate_api_name(&self.api_name)?;
        if self.prompt_synthesis.timeout_secs == 0 {
            return Err(Error::config("prompt_synthesis.timeout_secs must be positive"));
        }
        Ok(())
    }
}

/// API names end up in file names and the server's registered name
pub fn validate_api_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::config("API name cannot be empty"));
    }

    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(Error::config(
            "API name must contain only alphanumeric characters, dashes, and underscores",
        ));
    }

    if name.starts_with('-') || name.starts_with('_') {
        return Err(Error::config(
            "API name cannot start with a dash or underscore",
        ));
    }

    Ok(())
}
