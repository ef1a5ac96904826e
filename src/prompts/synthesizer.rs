//! LLM-backed prompt synthesis for generated tools.
//!
//! Sends tool summaries to an OpenAI-compatible chat-completions endpoint and
//! parses the labelled records out of the answer. The result is best effort:
//! a model that ignores the format yields fewer prompts than tools.
//!
//! # Examples
//!
//! ```no_run
//! use mcpforge::prompts::{PromptSynthesizer, Provider};
//!
//! # async fn example(tools: Vec<mcpforge::openapi::Tool>) -> mcpforge::core::Result<()> {
//! let synthesizer = PromptSynthesizer::new(Provider::Groq, std::env::var("GROQ_API_KEY").unwrap_or_default())?;
//! let prompts = synthesizer.synthesize(&tools).await?;
//! println!("{} prompts", prompts.len());
//! # Ok(())
//! # }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::response_parser::parse_prompt_records;
use crate::core::config::PromptSynthesisConfig;
use crate::core::error::{Error, Result};
use crate::openapi::{Prompt, Tool};

const TEMPERATURE: f32 = 0.7;
const MAX_TOKENS: u32 = 1200;
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

const SYSTEM_MESSAGE: &str = "You are a helpful assistant that generates MCP-compliant prompts \
for API tools. IMPORTANT: Only use {{placeholders}} for arguments that actually exist in the tool.";

/// Chat-completions provider
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    OpenAi,
    /// Fast, low-cost alternative
    Groq,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::OpenAi => "openai",
            Provider::Groq => "groq",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::OpenAi => "gpt-4o",
            Provider::Groq => "llama-3.1-8b-instant",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Provider::OpenAi => "https://api.openai.com/v1",
            Provider::Groq => "https://api.groq.com/openai/v1",
        }
    }

    pub fn default_api_key_env(&self) -> &'static str {
        match self {
            Provider::OpenAi => "OPENAI_API_KEY",
            Provider::Groq => "GROQ_API_KEY",
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "openai" => Ok(Provider::OpenAi),
            "groq" => Ok(Provider::Groq),
            _ => Err(Error::config(format!(
                "Unknown prompt provider '{s}' (expected openai or groq)"
            ))),
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Generates one prompt per tool through a language model
pub struct PromptSynthesizer {
    client: reqwest::Client,
    provider: Provider,
    model: String,
    base_url: String,
    api_key: Zeroizing<String>,
}

impl fmt::Debug for PromptSynthesizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptSynthesizer")
            .field("provider", &self.provider)
            .field("model", &self.model)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl PromptSynthesizer {
    pub fn new(provider: Provider, api_key: impl Into<String>) -> Result<Self> {
        Self::with_timeout(provider, api_key, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        provider: Provider,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!(
                env!("CARGO_PKG_NAME"),
                "/",
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self {
            client,
            provider,
            model: provider.default_model().to_string(),
            base_url: provider.default_base_url().to_string(),
            api_key: Zeroizing::new(api_key.into()),
        })
    }

    /// Build from config, reading the API key from the configured variable
    pub fn from_config(config: &PromptSynthesisConfig) -> Result<Self> {
        let key_env = config.api_key_env();
        let api_key = std::env::var(key_env).map_err(|_| {
            Error::prompt_synthesis(format!(
                "Environment variable {key_env} is not set; it must hold the {} API key",
                config.provider
            ))
        })?;

        let mut synthesizer = Self::with_timeout(
            config.provider,
            api_key,
            Duration::from_secs(config.timeout_secs),
        )?;
        if let Some(model) = &config.model {
            synthesizer = synthesizer.with_model(model.clone());
        }
        if let Some(base_url) = &config.base_url {
            synthesizer = synthesizer.with_base_url(base_url.clone());
        }
        Ok(synthesizer)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Ask the model for one prompt per tool
    pub async fn synthesize(&self, tools: &[Tool]) -> Result<Vec<Prompt>> {
        if tools.is_empty() {
            return Ok(Vec::new());
        }

        let user_message = build_user_message(tools);
        let answer = self.complete(&user_message).await?;
        let prompts = parse_prompt_records(&answer);

        if prompts.len() < tools.len() {
            warn!(
                provider = %self.provider,
                tools = tools.len(),
                prompts = prompts.len(),
                "Prompt synthesis returned fewer prompts than tools"
            );
        } else {
            debug!(provider = %self.provider, prompts = prompts.len(), "Synthesized prompts");
        }
        Ok(prompts)
    }

    async fn complete(&self, user_message: &str) -> Result<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_MESSAGE,
                },
                ChatMessage {
                    role: "user",
                    content: user_message,
                },
            ],
            temperature: TEMPERATURE,
            max_tokens: MAX_TOKENS,
        };

        let url = format!("{}/chat/completions", self.base_url);
        debug!(%url, model = %self.model, "Calling chat completions");

        let response = self
            .client
            .post(&url)
            .bearer_auth(self.api_key.as_str())
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::prompt_synthesis(format!("Request to {url} failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::prompt_synthesis(format!(
                "{} returned {status}: {body}",
                self.provider
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| Error::prompt_synthesis(format!("Malformed completion response: {e}")))?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .ok_or_else(|| Error::prompt_synthesis("Completion response has no content"))
    }
}

fn describe_tool(tool: &Tool) -> String {
    let args = if tool.args.is_empty() {
        "none".to_string()
    } else {
        tool.args.keys().cloned().collect::<Vec<_>>().join(", ")
    };
    format!(
        "Tool: {}\nDescription: {}\nMethod: {}\nURL: {}\nArguments: {args}",
        tool.name, tool.desc, tool.method, tool.url
    )
}

/// Instructions plus one block per tool
pub fn build_user_message(tools: &[Tool]) -> String {
    let joined = tools
        .iter()
        .map(describe_tool)
        .collect::<Vec<_>>()
        .join("\n\n---\n\n");

    format!(
        r#"You are an expert at creating MCP (Model Context Protocol) prompt templates for API tools.

For EACH API tool below, generate exactly ONE prompt template following MCP standards.

CRITICAL RULES:
1. Prompt Name MUST be EXACTLY the same as the tool name
2. If tool has NO arguments (Arguments: none), do NOT use any {{{{placeholders}}}} in the text
3. If tool HAS arguments, use {{{{argument_name}}}} placeholders

MCP Prompt Format:
- Name: [ToolName] - MUST EXACTLY match the tool name
- Arguments: [Extracted from tool args, or leave EMPTY if tool has no arguments]
- Description: [One-line description]
- Text: [Template with NO placeholders if tool has no arguments]

Example - tool "GetUser" with arguments (id, limit):
- Name: GetUser
- Arguments: id, limit
- Description: Fetch user details
- Text: "Query user with ID {{{{id}}}} and retrieve {{{{limit}}}} records"

Tools:
{joined}

Generate exactly one complete MCP prompt template per tool. Format each as:
---
Tool: [tool_name]
Name: [tool_name] (MUST BE IDENTICAL)
Arguments: [arg1, arg2, ...] or EMPTY if no arguments
Description: [description]
Text: [template text with placeholders ONLY for arguments that exist]
---"#
    )
}
