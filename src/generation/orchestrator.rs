//! Generation orchestration - coordinates the generation workflow

use indexmap::IndexMap;
use std::sync::Arc;

use crate::core::error::{Error, Result};
use crate::generation::{
    Artifact, GenerationMetadata, GenerationResult, ServerContext, ServerRenderer,
};
use crate::openapi::{Model, Prompt, Tool};

/// Name of the environment template written next to the server
pub const ENV_EXAMPLE_FILE: &str = ".env.example";

/// Input of one generation run
#[derive(Debug, Clone, Default)]
pub struct GenerationRequest {
    pub api_name: String,
    pub tools: Vec<Tool>,
    pub prompts: Vec<Prompt>,
    pub models: IndexMap<String, Model>,
}

impl GenerationRequest {
    fn validate(&self) -> Result<()> {
        if self.api_name.trim().is_empty() {
            return Err(Error::config("API name cannot be empty"));
        }
        Ok(())
    }
}

/// Orchestrates the code generation workflow
pub struct GenerationOrchestrator {
    renderer: Arc<dyn ServerRenderer>,
}

impl GenerationOrchestrator {
    pub fn new(renderer: Arc<dyn ServerRenderer>) -> Self {
        Self { renderer }
    }

    /// Render the server and its companion files
    pub fn generate(&self, request: &GenerationRequest) -> Result<GenerationResult> {
        // 1. Validate request
        request.validate()?;

        tracing::debug!(
            "Orchestrator starting generation with {} tools",
            request.tools.len()
        );

        // 2. Build the render context
        let context = ServerContext::build(
            &request.api_name,
            &request.tools,
            &request.prompts,
            &request.models,
        );

        // 3. Render the server source
        let server_file = self.renderer.file_name(&request.api_name);
        let source = self.renderer.render(&context)?;

        // 4. Companion files
        let artifacts = vec![
            Artifact::new(&server_file, source),
            Artifact::new(ENV_EXAMPLE_FILE, env_example(&context.required_secrets)),
        ];

        Ok(GenerationResult {
            artifacts,
            metadata: GenerationMetadata {
                api_name: request.api_name.clone(),
                server_file,
                tool_count: context.tools.len(),
                prompt_count: context.prompts.len(),
                model_count: context.models.len(),
                required_secrets: context.required_secrets,
            },
        })
    }
}

/// Environment template listing every secret the server reads
pub fn env_example(secrets: &[String]) -> String {
    if secrets.is_empty() {
        return "# This server reads no credentials from the environment.\n".to_string();
    }
    let mut out = String::from("# Credentials read by the generated server\n");
    for secret in secrets {
        out.push_str(secret);
        out.push_str("=\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::FastMcpRenderer;
    use crate::openapi::{AuthScheme, HttpMethod};

    struct StaticRenderer;

    impl ServerRenderer for StaticRenderer {
        fn render(&self, context: &ServerContext) -> Result<String> {
            Ok(format!("tools={}", context.tools.len()))
        }

        fn file_name(&self, api_name: &str) -> String {
            format!("{api_name}.txt")
        }
    }

    fn tool(name: &str, auth: AuthScheme) -> Tool {
        Tool {
            name: name.to_string(),
            url: format!("https://api.example.com/{name}"),
            method: HttpMethod::Get,
            auth,
            args: IndexMap::new(),
            body_model: None,
            response_model: None,
            has_query_params: false,
            has_file_fields: false,
            desc: String::new(),
        }
    }

    #[test]
    fn test_generate_produces_server_and_env_example() {
        let orchestrator = GenerationOrchestrator::new(Arc::new(FastMcpRenderer::embedded().unwrap()));
        let request = GenerationRequest {
            api_name: "weather".to_string(),
            tools: vec![
                tool("forecast", AuthScheme::BearerToken { env_var: "WEATHER_TOKEN".to_string() }),
                tool("alerts", AuthScheme::BearerToken { env_var: "WEATHER_TOKEN".to_string() }),
            ],
            ..Default::default()
        };

        let result = orchestrator.generate(&request).unwrap();
        assert_eq!(result.artifacts.len(), 2);
        assert_eq!(result.artifacts[0].path.to_str(), Some("weather_server.py"));
        assert!(result.server_source().unwrap().contains("def forecast():"));
        assert_eq!(result.artifacts[1].path.to_str(), Some(ENV_EXAMPLE_FILE));
        assert_eq!(
            result.artifacts[1].content,
            "# Credentials read by the generated server\nWEATHER_TOKEN=\n"
        );
        assert_eq!(result.metadata.tool_count, 2);
        assert_eq!(result.metadata.required_secrets, vec!["WEATHER_TOKEN"]);
    }

    #[test]
    fn test_generate_uses_renderer_file_name() {
        let orchestrator = GenerationOrchestrator::new(Arc::new(StaticRenderer));
        let request = GenerationRequest {
            api_name: "api".to_string(),
            tools: vec![tool("ping", AuthScheme::None)],
            ..Default::default()
        };
        let result = orchestrator.generate(&request).unwrap();
        assert_eq!(result.metadata.server_file, "api.txt");
        assert_eq!(result.server_source(), Some("tools=1"));
    }

    #[test]
    fn test_blank_api_name_is_rejected() {
        let orchestrator = GenerationOrchestrator::new(Arc::new(StaticRenderer));
        let err = orchestrator.generate(&GenerationRequest::default()).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_env_example_without_secrets() {
        assert!(env_example(&[]).starts_with('#'));
        assert!(!env_example(&[]).contains('='));
    }
}
