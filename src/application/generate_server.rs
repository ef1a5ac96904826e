//! Use case for generating an MCP server from a spec document

use std::sync::Arc;
use tracing::{info, warn};

use crate::application::{
    ApplicationError, GenerateServerRequest, GenerateServerResponse, OpenApiLoader,
    OutputService, PromptSource, Session,
};
use crate::generation::GenerationOrchestrator;
use crate::openapi::SpecParser;
use crate::prompts::load_prompts_file;

/// Use case for generating server implementations
pub struct GenerateServerUseCase {
    openapi_loader: Arc<dyn OpenApiLoader>,
    generation_orchestrator: Arc<GenerationOrchestrator>,
    output_service: Arc<dyn OutputService>,
    prompt_source: Option<Arc<dyn PromptSource>>,
}

impl GenerateServerUseCase {
    pub fn new(
        openapi_loader: Arc<dyn OpenApiLoader>,
        generation_orchestrator: Arc<GenerationOrchestrator>,
        output_service: Arc<dyn OutputService>,
    ) -> Self {
        Self {
            openapi_loader,
            generation_orchestrator,
            output_service,
            prompt_source: None,
        }
    }

    /// Synthesize prompts for the selected tools before generating
    pub fn with_prompt_source(mut self, prompt_source: Arc<dyn PromptSource>) -> Self {
        self.prompt_source = Some(prompt_source);
        self
    }

    pub async fn execute(
        &self,
        request: GenerateServerRequest,
    ) -> Result<GenerateServerResponse, ApplicationError> {
        // 1. Validate request
        request.validate()?;

        // 2. Load and parse the document
        let text = self.openapi_loader.load(&request.spec_source).await?;
        let parsed = SpecParser::new().parse_str(&text)?;

        // 3. Collect tools
        let mut session = Session::new(&request.api_name);
        session.load(parsed)?;
        if !request.include_operations.is_empty() {
            for name in session.retain_tools(&request.include_operations[..])? {
                warn!(operation = %name, "Included operation not found in spec");
            }
        }
        for name in session.exclude_tools(&request.exclude_operations[..])? {
            warn!(operation = %name, "Excluded operation not found in spec");
        }

        // 4. Prompts: authored first, then synthesized
        let mut prompts = match &request.prompts_file {
            Some(path) => load_prompts_file(path)?,
            None => Vec::new(),
        };
        if let Some(source) = &self.prompt_source {
            prompts.extend(source.prompts_for(session.tools()).await?);
        }
        session.design_prompts(prompts)?;

        // 5. Generate code
        let result = session.generate(&self.generation_orchestrator)?;

        // 6. Ensure output directory exists
        self.output_service
            .ensure_directory(&request.output_dir)
            .await?;

        // 7. Prepend output directory to artifact paths and write
        let mut output_artifacts = result.artifacts;
        for artifact in &mut output_artifacts {
            artifact.path = request.output_dir.join(&artifact.path);
        }

        let artifacts_count = output_artifacts.len();
        self.output_service
            .write_artifacts(&output_artifacts)
            .await?;

        let server_path = request.output_dir.join(&result.metadata.server_file);
        info!(
            server = %server_path.display(),
            tools = result.metadata.tool_count,
            prompts = result.metadata.prompt_count,
            models = result.metadata.model_count,
            "Generated MCP server"
        );

        Ok(GenerateServerResponse {
            artifacts_count,
            output_path: request.output_dir,
            server_path,
            metadata: result.metadata,
        })
    }
}
