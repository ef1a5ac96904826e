//! mcpforge CLI entrypoint
//! Parses command-line arguments and dispatches to the generator.
#![deny(unsafe_code)]

// Internal imports (std, crate)
use mcpforge::application::{
    GenerateServerRequest, GenerateServerUseCase, OpenApiLoader, PromptSource,
};
use mcpforge::core::Config;
use mcpforge::core::config::CliOverrides;
use mcpforge::generation::{FastMcpRenderer, GenerationOrchestrator};
use mcpforge::infrastructure::{CompositeOpenApiLoader, FileSystemOutputService};
use mcpforge::openapi::{SpecParser, required_secrets};
use mcpforge::prompts::{PromptSynthesizer, Provider};
use std::path::PathBuf;
use std::sync::Arc;

// External imports (alphabetized)
use anyhow::Context;
use clap::Parser;
use tracing::{Level, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mcpforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Subcommand, Debug)]
pub enum Commands {
    /// Generate an MCP server that exposes every API operation as a tool
    Generate {
        /// Path or URL to the OpenAPI / Swagger document (YAML or JSON)
        #[arg(long)]
        spec: Option<String>,
        /// API name; the server is written to <API_NAME>_server.py
        #[arg(long)]
        api_name: Option<String>,
        /// Output directory for generated files
        #[arg(long)]
        output_dir: Option<PathBuf>,
        /// TOML config file
        #[arg(long)]
        config: Option<PathBuf>,
        /// Only generate these operations (repeatable)
        #[arg(long = "include")]
        include: Vec<String>,
        /// Skip these operations (repeatable)
        #[arg(long = "exclude")]
        exclude: Vec<String>,
        /// JSON file of prompts to register next to the tools
        #[arg(long)]
        prompts: Option<PathBuf>,
        /// Synthesize one prompt per tool with a language model
        #[arg(long)]
        auto_prompts: bool,
        /// Prompt synthesis provider
        #[arg(long, value_parser = parse_provider)]
        provider: Option<Provider>,
        /// Directory holding a custom server.py.tera
        #[arg(long)]
        template_dir: Option<PathBuf>,
    },
    /// Parse a document and print the tools and models it yields
    Inspect {
        /// Path or URL to the OpenAPI / Swagger document (YAML or JSON)
        #[arg(long)]
        spec: String,
        /// Print the parse result as JSON
        #[arg(long)]
        json: bool,
    },
}

fn parse_provider(s: &str) -> Result<Provider, String> {
    s.parse().map_err(|e: mcpforge::core::Error| e.to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with default level INFO
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Generate {
            spec,
            api_name,
            output_dir,
            config,
            include,
            exclude,
            prompts,
            auto_prompts,
            provider,
            template_dir,
        } => {
            let base = match &config {
                Some(path) => Config::from_file(path)
                    .with_context(|| format!("Failed to load config {}", path.display()))?,
                None => Config::default(),
            };
            let config = base.merge_cli(CliOverrides {
                api_name,
                spec_source: spec,
                output_dir,
                template_dir,
                include_operations: include,
                exclude_operations: exclude,
                prompts_file: prompts,
                auto_prompts,
                provider,
            });
            generate(config).await?
        }
        Commands::Inspect { spec, json } => inspect(&spec, json).await?,
    }
    Ok(())
}

/// Generate the server and its companion files
async fn generate(config: Config) -> anyhow::Result<()> {
    config.validate().context("Invalid configuration")?;
    let request =
        GenerateServerRequest::from_config(&config).context("Invalid generate request")?;

    info!(spec = %request.spec_source, api = %request.api_name, "Generating MCP server");

    let renderer = FastMcpRenderer::for_dir(config.template_dir.as_deref())
        .context("Failed to load server template")?;
    let loader = CompositeOpenApiLoader::new().context("Failed to create spec loader")?;

    let mut use_case = GenerateServerUseCase::new(
        Arc::new(loader),
        Arc::new(GenerationOrchestrator::new(Arc::new(renderer))),
        Arc::new(FileSystemOutputService::new()),
    );
    if config.prompt_synthesis.enabled {
        let synthesizer = PromptSynthesizer::from_config(&config.prompt_synthesis)
            .context("Failed to set up prompt synthesis")?;
        info!(provider = %synthesizer.provider(), model = %synthesizer.model(), "Prompt synthesis enabled");
        use_case = use_case.with_prompt_source(Arc::new(synthesizer) as Arc<dyn PromptSource>);
    }

    let response = use_case
        .execute(request)
        .await
        .context("Failed to generate MCP server")?;

    println!(
        "Wrote {} ({} tools, {} prompts, {} models)",
        response.server_path.display(),
        response.metadata.tool_count,
        response.metadata.prompt_count,
        response.metadata.model_count
    );
    if !response.metadata.required_secrets.is_empty() {
        println!(
            "Set these environment variables before running it: {}",
            response.metadata.required_secrets.join(", ")
        );
    }
    Ok(())
}

/// Print what a document parses into
async fn inspect(spec: &str, json: bool) -> anyhow::Result<()> {
    let loader = CompositeOpenApiLoader::new().context("Failed to create spec loader")?;
    let text = loader
        .load(spec)
        .await
        .with_context(|| format!("Failed to load {spec}"))?;
    let parsed = SpecParser::new()
        .parse_str(&text)
        .context("Failed to parse spec")?;

    if json {
        println!("{}", serde_json::to_string_pretty(&parsed)?);
        return Ok(());
    }

    println!("Tools ({}):", parsed.tools.len());
    for tool in &parsed.tools {
        let args: Vec<String> = tool
            .args
            .iter()
            .map(|(name, ty)| format!("{name}: {ty}"))
            .collect();
        println!("  {} {} {}({})", tool.method, tool.url, tool.name, args.join(", "));
    }
    println!("Models ({}):", parsed.models.len());
    for model in parsed.models.values() {
        let fields: Vec<String> = model
            .fields
            .iter()
            .map(|(name, ty)| format!("{name}: {ty}"))
            .collect();
        println!("  {} {{ {} }}", model.name, fields.join(", "));
    }
    let secrets = required_secrets(&parsed.tools);
    if !secrets.is_empty() {
        println!("Secrets: {}", secrets.join(", "));
    }
    Ok(())
}
