//! Tera-based server renderer

use std::path::Path;
use tera::Tera;
use tracing::debug;

use super::context::ServerContext;
use crate::core::error::{Error, Result};

/// Template file name looked up in a custom template directory
pub const SERVER_TEMPLATE_FILE: &str = "server.py.tera";

const EMBEDDED_SERVER_TEMPLATE: &str =
    include_str!("../../templates/python_fastmcp/server.py.tera");

/// Renders a server context into source text
pub trait ServerRenderer: Send + Sync {
    fn render(&self, context: &ServerContext) -> Result<String>;

    /// File name of the rendered server for `api_name`
    fn file_name(&self, api_name: &str) -> String {
        format!("{api_name}_server.py")
    }
}

/// Where the server template came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateSource {
    Embedded,
    Filesystem(std::path::PathBuf),
}

/// Renders a Python FastMCP server through Tera
#[derive(Debug)]
pub struct FastMcpRenderer {
    tera: Tera,
    source: TemplateSource,
}

impl FastMcpRenderer {
    const TEMPLATE_NAME: &'static str = "server.py";

    /// Use the template compiled into the binary
    pub fn embedded() -> Result<Self> {
        Self::from_template_str(EMBEDDED_SERVER_TEMPLATE, TemplateSource::Embedded)
    }

    /// Use `server.py.tera` from a custom template directory
    pub fn from_template_dir(dir: &Path) -> Result<Self> {
        let path = dir.join(SERVER_TEMPLATE_FILE);
        if !path.is_file() {
            return Err(Error::config(format!(
                "Template directory {} has no {SERVER_TEMPLATE_FILE}",
                dir.display()
            )));
        }
        let content = std::fs::read_to_string(&path)?;
        debug!(template = %path.display(), "Loaded custom server template");
        Self::from_template_str(&content, TemplateSource::Filesystem(path))
    }

    /// Embedded template unless a template directory is given
    pub fn for_dir(dir: Option<&Path>) -> Result<Self> {
        match dir {
            Some(dir) => Self::from_template_dir(dir),
            None => Self::embedded(),
        }
    }

    fn from_template_str(content: &str, source: TemplateSource) -> Result<Self> {
        let mut tera = Tera::default();
        tera.add_raw_template(Self::TEMPLATE_NAME, content)?;
        Ok(Self { tera, source })
    }

    pub fn source(&self) -> &TemplateSource {
        &self.source
    }
}

impl ServerRenderer for FastMcpRenderer {
    fn render(&self, context: &ServerContext) -> Result<String> {
        let tera_context = context.to_tera_context()?;
        let rendered = self.tera.render(Self::TEMPLATE_NAME, &tera_context)?;
        debug!(
            api = %context.api_name,
            tools = context.tools.len(),
            prompts = context.prompts.len(),
            bytes = rendered.len(),
            "Rendered server source"
        );
        Ok(rendered)
    }
}
