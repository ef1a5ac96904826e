//! Workflow session: collect tools, design prompts, generate code.
//!
//! The session owns everything between loading a document and writing the
//! server, and only allows the steps that make sense in its current state:
//!
//! ```text
//! Idle --load--> CollectingTools --design_prompts--> DesigningPrompts
//!                     |                                    |
//!                     +-------------- generate ------------+--> GeneratingCode
//! ```
//!
//! Loading more than one document merges them. Tool names that collide get a
//! numeric suffix; a model that already exists with the same fields is reused,
//! and a different model under a taken name is renamed.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

use crate::core::error::{Error, Result};
use crate::generation::{GenerationOrchestrator, GenerationRequest, GenerationResult};
use crate::openapi::dedup::fingerprint;
use crate::openapi::{Model, ParseResult, Prompt, Tool};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    CollectingTools,
    DesigningPrompts,
    GeneratingCode,
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SessionState::Idle => "idle",
            SessionState::CollectingTools => "collecting tools",
            SessionState::DesigningPrompts => "designing prompts",
            SessionState::GeneratingCode => "generating code",
        })
    }
}

/// What one `load` call added to the session
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub tools_added: usize,
    pub models_added: usize,
    /// Tools renamed to avoid a collision, as (original, new)
    pub renamed_tools: Vec<(String, String)>,
    /// Models renamed or mapped onto an existing model, as (original, new)
    pub remapped_models: Vec<(String, String)>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Session {
    api_name: String,
    state: SessionState,
    tools: Vec<Tool>,
    models: IndexMap<String, Model>,
    prompts: Vec<Prompt>,
}

impl Session {
    pub fn new(api_name: impl Into<String>) -> Self {
        Self {
            api_name: api_name.into(),
            ..Self::default()
        }
    }

    pub fn api_name(&self) -> &str {
        &self.api_name
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn tools(&self) -> &[Tool] {
        &self.tools
    }

    pub fn models(&self) -> &IndexMap<String, Model> {
        &self.models
    }

    pub fn prompts(&self) -> &[Prompt] {
        &self.prompts
    }

    fn require(&self, allowed: &[SessionState], action: &str) -> Result<()> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(Error::InvalidTransition {
                from: self.state.to_string(),
                action: action.to_string(),
            })
        }
    }

    /// Merge a parse result into the session
    pub fn load(&mut self, parsed: ParseResult) -> Result<LoadSummary> {
        self.require(
            &[SessionState::Idle, SessionState::CollectingTools],
            "load tools",
        )?;

        let mut summary = LoadSummary::default();
        let renames = self.merge_models(parsed.models, &mut summary);

        for mut tool in parsed.tools {
            tool.remap_models(&renames);
            let unique = self.unique_tool_name(&tool.name);
            if unique != tool.name {
                warn!(tool = %tool.name, renamed = %unique, "Tool name already loaded, renaming");
                summary.renamed_tools.push((tool.name.clone(), unique.clone()));
                tool.name = unique;
            }
            self.tools.push(tool);
            summary.tools_added += 1;
        }

        self.state = SessionState::CollectingTools;
        info!(
            tools = summary.tools_added,
            models = summary.models_added,
            total_tools = self.tools.len(),
            "Loaded tools into session"
        );
        Ok(summary)
    }

    fn merge_models(
        &mut self,
        incoming: IndexMap<String, Model>,
        summary: &mut LoadSummary,
    ) -> HashMap<String, String> {
        let mut by_fingerprint: HashMap<String, String> = self
            .models
            .values()
            .map(|m| (fingerprint(&m.fields), m.name.clone()))
            .collect();
        let mut renames = HashMap::new();

        for (id, mut model) in incoming {
            let print = fingerprint(&model.fields);
            if let Some(existing) = by_fingerprint.get(&print) {
                if *existing != id {
                    summary.remapped_models.push((id.clone(), existing.clone()));
                    renames.insert(id, existing.clone());
                }
                continue;
            }

            let name = self.unique_model_name(&id);
            if name != id {
                debug!(model = %id, renamed = %name, "Model name taken by a different model");
                summary.remapped_models.push((id.clone(), name.clone()));
                renames.insert(id, name.clone());
            }
            model.name = name.clone();
            by_fingerprint.insert(print, name.clone());
            self.models.insert(name, model);
            summary.models_added += 1;
        }
        renames
    }

    fn unique_tool_name(&self, name: &str) -> String {
        let taken = |candidate: &str| self.tools.iter().any(|t| t.name == candidate);
        if !taken(name) {
            return name.to_string();
        }
        (2..)
            .map(|n| format!("{name}_{n}"))
            .find(|candidate| !taken(candidate))
            .unwrap_or_else(|| name.to_string())
    }

    fn unique_model_name(&self, name: &str) -> String {
        if !self.models.contains_key(name) {
            return name.to_string();
        }
        (2..)
            .map(|n| format!("{name}{n}"))
            .find(|candidate| !self.models.contains_key(candidate))
            .unwrap_or_else(|| name.to_string())
    }

    /// Keep only the named tools. Names that match nothing are reported back.
    pub fn retain_tools<S: AsRef<str>>(&mut self, names: &[S]) -> Result<Vec<String>> {
        self.require(&[SessionState::CollectingTools], "select tools")?;
        let unknown = self.unknown_names(names);
        self.tools
            .retain(|tool| names.iter().any(|n| n.as_ref() == tool.name));
        self.prune_models();
        Ok(unknown)
    }

    /// Drop the named tools. Names that match nothing are reported back.
    pub fn exclude_tools<S: AsRef<str>>(&mut self, names: &[S]) -> Result<Vec<String>> {
        self.require(&[SessionState::CollectingTools], "remove tools")?;
        let unknown = self.unknown_names(names);
        self.tools
            .retain(|tool| !names.iter().any(|n| n.as_ref() == tool.name));
        self.prune_models();
        Ok(unknown)
    }

    /// Drop one tool, returning it if it existed
    pub fn remove_tool(&mut self, name: &str) -> Result<Option<Tool>> {
        self.require(&[SessionState::CollectingTools], "remove tools")?;
        let removed = self
            .tools
            .iter()
            .position(|t| t.name == name)
            .map(|index| self.tools.remove(index));
        self.prune_models();
        Ok(removed)
    }

    /// Drop models that no remaining tool uses as body or response
    fn prune_models(&mut self) {
        let tools = &self.tools;
        let before = self.models.len();
        self.models.retain(|id, _| {
            tools.iter().any(|t| {
                t.body_model.as_deref() == Some(id.as_str())
                    || t.response_model.as_deref() == Some(id.as_str())
            })
        });
        if self.models.len() < before {
            debug!(pruned = before - self.models.len(), "Dropped unreferenced models");
        }
    }

    fn unknown_names<S: AsRef<str>>(&self, names: &[S]) -> Vec<String> {
        names
            .iter()
            .map(AsRef::as_ref)
            .filter(|name| !self.tools.iter().any(|t| t.name == *name))
            .map(String::from)
            .collect()
    }

    /// Add prompts; may be called repeatedly
    pub fn design_prompts(&mut self, prompts: Vec<Prompt>) -> Result<()> {
        self.require(
            &[SessionState::CollectingTools, SessionState::DesigningPrompts],
            "design prompts",
        )?;
        for prompt in &prompts {
            if !self.tools.iter().any(|t| t.name == prompt.name) {
                debug!(prompt = %prompt.name, "Prompt does not match any tool name");
            }
        }
        self.prompts.extend(prompts);
        self.state = SessionState::DesigningPrompts;
        Ok(())
    }

    /// Render the server for the current tools and prompts
    pub fn generate(&mut self, orchestrator: &GenerationOrchestrator) -> Result<GenerationResult> {
        self.require(
            &[SessionState::CollectingTools, SessionState::DesigningPrompts],
            "generate code",
        )?;
        let request = GenerationRequest {
            api_name: self.api_name.clone(),
            tools: self.tools.clone(),
            prompts: self.prompts.clone(),
            models: self.models.clone(),
        };
        let result = orchestrator.generate(&request)?;
        self.state = SessionState::GeneratingCode;
        Ok(result)
    }

    /// Forget everything and return to `Idle`
    pub fn reset(&mut self) {
        *self = Self::new(std::mem::take(&mut self.api_name));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::ServerRenderer;
    use crate::generation::ServerContext;
    use crate::openapi::{AuthScheme, HttpMethod, SemanticType, parse_spec};
    use std::sync::Arc;

    struct CountingRenderer;

    impl ServerRenderer for CountingRenderer {
        fn render(&self, context: &ServerContext) -> Result<String> {
            Ok(format!("{} tools, {} prompts", context.tools.len(), context.prompts.len()))
        }
    }

    fn orchestrator() -> GenerationOrchestrator {
        GenerationOrchestrator::new(Arc::new(CountingRenderer))
    }

    fn model(name: &str, fields: &[(&str, SemanticType)]) -> Model {
        Model::new(
            name,
            fields
                .iter()
                .map(|(n, t)| (n.to_string(), t.clone()))
                .collect(),
        )
    }

    fn tool(name: &str, body: Option<&str>) -> Tool {
        let mut tool = Tool {
            name: name.to_string(),
            url: format!("https://api.example.com/{name}"),
            method: HttpMethod::Post,
            auth: AuthScheme::None,
            args: IndexMap::new(),
            body_model: None,
            response_model: None,
            has_query_params: false,
            has_file_fields: false,
            desc: String::new(),
        };
        if let Some(body) = body {
            tool.set_body_model(body);
        }
        tool
    }

    fn parsed(tools: Vec<Tool>, models: Vec<Model>) -> ParseResult {
        ParseResult {
            tools,
            models: models.into_iter().map(|m| (m.name.clone(), m)).collect(),
        }
    }

    #[test]
    fn test_happy_path_transitions() {
        let mut session = Session::new("pets");
        assert_eq!(session.state(), SessionState::Idle);

        session.load(parsed(vec![tool("a", None), tool("b", None)], vec![])).unwrap();
        assert_eq!(session.state(), SessionState::CollectingTools);

        session.remove_tool("b").unwrap();
        session
            .design_prompts(vec![Prompt {
                name: "a".to_string(),
                text: "Do a".to_string(),
                ..Prompt::default()
            }])
            .unwrap();
        assert_eq!(session.state(), SessionState::DesigningPrompts);

        let result = session.generate(&orchestrator()).unwrap();
        assert_eq!(result.server_source(), Some("1 tools, 1 prompts"));
        assert_eq!(session.state(), SessionState::GeneratingCode);
    }

    #[test]
    fn test_invalid_transitions() {
        let mut session = Session::new("pets");
        let err = session.generate(&orchestrator()).unwrap_err();
        assert_eq!(err.to_string(), "Cannot generate code while session is idle");
        assert!(session.design_prompts(vec![]).is_err());
        assert!(session.remove_tool("a").is_err());

        session.load(parsed(vec![tool("a", None)], vec![])).unwrap();
        session.design_prompts(vec![]).unwrap();
        assert!(matches!(
            session.retain_tools(&["a"]),
            Err(Error::InvalidTransition { .. })
        ));
        assert!(session.load(ParseResult::default()).is_err());

        session.generate(&orchestrator()).unwrap();
        assert!(session.design_prompts(vec![]).is_err());
        assert!(session.generate(&orchestrator()).is_err());
    }

    #[test]
    fn test_reset_returns_to_idle() {
        let mut session = Session::new("pets");
        session.load(parsed(vec![tool("a", None)], vec![])).unwrap();
        session.reset();
        assert_eq!(session.state(), SessionState::Idle);
        assert!(session.tools().is_empty());
        assert_eq!(session.api_name(), "pets");
    }

    #[test]
    fn test_retain_and_exclude_report_unknown_names() {
        let mut session = Session::new("x");
        session
            .load(parsed(vec![tool("a", None), tool("b", None), tool("c", None)], vec![]))
            .unwrap();

        let unknown = session.retain_tools(&["a", "b", "zzz"]).unwrap();
        assert_eq!(unknown, vec!["zzz"]);
        let unknown = session.exclude_tools(&["b", "nope"]).unwrap();
        assert_eq!(unknown, vec!["nope"]);

        let names: Vec<&str> = session.tools().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a"]);
    }

    #[test]
    fn test_filtering_tools_drops_their_models() {
        let mut session = Session::new("x");
        session
            .load(parsed(
                vec![tool("create_user", Some("User")), tool("create_order", Some("Order")), tool("health", None)],
                vec![
                    model("User", &[("name", SemanticType::Text)]),
                    model("Order", &[("total", SemanticType::Float)]),
                ],
            ))
            .unwrap();

        session.exclude_tools(&["create_user"]).unwrap();
        assert_eq!(session.models().keys().collect::<Vec<_>>(), vec!["Order"]);

        session.remove_tool("create_order").unwrap();
        assert!(session.models().is_empty());

        session.retain_tools(&["health"]).unwrap();
        assert_eq!(session.tools().len(), 1);
        assert!(session.models().is_empty());

        session
            .load(parsed(
                vec![tool("update_user", Some("User"))],
                vec![model("User", &[("id", SemanticType::Integer)])],
            ))
            .unwrap();
        assert_eq!(session.models().keys().collect::<Vec<_>>(), vec!["User"]);
        assert_eq!(session.tools()[1].body_model.as_deref(), Some("User"));
    }

    #[test]
    fn test_merge_suffixes_colliding_tools() {
        let mut session = Session::new("x");
        session.load(parsed(vec![tool("list", None)], vec![])).unwrap();
        let summary = session
            .load(parsed(vec![tool("list", None), tool("list", None)], vec![]))
            .unwrap();

        let names: Vec<&str> = session.tools().iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["list", "list_2", "list_3"]);
        assert_eq!(summary.renamed_tools.len(), 2);
    }

    #[test]
    fn test_merge_reuses_identical_models() {
        let user = model("User", &[("name", SemanticType::Text)]);
        let mut session = Session::new("x");
        session
            .load(parsed(vec![tool("create_user", Some("User"))], vec![user.clone()]))
            .unwrap();

        let same_fields = model("Person", &[("name", SemanticType::Text)]);
        let summary = session
            .load(parsed(vec![tool("create_person", Some("Person"))], vec![same_fields]))
            .unwrap();

        assert_eq!(session.models().len(), 1);
        assert_eq!(summary.remapped_models, vec![("Person".to_string(), "User".to_string())]);
        let second = &session.tools()[1];
        assert_eq!(second.body_model.as_deref(), Some("User"));
        assert_eq!(second.args.get("body"), Some(&SemanticType::Model("User".to_string())));
    }

    #[test]
    fn test_merge_renames_conflicting_models() {
        let mut session = Session::new("x");
        session
            .load(parsed(
                vec![tool("create_user", Some("User"))],
                vec![model("User", &[("name", SemanticType::Text)])],
            ))
            .unwrap();
        session
            .load(parsed(
                vec![tool("update_user", Some("User"))],
                vec![model("User", &[("id", SemanticType::Integer)])],
            ))
            .unwrap();

        assert_eq!(session.models().len(), 2);
        assert_eq!(session.models()["User2"].name, "User2");
        assert_eq!(session.tools()[0].body_model.as_deref(), Some("User"));
        assert_eq!(session.tools()[1].body_model.as_deref(), Some("User2"));
    }

    #[test]
    fn test_session_round_trips_through_json() {
        let mut session = Session::new("pets");
        session
            .load(parse_spec(
                r#"{"openapi": "3.0.0", "servers": [{"url": "https://x.io"}],
                    "paths": {"/pets": {"get": {"operationId": "listPets"}}}}"#,
            ).unwrap())
            .unwrap();

        let json = serde_json::to_string(&session).unwrap();
        assert!(json.contains("\"collecting_tools\""));
        let restored: Session = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, session);
    }
}
