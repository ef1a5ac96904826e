//! Render context for the server template.
//!
//! Turns the parse result into flat, template-ready views: pruned models with
//! Python class names, cosmetic aliases, tool functions, and prompt functions.
//! Every identifier and literal is final here, so the template only lays text
//! out.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use tracing::debug;

use super::sanitizers::{docstring, python_list_literal, python_literal};
use super::utils::{
    BODY_BUILTINS, IdentAllocator, MODULE_NAMES, is_python_keyword, python_type,
    sanitize_field_identifier,
};
use crate::core::utils::{class_identifier, title_case_joined};
use crate::openapi::{AuthScheme, HttpMethod, Model, Prompt, Tool, required_secrets};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldView {
    pub ident: String,
    pub py_type: String,
    /// Original field name when it differs from `ident`
    pub alias_literal: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelView {
    pub id: String,
    pub class_name: String,
    pub fields: Vec<FieldView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AliasView {
    pub name: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParamView {
    pub ident: String,
    pub py_type: String,
    /// Original argument name, the key used for path substitution and params
    pub key_literal: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolView {
    pub name: String,
    pub name_literal: String,
    pub fn_name: String,
    pub doc: String,
    pub params: Vec<ParamView>,
    pub url_literal: String,
    pub method_literal: String,
    /// `none`, `bearer`, or `api_key`
    pub auth_kind: &'static str,
    pub auth_env_literal: Option<String>,
    pub has_body: bool,
    /// The body argument is a generated model rather than a plain dict
    pub body_is_model: bool,
    pub has_file_fields: bool,
    /// Leftover arguments go to the query string
    pub send_params: bool,
    pub response_class: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PromptView {
    pub register_literal: String,
    pub fn_name: String,
    pub doc: String,
    pub name_literal: String,
    pub arguments_literal: String,
    pub desc_literal: String,
    pub text_literal: String,
}

/// Everything the server template needs
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerContext {
    pub api_name: String,
    pub api_name_literal: String,
    pub api_doc: String,
    pub models: Vec<ModelView>,
    pub aliases: Vec<AliasView>,
    pub tools: Vec<ToolView>,
    pub prompts: Vec<PromptView>,
    pub required_secrets: Vec<String>,
}

impl ServerContext {
    pub fn build(
        api_name: &str,
        tools: &[Tool],
        prompts: &[Prompt],
        models: &IndexMap<String, Model>,
    ) -> Self {
        let emitted = prune_models(tools, models);
        let classes = class_names(&emitted);

        let model_views: Vec<ModelView> = emitted
            .iter()
            .map(|model| model_view(model, &classes))
            .collect();
        let aliases = model_aliases(tools, &classes);

        let mut module_idents = IdentAllocator::with_reserved(MODULE_NAMES.iter().copied());
        for class in classes.values() {
            module_idents.reserve(class.clone());
        }
        for alias in &aliases {
            module_idents.reserve(alias.name.clone());
        }

        let tool_views = tools
            .iter()
            .map(|tool| tool_view(tool, &classes, &mut module_idents))
            .collect();
        let prompt_views = prompts
            .iter()
            .map(|prompt| prompt_view(prompt, &mut module_idents))
            .collect();

        debug!(
            api = api_name,
            models = model_views.len(),
            aliases = aliases.len(),
            "Built server render context"
        );

        Self {
            api_name: api_name.to_string(),
            api_name_literal: python_literal(api_name),
            api_doc: docstring(api_name, "generated"),
            models: model_views,
            aliases,
            tools: tool_views,
            prompts: prompt_views,
            required_secrets: required_secrets(tools),
        }
    }

    pub fn to_tera_context(&self) -> crate::core::error::Result<tera::Context> {
        Ok(tera::Context::from_serialize(self)?)
    }
}

/// Models referenced by some tool's body or response, in first-reference
/// order. References to models missing from `models` are dropped.
pub fn prune_models<'m>(tools: &[Tool], models: &'m IndexMap<String, Model>) -> Vec<&'m Model> {
    let mut used: IndexSet<&str> = IndexSet::new();
    for tool in tools {
        used.extend(tool.body_model.as_deref());
        used.extend(tool.response_model.as_deref());
    }
    used.into_iter().filter_map(|id| models.get(id)).collect()
}

/// Python class name for each emitted model id
fn class_names(emitted: &[&Model]) -> IndexMap<String, String> {
    let mut idents = IdentAllocator::with_reserved(MODULE_NAMES.iter().copied());
    emitted
        .iter()
        .map(|model| {
            let mut base = class_identifier(&model.name, "Model");
            if is_python_keyword(&base) || idents.is_taken(&base) {
                base.push_str("Model");
            }
            (model.name.clone(), idents.allocate_sanitized(base))
        })
        .collect()
}

fn model_view(model: &Model, classes: &IndexMap<String, String>) -> ModelView {
    let mut idents = IdentAllocator::with_reserved(["model_config"]);
    let fields = model
        .fields
        .iter()
        .map(|(name, ty)| {
            let ident = idents.allocate_sanitized(sanitize_field_identifier(name));
            FieldView {
                alias_literal: (ident != *name).then(|| python_literal(name)),
                py_type: python_type(ty, classes, true),
                ident,
            }
        })
        .collect();

    ModelView {
        id: model.name.clone(),
        class_name: classes.get(&model.name).cloned().unwrap_or_default(),
        fields,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Role {
    Request,
    Response,
}

impl Role {
    fn suffix(&self) -> &'static str {
        match self {
            Role::Request => "Request",
            Role::Response => "Response",
        }
    }
}

/// Alias bindings for models used by more than one (tool, role) pair.
///
/// Aliases never shadow an emitted class or another alias.
pub fn model_aliases(tools: &[Tool], classes: &IndexMap<String, String>) -> Vec<AliasView> {
    let mut usage: IndexMap<&str, Vec<(&str, Role)>> = IndexMap::new();
    for tool in tools {
        if let Some(model) = tool.body_model.as_deref() {
            usage.entry(model).or_default().push((tool.name.as_str(), Role::Request));
        }
        if let Some(model) = tool.response_model.as_deref() {
            usage.entry(model).or_default().push((tool.name.as_str(), Role::Response));
        }
    }

    let mut taken: IndexSet<String> = classes.values().cloned().collect();
    taken.extend(MODULE_NAMES.iter().map(|s| s.to_string()));

    let mut aliases = Vec::new();
    for (model, usages) in usage {
        let Some(target) = classes.get(model) else {
            continue;
        };
        if usages.len() < 2 {
            continue;
        }
        for (tool_name, role) in usages {
            let name = class_identifier(
                &format!("{}{}", title_case_joined(tool_name), role.suffix()),
                "Alias",
            );
            if is_python_keyword(&name) || !taken.insert(name.clone()) {
                continue;
            }
            aliases.push(AliasView {
                name,
                target: target.clone(),
            });
        }
    }
    aliases
}

fn tool_view(
    tool: &Tool,
    classes: &IndexMap<String, String>,
    module_idents: &mut IdentAllocator,
) -> ToolView {
    let mut param_idents = IdentAllocator::with_reserved(
        MODULE_NAMES
            .iter()
            .chain(BODY_BUILTINS)
            .map(|s| s.to_string())
            .chain(classes.values().cloned()),
    );
    let params = tool
        .args
        .iter()
        .map(|(name, ty)| ParamView {
            ident: param_idents.allocate_sanitized(sanitize_field_identifier(name)),
            py_type: python_type(ty, classes, false),
            key_literal: python_literal(name),
        })
        .collect();

    let (auth_kind, auth_env_literal) = match &tool.auth {
        AuthScheme::None => ("none", None),
        AuthScheme::BearerToken { env_var } => ("bearer", Some(python_literal(env_var))),
        AuthScheme::ApiKeyHeader { env_var } => ("api_key", Some(python_literal(env_var))),
    };

    let body_is_model = tool
        .body_model
        .as_deref()
        .is_some_and(|model| classes.contains_key(model));

    ToolView {
        name: tool.name.clone(),
        name_literal: python_literal(&tool.name),
        fn_name: module_idents.allocate(&tool.name),
        doc: docstring(&tool.desc, &format!("{} {}", tool.method, tool.url)),
        params,
        url_literal: python_literal(&tool.url),
        method_literal: python_literal(tool.method.as_str()),
        auth_kind,
        auth_env_literal,
        has_body: tool.body_model.is_some(),
        body_is_model,
        has_file_fields: tool.has_file_fields,
        send_params: tool.has_query_params || tool.method == HttpMethod::Get,
        response_class: tool
            .response_model
            .as_deref()
            .and_then(|model| classes.get(model))
            .cloned(),
    }
}

fn prompt_view(prompt: &Prompt, module_idents: &mut IdentAllocator) -> PromptView {
    let registered = format!("{}_prompt", prompt.name);
    PromptView {
        fn_name: module_idents.allocate(&registered),
        register_literal: python_literal(&registered),
        doc: docstring(&prompt.desc, &registered),
        name_literal: python_literal(&prompt.name),
        arguments_literal: python_list_literal(&prompt.argument_names()),
        desc_literal: python_literal(&prompt.desc),
        text_literal: python_literal(&prompt.text),
    }
}
