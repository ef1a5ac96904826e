//! Intermediate representation produced by the spec parser and consumed by the
//! code generator.
//!
//! `ParseResult` is the only contract between the two halves of the compiler.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::core::error::Error;

/// Target-neutral type of a tool argument or model field
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SemanticType {
    Text,
    Integer,
    Float,
    Boolean,
    /// Generic dynamic structure (an object without declared fields)
    Dynamic,
    /// `None` is an untyped list
    List(Option<Box<SemanticType>>),
    /// Reference to a model by identifier. The model may not exist when the
    /// name came from an unresolvable `$ref`.
    Model(String),
}

impl SemanticType {
    /// Normalize a raw spec type tag through the fixed primitive table.
    /// Unknown tags default to text.
    pub fn from_type_tag(tag: &str) -> Self {
        match tag {
            "integer" => Self::Integer,
            "number" => Self::Float,
            "boolean" => Self::Boolean,
            "array" => Self::List(None),
            "object" => Self::Dynamic,
            // string, file, and anything unrecognized
            _ => Self::Text,
        }
    }

    pub fn list_of(inner: SemanticType) -> Self {
        Self::List(Some(Box::new(inner)))
    }

    pub fn model_ref(&self) -> Option<&str> {
        match self {
            Self::Model(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for SemanticType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Integer => write!(f, "integer"),
            Self::Float => write!(f, "float"),
            Self::Boolean => write!(f, "boolean"),
            Self::Dynamic => write!(f, "dynamic"),
            Self::List(None) => write!(f, "list"),
            Self::List(Some(inner)) => write!(f, "list<{inner}>"),
            Self::Model(name) => write!(f, "model:{name}"),
        }
    }
}

impl FromStr for SemanticType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "text" => Ok(Self::Text),
            "integer" => Ok(Self::Integer),
            "float" => Ok(Self::Float),
            "boolean" => Ok(Self::Boolean),
            "dynamic" => Ok(Self::Dynamic),
            "list" => Ok(Self::List(None)),
            _ => {
                if let Some(name) = s.strip_prefix("model:") {
                    Ok(Self::Model(name.to_string()))
                } else if let Some(inner) =
                    s.strip_prefix("list<").and_then(|rest| rest.strip_suffix('>'))
                {
                    Ok(Self::list_of(inner.parse()?))
                } else {
                    Err(Error::config(format!("Unknown semantic type: {s}")))
                }
            }
        }
    }
}

impl Serialize for SemanticType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SemanticType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// HTTP methods that become tools. Other path-item keys are skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    /// Match a path-item key case-insensitively
    pub fn from_key(key: &str) -> Option<Self> {
        match key.to_ascii_lowercase().as_str() {
            "get" => Some(Self::Get),
            "post" => Some(Self::Post),
            "put" => Some(Self::Put),
            "delete" => Some(Self::Delete),
            "patch" => Some(Self::Patch),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
        }
    }

    pub fn as_lower(&self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Delete => "delete",
            Self::Patch => "patch",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authentication injected by every generated tool function
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AuthScheme {
    #[default]
    None,
    /// `Authorization: Bearer <$env_var>`
    BearerToken { env_var: String },
    /// `X-API-KEY: <$env_var>`
    ApiKeyHeader { env_var: String },
}

impl AuthScheme {
    /// Environment variable holding the secret
    pub fn auth_val(&self) -> Option<&str> {
        match self {
            Self::None => None,
            Self::BearerToken { env_var } | Self::ApiKeyHeader { env_var } => Some(env_var),
        }
    }
}

/// A named, deduplicated body shape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Model {
    pub name: String,
    pub fields: IndexMap<String, SemanticType>,
}

impl Model {
    pub fn new(name: impl Into<String>, fields: IndexMap<String, SemanticType>) -> Self {
        Self {
            name: name.into(),
            fields,
        }
    }

    /// One-field generic model used when a declared body has no fields
    pub fn placeholder(name: impl Into<String>) -> Self {
        let mut fields = IndexMap::new();
        fields.insert("data".to_string(), SemanticType::Dynamic);
        Self::new(name, fields)
    }
}

/// One API operation exposed as a callable tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tool {
    pub name: String,
    /// Base URL + path template, may contain `{param}` placeholders
    pub url: String,
    pub method: HttpMethod,
    pub auth: AuthScheme,
    /// Path, query, and header parameters plus the reserved `body` argument
    pub args: IndexMap<String, SemanticType>,
    pub body_model: Option<String>,
    pub response_model: Option<String>,
    pub has_query_params: bool,
    pub has_file_fields: bool,
    pub desc: String,
}

impl Tool {
    /// Reserved argument name carrying the request body model
    pub const BODY_ARG: &'static str = "body";

    pub fn auth_val(&self) -> Option<&str> {
        self.auth.auth_val()
    }

    /// Point the body at `model`, keeping `args["body"]` and `body_model` in step
    pub fn set_body_model(&mut self, model: &str) {
        self.args.insert(
            Self::BODY_ARG.to_string(),
            SemanticType::Model(model.to_string()),
        );
        self.body_model = Some(model.to_string());
    }

    /// Point body and response at their new names in `renames`.
    /// Each reference is looked up once, so renames never chain.
    pub fn remap_models(&mut self, renames: &HashMap<String, String>) {
        if let Some(to) = self.body_model.as_ref().and_then(|m| renames.get(m)).cloned() {
            self.set_body_model(&to);
        }
        if let Some(to) = self.response_model.as_ref().and_then(|m| renames.get(m)).cloned() {
            self.response_model = Some(to);
        }
    }
}

/// A prompt template exposed next to the tools
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Prompt {
    /// Should equal a tool name for auto-linking
    pub name: String,
    /// Comma-separated argument names
    #[serde(default)]
    pub args: String,
    pub text: String,
    #[serde(default)]
    pub desc: String,
}

impl Prompt {
    /// Argument names split on commas and trimmed; blanks dropped
    pub fn argument_names(&self) -> Vec<String> {
        self.args
            .split(',')
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .map(String::from)
            .collect()
    }
}

/// Output of one parse call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    pub tools: Vec<Tool>,
    pub models: IndexMap<String, Model>,
}

impl ParseResult {
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty() && self.models.is_empty()
    }

    pub fn tool(&self, name: &str) -> Option<&Tool> {
        self.tools.iter().find(|t| t.name == name)
    }
}

/// Distinct secret environment variables across authenticated tools,
/// in first-seen order
pub fn required_secrets(tools: &[Tool]) -> Vec<String> {
    let mut secrets: Vec<String> = Vec::new();
    for env_var in tools.iter().filter_map(Tool::auth_val) {
        if !secrets.iter().any(|s| s == env_var) {
            secrets.push(env_var.to_string());
        }
    }
    secrets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tool(name: &str, auth: AuthScheme) -> Tool {
        Tool {
            name: name.to_string(),
            url: "https://api.example.com/items".to_string(),
            method: HttpMethod::Get,
            auth,
            args: IndexMap::new(),
            body_model: None,
            response_model: None,
            has_query_params: false,
            has_file_fields: false,
            desc: "GET /items".to_string(),
        }
    }

    #[test]
    fn test_type_tag_table() {
        assert_eq!(SemanticType::from_type_tag("string"), SemanticType::Text);
        assert_eq!(SemanticType::from_type_tag("file"), SemanticType::Text);
        assert_eq!(SemanticType::from_type_tag("integer"), SemanticType::Integer);
        assert_eq!(SemanticType::from_type_tag("number"), SemanticType::Float);
        assert_eq!(SemanticType::from_type_tag("boolean"), SemanticType::Boolean);
        assert_eq!(SemanticType::from_type_tag("array"), SemanticType::List(None));
        assert_eq!(SemanticType::from_type_tag("object"), SemanticType::Dynamic);
        assert_eq!(SemanticType::from_type_tag("null"), SemanticType::Text);
    }

    #[test]
    fn test_semantic_type_string_form_parses_back() {
        let nested = SemanticType::list_of(SemanticType::list_of(SemanticType::Model(
            "Pet".to_string(),
        )));
        assert_eq!(nested.to_string(), "list<list<model:Pet>>");
        assert_eq!(nested.to_string().parse::<SemanticType>().unwrap(), nested);
        assert!("tuple".parse::<SemanticType>().is_err());
    }

    #[test]
    fn test_semantic_type_serializes_as_string() {
        let json = serde_json::to_value(SemanticType::list_of(SemanticType::Integer)).unwrap();
        assert_eq!(json, serde_json::json!("list<integer>"));
    }

    #[test]
    fn test_http_method_from_key() {
        assert_eq!(HttpMethod::from_key("get"), Some(HttpMethod::Get));
        assert_eq!(HttpMethod::from_key("PATCH"), Some(HttpMethod::Patch));
        assert_eq!(HttpMethod::from_key("options"), None);
        assert_eq!(HttpMethod::from_key("head"), None);
        assert_eq!(HttpMethod::from_key("parameters"), None);
        assert_eq!(HttpMethod::Delete.to_string(), "DELETE");
    }

    #[test]
    fn test_set_body_model_keeps_args_in_step() {
        let mut t = tool("createPet", AuthScheme::None);
        t.set_body_model("Pet");
        assert_eq!(t.body_model.as_deref(), Some("Pet"));
        assert_eq!(
            t.args.get(Tool::BODY_ARG),
            Some(&SemanticType::Model("Pet".to_string()))
        );

        t.response_model = Some("Pet1".to_string());
        let renames: HashMap<String, String> = [
            ("Pet".to_string(), "Pet1".to_string()),
            ("Pet1".to_string(), "Pet2".to_string()),
        ]
        .into_iter()
        .collect();
        t.remap_models(&renames);
        assert_eq!(t.body_model.as_deref(), Some("Pet1"));
        assert_eq!(t.response_model.as_deref(), Some("Pet2"));
        assert_eq!(
            t.args.get(Tool::BODY_ARG),
            Some(&SemanticType::Model("Pet1".to_string()))
        );
    }

    #[test]
    fn test_prompt_argument_names() {
        let prompt = Prompt {
            name: "getUser".to_string(),
            args: " id,  limit ,".to_string(),
            text: "Fetch {id}".to_string(),
            desc: String::new(),
        };
        assert_eq!(prompt.argument_names(), vec!["id", "limit"]);
        assert!(Prompt::default().argument_names().is_empty());
    }

    #[test]
    fn test_required_secrets_are_distinct() {
        let tools = vec![
            tool(
                "a",
                AuthScheme::BearerToken {
                    env_var: "PETSTORE_AUTH_TOKEN".to_string(),
                },
            ),
            tool("b", AuthScheme::None),
            tool(
                "c",
                AuthScheme::BearerToken {
                    env_var: "PETSTORE_AUTH_TOKEN".to_string(),
                },
            ),
            tool(
                "d",
                AuthScheme::ApiKeyHeader {
                    env_var: "X-API-KEY".to_string(),
                },
            ),
        ];
        assert_eq!(
            required_secrets(&tools),
            vec!["PETSTORE_AUTH_TOKEN", "X-API-KEY"]
        );
    }
}
