//! Document-level handling: decoding, dialect detection, required-field
//! validation, base URL derivation, and security-scheme inference.

use serde_json::{Map, Value as JsonValue};
use tracing::debug;

use super::types::AuthScheme;
use crate::core::error::{Error, Result};

/// Which specification version a document follows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// OpenAPI 3.x, selected by a top-level `openapi` key
    OpenApi3,
    /// Swagger 2.0
    Swagger2,
}

impl Dialect {
    pub fn detect(root: &Map<String, JsonValue>) -> Self {
        if root.contains_key("openapi") {
            Self::OpenApi3
        } else {
            Self::Swagger2
        }
    }

    pub fn is_openapi(&self) -> bool {
        matches!(self, Self::OpenApi3)
    }
}

/// Decode spec text, trying strict JSON first and YAML second.
///
/// Returns `None` when the document is empty or null. The YAML error is the
/// one reported when both decoders fail.
pub fn decode(text: &str) -> Result<Option<JsonValue>> {
    if text.trim().is_empty() {
        return Ok(None);
    }

    let value = match serde_json::from_str::<JsonValue>(text) {
        Ok(value) => value,
        Err(json_err) => {
            debug!(error = %json_err, "Spec is not JSON, trying YAML");
            serde_yaml::from_str::<JsonValue>(text)?
        }
    };

    Ok((!value.is_null()).then_some(value))
}

/// A decoded document whose required top-level fields have been checked
#[derive(Debug, Clone)]
pub struct SpecDocument<'a> {
    pub root: &'a JsonValue,
    pub dialect: Dialect,
    pub base_url: String,
}

impl<'a> SpecDocument<'a> {
    /// Detect the dialect and validate the fields it requires, failing on the
    /// first violation
    pub fn new(root: &'a JsonValue) -> Result<Self> {
        let map = root.as_object().ok_or_else(|| {
            Error::spec_validation(
                "document",
                "Spec document must be a mapping at the top level. Example:\n\
                 {\"openapi\": \"3.0.0\", \"servers\": [{\"url\": \"https://api.example.com/v1\"}], \"paths\": {}}",
            )
        })?;

        let dialect = Dialect::detect(map);
        let base_url = match dialect {
            Dialect::OpenApi3 => openapi_base_url(map)?,
            Dialect::Swagger2 => swagger_base_url(map)?,
        };
        debug!(?dialect, %base_url, "Validated spec document");

        Ok(Self {
            root,
            dialect,
            base_url,
        })
    }

    /// The `paths` mapping, empty when absent
    pub fn paths(&self) -> Option<&'a Map<String, JsonValue>> {
        self.root.get("paths").and_then(JsonValue::as_object)
    }

    fn security_schemes(&self) -> Option<&'a Map<String, JsonValue>> {
        match self.dialect {
            Dialect::OpenApi3 => self
                .root
                .get("components")
                .and_then(|c| c.get("securitySchemes")),
            Dialect::Swagger2 => self.root.get("securityDefinitions"),
        }
        .and_then(JsonValue::as_object)
    }

    /// Infer the auth applied to every operation.
    ///
    /// Schemes are scanned in declaration order and the last bearer or API-key
    /// scheme wins.
    pub fn auth_scheme(&self) -> AuthScheme {
        let mut auth = AuthScheme::None;
        let Some(schemes) = self.security_schemes() else {
            return auth;
        };

        for (key, scheme) in schemes {
            let kind = scheme.get("type").and_then(JsonValue::as_str);
            if kind == Some("http")
                && scheme.get("scheme").and_then(JsonValue::as_str) == Some("bearer")
            {
                auth = AuthScheme::BearerToken {
                    env_var: format!("{}_TOKEN", key.to_uppercase()),
                };
            } else if kind == Some("apiKey") {
                let header = scheme
                    .get("name")
                    .and_then(JsonValue::as_str)
                    .unwrap_or(key);
                auth = AuthScheme::ApiKeyHeader {
                    env_var: header.to_uppercase(),
                };
            }
        }

        debug!(?auth, "Inferred auth scheme");
        auth
    }
}

fn openapi_base_url(map: &Map<String, JsonValue>) -> Result<String> {
    let first_server = map
        .get("servers")
        .and_then(JsonValue::as_array)
        .and_then(|servers| servers.first())
        .ok_or_else(|| {
            Error::spec_validation(
                "servers",
                "OpenAPI spec missing 'servers' field. OpenAPI 3.0 requires at least one server. Example:\n\
                 \"servers\": [{\"url\": \"https://api.example.com/v1\"}]",
            )
        })?;

    match first_server.get("url").and_then(JsonValue::as_str) {
        Some(url) if !url.is_empty() => Ok(url.to_string()),
        _ => Err(Error::spec_validation(
            "servers[0].url",
            "First entry in 'servers' has an empty 'url'. Provide a valid server URL. Example:\n\
             \"servers\": [{\"url\": \"https://api.example.com/v1\"}]",
        )),
    }
}

fn swagger_base_url(map: &Map<String, JsonValue>) -> Result<String> {
    let host = map
        .get("host")
        .and_then(JsonValue::as_str)
        .filter(|host| !host.is_empty())
        .ok_or_else(|| {
            Error::spec_validation(
                "host",
                "Swagger spec missing required 'host' field. Example:\n\
                 \"host\": \"api.example.com\",\n\"schemes\": [\"https\"],\n\"basePath\": \"/v2.0\"",
            )
        })?;

    let scheme = map
        .get("schemes")
        .and_then(JsonValue::as_array)
        .and_then(|schemes| schemes.first())
        .and_then(JsonValue::as_str)
        .ok_or_else(|| {
            Error::spec_validation(
                "schemes",
                "Swagger spec missing 'schemes' field. Specify the protocol scheme. Example:\n\
                 \"schemes\": [\"https\"]",
            )
        })?;

    let base_path = match map.get("basePath") {
        Some(value) => value.as_str().unwrap_or_default(),
        None => {
            return Err(Error::spec_validation(
                "basePath",
                "Swagger spec missing 'basePath' field. Add the base path for your API. Example:\n\
                 \"basePath\": \"/v2.0\"\nIf your API has no version path, use \"basePath\": \"/\"",
            ));
        }
    };

    Ok(format!("{scheme}://{host}{base_path}"))
}
