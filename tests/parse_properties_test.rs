//! Parser properties checked against whole documents

use mcpforge::core::Error;
use mcpforge::openapi::{AuthScheme, HttpMethod, SemanticType, SpecParser, parse_spec};

const PETSTORE: &str = include_str!("fixtures/openapi/petstore_swagger.json");
const USERS: &str = include_str!("fixtures/openapi/users_openapi.yaml");

fn spec_error_message(text: &str) -> String {
    match parse_spec(text) {
        Err(err @ Error::SpecValidation { .. }) => err.to_string(),
        other => panic!("expected a spec validation error, got {other:?}"),
    }
}

#[test]
fn test_petstore_path_parameter_tool() {
    let result = parse_spec(PETSTORE).unwrap();
    let tool = result.tool("get_pets_petId").expect("derived tool name");

    assert_eq!(tool.url, "https://api.example.com/v2/pets/{petId}");
    assert_eq!(tool.method, HttpMethod::Get);
    assert_eq!(tool.args.len(), 1);
    assert_eq!(tool.args["petId"], SemanticType::Text);
    assert_eq!(tool.body_model, None);
    // The shared schema is named after the first tool that reaches it
    assert_eq!(tool.response_model.as_deref(), Some("Petid"));
    assert_eq!(
        tool.auth,
        AuthScheme::ApiKeyHeader {
            env_var: "X-API-KEY".to_string()
        }
    );
}

#[test]
fn test_body_argument_matches_body_model() {
    for text in [PETSTORE, USERS] {
        let result = parse_spec(text).unwrap();
        for tool in &result.tools {
            match &tool.body_model {
                Some(model) => {
                    assert_eq!(tool.args["body"], SemanticType::Model(model.clone()));
                    assert!(result.models.contains_key(model));
                }
                None => assert!(!tool.args.contains_key("body")),
            }
        }
    }
}

#[test]
fn test_shared_body_is_deduplicated() {
    let result = parse_spec(USERS).unwrap();
    let create_user = result.tool("create_user").unwrap();
    let create_admin = result.tool("create_admin").unwrap();

    assert_eq!(create_user.body_model, create_admin.body_model);
    let shared = create_user.body_model.as_deref().unwrap();
    let model = &result.models[shared];
    assert_eq!(model.fields["name"], SemanticType::Text);
    assert_eq!(model.fields["age"], SemanticType::Integer);

    let with_same_fields = result
        .models
        .values()
        .filter(|m| m.fields.len() == 2 && m.fields.contains_key("name") && m.fields.contains_key("age"))
        .count();
    assert_eq!(with_same_fields, 1);
}

#[test]
fn test_zero_property_response_is_placeholder() {
    let result = parse_spec(USERS).unwrap();
    let tool = result.tool("get_status").unwrap();
    let name = tool.response_model.as_deref().unwrap();
    let model = &result.models[name];

    assert_eq!(model.fields.len(), 1);
    assert_eq!(model.fields["data"], SemanticType::Dynamic);
    assert_eq!(tool.args["userId"], SemanticType::Text);
    assert_eq!(tool.args["verbose"], SemanticType::Boolean);
    assert!(tool.has_query_params);
}

#[test]
fn test_parameterless_get_has_no_args() {
    let result = parse_spec(USERS).unwrap();
    let tool = result.tool("health").unwrap();
    assert!(tool.args.is_empty());
    assert_eq!(tool.body_model, None);
    assert_eq!(tool.response_model, None);
    assert_eq!(tool.url, "https://users.example.com/api/health");
    assert_eq!(tool.auth_val(), Some("BEARERAUTH_TOKEN"));
}

#[test]
fn test_parsing_twice_gives_identical_results() {
    let parser = SpecParser::new();
    for text in [PETSTORE, USERS] {
        assert_eq!(parser.parse_str(text).unwrap(), parser.parse_str(text).unwrap());
    }
}

#[test]
fn test_openapi_without_servers_names_the_field() {
    let message = spec_error_message("openapi: 3.0.0\npaths: {}\n");
    assert!(message.to_lowercase().contains("servers"));
    assert!(message.contains("Example"));
}

#[test]
fn test_swagger_missing_fields_are_named() {
    let no_host = spec_error_message(r#"{"swagger": "2.0", "schemes": ["https"], "basePath": "/", "paths": {}}"#);
    assert!(no_host.to_lowercase().contains("host"));

    let no_schemes = spec_error_message(r#"{"swagger": "2.0", "host": "a.io", "basePath": "/", "paths": {}}"#);
    assert!(no_schemes.to_lowercase().contains("scheme"));

    let no_base_path = spec_error_message(r#"{"swagger": "2.0", "host": "a.io", "schemes": ["https"], "paths": {}}"#);
    assert!(no_base_path.to_lowercase().contains("basepath"));
}

#[test]
fn test_every_tool_name_is_unique() {
    let result = parse_spec(PETSTORE).unwrap();
    let mut names: Vec<&str> = result.tools.iter().map(|t| t.name.as_str()).collect();
    let before = names.len();
    names.sort_unstable();
    names.dedup();
    assert_eq!(names.len(), before);
}
