//! Spec loading implementations

pub mod composite_loader;
pub mod file_loader;
pub mod http_loader;

pub use composite_loader::CompositeOpenApiLoader;
pub use file_loader::FileOpenApiLoader;
pub use http_loader::HttpOpenApiLoader;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::OpenApiLoader;
    use crate::core::Error;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SPEC_YAML: &str = r#"openapi: 3.0.0
info:
  title: Test API
  version: 1.0.0
servers:
  - url: https://api.example.com
paths: {}"#;

    #[tokio::test]
    async fn test_file_loader_returns_content() {
        let mut temp_file = NamedTempFile::new().expect("Failed to create temp file");
        temp_file
            .write_all(SPEC_YAML.as_bytes())
            .expect("Failed to write temp file");
        temp_file.flush().expect("Failed to flush temp file");

        let loader = FileOpenApiLoader::new();
        let content = loader.load(temp_file.path().to_str().unwrap()).await.unwrap();
        assert_eq!(content, SPEC_YAML);
    }

    #[tokio::test]
    async fn test_file_loader_not_found() {
        let loader = FileOpenApiLoader::new();
        let result = loader.load("/nonexistent/file.yaml").await;
        assert!(matches!(result, Err(Error::Load(_))));
    }

    #[tokio::test]
    async fn test_http_loader_fetches_body() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/openapi.yaml"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(SPEC_YAML)
                    .insert_header("content-type", "application/yaml"),
            )
            .mount(&mock_server)
            .await;

        let loader = HttpOpenApiLoader::new().unwrap();
        let url = format!("{}/openapi.yaml", mock_server.uri());
        assert_eq!(loader.load(&url).await.unwrap(), SPEC_YAML);
    }

    #[tokio::test]
    async fn test_http_loader_status_error() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing.json"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&mock_server)
            .await;

        let loader = HttpOpenApiLoader::new().unwrap();
        let url = format!("{}/missing.json", mock_server.uri());
        let err = loader.load(&url).await.unwrap_err();
        assert!(matches!(err, Error::Load(ref msg) if msg.contains("404")));
    }

    #[tokio::test]
    async fn test_http_loader_rejects_other_schemes() {
        let loader = HttpOpenApiLoader::new().unwrap();
        assert!(loader.load("ftp://example.com/spec.json").await.is_err());
        assert!(loader.load("not a url").await.is_err());
    }

    #[tokio::test]
    async fn test_composite_loader_dispatch() {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api-spec.json"))
            .respond_with(ResponseTemplate::new(200).set_body_string("{\"remote\": true}"))
            .mount(&mock_server)
            .await;

        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(b"{\"local\": true}").unwrap();
        temp_file.flush().unwrap();

        let loader = CompositeOpenApiLoader::new().unwrap();
        let remote = loader
            .load(&format!("{}/api-spec.json", mock_server.uri()))
            .await
            .unwrap();
        assert_eq!(remote, "{\"remote\": true}");

        let local = loader.load(temp_file.path().to_str().unwrap()).await.unwrap();
        assert_eq!(local, "{\"local\": true}");
    }

    #[test]
    fn test_is_remote() {
        assert!(CompositeOpenApiLoader::is_remote("https://x.io/spec.yaml"));
        assert!(!CompositeOpenApiLoader::is_remote("./specs/https.yaml"));
    }
}
