#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end tests of the registry REST API.
//!
//! Each test builds the real `Router` over a temporary storage root and sends
//! requests through `tower::ServiceExt::oneshot`.

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode, header};
use module_registry::{ModuleRegistry, RegistryConfig};
use serde_json::{Value, json};
use tempfile::TempDir;
use tower::ServiceExt;
use url::Url;

const HOST: &str = "registry.test:3001";

struct TestRegistry {
    _tmp: TempDir,
    config: RegistryConfig,
}

impl TestRegistry {
    fn new() -> Self {
        Self::with(|_| {})
    }

    fn with(tweak: impl FnOnce(&mut RegistryConfig)) -> Self {
        let tmp = TempDir::new().unwrap();
        let mut config = RegistryConfig {
            storage_dir: tmp.path().to_path_buf(),
            ..RegistryConfig::default()
        };
        tweak(&mut config);
        Self { _tmp: tmp, config }
    }

    fn router(&self) -> Router {
        ModuleRegistry::new(&self.config).router()
    }

    async fn send(&self, method: Method, uri: &str, body: Vec<u8>) -> TestResponse {
        let request = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::HOST, HOST)
            .body(Body::from(body))
            .unwrap();
        TestResponse::from(self.router().oneshot(request).await.unwrap()).await
    }

    async fn get(&self, uri: &str) -> TestResponse {
        self.send(Method::GET, uri, Vec::new()).await
    }

    async fn upload(&self, coordinate: &str, body: &[u8]) -> TestResponse {
        self.send(
            Method::POST,
            &format!("/v1/modules/{coordinate}/upload"),
            body.to_vec(),
        )
        .await
    }
}

struct TestResponse {
    status: StatusCode,
    headers: axum::http::HeaderMap,
    body: Vec<u8>,
}

impl TestResponse {
    async fn from(response: axum::response::Response) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        Self {
            status,
            headers,
            body,
        }
    }

    fn json(&self) -> Value {
        serde_json::from_slice(&self.body).unwrap()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

#[tokio::test]
async fn publish_list_download_fetch_scenario() {
    let registry = TestRegistry::new();

    let resp = registry.upload("acme/vpc/aws/1.0.0", b"X").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.body, b"Success!");

    let resp = registry.get("/v1/modules/acme/vpc/aws/versions").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(
        resp.json(),
        json!({"modules":[{"versions":[{"version":"1.0.0"}]}]})
    );

    let resp = registry.get("/v1/modules/acme/vpc/aws/1.0.0/download").await;
    assert_eq!(resp.status, StatusCode::NO_CONTENT);
    assert!(resp.body.is_empty());
    assert_eq!(
        resp.header("x-terraform-get"),
        Some("http://registry.test:3001/v1/modules/acme/vpc/aws/1.0.0/file.zip")
    );

    let resp = registry.get("/v1/modules/acme/vpc/aws/1.0.0/file.zip").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(resp.header("content-type"), Some("application/zip"));
    assert_eq!(resp.body, b"X");

    let resp = registry.upload("acme/vpc/aws/1.0.0", b"Y").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.json()["code"], "VERSION_EXISTS");

    let resp = registry.get("/v1/modules/acme/vpc/aws/1.0.0/file.zip").await;
    assert_eq!(resp.body, b"X");
}

#[tokio::test]
async fn discovery_reflects_request_origin() {
    let registry = TestRegistry::new();

    let resp = registry.get("/.well-known/terraform.json").await;
    assert_eq!(resp.status, StatusCode::OK);
    assert_eq!(
        resp.json(),
        json!({"modules.v1": "http://registry.test:3001/v1/modules/"})
    );

    let request = Request::builder()
        .uri("/.well-known/terraform.json")
        .header(header::HOST, "10.0.0.7:3001")
        .header("x-forwarded-proto", "https")
        .header("x-forwarded-host", "modules.example.com")
        .body(Body::empty())
        .unwrap();
    let resp = TestResponse::from(registry.router().oneshot(request).await.unwrap()).await;
    assert_eq!(
        resp.json()["modules.v1"],
        "https://modules.example.com/v1/modules/"
    );
}

#[tokio::test]
async fn configured_public_url_overrides_request_origin() {
    let registry = TestRegistry::with(|cfg| {
        cfg.public_url = Some(Url::parse("https://tf.example.com/registry/").unwrap());
    });
    registry.upload("acme/vpc/aws/2.1.0", b"zip").await;

    let resp = registry.get("/.well-known/terraform.json").await;
    assert_eq!(
        resp.json()["modules.v1"],
        "https://tf.example.com/registry/v1/modules/"
    );

    let resp = registry.get("/v1/modules/acme/vpc/aws/2.1.0/download").await;
    assert_eq!(
        resp.header("x-terraform-get"),
        Some("https://tf.example.com/registry/v1/modules/acme/vpc/aws/2.1.0/file.zip")
    );
}

#[tokio::test]
async fn unknown_module_is_404_everywhere() {
    let registry = TestRegistry::new();

    for uri in [
        "/v1/modules/acme/vpc/aws/versions",
        "/v1/modules/acme/vpc/aws/1.0.0/download",
        "/v1/modules/acme/vpc/aws/1.0.0/file.zip",
    ] {
        let resp = registry.get(uri).await;
        assert_eq!(resp.status, StatusCode::NOT_FOUND, "{uri}");
        assert_eq!(
            resp.header("content-type"),
            Some("application/problem+json")
        );
    }
}

#[tokio::test]
async fn module_with_only_a_staged_upload_is_404() {
    let registry = TestRegistry::new();
    let dir = registry.config.storage_dir.join("modules/acme/vpc/aws");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(dir.join(".upload-abc.partial"), b"half").unwrap();

    let resp = registry.get("/v1/modules/acme/vpc/aws/versions").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.json()["code"], "MODULE_NOT_FOUND");
}

#[tokio::test]
async fn undecodable_segments_get_a_problem_body() {
    let registry = TestRegistry::new();

    for (method, uri) in [
        (Method::GET, "/v1/modules/acme/%FF/aws/versions"),
        (Method::GET, "/v1/modules/acme/vpc/aws/1.0.%FE/download"),
        (Method::GET, "/v1/modules/acme/vpc/aws/1.0.%FE/file.zip"),
        (Method::POST, "/v1/modules/%C3/vpc/aws/1.0.0/upload"),
    ] {
        let resp = registry.send(method, uri, b"X".to_vec()).await;
        assert_eq!(resp.status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(
            resp.header("content-type"),
            Some("application/problem+json"),
            "{uri}"
        );
        assert_eq!(resp.json()["code"], "INVALID_SEGMENT", "{uri}");
    }
    assert!(!registry.config.storage_dir.join("modules").exists());
}

#[tokio::test]
async fn unknown_version_of_known_module_is_404() {
    let registry = TestRegistry::new();
    registry.upload("acme/vpc/aws/1.0.0", b"X").await;

    let resp = registry.get("/v1/modules/acme/vpc/aws/1.0.1/download").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.json()["code"], "VERSION_NOT_FOUND");
    assert!(resp.header("x-terraform-get").is_none());
}

#[tokio::test]
async fn empty_upload_is_rejected_without_side_effects() {
    let registry = TestRegistry::new();

    let resp = registry.upload("acme/vpc/aws/1.0.0", b"").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.json()["code"], "NO_DATA");
    assert_eq!(
        resp.json()["detail"],
        "No data received. Please include your module archive as the request body."
    );
    assert!(!registry.config.storage_dir.join("modules").exists());

    let resp = registry.get("/v1/modules/acme/vpc/aws/versions").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reupload_reports_existing_version_even_when_empty() {
    let registry = TestRegistry::new();
    registry.upload("acme/vpc/aws/1.0.0", b"X").await;

    let resp = registry.upload("acme/vpc/aws/1.0.0", b"").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        resp.json()["detail"],
        "Version 1.0.0 already exists! Please update the version number."
    );
}

#[tokio::test]
async fn lists_every_uploaded_version_once() {
    let registry = TestRegistry::new();
    for v in ["1.0.0", "1.1.0", "2.0.0"] {
        let resp = registry.upload(&format!("acme/vpc/aws/{v}"), v.as_bytes()).await;
        assert_eq!(resp.status, StatusCode::OK);
    }
    registry.upload("acme/vpc/aws/1.1.0", b"again").await;

    let resp = registry.get("/v1/modules/acme/vpc/aws/versions").await;
    let versions: Vec<String> = resp.json()["modules"][0]["versions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["version"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(versions, ["1.0.0", "1.1.0", "2.0.0"]);
}

#[tokio::test]
async fn traversal_segments_are_rejected() {
    let registry = TestRegistry::new();

    let resp = registry.upload("acme/%2E%2E/aws/1.0.0", b"X").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.json()["code"], "INVALID_SEGMENT");

    let resp = registry.upload("acme/vpc/aws/..%2F..%2Fescape", b"X").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    let resp = registry.get("/v1/modules/acme/vpc/a%5Cb/versions").await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);

    assert!(!registry.config.storage_dir.join("modules").exists());
}

#[tokio::test]
async fn unmatched_routes_are_404() {
    let registry = TestRegistry::new();

    let resp = registry.get("/v1/providers/hashicorp/aws/versions").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.json()["code"], "NOT_FOUND");

    let resp = registry
        .send(Method::DELETE, "/v1/modules/acme/vpc/aws/1.0.0/file.zip", Vec::new())
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);

    let resp = registry
        .send(Method::GET, "/v1/modules/acme/vpc/aws/1.0.0/upload", Vec::new())
        .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn oversized_upload_is_refused() {
    let registry = TestRegistry::with(|cfg| cfg.max_upload_size_mb = 1);

    let resp = registry
        .upload("acme/vpc/aws/1.0.0", &vec![0u8; 1024 * 1024 + 1])
        .await;
    assert_eq!(resp.status, StatusCode::PAYLOAD_TOO_LARGE);

    let resp = registry.get("/v1/modules/acme/vpc/aws/1.0.0/download").await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
}
