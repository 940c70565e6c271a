//! Shared harness for route integration tests.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request};
use axum::response::Response;
use axum::Router;
use homedash_domain::{
    AppConfig, ConnectivityConfig, DatabaseConfig, DiscordConfig, GoogleConfig, ServerConfig,
    Session, SessionConfig, UserIdentity,
};
use homedash_server::{routes, AppContext};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const COOKIE_NAME: &str = "homedash_session";

/// Context plus the mock provider backing every external endpoint.
pub struct TestHarness {
    pub ctx: Arc<AppContext>,
    pub provider: MockServer,
    /// Keep the temporary database directory alive for the test's lifetime.
    _temp_dir: TempDir,
}

/// Build a fresh context wired entirely against a wiremock server.
pub async fn setup() -> TestHarness {
    let provider = MockServer::start().await;

    // Startup reachability probe target
    Mock::given(method("GET"))
        .and(path("/generate_204"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&provider)
        .await;

    let temp_dir = TempDir::new().expect("failed to create temporary database directory");
    let db_path = temp_dir.path().join("homedash.db").to_string_lossy().into_owned();

    let mut google =
        GoogleConfig::with_credentials("cid", "secret", "http://localhost:8787/auth/google");
    google.auth_endpoint = format!("{}/o/oauth2/v2/auth", provider.uri());
    google.token_endpoint = format!("{}/token", provider.uri());
    google.userinfo_endpoint = format!("{}/userinfo", provider.uri());
    google.calendar_endpoint = format!("{}/calendar/v3", provider.uri());

    let config = AppConfig {
        server: ServerConfig::default(),
        database: DatabaseConfig { path: db_path, pool_size: 2 },
        google,
        discord: DiscordConfig { webhook_url: Some(format!("{}/webhook", provider.uri())) },
        connectivity: ConnectivityConfig {
            probe_url: format!("{}/generate_204", provider.uri()),
            probe_timeout_secs: 2,
        },
        session: SessionConfig::default(),
    };

    let ctx = Arc::new(AppContext::new(config).await.expect("failed to build app context"));

    TestHarness { ctx, provider, _temp_dir: temp_dir }
}

impl TestHarness {
    /// Fresh router over the shared context.
    pub fn app(&self) -> Router {
        routes::router(Arc::clone(&self.ctx))
    }

    /// A valid session for the default test identity.
    pub fn session(&self) -> Session {
        Session::new(identity(), "at-1".to_string(), Some("r1".to_string()), 3600)
    }

    /// Cookie header value carrying the encoded session.
    pub fn cookie_for(&self, session: &Session) -> String {
        let encoded = session.encode_cookie().expect("session should encode");
        format!("{COOKIE_NAME}={}", urlencoding::encode(&encoded))
    }
}

pub fn identity() -> UserIdentity {
    UserIdentity {
        id: "108273".to_string(),
        name: "Ada".to_string(),
        email: "ada@example.com".to_string(),
        avatar_url: None,
    }
}

/// Second identity for isolation tests.
pub fn other_identity() -> UserIdentity {
    UserIdentity {
        id: "555001".to_string(),
        name: "Grace".to_string(),
        email: "grace@example.com".to_string(),
        avatar_url: None,
    }
}

/// GET with an optional session cookie.
pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request should build")
}

/// JSON-bodied request with an optional session cookie.
pub fn json_request(
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: &serde_json::Value,
) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).expect("request should build")
}

/// Collect a response body as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should collect");
    serde_json::from_slice(&bytes).expect("body should be JSON")
}

/// The `Set-Cookie` header value, if any.
pub fn set_cookie_header(response: &Response) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .map(ToString::to_string)
}
