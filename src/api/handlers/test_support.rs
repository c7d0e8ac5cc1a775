//! Router harness for handler tests, backed by the in-memory store.

use anyhow::{Context, Result};
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{
        HeaderMap, Method, Request, StatusCode,
        header::{CONTENT_TYPE, COOKIE, SET_COOKIE},
    },
};
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use super::auth::session::SESSION_COOKIE_NAME;
use crate::{
    accounts::PasswordHashing,
    api::{AppConfig, AppState, app},
    store::MemoryStore,
};

pub(crate) const SOUP_INSTRUCTIONS: &str = "Boil water and add vegetables for a long time";

pub(crate) struct TestApp {
    router: Router,
    pub store: Arc<MemoryStore>,
}

pub(crate) struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

impl TestResponse {
    /// The session token handed out in `Set-Cookie`, if any.
    pub fn session_token(&self) -> Option<String> {
        let cookie = self.headers.get(SET_COOKIE)?.to_str().ok()?;
        let value = cookie
            .split(';')
            .next()?
            .strip_prefix(SESSION_COOKIE_NAME)?
            .strip_prefix('=')?;
        (!value.is_empty()).then(|| value.to_string())
    }

    pub fn error(&self) -> Option<&str> {
        self.body.get("error").and_then(Value::as_str)
    }
}

impl TestApp {
    pub fn new() -> Result<Self> {
        Self::with_config(AppConfig::default())
    }

    pub fn with_config(config: AppConfig) -> Result<Self> {
        let store = Arc::new(MemoryStore::new());
        let state = AppState::new(config, store.clone(), store.clone(), PasswordHashing::fast());
        let router = app(Arc::new(state))?;
        Ok(Self { router, store })
    }

    pub async fn send(&self, request: Request<Body>) -> Result<TestResponse> {
        let response = self.router.clone().oneshot(request).await?;
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).context("response body is not JSON")?
        };
        Ok(TestResponse {
            status,
            headers,
            body,
        })
    }

    /// Sign `username` up with a fixed password and return the session token.
    pub async fn signup(&self, username: &str) -> Result<String> {
        let response = self
            .send(json_request(
                Method::POST,
                "/signup",
                &serde_json::json!({"username": username, "password": "p@ss"}),
                None,
            )?)
            .await?;
        response
            .session_token()
            .with_context(|| format!("signup returned {}: {}", response.status, response.body))
    }
}

pub(crate) fn json_request(
    method: Method,
    uri: &str,
    body: &Value,
    token: Option<&str>,
) -> Result<Request<Body>> {
    raw_request(method, uri, serde_json::to_vec(body)?, token)
}

pub(crate) fn raw_request(
    method: Method,
    uri: &str,
    body: impl Into<Body>,
    token: Option<&str>,
) -> Result<Request<Body>> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(COOKIE, format!("{SESSION_COOKIE_NAME}={token}"));
    }
    Ok(builder.body(body.into())?)
}

pub(crate) fn empty_request(
    method: Method,
    uri: &str,
    token: Option<&str>,
) -> Result<Request<Body>> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(COOKIE, format!("{SESSION_COOKIE_NAME}={token}"));
    }
    Ok(builder.body(Body::empty())?)
}
