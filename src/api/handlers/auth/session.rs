//! Session endpoints and the cookie/bearer plumbing shared by every handler.

use axum::{
    Json,
    extract::Extension,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{AUTHORIZATION, COOKIE, InvalidHeaderValue, SET_COOKIE},
    },
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::error;

use super::types::PublicUser;
use crate::{
    api::{
        handlers::error::{ApiError, ErrorBody},
        state::{AppConfig, AppState},
    },
    sessions::SessionContext,
};

pub const SESSION_COOKIE_NAME: &str = "recipebox_session";

#[utoipa::path(
    get,
    path = "/check_session",
    responses(
        (status = 200, description = "Session is active", body = PublicUser),
        (status = 401, description = "No active session", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn check_session(
    headers: HeaderMap,
    state: Extension<Arc<AppState>>,
) -> Result<Json<PublicUser>, ApiError> {
    let session = current_session(&headers, &state).await?;
    let user = state
        .auth()
        .check_session(&session)
        .await
        .map_err(|err| state.reject(err))?;
    Ok(Json(user.into()))
}

#[utoipa::path(
    delete,
    path = "/logout",
    responses(
        (status = 204, description = "Session destroyed and cookie cleared"),
        (status = 401, description = "No active session", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn logout(
    headers: HeaderMap,
    state: Extension<Arc<AppState>>,
) -> Result<impl IntoResponse, ApiError> {
    let session = current_session(&headers, &state).await?;
    state
        .auth()
        .logout(&session)
        .await
        .map_err(|err| state.reject(err))?;

    let mut response_headers = HeaderMap::new();
    match clear_session_cookie(state.config()) {
        Ok(cookie) => {
            response_headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build session cookie: {err}"),
    }
    Ok((StatusCode::NO_CONTENT, response_headers))
}

/// Resolve the token presented with the request into a [`SessionContext`].
///
/// Missing, unknown and expired tokens all yield an anonymous context.
pub(crate) async fn current_session(
    headers: &HeaderMap,
    state: &AppState,
) -> Result<SessionContext, ApiError> {
    state
        .auth()
        .sessions()
        .resolve(extract_session_token(headers))
        .await
        .map_err(|err| state.reject(err))
}

/// Headers that hand a freshly created session to the client.
pub(super) fn session_headers(config: &AppConfig, token: &str) -> HeaderMap {
    let mut headers = HeaderMap::new();
    match session_cookie(config, token) {
        Ok(cookie) => {
            headers.insert(SET_COOKIE, cookie);
        }
        Err(err) => error!("Failed to build session cookie: {err}"),
    }
    headers
}

/// Build an `HttpOnly` cookie for the session token.
fn session_cookie(config: &AppConfig, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.session_ttl_seconds();
    let mut cookie = format!(
        "{SESSION_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}"
    );
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_session_cookie(config: &AppConfig) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{SESSION_COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if config.session_cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn extract_session_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = extract_bearer_token(headers) {
        return Some(token);
    }
    let value = headers.get(COOKIE)?.to_str().ok()?;
    value.split(';').find_map(|pair| {
        let (key, val) = pair.trim().split_once('=')?;
        (key.trim() == SESSION_COOKIE_NAME).then(|| val.trim().to_string())
    })
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}
