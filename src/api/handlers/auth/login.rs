use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::debug;

use super::{
    session::session_headers,
    types::{LoginRequest, PublicUser},
};
use crate::api::{
    handlers::error::{ApiError, ErrorBody},
    state::AppState,
};

#[utoipa::path(
    post,
    path = "/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted and session opened", body = PublicUser),
        (status = 401, description = "Unknown username or wrong password", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn login(
    state: Extension<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    // An unreadable body is just another failed login.
    let request = payload.map_or_else(
        |rejection| {
            debug!("Rejected login body: {rejection}");
            LoginRequest::default()
        },
        |Json(request)| request,
    );

    let authenticated = state
        .auth()
        .login(request.username, request.password)
        .await
        .map_err(|err| state.reject(err))?;

    let headers = session_headers(state.config(), &authenticated.token);
    Ok((
        StatusCode::OK,
        headers,
        Json(PublicUser::from(authenticated.user)),
    ))
}
