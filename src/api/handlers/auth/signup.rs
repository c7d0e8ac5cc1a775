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
    types::{PublicUser, SignupRequest},
};
use crate::{
    accounts::{SignupInput, service::MISSING_CREDENTIALS},
    api::{
        handlers::error::{ApiError, ErrorBody},
        state::AppState,
    },
    error::ServiceError,
};

#[utoipa::path(
    post,
    path = "/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created and session opened", body = PublicUser),
        (status = 422, description = "Missing credentials or username taken", body = ErrorBody)
    ),
    tag = "auth"
)]
pub async fn signup(
    state: Extension<Arc<AppState>>,
    payload: Result<Json<SignupRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!("Rejected signup body: {rejection}");
            return Err(state.reject(ServiceError::validation(MISSING_CREDENTIALS)));
        }
    };

    let created = state
        .auth()
        .signup(SignupInput {
            username: request.username,
            password: request.password,
            image_url: request.image_url,
            bio: request.bio,
        })
        .await
        .map_err(|err| state.reject(err))?;

    let headers = session_headers(state.config(), &created.token);
    Ok((
        StatusCode::CREATED,
        headers,
        Json(PublicUser::from(created.user)),
    ))
}
