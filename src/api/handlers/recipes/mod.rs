//! Shared recipe list endpoints. Both require an active session.

pub mod types;


use axum::{
    Json,
    extract::{Extension, rejection::JsonRejection},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use std::sync::Arc;
use tracing::debug;

use super::{
    auth::session::current_session,
    error::{ApiError, ErrorBody},
};
use crate::{api::state::AppState, error::ServiceError};
use types::{PublicRecipe, RecipeRequest};

pub const MALFORMED_BODY: &str = "Request body must be a JSON object";

#[utoipa::path(
    get,
    path = "/recipes",
    responses(
        (status = 200, description = "Every recipe with its owner, ordered by id", body = [PublicRecipe]),
        (status = 401, description = "No active session", body = ErrorBody)
    ),
    tag = "recipes"
)]
pub async fn list_recipes(
    headers: HeaderMap,
    state: Extension<Arc<AppState>>,
) -> Result<Json<Vec<PublicRecipe>>, ApiError> {
    let session = current_session(&headers, &state).await?;
    let recipes = state
        .recipes()
        .list(&session)
        .await
        .map_err(|err| state.reject(err))?;
    Ok(Json(recipes.into_iter().map(PublicRecipe::from).collect()))
}

#[utoipa::path(
    post,
    path = "/recipes",
    request_body = RecipeRequest,
    responses(
        (status = 201, description = "Recipe created for the session user", body = PublicRecipe),
        (status = 401, description = "No active session", body = ErrorBody),
        (status = 422, description = "Invalid recipe", body = ErrorBody)
    ),
    tag = "recipes"
)]
pub async fn create_recipe(
    headers: HeaderMap,
    state: Extension<Arc<AppState>>,
    payload: Result<Json<RecipeRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    // Identity first: an anonymous caller learns nothing about its payload.
    let session = current_session(&headers, &state).await?;
    session.require_user().map_err(|err| state.reject(err))?;

    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            debug!("Rejected recipe body: {rejection}");
            return Err(state.reject(ServiceError::validation(MALFORMED_BODY)));
        }
    };

    let created = state
        .recipes()
        .create(&session, request.into_input())
        .await
        .map_err(|err| state.reject(err))?;

    Ok((StatusCode::CREATED, Json(PublicRecipe::from(created))))
}
