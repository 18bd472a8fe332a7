use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use crate::{
    state::AppState,
    users::{
        dto::{MessageResponse, ResultResponse, UserPayload},
        error::{UserError, UserResult},
        repo_types::User,
    },
};

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/user", get(list_users).post(create_user))
        .route(
            "/user/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

/// A non-numeric id cannot name a user.
fn parse_id(raw: &str) -> UserResult<i64> {
    raw.trim().parse::<i64>().map_err(|_| UserError::NotFound)
}

/// A missing or undecodable body validates as an empty one.
fn body(payload: Option<Json<UserPayload>>) -> UserPayload {
    payload.map(|Json(p)| p).unwrap_or_default()
}

#[instrument(skip(state))]
pub async fn list_users(
    State(state): State<AppState>,
) -> UserResult<Json<ResultResponse<Vec<User>>>> {
    let users = state.users.list().await?;
    Ok(Json(ResultResponse { result: users }))
}

#[instrument(skip(state, payload))]
pub async fn create_user(
    State(state): State<AppState>,
    payload: Option<Json<UserPayload>>,
) -> UserResult<(StatusCode, Json<MessageResponse>)> {
    state.users.create(&body(payload)).await?;
    Ok((
        StatusCode::CREATED,
        Json(MessageResponse::new("User created successfully")),
    ))
}

#[instrument(skip(state))]
pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> UserResult<Json<ResultResponse<User>>> {
    let user = state.users.get(parse_id(&id)?).await?;
    Ok(Json(ResultResponse { result: user }))
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Option<Json<UserPayload>>,
) -> UserResult<Json<MessageResponse>> {
    state.users.update(parse_id(&id)?, &body(payload)).await?;
    Ok(Json(MessageResponse::new("User updated successfully")))
}

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> UserResult<Json<MessageResponse>> {
    state.users.delete(parse_id(&id)?).await?;
    Ok(Json(MessageResponse::new("User deleted successfully")))
}
