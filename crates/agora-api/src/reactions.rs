use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use agora_types::MessageId;
use agora_types::api::ReactRequest;

use crate::auth::AppState;
use crate::error::ApiResult;
use crate::middleware::SessionToken;

pub async fn react(
    State(state): State<AppState>,
    Path(message_id): Path<MessageId>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<ReactRequest>,
) -> ApiResult<impl IntoResponse> {
    state.messaging.react(&token, message_id, req.react_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unreact(
    State(state): State<AppState>,
    Path(message_id): Path<MessageId>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<ReactRequest>,
) -> ApiResult<impl IntoResponse> {
    state.messaging.unreact(&token, message_id, req.react_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn pin(
    State(state): State<AppState>,
    Path(message_id): Path<MessageId>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> ApiResult<impl IntoResponse> {
    state.messaging.pin(&token, message_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn unpin(
    State(state): State<AppState>,
    Path(message_id): Path<MessageId>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> ApiResult<impl IntoResponse> {
    state.messaging.unpin(&token, message_id)?;
    Ok(StatusCode::NO_CONTENT)
}
