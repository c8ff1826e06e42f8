//! Operations addressed by message id alone, where the container is looked
//! up, plus search across containers.

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use agora_types::MessageId;
use agora_types::api::{
    EditMessageRequest, SearchResponse, ShareMessageRequest, SharedMessageIdResponse,
};
use serde::Deserialize;

use crate::auth::AppState;
use crate::error::ApiResult;
use crate::middleware::SessionToken;

pub async fn edit_message(
    State(state): State<AppState>,
    Path(message_id): Path<MessageId>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<EditMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    state.messaging.edit(&token, message_id, &req.message)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn remove_message(
    State(state): State<AppState>,
    Path(message_id): Path<MessageId>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> ApiResult<impl IntoResponse> {
    state.messaging.remove(&token, message_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn share_message(
    State(state): State<AppState>,
    Path(message_id): Path<MessageId>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<ShareMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    let shared_message_id = state.messaging.share(
        &token,
        message_id,
        &req.message,
        req.channel_id,
        req.dm_id,
    )?;
    Ok((
        StatusCode::CREATED,
        Json(SharedMessageIdResponse { shared_message_id }),
    ))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    #[serde(default)]
    pub query_str: String,
}

pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> ApiResult<impl IntoResponse> {
    let messages = state.messaging.search(&token, &query.query_str)?;
    Ok(Json(SearchResponse { messages }))
}
