use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;

use agora_types::api::{
    ChannelIdResponse, CreateChannelRequest, InviteRequest, MessageIdResponse, SendLaterRequest,
    SendMessageRequest,
};
use agora_types::{ChannelId, ContainerRef};

use crate::auth::AppState;
use crate::error::ApiResult;
use crate::middleware::SessionToken;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    #[serde(default)]
    pub start: usize,
}

pub async fn create_channel(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<CreateChannelRequest>,
) -> ApiResult<impl IntoResponse> {
    let channel_id = state
        .messaging
        .create_channel(&token, &req.name, req.is_public)?;
    Ok((StatusCode::CREATED, Json(ChannelIdResponse { channel_id })))
}

pub async fn join_channel(
    State(state): State<AppState>,
    Path(channel_id): Path<ChannelId>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> ApiResult<impl IntoResponse> {
    state.messaging.join_channel(&token, channel_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn invite_to_channel(
    State(state): State<AppState>,
    Path(channel_id): Path<ChannelId>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<InviteRequest>,
) -> ApiResult<impl IntoResponse> {
    state
        .messaging
        .invite_to_channel(&token, channel_id, req.u_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn leave_channel(
    State(state): State<AppState>,
    Path(channel_id): Path<ChannelId>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> ApiResult<impl IntoResponse> {
    state.messaging.leave_channel(&token, channel_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_messages(
    State(state): State<AppState>,
    Path(channel_id): Path<ChannelId>,
    Query(query): Query<PageQuery>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> ApiResult<impl IntoResponse> {
    let page = state
        .messaging
        .list_messages(&token, ContainerRef::Channel(channel_id), query.start)?;
    Ok(Json(page))
}

pub async fn send_message(
    State(state): State<AppState>,
    Path(channel_id): Path<ChannelId>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    let message_id = state
        .messaging
        .send(&token, ContainerRef::Channel(channel_id), &req.message)?;
    Ok((StatusCode::CREATED, Json(MessageIdResponse { message_id })))
}

pub async fn send_later(
    State(state): State<AppState>,
    Path(channel_id): Path<ChannelId>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<SendLaterRequest>,
) -> ApiResult<impl IntoResponse> {
    let message_id = state.messaging.schedule_send(
        &token,
        ContainerRef::Channel(channel_id),
        &req.message,
        req.time_sent,
    )?;
    Ok((StatusCode::ACCEPTED, Json(MessageIdResponse { message_id })))
}
