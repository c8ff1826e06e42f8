use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use agora_types::api::{
    CreateDmRequest, DmIdResponse, MessageIdResponse, SendLaterRequest, SendMessageRequest,
};
use agora_types::{ContainerRef, DmId};

use crate::auth::AppState;
use crate::channels::PageQuery;
use crate::error::ApiResult;
use crate::middleware::SessionToken;

pub async fn create_dm(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<CreateDmRequest>,
) -> ApiResult<impl IntoResponse> {
    let dm_id = state.messaging.create_dm(&token, &req.u_ids)?;
    Ok((StatusCode::CREATED, Json(DmIdResponse { dm_id })))
}

pub async fn remove_dm(
    State(state): State<AppState>,
    Path(dm_id): Path<DmId>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> ApiResult<impl IntoResponse> {
    state.messaging.remove_dm(&token, dm_id)?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_messages(
    State(state): State<AppState>,
    Path(dm_id): Path<DmId>,
    Query(query): Query<PageQuery>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> ApiResult<impl IntoResponse> {
    let page = state
        .messaging
        .list_messages(&token, ContainerRef::Dm(dm_id), query.start)?;
    Ok(Json(page))
}

pub async fn send_message(
    State(state): State<AppState>,
    Path(dm_id): Path<DmId>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<SendMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    let message_id = state
        .messaging
        .send(&token, ContainerRef::Dm(dm_id), &req.message)?;
    Ok((StatusCode::CREATED, Json(MessageIdResponse { message_id })))
}

pub async fn send_later(
    State(state): State<AppState>,
    Path(dm_id): Path<DmId>,
    Extension(SessionToken(token)): Extension<SessionToken>,
    Json(req): Json<SendLaterRequest>,
) -> ApiResult<impl IntoResponse> {
    let message_id = state.messaging.schedule_send(
        &token,
        ContainerRef::Dm(dm_id),
        &req.message,
        req.time_sent,
    )?;
    Ok((StatusCode::ACCEPTED, Json(MessageIdResponse { message_id })))
}
