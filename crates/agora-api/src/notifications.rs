use axum::{Extension, Json, extract::State, response::IntoResponse};

use agora_types::api::NotificationsResponse;

use crate::auth::AppState;
use crate::error::ApiResult;
use crate::middleware::SessionToken;

pub async fn get_notifications(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> ApiResult<impl IntoResponse> {
    let notifications = state.messaging.notifications(&token)?;
    Ok(Json(NotificationsResponse { notifications }))
}

pub async fn user_stats(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.messaging.user_stats(&token)?))
}

pub async fn workspace_stats(
    State(state): State<AppState>,
    Extension(SessionToken(token)): Extension<SessionToken>,
) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.messaging.workspace_stats(&token)?))
}
