//! HTTP handlers for the Agora messaging service.

pub mod auth;
pub mod channels;
pub mod dms;
pub mod error;
pub mod messages;
pub mod middleware;
pub mod notifications;
pub mod reactions;

use axum::{
    Router, middleware as axum_middleware,
    routing::{delete, get, post, put},
};

use auth::AppState;
use middleware::require_auth;

/// All routes, without the CORS and tracing layers the server adds.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/channels", post(channels::create_channel))
        .route("/channels/{channel_id}/join", post(channels::join_channel))
        .route("/channels/{channel_id}/invite", post(channels::invite_to_channel))
        .route("/channels/{channel_id}/leave", post(channels::leave_channel))
        .route(
            "/channels/{channel_id}/messages",
            get(channels::get_messages).post(channels::send_message),
        )
        .route("/channels/{channel_id}/messages/later", post(channels::send_later))
        .route("/dms", post(dms::create_dm))
        .route("/dms/{dm_id}", delete(dms::remove_dm))
        .route(
            "/dms/{dm_id}/messages",
            get(dms::get_messages).post(dms::send_message),
        )
        .route("/dms/{dm_id}/messages/later", post(dms::send_later))
        .route(
            "/messages/{message_id}",
            put(messages::edit_message).delete(messages::remove_message),
        )
        .route("/messages/{message_id}/share", post(messages::share_message))
        .route("/messages/{message_id}/react", post(reactions::react))
        .route("/messages/{message_id}/unreact", post(reactions::unreact))
        .route("/messages/{message_id}/pin", post(reactions::pin))
        .route("/messages/{message_id}/unpin", post(reactions::unpin))
        .route("/search", get(messages::search))
        .route("/notifications", get(notifications::get_notifications))
        .route("/stats/user", get(notifications::user_stats))
        .route("/stats/workspace", get(notifications::workspace_stats))
        .layer(axum_middleware::from_fn(require_auth))
        .with_state(state);

    Router::new().merge(public_routes).merge(protected_routes)
}
