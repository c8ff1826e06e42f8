//! Shared data types for the Agora workspace backend.
//!
//! `models` holds the entities owned by the store (messages, reacts,
//! notifications, stats samples). `api` holds the JSON bodies exchanged over
//! HTTP, plus the session token claims.

pub mod api;
pub mod models;

pub use models::{
    ChannelId, ContainerKind, ContainerRef, DmId, GlobalRole, Message, MessageId, Notification,
    React, ReactKind, StatSample, UserId,
};

/// Current unix time in whole seconds.
pub fn unix_now() -> i64 {
    chrono::Utc::now().timestamp()
}
