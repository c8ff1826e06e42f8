//! Agora message lifecycle and notification core.
//!
//! [`Messaging`] is the entry point: every operation takes the caller's
//! session token, validates it through an [`AuthContext`], and then runs its
//! whole read-modify-write under the store lock. Deferred sends are handed to
//! a [`deferred::Scheduler`] task that takes the same lock when it fires.

pub mod auth;
pub mod deferred;
pub mod error;
pub mod membership;
pub mod messages;
pub mod notifications;
pub mod pins;
pub mod reactions;
pub mod registry;
pub mod search;
pub mod share;
pub mod tags;
pub mod workspace;

use std::sync::Arc;

use agora_store::{Store, Workspace};
use agora_types::UserId;

pub use auth::{AuthContext, JwtAuth};
pub use deferred::{DeferredSender, Scheduler};
pub use error::{MessagingError, Result};
pub use membership::MembershipOracle;
pub use registry::{MessageLocation, MessageRegistry};

#[derive(Clone)]
pub struct Messaging {
    inner: Arc<MessagingInner>,
}

struct MessagingInner {
    store: Arc<Store>,
    auth: Arc<dyn AuthContext>,
    deferred: DeferredSender,
}

impl Messaging {
    pub fn new(store: Arc<Store>, auth: Arc<dyn AuthContext>, deferred: DeferredSender) -> Self {
        Self {
            inner: Arc::new(MessagingInner {
                store,
                auth,
                deferred,
            }),
        }
    }

    /// Builds the service and spawns its deferred-delivery scheduler on the
    /// current tokio runtime.
    pub fn start(store: Arc<Store>, auth: Arc<dyn AuthContext>) -> Self {
        let (deferred, scheduler) = deferred::channel(store.clone());
        tokio::spawn(scheduler.run());
        Self::new(store, auth, deferred)
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.inner.store
    }

    /// Validates `token` and runs `f` with the caller's id under the store lock.
    pub(crate) fn read_as<T>(
        &self,
        token: &str,
        f: impl FnOnce(&Workspace, UserId) -> Result<T>,
    ) -> Result<T> {
        let caller = self.inner.auth.validate(token)?;
        self.inner.store.read(|ws| {
            ensure_known(ws, caller)?;
            f(ws, caller)
        })
    }

    /// Validates `token` and runs `f` with the caller's id, allowed to mutate.
    pub(crate) fn write_as<T>(
        &self,
        token: &str,
        f: impl FnOnce(&mut Workspace, UserId) -> Result<T>,
    ) -> Result<T> {
        let caller = self.inner.auth.validate(token)?;
        self.inner.store.write(|ws| {
            ensure_known(ws, caller)?;
            f(ws, caller)
        })
    }
}

fn ensure_known(ws: &Workspace, caller: UserId) -> Result<()> {
    if ws.user(caller).is_none() {
        return Err(MessagingError::unauthorized("token refers to an unknown user"));
    }
    Ok(())
}
