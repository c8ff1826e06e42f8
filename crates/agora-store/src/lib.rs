pub mod models;
pub mod queries;
pub mod snapshot;
pub mod stats;

use std::sync::Mutex;

use thiserror::Error;

pub use models::{ChannelRecord, Container, DmRecord, UserRecord, Workspace};
pub use stats::StatsSink;

/// A previous holder of the store lock panicked mid-mutation.
#[derive(Debug, Error)]
#[error("store lock poisoned")]
pub struct LockPoisoned;

/// The single shared workspace state.
///
/// All access goes through [`Store::read`] or [`Store::write`], which hold one
/// coarse lock for the whole closure. A caller that reads, decides and then
/// mutates inside one `write` sees no interleaving from other requests or
/// from the deferred-delivery scheduler.
#[derive(Default)]
pub struct Store {
    inner: Mutex<Workspace>,
}

impl Store {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_workspace(workspace: Workspace) -> Self {
        Self {
            inner: Mutex::new(workspace),
        }
    }

    pub fn read<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&Workspace) -> Result<T, E>,
        E: From<LockPoisoned>,
    {
        let ws = self.inner.lock().map_err(|_| LockPoisoned)?;
        f(&ws)
    }

    pub fn write<F, T, E>(&self, f: F) -> Result<T, E>
    where
        F: FnOnce(&mut Workspace) -> Result<T, E>,
        E: From<LockPoisoned>,
    {
        let mut ws = self.inner.lock().map_err(|_| LockPoisoned)?;
        f(&mut ws)
    }
}
