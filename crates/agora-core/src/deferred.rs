//! "Send later": messages accepted now and inserted at a future time.
//!
//! Validation, permission checks and id reservation happen when the send is
//! scheduled. The [`Scheduler`] task only inserts, at or after the due time,
//! without re-checking membership.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{Instant, sleep_until};
use tracing::{debug, info, warn};

use agora_store::Store;
use agora_types::{ContainerRef, MessageId, UserId, unix_now};

use crate::Messaging;
use crate::error::{MessagingError, Result};
use crate::membership::MembershipOracle;
use crate::messages::{check_container_exists, check_text, post_message};
use crate::registry::MessageRegistry;

/// A reserved message waiting for its delivery time.
#[derive(Debug)]
pub struct PendingSend {
    due: Instant,
    message_id: MessageId,
    author: UserId,
    target: ContainerRef,
    text: String,
    /// Unix seconds; becomes the message's `time_sent`.
    deliver_at: i64,
}

impl PendingSend {
    fn key(&self) -> (Instant, MessageId) {
        (self.due, self.message_id)
    }
}

impl PartialEq for PendingSend {
    fn eq(&self, other: &Self) -> bool {
        self.key() == other.key()
    }
}

impl Eq for PendingSend {}

impl PartialOrd for PendingSend {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PendingSend {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

/// Cloneable enqueue side of the scheduler.
#[derive(Clone)]
pub struct DeferredSender {
    tx: mpsc::UnboundedSender<PendingSend>,
}

impl DeferredSender {
    fn enqueue(&self, pending: PendingSend) -> Result<()> {
        self.tx
            .send(pending)
            .map_err(|_| MessagingError::Internal("deferred delivery scheduler stopped".into()))
    }
}

pub struct Scheduler {
    store: Arc<Store>,
    rx: mpsc::UnboundedReceiver<PendingSend>,
    queue: BinaryHeap<Reverse<PendingSend>>,
}

pub fn channel(store: Arc<Store>) -> (DeferredSender, Scheduler) {
    let (tx, rx) = mpsc::unbounded_channel();
    let scheduler = Scheduler {
        store,
        rx,
        queue: BinaryHeap::new(),
    };
    (DeferredSender { tx }, scheduler)
}

async fn sleep_until_due(due: Option<Instant>) {
    match due {
        Some(due) => sleep_until(due).await,
        None => std::future::pending().await,
    }
}

impl Scheduler {
    /// Runs until every [`DeferredSender`] is dropped, then delivers whatever
    /// is still queued on schedule and returns.
    pub async fn run(mut self) {
        loop {
            let next_due = self.queue.peek().map(|Reverse(p)| p.due);
            tokio::select! {
                received = self.rx.recv() => match received {
                    Some(pending) => {
                        debug!("Queued message {} for {}", pending.message_id, pending.target);
                        self.queue.push(Reverse(pending));
                    }
                    None => break,
                },
                _ = sleep_until_due(next_due) => self.deliver_due(),
            }
        }

        while let Some(Reverse(pending)) = self.queue.pop() {
            sleep_until(pending.due).await;
            self.deliver(pending);
        }
        debug!("Deferred delivery scheduler exiting");
    }

    fn deliver_due(&mut self) {
        let now = Instant::now();
        while self.queue.peek().is_some_and(|Reverse(p)| p.due <= now) {
            if let Some(Reverse(pending)) = self.queue.pop() {
                self.deliver(pending);
            }
        }
    }

    fn deliver(&self, pending: PendingSend) {
        let PendingSend {
            message_id,
            author,
            target,
            text,
            deliver_at,
            ..
        } = pending;

        let result = self.store.write(|ws| {
            if ws.container(target).is_none() {
                warn!("Dropping deferred message {}: {} no longer exists", message_id, target);
                return Ok(());
            }
            post_message(ws, author, target, message_id, &text, deliver_at)?;
            info!("Deferred message {} delivered to {}", message_id, target);
            Ok::<_, MessagingError>(())
        });
        if let Err(e) = result {
            warn!("Deferred message {} not delivered: {}", message_id, e);
        }
    }
}

impl Messaging {
    /// Reserves a message id now and delivers `text` to `target` at unix time
    /// `deliver_at`. The message is invisible until then. There is no cancel.
    pub fn schedule_send(
        &self,
        token: &str,
        target: ContainerRef,
        text: &str,
        deliver_at: i64,
    ) -> Result<MessageId> {
        let pending = self.write_as(token, |ws, caller| {
            check_container_exists(ws, target)?;
            check_text(text)?;
            let now = unix_now();
            if deliver_at < now {
                return Err(MessagingError::invalid("timeSent is in the past"));
            }
            if !ws.is_member(caller, target) {
                return Err(MessagingError::forbidden(format!(
                    "user is not a member of {target}"
                )));
            }

            let delay = Duration::from_secs(u64::try_from(deliver_at - now).unwrap_or(0));
            Ok(PendingSend {
                due: Instant::now() + delay,
                message_id: ws.allocate_message_id(),
                author: caller,
                target,
                text: text.to_string(),
                deliver_at,
            })
        })?;

        let message_id = pending.message_id;
        let author = pending.author;
        self.inner.deferred.enqueue(pending)?;
        info!(
            "Message {} scheduled for {} at {} by user {}",
            message_id, target, deliver_at, author
        );
        Ok(message_id)
    }
}
