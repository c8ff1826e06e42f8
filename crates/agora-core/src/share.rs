use tracing::info;

use agora_store::Workspace;
use agora_types::{ChannelId, ContainerRef, DmId, Message, MessageId, unix_now};

use crate::Messaging;
use crate::error::{MessagingError, Result};
use crate::membership::MembershipOracle;
use crate::messages::{check_not_too_long, insert_message};
use crate::notifications::notify_tags;
use crate::registry::MessageRegistry;

/// Sentinel for "not this kind of container" in share requests.
pub const NO_TARGET: i64 = -1;

fn existing_channel(ws: &Workspace, id: i64) -> Option<ContainerRef> {
    let id = ChannelId::try_from(id).ok()?;
    ws.channel(id).map(|_| ContainerRef::Channel(id))
}

fn existing_dm(ws: &Workspace, id: i64) -> Option<ContainerRef> {
    let id = DmId::try_from(id).ok()?;
    ws.dm(id).map(|_| ContainerRef::Dm(id))
}

/// Exactly one of `channel_id` / `dm_id` must name a live container; the
/// other must be [`NO_TARGET`].
fn share_target(ws: &Workspace, channel_id: i64, dm_id: i64) -> Result<ContainerRef> {
    let target = existing_channel(ws, channel_id).or_else(|| existing_dm(ws, dm_id));
    let Some(target) = target else {
        return Err(MessagingError::invalid("both channelId and dmId are invalid"));
    };
    if channel_id != NO_TARGET && dm_id != NO_TARGET {
        return Err(MessagingError::invalid("neither channelId nor dmId is -1"));
    }
    Ok(target)
}

impl Messaging {
    /// Copies a message into another channel or DM, optionally followed by
    /// `extra` text. The copy is independent of the source: later edits,
    /// reacts and pins on either side do not carry over.
    ///
    /// Mentions are resolved in `extra` only, against the destination.
    pub fn share(
        &self,
        token: &str,
        source_id: MessageId,
        extra: &str,
        channel_id: i64,
        dm_id: i64,
    ) -> Result<MessageId> {
        self.write_as(token, |ws, caller| {
            check_not_too_long(extra)?;
            let target = share_target(ws, channel_id, dm_id)?;

            let source = ws
                .locate_message(source_id)
                .ok_or_else(|| MessagingError::invalid("invalid messageId"))?;
            if !ws.is_member(caller, source.container) {
                return Err(MessagingError::invalid("invalid messageId"));
            }
            if !ws.is_member(caller, target) {
                return Err(MessagingError::forbidden(format!(
                    "user is not a member of {target}"
                )));
            }

            let original = ws
                .message_at(source)
                .map(|m| m.text.clone())
                .ok_or_else(|| MessagingError::invalid("invalid messageId"))?;
            let text = if extra.is_empty() {
                original
            } else {
                format!("{original} {extra}")
            };

            let now = unix_now();
            let id = ws.allocate_message_id();
            insert_message(ws, target, Message::new(id, caller, text, now))?;
            notify_tags(ws, caller, target, extra);

            info!(
                "Message {} shared from {} to {} as {} by user {}",
                source_id, source.container, target, id, caller
            );
            Ok(id)
        })
    }
}
