use tracing::info;

use agora_store::Workspace;
use agora_types::{MessageId, UserId};

use crate::Messaging;
use crate::error::{MessagingError, Result};
use crate::membership::MembershipOracle;
use crate::registry::MessageRegistry;

fn set_pinned(ws: &mut Workspace, caller: UserId, message_id: MessageId, pinned: bool) -> Result<()> {
    let loc = ws
        .locate_message(message_id)
        .ok_or_else(|| MessagingError::invalid("invalid messageId"))?;
    if !ws.is_member(caller, loc.container) {
        return Err(MessagingError::invalid("user is not in the channel or dm"));
    }
    if !ws.has_message_permission(caller, loc.container, None) {
        return Err(MessagingError::forbidden("user does not have owner permissions"));
    }

    let message = ws
        .message_at_mut(loc)
        .ok_or_else(|| MessagingError::invalid("invalid messageId"))?;
    if message.is_pinned == pinned {
        return Err(MessagingError::invalid(if pinned {
            "message is already pinned"
        } else {
            "message is not pinned"
        }));
    }
    message.is_pinned = pinned;
    Ok(())
}

impl Messaging {
    /// Marks a message pinned. Only owners of the container (and global
    /// owners, for channels) may pin.
    pub fn pin(&self, token: &str, message_id: MessageId) -> Result<()> {
        self.write_as(token, |ws, caller| {
            set_pinned(ws, caller, message_id, true)?;
            info!("Message {} pinned by user {}", message_id, caller);
            Ok(())
        })
    }

    pub fn unpin(&self, token: &str, message_id: MessageId) -> Result<()> {
        self.write_as(token, |ws, caller| {
            set_pinned(ws, caller, message_id, false)?;
            info!("Message {} unpinned by user {}", message_id, caller);
            Ok(())
        })
    }
}
