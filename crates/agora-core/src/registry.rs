use agora_store::Workspace;
use agora_types::{ContainerRef, Message, MessageId};

/// Where a message currently lives. Recomputed on every operation: removals
/// and inserts shift indices, so locations are never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageLocation {
    pub container: ContainerRef,
    pub index: usize,
}

/// Message id allocation and lookup across channels and DMs.
pub trait MessageRegistry {
    /// Hands out the next id from the workspace-wide counter. Ids are never
    /// reused, even after the message is removed.
    fn allocate_message_id(&mut self) -> MessageId;

    /// Scans channels, then DMs.
    fn locate_message(&self, id: MessageId) -> Option<MessageLocation>;

    fn message_at(&self, loc: MessageLocation) -> Option<&Message>;

    fn message_at_mut(&mut self, loc: MessageLocation) -> Option<&mut Message>;
}

impl MessageRegistry for Workspace {
    fn allocate_message_id(&mut self) -> MessageId {
        let id = self.message_counter;
        self.message_counter += 1;
        id
    }

    fn locate_message(&self, id: MessageId) -> Option<MessageLocation> {
        self.containers().find_map(|c| {
            c.find_message(id).map(|index| MessageLocation {
                container: c.container_ref(),
                index,
            })
        })
    }

    fn message_at(&self, loc: MessageLocation) -> Option<&Message> {
        self.container(loc.container)?.messages().get(loc.index)
    }

    fn message_at_mut(&mut self, loc: MessageLocation) -> Option<&mut Message> {
        self.container_mut(loc.container)?
            .messages_mut()
            .get_mut(loc.index)
    }
}
