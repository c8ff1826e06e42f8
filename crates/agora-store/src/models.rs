//! Store record types. Distinct from the agora-types API views so the
//! store layout can change without touching the wire format.
use serde::{Deserialize, Serialize};

use agora_types::{
    ChannelId, ContainerRef, DmId, GlobalRole, Message, MessageId, Notification, StatSample,
    UserId,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Workspace {
    pub users: Vec<UserRecord>,
    pub channels: Vec<ChannelRecord>,
    pub dms: Vec<DmRecord>,
    /// Next message id to hand out. Never decremented.
    pub message_counter: MessageId,
    /// Next DM id. DMs can be removed, so ids are not derived from the list.
    #[serde(default)]
    pub dm_counter: DmId,
    pub stats: WorkspaceStats,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserRecord {
    pub id: UserId,
    pub email: String,
    pub password_hash: String,
    pub name_first: String,
    pub name_last: String,
    pub handle: String,
    pub role: GlobalRole,
    /// Most recent first.
    pub notifications: Vec<Notification>,
    pub stats: UserStats,
}

impl UserRecord {
    pub fn is_global_owner(&self) -> bool {
        self.role == GlobalRole::Owner
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserStats {
    pub channels_joined: Vec<StatSample>,
    pub dms_joined: Vec<StatSample>,
    pub messages_sent: Vec<StatSample>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkspaceStats {
    pub channels_exist: Vec<StatSample>,
    pub dms_exist: Vec<StatSample>,
    pub messages_exist: Vec<StatSample>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelRecord {
    pub id: ChannelId,
    pub name: String,
    pub is_public: bool,
    pub owner_members: Vec<UserId>,
    pub all_members: Vec<UserId>,
    /// Most recent first.
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DmRecord {
    pub id: DmId,
    pub name: String,
    /// Only the creator may delete the DM.
    pub creator: UserId,
    pub owner_members: Vec<UserId>,
    pub all_members: Vec<UserId>,
    /// Most recent first.
    pub messages: Vec<Message>,
}

/// Behaviour shared by channels and DMs: an ordered message list plus a
/// member set with an owner subset.
///
/// `owner_members ⊆ all_members` holds after every method below.
pub trait Container {
    fn container_ref(&self) -> ContainerRef;
    fn name(&self) -> &str;
    fn all_members(&self) -> &[UserId];
    fn owner_members(&self) -> &[UserId];
    fn messages(&self) -> &[Message];
    fn messages_mut(&mut self) -> &mut Vec<Message>;
    fn members_mut(&mut self) -> (&mut Vec<UserId>, &mut Vec<UserId>);

    fn is_member(&self, user_id: UserId) -> bool {
        self.all_members().contains(&user_id)
    }

    fn is_owner(&self, user_id: UserId) -> bool {
        self.owner_members().contains(&user_id)
    }

    /// Returns false if the user was already a member.
    fn add_member(&mut self, user_id: UserId) -> bool {
        let (all, _) = self.members_mut();
        if all.contains(&user_id) {
            return false;
        }
        all.push(user_id);
        true
    }

    /// Makes an existing member an owner. Returns false for non-members and
    /// users who already own the container.
    fn add_owner(&mut self, user_id: UserId) -> bool {
        let (all, owners) = self.members_mut();
        if !all.contains(&user_id) || owners.contains(&user_id) {
            return false;
        }
        owners.push(user_id);
        true
    }

    /// Removes membership and, with it, any ownership.
    fn remove_member(&mut self, user_id: UserId) -> bool {
        let (all, owners) = self.members_mut();
        owners.retain(|&id| id != user_id);
        let before = all.len();
        all.retain(|&id| id != user_id);
        all.len() != before
    }

    fn find_message(&self, message_id: MessageId) -> Option<usize> {
        self.messages()
            .iter()
            .position(|m| m.message_id == message_id)
    }
}

impl Container for ChannelRecord {
    fn container_ref(&self) -> ContainerRef {
        ContainerRef::Channel(self.id)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn all_members(&self) -> &[UserId] {
        &self.all_members
    }

    fn owner_members(&self) -> &[UserId] {
        &self.owner_members
    }

    fn messages(&self) -> &[Message] {
        &self.messages
    }

    fn messages_mut(&mut self) -> &mut Vec<Message> {
        &mut self.messages
    }

    fn members_mut(&mut self) -> (&mut Vec<UserId>, &mut Vec<UserId>) {
        (&mut self.all_members, &mut self.owner_members)
    }
}

impl Container for DmRecord {
    fn container_ref(&self) -> ContainerRef {
        ContainerRef::Dm(self.id)
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn all_members(&self) -> &[UserId] {
        &self.all_members
    }

    fn owner_members(&self) -> &[UserId] {
        &self.owner_members
    }

    fn messages(&self) -> &[Message] {
        &self.messages
    }

    fn messages_mut(&mut self) -> &mut Vec<Message> {
        &mut self.messages
    }

    fn members_mut(&mut self) -> (&mut Vec<UserId>, &mut Vec<UserId>) {
        (&mut self.all_members, &mut self.owner_members)
    }
}
