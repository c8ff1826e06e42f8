use std::fmt;

use serde::{Deserialize, Serialize};

pub type UserId = u32;
pub type ChannelId = u32;
pub type DmId = u32;

/// Message ids come from one workspace-wide counter shared by channels and DMs.
pub type MessageId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContainerKind {
    Channel,
    Dm,
}

impl fmt::Display for ContainerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Channel => f.write_str("channel"),
            Self::Dm => f.write_str("dm"),
        }
    }
}

/// Points at one channel or one DM.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum ContainerRef {
    Channel(ChannelId),
    Dm(DmId),
}

impl ContainerRef {
    pub fn kind(&self) -> ContainerKind {
        match self {
            Self::Channel(_) => ContainerKind::Channel,
            Self::Dm(_) => ContainerKind::Dm,
        }
    }

    pub fn id(&self) -> u32 {
        match self {
            Self::Channel(id) | Self::Dm(id) => *id,
        }
    }

    /// Legacy `(channelId, dmId)` pair where the unused side is `-1`.
    pub fn as_id_pair(&self) -> (i64, i64) {
        match self {
            Self::Channel(id) => (i64::from(*id), -1),
            Self::Dm(id) => (-1, i64::from(*id)),
        }
    }
}

impl fmt::Display for ContainerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind(), self.id())
    }
}

/// Workspace-wide role. The first registered user becomes the global owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlobalRole {
    Owner,
    Member,
}

/// Known react kinds. Only thumbs-up (id 1) exists today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum ReactKind {
    Thumbsup,
}

impl ReactKind {
    pub fn from_id(id: u32) -> Option<Self> {
        match id {
            1 => Some(Self::Thumbsup),
            _ => None,
        }
    }

    pub fn id(self) -> u32 {
        match self {
            Self::Thumbsup => 1,
        }
    }
}

impl TryFrom<u32> for ReactKind {
    type Error = String;

    fn try_from(id: u32) -> Result<Self, Self::Error> {
        Self::from_id(id).ok_or_else(|| format!("unknown react id {id}"))
    }
}

impl From<ReactKind> for u32 {
    fn from(kind: ReactKind) -> u32 {
        kind.id()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct React {
    #[serde(rename = "reactId")]
    pub kind: ReactKind,
    #[serde(rename = "uIds")]
    pub reactors: Vec<UserId>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub message_id: MessageId,
    #[serde(rename = "uId")]
    pub author_id: UserId,
    #[serde(rename = "message")]
    pub text: String,
    pub time_sent: i64,
    pub reacts: Vec<React>,
    pub is_pinned: bool,
}

impl Message {
    pub fn new(message_id: MessageId, author_id: UserId, text: String, time_sent: i64) -> Self {
        Self {
            message_id,
            author_id,
            text,
            time_sent,
            reacts: Vec::new(),
            is_pinned: false,
        }
    }

    pub fn has_reacted(&self, kind: ReactKind, user_id: UserId) -> bool {
        self.reacts
            .iter()
            .any(|r| r.kind == kind && r.reactors.contains(&user_id))
    }
}

/// One entry in a user's notification feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub container: ContainerRef,
    pub message: String,
}

/// A point on a stats timeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatSample {
    pub value: u64,
    pub time_stamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn react_kind_ids() {
        assert_eq!(ReactKind::from_id(1), Some(ReactKind::Thumbsup));
        assert_eq!(ReactKind::from_id(0), None);
        assert_eq!(ReactKind::from_id(2), None);
        assert!(serde_json::from_str::<ReactKind>("7").is_err());
        assert_eq!(serde_json::to_string(&ReactKind::Thumbsup).unwrap(), "1");
    }

    #[test]
    fn container_ref_id_pair() {
        assert_eq!(ContainerRef::Channel(3).as_id_pair(), (3, -1));
        assert_eq!(ContainerRef::Dm(0).as_id_pair(), (-1, 0));
        assert_eq!(ContainerRef::Dm(4).to_string(), "dm:4");
    }

    #[test]
    fn message_wire_names() {
        let msg = Message::new(7, 2, "hi".into(), 100);
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["messageId"], 7);
        assert_eq!(json["uId"], 2);
        assert_eq!(json["message"], "hi");
        assert_eq!(json["isPinned"], false);
    }
}
