//! Directory operations: channels, DMs and who belongs to them.
//!
//! These sit outside the message lifecycle proper but every message operation
//! depends on the membership they maintain.

use std::collections::BTreeSet;

use tracing::info;

use agora_store::{Container, Workspace};
use agora_types::api::{UserStatsView, WorkspaceStatsView};
use agora_types::{ChannelId, ContainerRef, DmId, UserId, unix_now};

use crate::Messaging;
use crate::error::{MessagingError, Result};
use crate::membership::MembershipOracle;
use crate::notifications::{NotificationKind, notify};

const MAX_CHANNEL_NAME_CHARS: usize = 20;

fn channel_exists(ws: &Workspace, channel_id: ChannelId) -> Result<()> {
    if ws.channel(channel_id).is_none() {
        return Err(MessagingError::invalid("invalid channelId"));
    }
    Ok(())
}

fn handle_of(ws: &Workspace, user_id: UserId) -> Option<String> {
    ws.user(user_id).map(|u| u.handle.clone())
}

impl Messaging {
    pub fn create_channel(&self, token: &str, name: &str, is_public: bool) -> Result<ChannelId> {
        self.write_as(token, |ws, caller| {
            let len = name.chars().count();
            if len == 0 || len > MAX_CHANNEL_NAME_CHARS {
                return Err(MessagingError::invalid(
                    "channel name must be between 1 and 20 characters",
                ));
            }

            let now = unix_now();
            let id = ws.create_channel(caller, name, is_public);
            ws.record_channel_created(now);
            ws.record_channel_membership(caller, true, now);
            info!("Channel {} ({}) created by user {}", id, name, caller);
            Ok(id)
        })
    }

    /// Joins a channel. Private channels admit only global owners.
    pub fn join_channel(&self, token: &str, channel_id: ChannelId) -> Result<()> {
        self.write_as(token, |ws, caller| {
            channel_exists(ws, channel_id)?;
            let is_global_owner = ws.is_global_owner(caller);
            let channel = ws
                .channel_mut(channel_id)
                .ok_or_else(|| MessagingError::invalid("invalid channelId"))?;

            if channel.is_member(caller) {
                return Err(MessagingError::invalid("user is already a member"));
            }
            if !channel.is_public && !is_global_owner {
                return Err(MessagingError::forbidden("channel is private"));
            }
            channel.add_member(caller);

            ws.record_channel_membership(caller, true, unix_now());
            info!("User {} joined channel {}", caller, channel_id);
            Ok(())
        })
    }

    /// Adds `invitee` to a channel the caller belongs to and tells them so.
    pub fn invite_to_channel(
        &self,
        token: &str,
        channel_id: ChannelId,
        invitee: UserId,
    ) -> Result<()> {
        self.write_as(token, |ws, caller| {
            channel_exists(ws, channel_id)?;
            let invitee_handle =
                handle_of(ws, invitee).ok_or_else(|| MessagingError::invalid("invalid uId"))?;
            let target = ContainerRef::Channel(channel_id);
            if !ws.is_member(caller, target) {
                return Err(MessagingError::forbidden("user is not a member of the channel"));
            }
            if ws.is_member(invitee, target) {
                return Err(MessagingError::invalid("invitee is already a member"));
            }

            if let Some(channel) = ws.channel_mut(channel_id) {
                channel.add_member(invitee);
            }
            ws.record_channel_membership(invitee, true, unix_now());
            notify(ws, caller, [invitee_handle.as_str()], target, NotificationKind::Added);
            info!("User {} invited user {} to channel {}", caller, invitee, channel_id);
            Ok(())
        })
    }

    /// Leaves a channel, giving up ownership too. Messages stay.
    pub fn leave_channel(&self, token: &str, channel_id: ChannelId) -> Result<()> {
        self.write_as(token, |ws, caller| {
            channel_exists(ws, channel_id)?;
            let left = ws
                .channel_mut(channel_id)
                .is_some_and(|c| c.remove_member(caller));
            if !left {
                return Err(MessagingError::forbidden("user is not a member of the channel"));
            }

            ws.record_channel_membership(caller, false, unix_now());
            info!("User {} left channel {}", caller, channel_id);
            Ok(())
        })
    }

    /// Opens a DM between the caller and `members`. Every member except the
    /// caller gets an Added notification.
    pub fn create_dm(&self, token: &str, members: &[UserId]) -> Result<DmId> {
        self.write_as(token, |ws, caller| {
            let mut seen = BTreeSet::from([caller]);
            for &member in members {
                if ws.user(member).is_none() {
                    return Err(MessagingError::invalid(format!("invalid uId {member}")));
                }
                if !seen.insert(member) {
                    return Err(MessagingError::invalid("duplicate uIds"));
                }
            }

            let now = unix_now();
            let id = ws.create_dm(caller, members);
            ws.record_dm_created(now);
            for &member in &seen {
                ws.record_dm_membership(member, true, now);
            }

            let handles: Vec<String> = members.iter().filter_map(|&m| handle_of(ws, m)).collect();
            notify(
                ws,
                caller,
                handles.iter().map(String::as_str),
                ContainerRef::Dm(id),
                NotificationKind::Added,
            );
            info!("DM {} created by user {} with {} others", id, caller, members.len());
            Ok(id)
        })
    }

    /// Deletes a DM and all its messages. Only the creator may do this.
    pub fn remove_dm(&self, token: &str, dm_id: DmId) -> Result<()> {
        self.write_as(token, |ws, caller| {
            let dm = ws
                .dm(dm_id)
                .ok_or_else(|| MessagingError::invalid("invalid dmId"))?;
            if !dm.is_member(caller) {
                return Err(MessagingError::forbidden("user is not a member of the dm"));
            }
            if dm.creator != caller {
                return Err(MessagingError::forbidden("only the creator can remove a dm"));
            }

            let Some(removed) = ws.remove_dm(dm_id) else {
                return Err(MessagingError::invalid("invalid dmId"));
            };
            let now = unix_now();
            ws.record_dm_removed(removed.messages.len(), now);
            for &member in &removed.all_members {
                ws.record_dm_membership(member, false, now);
            }
            info!(
                "DM {} removed by user {} ({} messages dropped)",
                dm_id,
                caller,
                removed.messages.len()
            );
            Ok(())
        })
    }

    pub fn user_stats(&self, token: &str) -> Result<UserStatsView> {
        self.read_as(token, |ws, caller| {
            ws.user_stats(caller)
                .ok_or_else(|| MessagingError::unauthorized("token refers to an unknown user"))
        })
    }

    pub fn workspace_stats(&self, token: &str) -> Result<WorkspaceStatsView> {
        self.read_as(token, |ws, _| Ok(ws.workspace_stats()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;

    fn latest(timeline: &[agora_types::StatSample]) -> u64 {
        timeline.last().map_or(0, |s| s.value)
    }

    #[test]
    fn channel_names_are_bounded() {
        let h = Harness::new();
        let u = h.user("Una");
        assert!(matches!(
            h.messaging.create_channel(&u.token, "", true),
            Err(MessagingError::InvalidArgument(_))
        ));
        assert!(matches!(
            h.messaging.create_channel(&u.token, &"c".repeat(21), true),
            Err(MessagingError::InvalidArgument(_))
        ));
        assert!(h.messaging.create_channel(&u.token, &"c".repeat(20), true).is_ok());
    }

    #[test]
    fn bad_token_wins_over_bad_channel_name() {
        let h = Harness::new();
        assert!(matches!(
            h.messaging.create_channel("garbage", "", true),
            Err(MessagingError::Unauthorized(_))
        ));
        assert!(matches!(
            h.messaging.create_channel("garbage", &"c".repeat(21), true),
            Err(MessagingError::Unauthorized(_))
        ));
    }

    #[test]
    fn private_channels_admit_only_global_owners() {
        let h = Harness::new();
        let global = h.user("Gina");
        let alice = h.user("Alice");
        let bob = h.user("Bob");
        let ch = h.messaging.create_channel(&alice.token, "secret", false).unwrap();

        assert!(matches!(
            h.messaging.join_channel(&bob.token, ch),
            Err(MessagingError::Forbidden(_))
        ));
        h.messaging.join_channel(&global.token, ch).unwrap();
        assert!(matches!(
            h.messaging.join_channel(&global.token, ch),
            Err(MessagingError::InvalidArgument(_))
        ));
        assert!(matches!(
            h.messaging.join_channel(&bob.token, ch + 1),
            Err(MessagingError::InvalidArgument(_))
        ));
    }

    #[test]
    fn invite_adds_member_and_notifies() {
        let h = Harness::new();
        let ann = h.user("Ann");
        let bob = h.user("Bob");
        let otto = h.user("Otto");
        let ch = h.messaging.create_channel(&ann.token, "general", false).unwrap();

        assert!(matches!(
            h.messaging.invite_to_channel(&otto.token, ch, bob.id),
            Err(MessagingError::Forbidden(_))
        ));
        h.messaging.invite_to_channel(&ann.token, ch, bob.id).unwrap();
        assert!(matches!(
            h.messaging.invite_to_channel(&ann.token, ch, bob.id),
            Err(MessagingError::InvalidArgument(_))
        ));
        assert!(matches!(
            h.messaging.invite_to_channel(&ann.token, ch, 99),
            Err(MessagingError::InvalidArgument(_))
        ));

        let feed = h.messaging.notifications(&bob.token).unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].notification_message, "ann added you to general");
        assert_eq!((feed[0].channel_id, feed[0].dm_id), (i64::from(ch), -1));
    }

    #[test]
    fn leaving_drops_ownership() {
        let h = Harness::new();
        let ann = h.user("Ann");
        let ch = h.messaging.create_channel(&ann.token, "general", true).unwrap();
        h.messaging.leave_channel(&ann.token, ch).unwrap();

        let owners = h.ws(|ws| ws.channel(ch).map(|c| c.owner_members.clone()).unwrap());
        assert!(owners.is_empty());
        assert!(matches!(
            h.messaging.leave_channel(&ann.token, ch),
            Err(MessagingError::Forbidden(_))
        ));
    }

    #[test]
    fn dm_creation_validates_members_and_notifies_them() {
        let h = Harness::new();
        let ann = h.user("Ann");
        let bob = h.user("Bob");
        let cat = h.user("Cat");

        assert!(h.messaging.create_dm(&ann.token, &[bob.id, bob.id]).is_err());
        assert!(h.messaging.create_dm(&ann.token, &[ann.id]).is_err());
        assert!(h.messaging.create_dm(&ann.token, &[42]).is_err());

        let dm = h.messaging.create_dm(&ann.token, &[cat.id, bob.id]).unwrap();
        let name = h.ws(|ws| ws.dm(dm).map(|d| d.name.clone()).unwrap());
        assert_eq!(name, "ann, bob, cat");

        for member in [&bob, &cat] {
            let feed = h.messaging.notifications(&member.token).unwrap();
            assert_eq!(feed[0].notification_message, "ann added you to ann, bob, cat");
            assert_eq!((feed[0].channel_id, feed[0].dm_id), (-1, i64::from(dm)));
        }
        assert!(h.messaging.notifications(&ann.token).unwrap().is_empty());
    }

    #[test]
    fn removing_a_dm_drops_its_messages_from_stats() {
        let h = Harness::new();
        let ann = h.user("Ann");
        let bob = h.user("Bob");
        let dm = h.messaging.create_dm(&ann.token, &[bob.id]).unwrap();
        h.messaging.send(&bob.token, ContainerRef::Dm(dm), "one").unwrap();
        h.messaging.send(&bob.token, ContainerRef::Dm(dm), "two").unwrap();

        assert!(matches!(
            h.messaging.remove_dm(&bob.token, dm),
            Err(MessagingError::Forbidden(_))
        ));
        h.messaging.remove_dm(&ann.token, dm).unwrap();
        assert!(matches!(
            h.messaging.remove_dm(&ann.token, dm),
            Err(MessagingError::InvalidArgument(_))
        ));

        let ws_stats = h.messaging.workspace_stats(&ann.token).unwrap();
        assert_eq!(latest(&ws_stats.messages_exist), 0);
        assert_eq!(latest(&ws_stats.dms_exist), 0);
        let bob_stats = h.messaging.user_stats(&bob.token).unwrap();
        assert_eq!(latest(&bob_stats.dms_joined), 0);
        assert_eq!(latest(&bob_stats.messages_sent), 2);
    }

    #[test]
    fn involvement_tracks_membership_and_messages() {
        let h = Harness::new();
        let ann = h.user("Ann");
        let bob = h.user("Bob");
        let ch = h.messaging.create_channel(&ann.token, "general", true).unwrap();
        h.messaging.send(&ann.token, ContainerRef::Channel(ch), "hi").unwrap();

        let stats = h.messaging.user_stats(&ann.token).unwrap();
        assert_eq!(stats.involvement_rate, 1.0);
        let stats = h.messaging.user_stats(&bob.token).unwrap();
        assert_eq!(stats.involvement_rate, 0.0);

        let ws_stats = h.messaging.workspace_stats(&bob.token).unwrap();
        assert_eq!(ws_stats.utilization_rate, 0.5);
    }
}
