use tracing::info;

use agora_store::Workspace;
use agora_types::{MessageId, React, ReactKind, UserId};

use crate::Messaging;
use crate::error::{MessagingError, Result};
use crate::membership::MembershipOracle;
use crate::notifications::{NotificationKind, notify};
use crate::registry::{MessageLocation, MessageRegistry};

fn react_kind(react_id: u32) -> Result<ReactKind> {
    ReactKind::from_id(react_id).ok_or_else(|| MessagingError::invalid("invalid reactId"))
}

/// Locates `message_id` and checks that `caller` belongs to its container.
fn locate_for_member(
    ws: &Workspace,
    caller: UserId,
    message_id: MessageId,
) -> Result<MessageLocation> {
    let loc = ws
        .locate_message(message_id)
        .ok_or_else(|| MessagingError::invalid("invalid messageId"))?;
    if !ws.is_member(caller, loc.container) {
        return Err(MessagingError::invalid("user is not in the channel or dm"));
    }
    Ok(loc)
}

impl Messaging {
    /// Adds the caller to the reactors of `react_id` on a message. Reacting
    /// twice with the same kind is rejected. The author is notified if they
    /// are still in the container.
    pub fn react(&self, token: &str, message_id: MessageId, react_id: u32) -> Result<()> {
        self.write_as(token, |ws, caller| {
            let kind = react_kind(react_id)?;
            let loc = locate_for_member(ws, caller, message_id)?;
            let message = ws
                .message_at_mut(loc)
                .ok_or_else(|| MessagingError::invalid("invalid messageId"))?;

            match message.reacts.iter_mut().find(|r| r.kind == kind) {
                Some(react) if react.reactors.contains(&caller) => {
                    return Err(MessagingError::invalid("already reacted with this reactId"));
                }
                Some(react) => react.reactors.push(caller),
                None => message.reacts.push(React {
                    kind,
                    reactors: vec![caller],
                }),
            }
            let author = message.author_id;

            if ws.is_member(author, loc.container) {
                if let Some(handle) = ws.user(author).map(|u| u.handle.clone()) {
                    notify(ws, caller, [handle.as_str()], loc.container, NotificationKind::Reacted);
                }
            }
            info!("User {} reacted {:?} to message {}", caller, kind, message_id);
            Ok(())
        })
    }

    /// Removes the caller from the reactors of `react_id` on a message.
    pub fn unreact(&self, token: &str, message_id: MessageId, react_id: u32) -> Result<()> {
        self.write_as(token, |ws, caller| {
            let kind = react_kind(react_id)?;
            let loc = locate_for_member(ws, caller, message_id)?;
            let message = ws
                .message_at_mut(loc)
                .ok_or_else(|| MessagingError::invalid("invalid messageId"))?;

            let react = message
                .reacts
                .iter_mut()
                .find(|r| r.kind == kind && r.reactors.contains(&caller))
                .ok_or_else(|| MessagingError::invalid("user has not reacted with this reactId"))?;
            react.reactors.retain(|&id| id != caller);

            info!("User {} removed {:?} from message {}", caller, kind, message_id);
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;
    use agora_types::ContainerRef;

    const THUMBSUP: u32 = 1;

    fn invalid(r: Result<()>) -> bool {
        matches!(r, Err(MessagingError::InvalidArgument(_)))
    }

    #[test]
    fn react_then_unreact_round_trips() {
        let h = Harness::new();
        let ann = h.user("Ann");
        let bob = h.user("Bob");
        let ch = h.messaging.create_channel(&ann.token, "general", true).unwrap();
        h.messaging.join_channel(&bob.token, ch).unwrap();
        let m = h.messaging.send(&ann.token, ContainerRef::Channel(ch), "hi").unwrap();

        h.messaging.react(&bob.token, m, THUMBSUP).unwrap();
        h.messaging.react(&ann.token, m, THUMBSUP).unwrap();
        assert!(invalid(h.messaging.react(&bob.token, m, THUMBSUP)));

        let page = h.messaging.list_messages(&bob.token, ContainerRef::Channel(ch), 0).unwrap();
        let react = &page.messages[0].reacts[0];
        assert_eq!(react.react_id, THUMBSUP);
        assert_eq!(react.u_ids, vec![bob.id, ann.id]);
        assert!(react.is_this_user_reacted);

        h.messaging.unreact(&bob.token, m, THUMBSUP).unwrap();
        assert!(invalid(h.messaging.unreact(&bob.token, m, THUMBSUP)));
        let reacted = h.ws(|ws| ws.channels[0].messages[0].has_reacted(ReactKind::Thumbsup, bob.id));
        assert!(!reacted);
    }

    #[test]
    fn react_rejects_unknown_kind_and_outsiders() {
        let h = Harness::new();
        let ann = h.user("Ann");
        let outsider = h.user("Otto");
        let ch = h.messaging.create_channel(&ann.token, "general", true).unwrap();
        let m = h.messaging.send(&ann.token, ContainerRef::Channel(ch), "hi").unwrap();

        assert!(invalid(h.messaging.react(&ann.token, m, 2)));
        assert!(invalid(h.messaging.react(&outsider.token, m, THUMBSUP)));
        assert!(invalid(h.messaging.react(&ann.token, m + 100, THUMBSUP)));
        assert!(invalid(h.messaging.unreact(&ann.token, m, THUMBSUP)));
    }

    #[test]
    fn react_notifies_author_while_still_member() {
        let h = Harness::new();
        let ann = h.user("Ann");
        let bob = h.user("Bob");
        let carl = h.user("Carl");
        let dm = h.messaging.create_dm(&ann.token, &[bob.id]).unwrap();
        let ch = h.messaging.create_channel(&ann.token, "general", true).unwrap();
        h.messaging.join_channel(&bob.token, ch).unwrap();
        h.messaging.join_channel(&carl.token, ch).unwrap();

        let in_dm = h.messaging.send(&bob.token, ContainerRef::Dm(dm), "hey").unwrap();
        h.messaging.react(&ann.token, in_dm, THUMBSUP).unwrap();
        let feed = h.messaging.notifications(&bob.token).unwrap();
        assert_eq!(feed[0].notification_message, "ann reacted to your message in ann, bob");
        assert_eq!((feed[0].channel_id, feed[0].dm_id), (-1, i64::from(dm)));

        let in_channel = h.messaging.send(&bob.token, ContainerRef::Channel(ch), "yo").unwrap();
        h.messaging.leave_channel(&bob.token, ch).unwrap();
        h.messaging.react(&carl.token, in_channel, THUMBSUP).unwrap();
        assert_eq!(h.messaging.notifications(&bob.token).unwrap().len(), 2);
    }
}
