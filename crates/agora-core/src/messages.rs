use tracing::info;

use agora_store::{Container, StatsSink, Workspace};
use agora_types::api::{MessagePage, MessageView, ReactView};
use agora_types::{ContainerKind, ContainerRef, Message, MessageId, UserId, unix_now};

use crate::Messaging;
use crate::error::{MessagingError, Result};
use crate::membership::MembershipOracle;
use crate::notifications::notify_tags;
use crate::registry::MessageRegistry;

pub const MAX_MESSAGE_CHARS: usize = 1000;

/// Messages returned per history page.
pub const PAGE_SIZE: usize = 50;

pub(crate) fn check_not_too_long(text: &str) -> Result<()> {
    if text.chars().count() > MAX_MESSAGE_CHARS {
        return Err(MessagingError::invalid("message length is greater than 1000"));
    }
    Ok(())
}

pub(crate) fn check_text(text: &str) -> Result<()> {
    if text.is_empty() {
        return Err(MessagingError::invalid("message length is less than 1"));
    }
    check_not_too_long(text)
}

fn find_container(ws: &Workspace, target: ContainerRef) -> Result<&dyn Container> {
    ws.container(target).ok_or_else(|| {
        MessagingError::invalid(match target.kind() {
            ContainerKind::Channel => "invalid channelId",
            ContainerKind::Dm => "invalid dmId",
        })
    })
}

pub(crate) fn check_container_exists(ws: &Workspace, target: ContainerRef) -> Result<()> {
    find_container(ws, target).map(|_| ())
}

/// Puts a message at the front of `target` and bumps the message counters.
/// Fails only if `target` no longer exists.
pub(crate) fn insert_message(
    ws: &mut Workspace,
    target: ContainerRef,
    message: Message,
) -> Result<MessageId> {
    let id = message.message_id;
    let author = message.author_id;
    let time_sent = message.time_sent;

    ws.container_mut(target)
        .ok_or_else(|| MessagingError::invalid(format!("{target} no longer exists")))?
        .messages_mut()
        .insert(0, message);
    ws.on_message_created(author, time_sent);
    Ok(id)
}

/// Posts a message under an already allocated id and notifies anyone it
/// tags. Membership and text are not checked here.
pub(crate) fn post_message(
    ws: &mut Workspace,
    author: UserId,
    target: ContainerRef,
    message_id: MessageId,
    text: &str,
    time_sent: i64,
) -> Result<MessageId> {
    insert_message(ws, target, Message::new(message_id, author, text.to_string(), time_sent))?;
    notify_tags(ws, author, target, text);
    Ok(message_id)
}

/// Send with every precondition checked.
pub(crate) fn send_checked(
    ws: &mut Workspace,
    caller: UserId,
    target: ContainerRef,
    text: &str,
    now: i64,
) -> Result<MessageId> {
    check_container_exists(ws, target)?;
    if !ws.is_member(caller, target) {
        return Err(MessagingError::forbidden(format!("user is not a member of {target}")));
    }
    check_text(text)?;

    let id = ws.allocate_message_id();
    post_message(ws, caller, target, id, text, now)
}

/// Edit, or remove when `text` is empty.
pub(crate) fn edit_checked(
    ws: &mut Workspace,
    caller: UserId,
    message_id: MessageId,
    text: &str,
    now: i64,
) -> Result<()> {
    check_not_too_long(text)?;

    let loc = ws
        .locate_message(message_id)
        .ok_or_else(|| MessagingError::invalid("invalid messageId"))?;
    if !ws.is_member(caller, loc.container) {
        return Err(MessagingError::invalid(
            "user is not in the channel or dm that holds the message",
        ));
    }
    let author = ws
        .message_at(loc)
        .map(|m| m.author_id)
        .ok_or_else(|| MessagingError::invalid("invalid messageId"))?;
    if !ws.has_message_permission(caller, loc.container, Some(author)) {
        return Err(MessagingError::forbidden(
            "user is not the author of the message and is not an owner",
        ));
    }

    if text.is_empty() {
        if let Some(container) = ws.container_mut(loc.container) {
            container.messages_mut().remove(loc.index);
        }
        ws.on_message_deleted(now);
        info!("Message {} removed from {} by user {}", message_id, loc.container, caller);
        return Ok(());
    }

    if let Some(message) = ws.message_at_mut(loc) {
        message.text = text.to_string();
    }
    notify_tags(ws, caller, loc.container, text);
    info!("Message {} edited in {} by user {}", message_id, loc.container, caller);
    Ok(())
}

pub(crate) fn view(message: &Message, viewer: UserId) -> MessageView {
    MessageView {
        message_id: message.message_id,
        u_id: message.author_id,
        message: message.text.clone(),
        time_sent: message.time_sent,
        reacts: message
            .reacts
            .iter()
            .map(|r| ReactView {
                react_id: r.kind.id(),
                u_ids: r.reactors.clone(),
                is_this_user_reacted: r.reactors.contains(&viewer),
            })
            .collect(),
        is_pinned: message.is_pinned,
    }
}

impl Messaging {
    /// Sends `text` to a channel or DM the caller belongs to.
    pub fn send(&self, token: &str, target: ContainerRef, text: &str) -> Result<MessageId> {
        self.write_as(token, |ws, caller| {
            let id = send_checked(ws, caller, target, text, unix_now())?;
            info!("Message {} sent to {} by user {}", id, target, caller);
            Ok(id)
        })
    }

    /// Replaces a message's text. An empty `text` removes the message.
    pub fn edit(&self, token: &str, message_id: MessageId, text: &str) -> Result<()> {
        self.write_as(token, |ws, caller| {
            edit_checked(ws, caller, message_id, text, unix_now())
        })
    }

    pub fn remove(&self, token: &str, message_id: MessageId) -> Result<()> {
        self.edit(token, message_id, "")
    }

    /// Up to [`PAGE_SIZE`] messages starting `start` places from the newest.
    pub fn list_messages(
        &self,
        token: &str,
        target: ContainerRef,
        start: usize,
    ) -> Result<MessagePage> {
        self.read_as(token, |ws, caller| {
            let container = find_container(ws, target)?;
            if !container.is_member(caller) {
                return Err(MessagingError::forbidden(format!(
                    "user is not a member of {target}"
                )));
            }

            let messages = container.messages();
            if start > messages.len() {
                return Err(MessagingError::invalid("start is greater than the total number of messages"));
            }

            let end = if start + PAGE_SIZE >= messages.len() {
                -1
            } else {
                (start + PAGE_SIZE) as i64
            };
            Ok(MessagePage {
                messages: messages
                    .iter()
                    .skip(start)
                    .take(PAGE_SIZE)
                    .map(|m| view(m, caller))
                    .collect(),
                start,
                end,
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::Harness;

    fn invalid(r: Result<impl std::fmt::Debug>) -> bool {
        matches!(r, Err(MessagingError::InvalidArgument(_)))
    }

    fn forbidden(r: Result<impl std::fmt::Debug>) -> bool {
        matches!(r, Err(MessagingError::Forbidden(_)))
    }

    #[test]
    fn send_to_own_channel() {
        let h = Harness::new();
        let u = h.user("Una");
        let ch = h.messaging.create_channel(&u.token, "general", true).unwrap();
        let target = ContainerRef::Channel(ch);

        h.messaging.send(&u.token, target, "hello").unwrap();

        let page = h.messaging.list_messages(&u.token, target, 0).unwrap();
        assert_eq!(page.messages.len(), 1);
        assert_eq!(page.messages[0].message, "hello");
        assert!(!page.messages[0].is_pinned);
        assert!(page.messages[0].reacts.is_empty());
        assert_eq!(page.end, -1);
    }

    #[test]
    fn ids_increase_across_channels_and_dms() {
        let h = Harness::new();
        let u = h.user("Una");
        let ch = ContainerRef::Channel(h.messaging.create_channel(&u.token, "c", true).unwrap());
        let dm = ContainerRef::Dm(h.messaging.create_dm(&u.token, &[]).unwrap());

        let mut last = None;
        for target in [ch, dm, ch, dm, dm, ch] {
            let id = h.messaging.send(&u.token, target, "x").unwrap();
            if let Some(prev) = last {
                assert!(id > prev);
            }
            last = Some(id);
        }
    }

    #[test]
    fn send_validates_membership_and_length() {
        let h = Harness::new();
        let owner = h.user("Owen");
        let outsider = h.user("Otto");
        let ch = ContainerRef::Channel(h.messaging.create_channel(&owner.token, "c", true).unwrap());

        assert!(forbidden(h.messaging.send(&outsider.token, ch, "hi")));
        assert!(invalid(h.messaging.send(&owner.token, ch, "")));
        assert!(invalid(h.messaging.send(&owner.token, ch, &"a".repeat(1001))));
        assert!(h.messaging.send(&owner.token, ch, &"a".repeat(1000)).is_ok());
        assert!(invalid(h.messaging.send(&owner.token, ContainerRef::Channel(9), "hi")));
        assert!(matches!(
            h.messaging.send("garbage", ch, "hi"),
            Err(MessagingError::Unauthorized(_))
        ));
    }

    #[test]
    fn messages_are_newest_first() {
        let h = Harness::new();
        let u = h.user("Una");
        let ch = ContainerRef::Channel(h.messaging.create_channel(&u.token, "c", true).unwrap());
        h.messaging.send(&u.token, ch, "first").unwrap();
        h.messaging.send(&u.token, ch, "second").unwrap();

        let page = h.messaging.list_messages(&u.token, ch, 0).unwrap();
        let texts: Vec<&str> = page.messages.iter().map(|m| m.message.as_str()).collect();
        assert_eq!(texts, vec!["second", "first"]);
    }

    #[test]
    fn edit_to_empty_equals_remove() {
        let h = Harness::new();
        let u = h.user("Una");
        let ch = ContainerRef::Channel(h.messaging.create_channel(&u.token, "c", true).unwrap());
        let a = h.messaging.send(&u.token, ch, "a").unwrap();
        let b = h.messaging.send(&u.token, ch, "b").unwrap();

        h.messaging.edit(&u.token, a, "").unwrap();
        h.messaging.remove(&u.token, b).unwrap();

        assert!(h.messaging.list_messages(&u.token, ch, 0).unwrap().messages.is_empty());
        let exist: Vec<u64> = h.ws(|ws| ws.stats.messages_exist.iter().map(|s| s.value).collect());
        assert_eq!(exist, vec![0, 1, 2, 1, 0]);

        // Removed messages are gone for good.
        assert!(invalid(h.messaging.edit(&u.token, a, "again")));
        assert!(invalid(h.messaging.remove(&u.token, b)));
    }

    #[test]
    fn edit_permissions() {
        let h = Harness::new();
        let owner = h.user("Owen");
        let author = h.user("Abby");
        let other = h.user("Olga");
        let outsider = h.user("Otto");
        let ch_id = h.messaging.create_channel(&owner.token, "c", true).unwrap();
        let ch = ContainerRef::Channel(ch_id);
        h.messaging.join_channel(&author.token, ch_id).unwrap();
        h.messaging.join_channel(&other.token, ch_id).unwrap();

        let m = h.messaging.send(&author.token, ch, "draft").unwrap();

        // Non-members get a bad request, not forbidden.
        assert!(invalid(h.messaging.edit(&outsider.token, m, "x")));
        assert!(forbidden(h.messaging.edit(&other.token, m, "x")));
        assert!(invalid(h.messaging.edit(&author.token, m, &"x".repeat(1001))));

        h.messaging.edit(&author.token, m, "by author").unwrap();
        h.messaging.edit(&owner.token, m, "by owner").unwrap();
        let page = h.messaging.list_messages(&other.token, ch, 0).unwrap();
        assert_eq!(page.messages[0].message, "by owner");
    }

    #[test]
    fn global_owner_edits_channels_but_not_dms() {
        let h = Harness::new();
        let global = h.user("Gina");
        let alice = h.user("Alice");
        let bob = h.user("Bob");

        let ch_id = h.messaging.create_channel(&alice.token, "c", true).unwrap();
        h.messaging.join_channel(&global.token, ch_id).unwrap();
        h.messaging.join_channel(&bob.token, ch_id).unwrap();
        let in_channel = h.messaging.send(&bob.token, ContainerRef::Channel(ch_id), "hi").unwrap();
        h.messaging.remove(&global.token, in_channel).unwrap();

        let dm = h.messaging.create_dm(&alice.token, &[global.id, bob.id]).unwrap();
        let in_dm = h.messaging.send(&bob.token, ContainerRef::Dm(dm), "hi").unwrap();
        assert!(forbidden(h.messaging.remove(&global.token, in_dm)));
        h.messaging.remove(&alice.token, in_dm).unwrap();
    }

    #[test]
    fn edit_can_newly_tag() {
        let h = Harness::new();
        let ann = h.user("Ann");
        let bob = h.user("Bob");
        let ch_id = h.messaging.create_channel(&ann.token, "general", true).unwrap();
        h.messaging.join_channel(&bob.token, ch_id).unwrap();

        let m = h.messaging.send(&ann.token, ContainerRef::Channel(ch_id), "hello").unwrap();
        assert!(h.messaging.notifications(&bob.token).unwrap().is_empty());

        h.messaging.edit(&ann.token, m, "hello @bob").unwrap();
        h.messaging.edit(&ann.token, m, "hello again").unwrap();

        let feed = h.messaging.notifications(&bob.token).unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].notification_message, "ann tagged you in general: hello @bob");
        assert_eq!((feed[0].channel_id, feed[0].dm_id), (i64::from(ch_id), -1));
    }

    #[test]
    fn duplicate_tags_notify_once() {
        let h = Harness::new();
        let ann = h.user("Ann");
        let a = h.user("A");
        let ch_id = h.messaging.create_channel(&ann.token, "general", true).unwrap();
        h.messaging.join_channel(&a.token, ch_id).unwrap();

        h.messaging.send(&ann.token, ContainerRef::Channel(ch_id), "@a @a hi").unwrap();

        let feed = h.messaging.notifications(&a.token).unwrap();
        assert_eq!(feed.len(), 1);
        assert_eq!(feed[0].notification_message, "ann tagged you in general: @a @a hi");
    }

    #[test]
    fn history_pages_by_fifty() {
        let h = Harness::new();
        let u = h.user("Una");
        let outsider = h.user("Otto");
        let ch = ContainerRef::Channel(h.messaging.create_channel(&u.token, "c", true).unwrap());
        for i in 0..60 {
            h.messaging.send(&u.token, ch, &format!("m{i}")).unwrap();
        }

        let first = h.messaging.list_messages(&u.token, ch, 0).unwrap();
        assert_eq!(first.messages.len(), 50);
        assert_eq!(first.end, 50);
        assert_eq!(first.messages[0].message, "m59");

        let second = h.messaging.list_messages(&u.token, ch, 50).unwrap();
        assert_eq!(second.messages.len(), 10);
        assert_eq!(second.end, -1);

        assert!(h.messaging.list_messages(&u.token, ch, 60).unwrap().messages.is_empty());
        assert!(invalid(h.messaging.list_messages(&u.token, ch, 61)));
        assert!(forbidden(h.messaging.list_messages(&outsider.token, ch, 0)));
    }

    #[test]
    fn concurrent_senders_never_share_an_id() {
        const SENDERS: usize = 8;
        const PER_SENDER: usize = 25;

        let h = Harness::new();
        let owner = h.user("Owner");
        let ch = h.messaging.create_channel(&owner.token, "busy", true).unwrap();
        let target = ContainerRef::Channel(ch);
        let senders: Vec<_> = (0..SENDERS).map(|i| h.user(&format!("S{i}"))).collect();
        for s in &senders {
            h.messaging.join_channel(&s.token, ch).unwrap();
        }

        let mut ids: Vec<MessageId> = std::thread::scope(|scope| {
            let handles: Vec<_> = senders
                .iter()
                .map(|s| {
                    let messaging = &h.messaging;
                    scope.spawn(move || {
                        (0..PER_SENDER)
                            .map(|n| messaging.send(&s.token, target, &format!("msg {n}")).unwrap())
                            .collect::<Vec<_>>()
                    })
                })
                .collect();
            handles.into_iter().flat_map(|t| t.join().unwrap()).collect()
        });
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), SENDERS * PER_SENDER);

        let exist = h.ws(|ws| ws.stats.messages_exist.last().map(|s| s.value));
        assert_eq!(exist, Some((SENDERS * PER_SENDER) as u64));

        let mut listed = 0;
        let mut start = 0;
        loop {
            let page = h.messaging.list_messages(&owner.token, target, start).unwrap();
            listed += page.messages.len();
            if page.end < 0 {
                break;
            }
            start = page.end as usize;
        }
        assert_eq!(listed, SENDERS * PER_SENDER);
    }
}
