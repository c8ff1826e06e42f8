use tracing::debug;

use agora_store::Workspace;
use agora_types::api::NotificationView;
use agora_types::{ContainerRef, Notification, UserId};

use crate::Messaging;
use crate::error::Result;
use crate::tags::resolve_tags;

/// Feed reads return at most this many entries.
pub const FEED_PAGE: usize = 20;

/// Tagged notifications quote this many characters of the message.
const TAG_SNIPPET_CHARS: usize = 20;

#[derive(Debug, Clone, Copy)]
pub enum NotificationKind<'a> {
    Added,
    Reacted,
    Tagged { text: &'a str },
}

pub fn render(sender_handle: &str, container_name: &str, kind: NotificationKind<'_>) -> String {
    match kind {
        NotificationKind::Added => format!("{sender_handle} added you to {container_name}"),
        NotificationKind::Reacted => {
            format!("{sender_handle} reacted to your message in {container_name}")
        }
        NotificationKind::Tagged { text } => {
            let snippet: String = text.chars().take(TAG_SNIPPET_CHARS).collect();
            format!("{sender_handle} tagged you in {container_name}: {snippet}")
        }
    }
}

/// Prepends one rendered notification to each recipient's feed.
/// Unknown handles are skipped; there is no acknowledgement or retry.
pub fn notify<'h>(
    ws: &mut Workspace,
    sender: UserId,
    recipients: impl IntoIterator<Item = &'h str>,
    target: ContainerRef,
    kind: NotificationKind<'_>,
) {
    let Some(sender_handle) = ws.user(sender).map(|u| u.handle.clone()) else {
        return;
    };
    let Some(container_name) = ws.container(target).map(|c| c.name().to_string()) else {
        return;
    };
    let message = render(&sender_handle, &container_name, kind);

    for handle in recipients {
        if let Some(user) = ws.users.iter_mut().find(|u| u.handle == handle) {
            debug!("Notifying {} in {}: {}", handle, target, message);
            user.notifications.insert(
                0,
                Notification {
                    container: target,
                    message: message.clone(),
                },
            );
        }
    }
}

/// Resolves the mentions in `text` against `target` and sends one Tagged
/// notification per distinct member mentioned.
pub(crate) fn notify_tags(ws: &mut Workspace, sender: UserId, target: ContainerRef, text: &str) {
    let handles = resolve_tags(ws, text, target);
    if handles.is_empty() {
        return;
    }
    notify(
        ws,
        sender,
        handles.iter().map(String::as_str),
        target,
        NotificationKind::Tagged { text },
    );
}

impl Messaging {
    /// The caller's most recent notifications, newest first.
    pub fn notifications(&self, token: &str) -> Result<Vec<NotificationView>> {
        self.read_as(token, |ws, caller| {
            let feed = ws
                .user(caller)
                .map(|u| {
                    u.notifications
                        .iter()
                        .take(FEED_PAGE)
                        .map(|n| {
                            let (channel_id, dm_id) = n.container.as_id_pair();
                            NotificationView {
                                channel_id,
                                dm_id,
                                notification_message: n.message.clone(),
                            }
                        })
                        .collect()
                })
                .unwrap_or_default();
            Ok(feed)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agora_store::Container;

    #[test]
    fn rendering_matches_each_kind() {
        assert_eq!(
            render("ann", "general", NotificationKind::Added),
            "ann added you to general"
        );
        assert_eq!(
            render("ann", "general", NotificationKind::Reacted),
            "ann reacted to your message in general"
        );
        assert_eq!(
            render(
                "ann",
                "bob, ann",
                NotificationKind::Tagged {
                    text: "@bob this text runs well past twenty chars"
                }
            ),
            "ann tagged you in bob, ann: @bob this text runs "
        );
    }

    #[test]
    fn snippet_counts_characters_not_bytes() {
        let text = "é".repeat(25);
        let rendered = render("a", "c", NotificationKind::Tagged { text: &text });
        assert!(rendered.ends_with(&"é".repeat(20)));
    }

    #[test]
    fn notify_prepends_to_feed() {
        let mut ws = Workspace::default();
        let ann = ws.create_user("a@x.io", "h", "Ann", "", 0);
        let bob = ws.create_user("b@x.io", "h", "Bob", "", 0);
        let ch = ws.create_channel(ann, "general", true);
        ws.channel_mut(ch).unwrap().add_member(bob);
        let target = ContainerRef::Channel(ch);

        notify(&mut ws, ann, ["bob"], target, NotificationKind::Added);
        notify(&mut ws, ann, ["bob", "ghost"], target, NotificationKind::Reacted);

        let feed = &ws.user(bob).unwrap().notifications;
        assert_eq!(feed.len(), 2);
        assert_eq!(feed[0].message, "ann reacted to your message in general");
        assert_eq!(feed[1].message, "ann added you to general");
        assert!(ws.user(ann).unwrap().notifications.is_empty());
    }
}
