use agora_store::Workspace;
use agora_types::{ContainerKind, ContainerRef, UserId};

/// Membership and role questions, asked the same way for channels and DMs.
pub trait MembershipOracle {
    fn is_member(&self, user: UserId, target: ContainerRef) -> bool;
    fn is_owner(&self, user: UserId, target: ContainerRef) -> bool;
    fn is_global_owner(&self, user: UserId) -> bool;

    /// May `user` edit, remove, pin or unpin messages in `target`?
    ///
    /// Channel owners, DM owners and the message author qualify. Global owners
    /// qualify in channels only, never in DMs. Pass `author = None` to drop the
    /// author clause, which is what pin and unpin do.
    fn has_message_permission(
        &self,
        user: UserId,
        target: ContainerRef,
        author: Option<UserId>,
    ) -> bool {
        let is_author = author == Some(user);
        match target.kind() {
            ContainerKind::Channel => {
                self.is_global_owner(user) || self.is_owner(user, target) || is_author
            }
            ContainerKind::Dm => self.is_owner(user, target) || is_author,
        }
    }
}

impl MembershipOracle for Workspace {
    fn is_member(&self, user: UserId, target: ContainerRef) -> bool {
        self.container(target).is_some_and(|c| c.is_member(user))
    }

    fn is_owner(&self, user: UserId, target: ContainerRef) -> bool {
        self.container(target).is_some_and(|c| c.is_owner(user))
    }

    fn is_global_owner(&self, user: UserId) -> bool {
        self.user(user).is_some_and(|u| u.is_global_owner())
    }
}
