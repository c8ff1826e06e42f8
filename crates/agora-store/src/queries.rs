use agora_types::{ChannelId, ContainerRef, DmId, GlobalRole, UserId};

use crate::models::{ChannelRecord, Container, DmRecord, UserRecord, UserStats, Workspace};
use crate::stats;

const HANDLE_MAX_LEN: usize = 20;

impl Workspace {
    // -- Users --

    /// Registers a user and derives a unique handle from their name.
    /// The very first user becomes the workspace's global owner.
    pub fn create_user(
        &mut self,
        email: &str,
        password_hash: &str,
        name_first: &str,
        name_last: &str,
        now: i64,
    ) -> UserId {
        let id = self.users.len() as UserId;
        let role = if self.users.is_empty() {
            self.stats = stats::fresh_workspace_stats(now);
            GlobalRole::Owner
        } else {
            GlobalRole::Member
        };

        let handle = self.unique_handle(name_first, name_last);
        self.users.push(UserRecord {
            id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            name_first: name_first.to_string(),
            name_last: name_last.to_string(),
            handle,
            role,
            notifications: Vec::new(),
            stats: UserStats::starting_at(now),
        });
        id
    }

    pub fn user(&self, id: UserId) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.id == id)
    }

    pub fn user_mut(&mut self, id: UserId) -> Option<&mut UserRecord> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    pub fn user_by_handle(&self, handle: &str) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.handle == handle)
    }

    pub fn user_by_email(&self, email: &str) -> Option<&UserRecord> {
        self.users.iter().find(|u| u.email == email)
    }

    fn unique_handle(&self, name_first: &str, name_last: &str) -> String {
        let base: String = format!("{name_first}{name_last}")
            .to_lowercase()
            .chars()
            .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
            .take(HANDLE_MAX_LEN)
            .collect();

        if self.user_by_handle(&base).is_none() {
            return base;
        }
        (0u32..)
            .map(|n| format!("{base}{n}"))
            .find(|candidate| self.user_by_handle(candidate).is_none())
            .unwrap_or(base)
    }

    // -- Channels --

    pub fn create_channel(&mut self, creator: UserId, name: &str, is_public: bool) -> ChannelId {
        let id = self.channels.last().map_or(0, |c| c.id + 1);
        self.channels.push(ChannelRecord {
            id,
            name: name.to_string(),
            is_public,
            owner_members: vec![creator],
            all_members: vec![creator],
            messages: Vec::new(),
        });
        id
    }

    pub fn channel(&self, id: ChannelId) -> Option<&ChannelRecord> {
        self.channels.iter().find(|c| c.id == id)
    }

    pub fn channel_mut(&mut self, id: ChannelId) -> Option<&mut ChannelRecord> {
        self.channels.iter_mut().find(|c| c.id == id)
    }

    // -- DMs --

    /// Creates a DM whose name is the sorted member handles joined by `", "`.
    /// `members` must not contain the creator; unknown user ids are skipped.
    pub fn create_dm(&mut self, creator: UserId, members: &[UserId]) -> DmId {
        let mut all_members: Vec<UserId> = members.to_vec();
        all_members.push(creator);

        let mut handles: Vec<&str> = all_members
            .iter()
            .filter_map(|&id| self.user(id).map(|u| u.handle.as_str()))
            .collect();
        handles.sort_unstable();
        let name = handles.join(", ");

        let id = self.dm_counter;
        self.dm_counter += 1;
        self.dms.push(DmRecord {
            id,
            name,
            creator,
            owner_members: vec![creator],
            all_members,
            messages: Vec::new(),
        });
        id
    }

    pub fn dm(&self, id: DmId) -> Option<&DmRecord> {
        self.dms.iter().find(|d| d.id == id)
    }

    pub fn dm_mut(&mut self, id: DmId) -> Option<&mut DmRecord> {
        self.dms.iter_mut().find(|d| d.id == id)
    }

    /// Deletes a DM and returns it, messages included.
    pub fn remove_dm(&mut self, id: DmId) -> Option<DmRecord> {
        let index = self.dms.iter().position(|d| d.id == id)?;
        Some(self.dms.remove(index))
    }

    // -- Containers --

    pub fn container(&self, target: ContainerRef) -> Option<&dyn Container> {
        match target {
            ContainerRef::Channel(id) => self.channel(id).map(|c| c as &dyn Container),
            ContainerRef::Dm(id) => self.dm(id).map(|d| d as &dyn Container),
        }
    }

    pub fn container_mut(&mut self, target: ContainerRef) -> Option<&mut dyn Container> {
        match target {
            ContainerRef::Channel(id) => self.channel_mut(id).map(|c| c as &mut dyn Container),
            ContainerRef::Dm(id) => self.dm_mut(id).map(|d| d as &mut dyn Container),
        }
    }

    /// Channels first, then DMs, in creation order.
    pub fn containers(&self) -> impl Iterator<Item = &dyn Container> {
        self.channels
            .iter()
            .map(|c| c as &dyn Container)
            .chain(self.dms.iter().map(|d| d as &dyn Container))
    }
}
