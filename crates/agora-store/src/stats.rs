//! Usage counters kept as timelines: every change appends a new sample
//! rather than overwriting the last one.

use agora_types::api::{UserStatsView, WorkspaceStatsView};
use agora_types::{StatSample, UserId};

use crate::models::{UserStats, Workspace, WorkspaceStats};

/// Fire-and-forget message counters. Callers never inspect a result.
pub trait StatsSink {
    fn on_message_created(&mut self, author: UserId, at: i64);
    fn on_message_deleted(&mut self, at: i64);
}

pub(crate) fn fresh_workspace_stats(now: i64) -> WorkspaceStats {
    let zero = vec![StatSample { value: 0, time_stamp: now }];
    WorkspaceStats {
        channels_exist: zero.clone(),
        dms_exist: zero.clone(),
        messages_exist: zero,
    }
}

impl UserStats {
    pub fn starting_at(now: i64) -> Self {
        let zero = vec![StatSample { value: 0, time_stamp: now }];
        Self {
            channels_joined: zero.clone(),
            dms_joined: zero.clone(),
            messages_sent: zero,
        }
    }
}

fn latest(timeline: &[StatSample]) -> u64 {
    timeline.last().map_or(0, |s| s.value)
}

fn push_delta(timeline: &mut Vec<StatSample>, delta: i64, now: i64) {
    let value = latest(timeline).saturating_add_signed(delta);
    timeline.push(StatSample {
        value,
        time_stamp: now,
    });
}

impl StatsSink for Workspace {
    fn on_message_created(&mut self, author: UserId, at: i64) {
        if let Some(user) = self.user_mut(author) {
            push_delta(&mut user.stats.messages_sent, 1, at);
        }
        push_delta(&mut self.stats.messages_exist, 1, at);
    }

    fn on_message_deleted(&mut self, at: i64) {
        push_delta(&mut self.stats.messages_exist, -1, at);
    }
}

impl Workspace {
    pub fn record_channel_created(&mut self, now: i64) {
        push_delta(&mut self.stats.channels_exist, 1, now);
    }

    pub fn record_dm_created(&mut self, now: i64) {
        push_delta(&mut self.stats.dms_exist, 1, now);
    }

    /// A DM disappeared together with `message_count` messages.
    pub fn record_dm_removed(&mut self, message_count: usize, now: i64) {
        push_delta(&mut self.stats.dms_exist, -1, now);
        if message_count > 0 {
            push_delta(&mut self.stats.messages_exist, -(message_count as i64), now);
        }
    }

    pub fn record_channel_membership(&mut self, user_id: UserId, joined: bool, now: i64) {
        if let Some(user) = self.user_mut(user_id) {
            push_delta(&mut user.stats.channels_joined, if joined { 1 } else { -1 }, now);
        }
    }

    pub fn record_dm_membership(&mut self, user_id: UserId, joined: bool, now: i64) {
        if let Some(user) = self.user_mut(user_id) {
            push_delta(&mut user.stats.dms_joined, if joined { 1 } else { -1 }, now);
        }
    }

    pub fn user_stats(&self, user_id: UserId) -> Option<UserStatsView> {
        let user = self.user(user_id)?;
        let s = &user.stats;

        let numerator =
            latest(&s.channels_joined) + latest(&s.dms_joined) + latest(&s.messages_sent);
        let denominator = latest(&self.stats.channels_exist)
            + latest(&self.stats.dms_exist)
            + latest(&self.stats.messages_exist);
        let involvement_rate = if denominator == 0 {
            0.0
        } else {
            (numerator as f64 / denominator as f64).min(1.0)
        };

        Some(UserStatsView {
            channels_joined: s.channels_joined.clone(),
            dms_joined: s.dms_joined.clone(),
            messages_sent: s.messages_sent.clone(),
            involvement_rate,
        })
    }

    pub fn workspace_stats(&self) -> WorkspaceStatsView {
        let active = self
            .users
            .iter()
            .filter(|u| latest(&u.stats.channels_joined) > 0 || latest(&u.stats.dms_joined) > 0)
            .count();
        let utilization_rate = if self.users.is_empty() {
            0.0
        } else {
            active as f64 / self.users.len() as f64
        };

        WorkspaceStatsView {
            channels_exist: self.stats.channels_exist.clone(),
            dms_exist: self.stats.dms_exist.clone(),
            messages_exist: self.stats.messages_exist.clone(),
            utilization_rate,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_counters_append_samples() {
        let mut ws = Workspace::default();
        let u = ws.create_user("u@x.io", "h", "U", "One", 1);

        ws.on_message_created(u, 2);
        ws.on_message_created(u, 3);
        ws.on_message_deleted(4);

        let values: Vec<u64> = ws.stats.messages_exist.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![0, 1, 2, 1]);
        assert_eq!(latest(&ws.user(u).unwrap().stats.messages_sent), 2);
    }

    #[test]
    fn involvement_is_capped_and_zero_safe() {
        let mut ws = Workspace::default();
        let u = ws.create_user("u@x.io", "h", "U", "One", 1);
        assert_eq!(ws.user_stats(u).unwrap().involvement_rate, 0.0);

        ws.record_channel_created(2);
        ws.record_channel_membership(u, true, 2);
        ws.on_message_created(u, 3);
        ws.on_message_deleted(4);
        // joined 1 + sent 1 over channels 1 + messages 0
        assert_eq!(ws.user_stats(u).unwrap().involvement_rate, 1.0);
    }

    #[test]
    fn utilization_counts_users_in_any_container() {
        let mut ws = Workspace::default();
        let a = ws.create_user("a@x.io", "h", "A", "A", 0);
        ws.create_user("b@x.io", "h", "B", "B", 0);
        ws.record_dm_membership(a, true, 1);

        assert_eq!(ws.workspace_stats().utilization_rate, 0.5);
    }
}
