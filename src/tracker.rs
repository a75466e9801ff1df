//! Tracks member statuses and decides when a reward fires.

use std::collections::HashMap;
use chrono::{DateTime, Duration, Utc};
use crate::structures::{ConfigError, Decision, GuildConfig};

/// How long a member stays ineligible after being rewarded.
pub fn cooldown_window() -> Duration {
    Duration::hours(24)
}

/// Case-folded substring containment, the only comparison the bot does.
///
/// Not exact match, not word-boundary match: `"playing EXAMPLE.GG now"`
/// contains `"example.gg"`.
pub fn contains_fold(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// The bot's whole memory: who has what status, which guilds are
/// configured, who was rewarded when, and how many rewards each guild
/// has handed out.
///
/// # Notes
/// Everything in here is process-lifetime only. A restart forgets all of
/// it, and the only invariant worth keeping (the daily cooldown) is
/// cheap for members to re-earn.
///
/// The tracker itself is not thread-safe; callers on a multithreaded
/// runtime wrap it in a single lock so observations stay serialized.
#[derive(Debug, Default)]
pub struct StatusTracker {
    /// Last observed status text per member. Empty means "no custom
    /// status"; absent means "never observed".
    statuses: HashMap<u64, String>,
    /// Reward configuration per guild. Absent means unconfigured, which
    /// disables reward evaluation there.
    guilds: HashMap<u64, GuildConfig>,
    /// When each member was last rewarded. Absent means eligible.
    cooldowns: HashMap<u64, DateTime<Utc>>,
    /// Rewards handed out per guild since the process started.
    rewards: HashMap<u64, u64>
}

impl StatusTracker {
    /// Creates an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one status observation through the reward decision.
    ///
    /// The "previous" status is always the ledger's value, captured
    /// before the overwrite; presence events don't get a vote on what
    /// "before" was, so duplicated or reordered events can't fake a
    /// rising edge.
    ///
    /// A [`Decision::Reward`] has already stamped the member's cooldown;
    /// the caller only has to perform the reward itself.
    pub fn observe(
        &mut self,
        guild_id: u64,
        member_id: u64,
        new_status: &str,
        now: DateTime<Utc>
    ) -> Decision {
        let previous = self.statuses.get(&member_id).cloned().unwrap_or_default();
        if previous == new_status {
            // Redundant event carrying state we already have
            return Decision::Skip;
        }
        self.statuses.insert(member_id, new_status.to_owned());

        let Some(config) = self.guilds.get(&guild_id) else {
            return Decision::Skip;
        };

        let has = contains_fold(new_status, &config.marker);
        let had = contains_fold(&previous, &config.marker);
        // Edge-triggered: only the transition into the marker counts
        if !has || had {
            return Decision::Skip;
        }

        if let Some(last) = self.cooldowns.get(&member_id) {
            if now - *last < cooldown_window() {
                return Decision::OnCooldown;
            }
        }
        self.cooldowns.insert(member_id, now);
        Decision::Reward
    }

    /// Creates or overwrites a guild's configuration.
    ///
    /// # Errors
    /// Rejects markers without a `.`; a vanity URL always has one. The
    /// store is left untouched on rejection.
    pub fn configure(
        &mut self,
        guild_id: u64,
        marker: String,
        reward_channel: u64
    ) -> Result<(), ConfigError> {
        if !marker.contains('.') {
            return Err(ConfigError::MissingDot(marker));
        }
        self.guilds.insert(guild_id, GuildConfig { marker, reward_channel });
        Ok(())
    }

    /// A guild's configuration, if `setup` has run there.
    pub fn config(&self, guild_id: u64) -> Option<&GuildConfig> {
        self.guilds.get(&guild_id)
    }

    /// A member's last-known status, if one was ever observed.
    pub fn status(&self, member_id: u64) -> Option<&str> {
        self.statuses.get(&member_id).map(String::as_str)
    }

    /// Clears a member's cooldown, reporting whether one existed.
    pub fn reset_cooldown(&mut self, member_id: u64) -> bool {
        self.cooldowns.remove(&member_id).is_some()
    }

    /// Bumps a guild's reward tally by one, once a reward has actually
    /// been dispatched.
    pub fn record_reward(&mut self, guild_id: u64) {
        *self.rewards.entry(guild_id).or_insert(0) += 1;
    }

    /// Rewards granted in a guild since the process started.
    pub fn rewards(&self, guild_id: u64) -> u64 {
        self.rewards.get(&guild_id).copied().unwrap_or(0)
    }

    /// How many tracked members currently carry the guild's marker.
    ///
    /// Zero when the guild is unconfigured, since there is no marker to
    /// carry.
    pub fn repping(&self, guild_id: u64) -> usize {
        let Some(config) = self.guilds.get(&guild_id) else {
            return 0;
        };
        self.statuses
            .values()
            .filter(|status| contains_fold(status, &config.marker))
            .count()
    }
}
