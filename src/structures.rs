//! Holds the data structures shared across the tracker.

use displaydoc::Display;
use thiserror::Error;

/// A guild's reward configuration, written by the `setup` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuildConfig {
    /// The vanity marker members must carry in their status text.
    pub marker: String,
    /// The channel reward announcements get posted to.
    pub reward_channel: u64
}

/// What the tracker decided about one status observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Nothing to do: no effective change, no configuration, or no
    /// rising edge into the marker.
    Skip,
    /// The member crossed into the marker, but was rewarded less than a
    /// day ago. Functionally a no-op, split out so callers can log it.
    OnCooldown,
    /// The member crossed into the marker and is eligible. The cooldown
    /// has already been stamped by the time the caller sees this.
    Reward
}

#[derive(Debug, Display, Error, PartialEq, Eq)]
/// Ways a guild configuration can be rejected.
pub enum ConfigError {
    #[displaydoc("`{0}` has no `.` in it, so it can't be a vanity URL")]
    /// The marker has no `.` in it
    MissingDot(String)
}
