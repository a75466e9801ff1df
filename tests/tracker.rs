use chrono::{DateTime, Duration, TimeZone, Utc};

use repwatch::structures::{ConfigError, Decision};
use repwatch::tracker::{contains_fold, cooldown_window, StatusTracker};

static MARKER: &str = "example.gg";

const GUILD: u64 = 1;
const CHANNEL: u64 = 42;
const ALICE: u64 = 100;
const BOB: u64 = 101;

fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 1, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn configured() -> StatusTracker {
    let mut tracker = StatusTracker::new();
    tracker
        .configure(GUILD, MARKER.to_owned(), CHANNEL)
        .expect("marker has a dot in it");
    tracker
}

#[test]
fn first_transition_rewards() {
    let mut tracker = configured();
    assert_eq!(
        tracker.observe(GUILD, ALICE, "playing example.gg", at(0)),
        Decision::Reward
    );
    assert_eq!(tracker.status(ALICE), Some("playing example.gg"));
}

#[test]
fn identical_status_is_not_an_event() {
    let mut tracker = configured();
    tracker.observe(GUILD, ALICE, "playing example.gg", at(0));
    // The gateway loves repeating itself; same text must change nothing
    assert_eq!(
        tracker.observe(GUILD, ALICE, "playing example.gg", at(1)),
        Decision::Skip
    );
    assert_eq!(tracker.status(ALICE), Some("playing example.gg"));
}

#[test]
fn unseen_member_with_empty_status_gets_no_ledger_record() {
    let mut tracker = configured();
    assert_eq!(tracker.observe(GUILD, ALICE, "", at(0)), Decision::Skip);
    assert_eq!(tracker.status(ALICE), None);
}

#[test]
fn only_the_rising_edge_rewards() {
    let mut tracker = configured();
    assert_eq!(tracker.observe(GUILD, ALICE, "foo", at(0)), Decision::Skip);
    assert_eq!(
        tracker.observe(GUILD, ALICE, "foo example.gg", at(1)),
        Decision::Reward
    );
    // Still carrying the marker: level, not edge, so nothing fires
    assert_eq!(
        tracker.observe(GUILD, ALICE, "foo example.gg again", at(2)),
        Decision::Skip
    );
}

#[test]
fn dropping_the_marker_is_not_a_reward() {
    let mut tracker = configured();
    tracker.observe(GUILD, ALICE, "on example.gg", at(0));
    assert_eq!(tracker.observe(GUILD, ALICE, "gone", at(1)), Decision::Skip);
}

#[test]
fn containment_is_case_folded() {
    let mut tracker = configured();
    assert_eq!(
        tracker.observe(GUILD, BOB, "JOIN EXAMPLE.GG TODAY", at(0)),
        Decision::Reward
    );
    assert!(contains_fold("JOIN EXAMPLE.GG TODAY", MARKER));
}

#[test]
fn unconfigured_guild_still_tracks_but_never_rewards() {
    let mut tracker = StatusTracker::new();
    assert_eq!(
        tracker.observe(GUILD, ALICE, "playing example.gg", at(0)),
        Decision::Skip
    );
    // The ledger is updated regardless of configuration
    assert_eq!(tracker.status(ALICE), Some("playing example.gg"));
}

#[test]
fn cooldown_suppresses_within_a_day() {
    let mut tracker = configured();
    assert_eq!(
        tracker.observe(GUILD, ALICE, "example.gg", at(0)),
        Decision::Reward
    );
    tracker.observe(GUILD, ALICE, "something else", at(1));
    // A second qualifying transition 23 hours in: suppressed
    assert_eq!(
        tracker.observe(GUILD, ALICE, "back on example.gg", at(23)),
        Decision::OnCooldown
    );
}

#[test]
fn cooldown_expires_after_a_day() {
    let mut tracker = configured();
    let start = at(0);
    tracker.observe(GUILD, ALICE, "example.gg", start);
    tracker.observe(GUILD, ALICE, "something else", at(1));
    assert_eq!(
        tracker.observe(
            GUILD,
            ALICE,
            "back on example.gg",
            start + cooldown_window()
        ),
        Decision::Reward
    );
}

#[test]
fn suppressed_decision_does_not_refresh_the_cooldown() {
    let mut tracker = configured();
    let start = at(0);
    tracker.observe(GUILD, ALICE, "example.gg", start);
    tracker.observe(GUILD, ALICE, "off", at(12));
    assert_eq!(
        tracker.observe(GUILD, ALICE, "example.gg again", at(13)),
        Decision::OnCooldown
    );
    tracker.observe(GUILD, ALICE, "off again", at(20));
    // The clock still runs from the original reward, not the suppressed
    // attempt, so a day after the first reward we're eligible again
    assert_eq!(
        tracker.observe(
            GUILD,
            ALICE,
            "example.gg thrice",
            start + cooldown_window() + Duration::hours(1)
        ),
        Decision::Reward
    );
}

#[test]
fn reset_cooldown_makes_a_member_eligible_again() {
    let mut tracker = configured();
    tracker.observe(GUILD, ALICE, "example.gg", at(0));
    tracker.observe(GUILD, ALICE, "off", at(1));
    assert!(tracker.reset_cooldown(ALICE));
    assert_eq!(
        tracker.observe(GUILD, ALICE, "example.gg once more", at(2)),
        Decision::Reward
    );
}

#[test]
fn reset_cooldown_without_a_record_is_a_quiet_no_op() {
    let mut tracker = configured();
    assert!(!tracker.reset_cooldown(ALICE));
}

#[test]
fn markers_without_a_dot_are_rejected() {
    let mut tracker = StatusTracker::new();
    assert_eq!(
        tracker.configure(GUILD, "novanity".to_owned(), CHANNEL),
        Err(ConfigError::MissingDot("novanity".to_owned()))
    );
    // Rejection leaves the guild unconfigured
    assert!(tracker.config(GUILD).is_none());
}

#[test]
fn setup_overwrites_previous_configuration() {
    let mut tracker = configured();
    tracker
        .configure(GUILD, "other.net".to_owned(), CHANNEL + 1)
        .expect("marker has a dot in it");
    let config = tracker.config(GUILD).expect("guild was configured");
    assert_eq!(config.marker, "other.net");
    assert_eq!(config.reward_channel, CHANNEL + 1);
}

#[test]
fn reward_counter_counts_per_guild() {
    let mut tracker = configured();
    assert_eq!(tracker.rewards(GUILD), 0);
    tracker.record_reward(GUILD);
    tracker.record_reward(GUILD);
    assert_eq!(tracker.rewards(GUILD), 2);
    assert_eq!(tracker.rewards(GUILD + 1), 0);
}

#[test]
fn repping_counts_tracked_members_carrying_the_marker() {
    let mut tracker = configured();
    tracker.observe(GUILD, ALICE, "playing example.gg", at(0));
    tracker.observe(GUILD, BOB, "asleep", at(0));
    assert_eq!(tracker.repping(GUILD), 1);
    // Unconfigured guilds have no marker to carry
    assert_eq!(tracker.repping(GUILD + 1), 0);
}
