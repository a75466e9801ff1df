use async_trait::async_trait;
use chrono::Utc;
use serenity::all::{ActivityData, ActivityType, Presence, Ready};
use serenity::prelude::*;

use repwatch::structures::Decision;

use crate::dispatch;
use crate::type_map;

pub struct Handler;

#[async_trait]
impl EventHandler for Handler {
    async fn ready(&self, ctx: Context, ready: Ready) {
        ctx.set_activity(Some(ActivityData::watching("your statuses")));
        tracing::info!("{} is connected!", ready.user.name);
    }

    /// Feeds every presence change through the tracker, and dispatches
    /// the reward when one fires.
    async fn presence_update(&self, ctx: Context, new_data: Presence) {
        // DMs have no guild and bots don't get rewarded
        let Some(guild_id) = new_data.guild_id else {
            return;
        };
        if new_data.user.bot.unwrap_or(false) {
            return;
        }

        let member_id = new_data.user.id;
        let status = custom_status(&new_data);

        let tracker = type_map::tracker(&ctx).await;
        // One write lock around the whole decision; the reward itself
        // runs outside it so a slow network call can't block other
        // observations
        let (decision, config) = {
            let mut tracker = tracker.write().await;
            let decision = tracker.observe(guild_id.get(), member_id.get(), &status, Utc::now());
            (decision, tracker.config(guild_id.get()).cloned())
        };

        match decision {
            Decision::Skip => {}
            Decision::OnCooldown => {
                tracing::info!("member {member_id} is on cooldown, no reward");
            }
            Decision::Reward => {
                let Some(config) = config else {
                    // Reward is only decided for configured guilds
                    return;
                };
                if let Err(err) =
                    dispatch::reward(&ctx, guild_id, member_id, &config, &status, &tracker).await
                {
                    tracing::error!("failed to reward member {member_id}: {err}");
                }
            }
        }
    }
}

/// Pulls the custom-status text out of a presence, `""` when unset.
fn custom_status(presence: &Presence) -> String {
    presence
        .activities
        .iter()
        .find(|activity| activity.kind == ActivityType::Custom)
        .and_then(|activity| activity.state.clone())
        .unwrap_or_default()
}
