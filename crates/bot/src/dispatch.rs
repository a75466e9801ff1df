//! Handles the externally visible half of a reward: the role, the
//! announcement, and the tally.

use std::sync::Arc;
use async_trait::async_trait;
use displaydoc::Display;
use serenity::all::{
    ChannelId, Colour, Context, CreateEmbed, CreateEmbedFooter, CreateMessage, EditRole, GuildId,
    Member, Mentionable, Permissions, RoleId, Timestamp, UserId
};
use thiserror::Error;
use tokio::sync::RwLock;

use repwatch::structures::GuildConfig;
use repwatch::tracker::StatusTracker;

use crate::type_map::BotUser;

/// Name of the shared role rewarded members receive.
const REWARD_ROLE: &str = "Image Permissions";

/// Embed accent for reward announcements.
const REWARD_GREEN: Colour = Colour(0x00FF00);

#[derive(Debug, Display, Error)]
/// Ways dispatching a reward can fall over. All of these get logged and
/// swallowed at the event boundary; none of them crash anything.
pub enum DispatchError {
    #[displaydoc("the configured reward channel no longer exists")]
    /// The configured reward channel no longer exists
    ChannelMissing,
    #[displaydoc("missing send or embed permission in the reward channel")]
    /// Missing send or embed permission in the reward channel
    InsufficientPermission,
    #[displaydoc("the rewarded member is no longer in the guild")]
    /// The rewarded member is no longer in the guild
    MemberMissing,
    #[displaydoc("failed to create the reward role: {0}")]
    /// Failed to create the reward role
    RoleCreationFailed(#[source] serenity::Error),
    #[displaydoc("failed to grant the reward role: {0}")]
    /// Failed to grant the reward role
    RoleGrantFailed(#[source] serenity::Error),
    #[displaydoc("failed to send the announcement: {0}")]
    /// Failed to send the announcement
    SendFailed(#[source] serenity::Error)
}

/// The narrow slice of guild administration a reward needs.
///
/// Dispatch logic talks to this instead of serenity directly, so the
/// step ordering can be exercised with a fake.
#[async_trait]
pub trait RewardTarget {
    /// Whether the configured reward channel still exists in-guild.
    async fn channel_exists(&self) -> bool;
    /// Whether the bot may send embeds into the reward channel.
    async fn can_post(&self) -> bool;
    /// Finds or lazily creates the shared reward role. `None` means the
    /// bot lacks role management and the role steps should be skipped.
    async fn ensure_reward_role(&self) -> Result<Option<RoleId>, DispatchError>;
    /// Grants the role, unless the member already holds it.
    async fn grant_role(&self, role: RoleId) -> Result<(), DispatchError>;
    /// Posts the announcement embed.
    async fn announce(&self, marker: &str, status: &str) -> Result<(), DispatchError>;
}

/// Walks a decided reward through its target, step by step.
///
/// The channel and permission gates abort everything; role trouble gets
/// logged and skipped, so it can't hold the announcement hostage.
async fn run<T: RewardTarget>(target: &T, marker: &str, status: &str) -> Result<(), DispatchError> {
    if !target.channel_exists().await {
        return Err(DispatchError::ChannelMissing);
    }
    if !target.can_post().await {
        return Err(DispatchError::InsufficientPermission);
    }

    match target.ensure_reward_role().await {
        Ok(Some(role)) => {
            if let Err(err) = target.grant_role(role).await {
                tracing::error!("{err}");
            }
        }
        Ok(None) => tracing::warn!("no role management permission, skipping the reward role"),
        Err(err) => tracing::error!("{err}")
    }

    target.announce(marker, status).await
}

/// Rewards a member: role, announcement, tally.
///
/// The tally only moves once the announcement has actually landed.
///
/// # Errors
/// Any [`DispatchError`]; the caller logs it and moves on.
pub async fn reward(
    ctx: &Context,
    guild_id: GuildId,
    member_id: UserId,
    config: &GuildConfig,
    status: &str,
    tracker: &Arc<RwLock<StatusTracker>>
) -> Result<(), DispatchError> {
    let member = guild_id
        .member(ctx, member_id)
        .await
        .map_err(|_| DispatchError::MemberMissing)?;
    let bot_id = {
        let data = ctx.data.read().await;
        data.get::<BotUser>()
            .expect("bot user missing from client data")
            .id
    };
    let target = DiscordTarget {
        ctx,
        guild_id,
        channel_id: ChannelId::new(config.reward_channel),
        member,
        bot_id
    };
    run(&target, &config.marker, status).await?;

    tracker.write().await.record_reward(guild_id.get());
    tracing::info!("rewarded member {member_id} in guild {guild_id}");
    Ok(())
}

/// A live guild, seen through the reward's eyes.
struct DiscordTarget<'a> {
    ctx: &'a Context,
    guild_id: GuildId,
    channel_id: ChannelId,
    member: Member,
    bot_id: UserId
}

#[async_trait]
impl RewardTarget for DiscordTarget<'_> {
    async fn channel_exists(&self) -> bool {
        self.ctx
            .cache
            .guild(self.guild_id)
            .is_some_and(|guild| guild.channels.contains_key(&self.channel_id))
    }

    async fn can_post(&self) -> bool {
        // Fetch our own member first; cache refs can't be held across
        // an await
        let Ok(me) = self.guild_id.member(self.ctx, self.bot_id).await else {
            return false;
        };
        let Some(guild) = self.ctx.cache.guild(self.guild_id) else {
            return false;
        };
        let Some(channel) = guild.channels.get(&self.channel_id) else {
            return false;
        };
        guild
            .user_permissions_in(channel, &me)
            .contains(Permissions::SEND_MESSAGES | Permissions::EMBED_LINKS)
    }

    async fn ensure_reward_role(&self) -> Result<Option<RoleId>, DispatchError> {
        let existing = self.ctx.cache.guild(self.guild_id).and_then(|guild| {
            guild
                .roles
                .values()
                .find(|role| role.name == REWARD_ROLE)
                .map(|role| role.id)
        });
        if existing.is_some() {
            return Ok(existing);
        }

        let me = self
            .guild_id
            .member(self.ctx, self.bot_id)
            .await
            .map_err(DispatchError::RoleCreationFailed)?;
        let manageable = self.ctx.cache.guild(self.guild_id).is_some_and(|guild| {
            guild
                .member_permissions(&me)
                .contains(Permissions::MANAGE_ROLES)
        });
        if !manageable {
            return Ok(None);
        }

        let role = self
            .guild_id
            .create_role(
                &self.ctx.http,
                EditRole::new()
                    .name(REWARD_ROLE)
                    .colour(REWARD_GREEN)
                    .permissions(
                        Permissions::ATTACH_FILES
                            | Permissions::EMBED_LINKS
                            | Permissions::USE_EXTERNAL_EMOJIS
                    )
            )
            .await
            .map_err(DispatchError::RoleCreationFailed)?;
        Ok(Some(role.id))
    }

    async fn grant_role(&self, role: RoleId) -> Result<(), DispatchError> {
        if self.member.roles.contains(&role) {
            // Already held; nothing to grant
            return Ok(());
        }
        self.member
            .add_role(&self.ctx.http, role)
            .await
            .map_err(DispatchError::RoleGrantFailed)
    }

    async fn announce(&self, marker: &str, status: &str) -> Result<(), DispatchError> {
        let user = &self.member.user;
        let embed = CreateEmbed::new()
            .colour(REWARD_GREEN)
            .title("Status Rep Reward! 🎉")
            .description(format!("{} repped **{marker}**!", self.member.mention()))
            .field(
                "Rewards",
                "• Image permissions\n• Embed permissions\n• File upload permissions",
                false
            )
            .field("Current Status", truncate_status(status), false)
            .thumbnail(user.face())
            .timestamp(Timestamp::now())
            .footer(CreateEmbedFooter::new(format!("User ID: {}", user.id)));
        self.channel_id
            .send_message(&self.ctx.http, CreateMessage::new().embed(embed))
            .await
            .map_err(DispatchError::SendFailed)?;
        Ok(())
    }
}

/// Clamps a status to 100 characters for embedding, with an ellipsis
/// when something was cut.
fn truncate_status(status: &str) -> String {
    if status.chars().count() > 100 {
        let clipped: String = status.chars().take(100).collect();
        format!("{clipped}...")
    } else {
        status.to_owned()
    }
}
