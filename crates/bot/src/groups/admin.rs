//! Administrator commands for configuring and inspecting the tracker.

use std::time::Duration;

use serenity::all::{
    ChannelId, Colour, CreateEmbed, CreateMessage, Message, Timestamp, UserId
};
use serenity::framework::standard::macros::{command, group};
use serenity::framework::standard::{Args, CommandResult};
use serenity::prelude::*;
use serenity::utils::{parse_channel_mention, parse_user_mention};

use repwatch::tracker::contains_fold;

use crate::type_map::{self, StartedTime};

#[group]
#[only_in(guilds)]
#[required_permissions(ADMINISTRATOR)]
#[commands(setup, setstatus, stats, checkstatus, resetcooldown)]
pub struct Admin;

/// Accepts either a `<#id>` mention or a raw channel id.
fn parse_channel(arg: &str) -> Option<ChannelId> {
    parse_channel_mention(arg).or_else(|| arg.parse().ok())
}

/// Accepts either a `<@id>` mention or a raw user id.
fn parse_user(arg: &str) -> Option<UserId> {
    parse_user_mention(arg).or_else(|| arg.parse().ok())
}

/// Replies to a message with a single embed.
async fn reply_embed(ctx: &Context, msg: &Message, embed: CreateEmbed) -> CommandResult {
    msg.channel_id
        .send_message(
            &ctx.http,
            CreateMessage::new().embed(embed).reference_message(msg)
        )
        .await?;
    Ok(())
}

#[command]
/// Configures the guild's vanity marker and reward channel.
async fn setup(ctx: &Context, msg: &Message, mut args: Args) -> CommandResult {
    let Some(guild_id) = msg.guild_id else {
        return Ok(());
    };
    if args.len() < 2 {
        msg.reply(ctx, "Usage: `setup <marker> <#channel>`").await?;
        return Ok(());
    }
    let marker = args.single::<String>()?;
    let channel_arg = args.single::<String>()?;

    let Some(channel_id) = parse_channel(&channel_arg) else {
        msg.reply(ctx, "That doesn't look like a channel.").await?;
        return Ok(());
    };
    // The reward channel has to live in this guild
    let in_guild = ctx
        .cache
        .guild(guild_id)
        .is_some_and(|guild| guild.channels.contains_key(&channel_id));
    if !in_guild {
        msg.reply(ctx, "That channel isn't in this guild.").await?;
        return Ok(());
    }

    let tracker = type_map::tracker(ctx).await;
    let configured = tracker
        .write()
        .await
        .configure(guild_id.get(), marker.clone(), channel_id.get());
    if let Err(err) = configured {
        msg.reply(ctx, format!("{err}")).await?;
        return Ok(());
    }

    let embed = CreateEmbed::new()
        .colour(Colour(0x00FF00))
        .title("Setup complete")
        .field("Marker", format!("`{marker}`"), false)
        .field("Reward channel", format!("<#{channel_id}>"), false)
        .timestamp(Timestamp::now());
    reply_embed(ctx, msg, embed).await
}

#[command]
/// Tells administrators what to ask their members to do. Changes
/// nothing.
async fn setstatus(ctx: &Context, msg: &Message, args: Args) -> CommandResult {
    let Some(guild_id) = msg.guild_id else {
        return Ok(());
    };
    if args.is_empty() {
        msg.reply(ctx, "Usage: `setstatus <text>`").await?;
        return Ok(());
    }

    let tracker = type_map::tracker(ctx).await;
    let marker = tracker
        .read()
        .await
        .config(guild_id.get())
        .map(|config| config.marker.clone())
        .unwrap_or_else(|| "your-vanity".to_owned());
    msg.reply(
        ctx,
        format!("Statuses are set by members themselves. Ask them to put `{marker}` in their custom status.")
    )
    .await?;
    Ok(())
}

#[command]
/// Reports the marker, reward tally, repping member count, and uptime.
async fn stats(ctx: &Context, msg: &Message) -> CommandResult {
    let Some(guild_id) = msg.guild_id else {
        return Ok(());
    };

    let tracker = type_map::tracker(ctx).await;
    let (marker, rewards, repping) = {
        let tracker = tracker.read().await;
        (
            tracker
                .config(guild_id.get())
                .map(|config| config.marker.clone()),
            tracker.rewards(guild_id.get()),
            tracker.repping(guild_id.get())
        )
    };
    let uptime = {
        let data = ctx.data.read().await;
        data.get::<StartedTime>()
            .expect("start time missing from client data")
            .elapsed()
    };

    let embed = CreateEmbed::new()
        .colour(Colour(0x0099FF))
        .title("📊 Stats")
        .field("Marker", marker.unwrap_or_else(|| "Not set".to_owned()), false)
        .field("Rewards given", rewards.to_string(), false)
        .field("Members repping", repping.to_string(), false)
        .field("Uptime", format_uptime(uptime), false)
        .timestamp(Timestamp::now());
    reply_embed(ctx, msg, embed).await
}

#[command]
/// Shows a member's last-known status and whether it carries the
/// marker.
async fn checkstatus(ctx: &Context, msg: &Message, mut args: Args) -> CommandResult {
    let Some(guild_id) = msg.guild_id else {
        return Ok(());
    };
    let Some(user_id) = args.single::<String>().ok().as_deref().and_then(parse_user) else {
        msg.reply(ctx, "Usage: `checkstatus <@member>`").await?;
        return Ok(());
    };
    let Ok(member) = guild_id.member(ctx, user_id).await else {
        msg.reply(ctx, "No such member here.").await?;
        return Ok(());
    };

    let tracker = type_map::tracker(ctx).await;
    let (status, has_marker) = {
        let tracker = tracker.read().await;
        let status = tracker.status(user_id.get()).unwrap_or("").to_owned();
        let has_marker = tracker
            .config(guild_id.get())
            .is_some_and(|config| contains_fold(&status, &config.marker));
        (status, has_marker)
    };
    let display = if status.is_empty() {
        "No status tracked".to_owned()
    } else {
        status
    };

    let embed = CreateEmbed::new()
        .colour(if has_marker { Colour(0x00FF00) } else { Colour(0xFF0000) })
        .title(format!("{} status check", member.user.name))
        .field("Current status", display, false)
        .field("Has marker", if has_marker { "✅ Yes" } else { "❌ No" }, false)
        .timestamp(Timestamp::now());
    reply_embed(ctx, msg, embed).await
}

#[command]
/// Clears a member's reward cooldown. Succeeds whether or not one
/// existed.
async fn resetcooldown(ctx: &Context, msg: &Message, mut args: Args) -> CommandResult {
    let Some(user_id) = args.single::<String>().ok().as_deref().and_then(parse_user) else {
        msg.reply(ctx, "Usage: `resetcooldown <@member>`").await?;
        return Ok(());
    };

    let tracker = type_map::tracker(ctx).await;
    tracker.write().await.reset_cooldown(user_id.get());
    msg.reply(ctx, format!("Cooldown reset for <@{user_id}>.")).await?;
    Ok(())
}

/// Renders an uptime as `1d 2h 3m`.
fn format_uptime(uptime: Duration) -> String {
    let secs = uptime.as_secs();
    format!("{}d {}h {}m", secs / 86_400, secs % 86_400 / 3600, secs % 3600 / 60)
}
