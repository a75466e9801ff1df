//! This module handles nearly everything with the discord bot.

use std::{
    collections::HashSet,
    env,
    fs,
    path::Path,
    sync::Arc,
    time::Instant
};
use serenity::all::{GatewayIntents, Http};
use serenity::Client;
use tokio::sync::RwLock;

use repwatch::tracker::StatusTracker;

use crate::structures::{Config, InitError};
use crate::handler;
use crate::hooks;
use crate::type_map::{BotUser, StartedTime, Tracker};

/// Initializes the bot, without starting it.
///
/// The token comes from the `DISCORD_TOKEN` environment variable; a
/// missing token is the one fatal startup condition. The config file is
/// optional, and falls back to the defaults when absent.
///
/// # Errors
/// Will return an error if initialization fails. See [`InitError`].
pub async fn init(config_path: impl AsRef<Path>) -> Result<Client, InitError> {
    let token = env::var("DISCORD_TOKEN")?;

    // Read the configuration
    let config = match fs::read_to_string(config_path) {
        Ok(raw) => toml::from_str(&raw)?,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Config::default(),
        Err(err) => return Err(err.into())
    };

    let http = Http::new(&token);

    // Get the owners and user
    let (owners, bot_user) = {
        let info = http.get_current_application_info().await?;
        let mut owners = HashSet::new();
        if let Some(team) = info.team {
            owners.insert(team.owner_user_id);
        } else if let Some(owner) = &info.owner {
            owners.insert(owner.id);
        }
        let bot_user = http.get_current_user().await?;
        (owners, bot_user)
    };

    let framework = hooks::setup_framework(config, owners);
    // Only ask for what we need; presences and members are privileged
    // and have to be enabled in the developer portal
    let intents =
        GatewayIntents::GUILDS |
        GatewayIntents::GUILD_MEMBERS |
        GatewayIntents::GUILD_PRESENCES |
        GatewayIntents::GUILD_MESSAGES |
        GatewayIntents::MESSAGE_CONTENT;

    // Build the client
    let client = Client::builder(&token, intents)
        .event_handler(handler::Handler)
        .framework(framework)
        // Set up extra data
        .type_map_insert::<Tracker>(Arc::new(RwLock::new(StatusTracker::new())))
        .type_map_insert::<BotUser>(bot_user)
        .type_map_insert::<StartedTime>(Instant::now())
        // Finish
        .await?;

    Ok(client)
}
