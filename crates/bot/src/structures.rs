//! Hold data structures for use in the bot.

use std::env::VarError;
use displaydoc::Display;
use thiserror::Error;
use serde::Deserialize;

#[derive(Debug, Display, Error)]
/// Different things that can go wrong when initializing the bot.
pub enum InitError {
    #[displaydoc("DISCORD_TOKEN is not set: {0}")]
    /// The bot token environment variable is not set
    TokenMissing(#[from] VarError),
    #[displaydoc("serenity error: {0}")]
    /// Serenity error
    Serenity(#[from] serenity::Error),
    #[displaydoc("failed to read config file: {0}")]
    /// Failed to read the config file
    ConfigRead(#[from] std::io::Error),
    #[displaydoc("failed to deserialize config file: {0}")]
    /// Failed to deserialize the config file
    ConfigParse(#[from] toml::de::Error)
}

/// Bot configuration, read from `repwatch.toml` when present.
#[derive(Deserialize, Clone, Debug)]
#[serde(default)]
pub struct Config {
    /// Prefixes that mark a message as a command.
    pub prefixes: Vec<String>
}

impl Default for Config {
    fn default() -> Self {
        Self { prefixes: vec!["!".to_owned()] }
    }
}
