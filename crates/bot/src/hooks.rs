//! Holds event hooks for the bot.

use std::collections::HashSet;
use serenity::all::{Message, StandardFramework, UserId};
use serenity::framework::standard::macros::hook;
use serenity::framework::standard::{CommandError, Configuration, DispatchError};
use serenity::prelude::*;
use crate::groups;
use crate::structures::Config;

#[hook]
async fn after(
    _ctx: &Context,
    _message: &Message,
    cmd_name: &str,
    error: Result<(), CommandError>
) {
    if let Err(err) = error {
        tracing::error!("command '{cmd_name}' failed: {err}");
    }
}

#[hook]
async fn before(_ctx: &Context, msg: &Message, command_name: &str) -> bool {
    tracing::debug!("got command '{}' from '{}'", command_name, msg.author.name);

    true // if `before` returns false, command processing doesn't happen.
}

#[hook]
async fn dispatch_error(ctx: &Context, msg: &Message, error: DispatchError, _command_name: &str) {
    if let DispatchError::LackingPermissions(_) = error {
        if let Err(err) = msg
            .reply(ctx, "You need Administrator permissions to use this command.")
            .await
        {
            tracing::error!("failed to send the permission denial: {err}");
        }
    }
}

/// Sets up the given framework for the bot.
pub fn setup_framework(config: Config, owners: HashSet<UserId>) -> StandardFramework {
    let framework = StandardFramework::new()
        .after(after)
        .before(before)
        .on_dispatch_error(dispatch_error)
        .group(&groups::admin::ADMIN_GROUP);
    framework.configure(
        Configuration::new()
            .with_whitespace(true)
            .prefixes(config.prefixes)
            .owners(owners)
    );
    framework
}
