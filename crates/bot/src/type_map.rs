use std::sync::Arc;
use std::time::Instant;
use serenity::all::CurrentUser;
use serenity::prelude::{Context, TypeMapKey};
use tokio::sync::RwLock;
use repwatch::tracker::StatusTracker;

/// The shared tracker. One lock around the whole thing keeps mutations
/// serialized, which is the closest a multithreaded runtime gets to a
/// run-to-completion event model.
pub struct Tracker;

impl TypeMapKey for Tracker {
    type Value = Arc<RwLock<StatusTracker>>;
}

pub struct StartedTime;

impl TypeMapKey for StartedTime {
    type Value = Instant;
}

pub struct BotUser;

impl TypeMapKey for BotUser {
    type Value = CurrentUser;
}

/// Clones the tracker handle out of the client data.
///
/// The tracker is inserted before the client starts, so a miss here is
/// a wiring bug, not a runtime condition.
pub async fn tracker(ctx: &Context) -> Arc<RwLock<StatusTracker>> {
    let data = ctx.data.read().await;
    data.get::<Tracker>()
        .expect("tracker missing from client data")
        .clone()
}
