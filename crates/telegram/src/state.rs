use std::sync::Arc;

use gembot_relay::{CommandDispatcher, Relay};

use crate::{bot::BotIdentity, media_group::MediaGroups};

/// Everything a message handler needs, shared by all in-flight handlers.
pub struct BotContext {
    pub bot: teloxide::Bot,
    pub identity: BotIdentity,
    pub relay: Arc<Relay>,
    pub commands: Arc<CommandDispatcher>,
    pub media_groups: MediaGroups,
}
