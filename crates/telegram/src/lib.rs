//! Telegram front end for the Gemini relay.
//!
//! Connects with teloxide, registers the `/clear` command, long-polls for
//! messages and turns each one into an [`gembot_channels::IncomingMessage`]
//! (or a command) for the relay.

pub mod bot;
pub mod config;
pub mod error;
pub mod handlers;
pub mod media_group;
pub mod outbound;
pub mod state;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
pub(crate) mod test_support;

pub use {
    bot::{BotIdentity, connect, start_polling},
    config::TelegramConfig,
    error::{Error, Result},
    handlers::Handled,
    media_group::{MEDIA_GROUP_WINDOW, MediaGroups},
    outbound::TelegramOutbound,
    state::BotContext,
};
