//! Messaging-platform seam.
//!
//! The relay core only ever sees inbound messages as [`IncomingMessage`] and
//! talks back through [`ChannelOutbound`]. Platform crates (Telegram) do the
//! translation in both directions.

pub mod error;
pub mod plugin;

pub use {
    error::{Error, Result},
    plugin::{ChannelAttachment, ChannelOutbound, ChannelReplyTarget, IncomingMessage},
};
