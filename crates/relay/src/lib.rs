//! Message-to-completion relay.
//!
//! One inbound chat message becomes one Gemini turn: eligible attachments are
//! downloaded, pushed through the File API and polled until ready, the text
//! is appended, the turn goes to the single shared session, and the reply is
//! split into transport-sized chunks. The `/clear` command resets the session.

pub mod chunk;
pub mod classify;
pub mod commands;
pub mod error;
pub mod relay;
pub mod session;
pub mod uploader;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
pub(crate) mod test_support;

pub use {
    chunk::{MAX_CHUNK_CHARS, chunk_message},
    classify::is_supported_media_type,
    commands::{CLEAR_CONFIRMATION, Command, CommandDispatcher},
    error::{Error, Result},
    relay::{ConversationPart, EMPTY_REPLY_NOTICE, IgnoreReason, Relay, RelayOutcome},
    session::{MODEL, SessionManager, default_safety_settings, default_session_config},
    uploader::{MediaUploader, PollPolicy, UploadedReference},
};
