use async_trait::async_trait;

use crate::Result;

// ── Inbound ─────────────────────────────────────────────────────────────────

/// A file attached to an inbound message, as declared by the platform.
#[derive(Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChannelAttachment {
    /// Direct download URL. May embed platform credentials, so it is never
    /// logged or printed by `Debug`.
    pub url: String,
    /// Declared media type, e.g. `image/png`. Not validated.
    pub media_type: String,
    /// Display name shown to the provider on upload.
    pub file_name: String,
}

impl ChannelAttachment {
    pub fn new(
        url: impl Into<String>,
        media_type: impl Into<String>,
        file_name: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            media_type: media_type.into(),
            file_name: file_name.into(),
        }
    }
}

impl std::fmt::Debug for ChannelAttachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChannelAttachment")
            .field("url", &"[REDACTED]")
            .field("media_type", &self.media_type)
            .field("file_name", &self.file_name)
            .finish()
    }
}

/// One inbound chat message, normalized across platforms.
///
/// Lives only for the duration of a single relay invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct IncomingMessage {
    /// Platform user id of the author.
    pub sender_id: String,
    /// Chat/channel the message was posted in; replies go back here.
    pub chat_id: String,
    /// Platform message id, when the platform has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    /// Text body (or caption). Possibly empty.
    #[serde(default)]
    pub text: String,
    /// Attachments in the order the platform delivered them.
    #[serde(default)]
    pub attachments: Vec<ChannelAttachment>,
}

/// Where to send a response back.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ChannelReplyTarget {
    /// Chat/peer ID to send the reply to.
    pub chat_id: String,
    /// Message being answered, if the platform supports threaded replies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
}

// ── Outbound ────────────────────────────────────────────────────────────────

/// Send messages to a channel.
///
/// Implementations send exactly what they are given; splitting long text is
/// the caller's job.
#[async_trait]
pub trait ChannelOutbound: Send + Sync {
    /// Send one text message to a chat.
    async fn send_text(&self, to: &str, text: &str) -> Result<()>;

    /// Send a "typing" indicator. No-op by default.
    async fn send_typing(&self, _to: &str) -> Result<()> {
        Ok(())
    }

    /// Answer a specific message (e.g. a command invocation). Falls back to a
    /// plain send into the same chat.
    async fn send_reply(&self, target: &ChannelReplyTarget, text: &str) -> Result<()> {
        self.send_text(&target.chat_id, text).await
    }
}
