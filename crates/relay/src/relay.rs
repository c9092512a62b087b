use std::{fmt, sync::Arc};

use {
    futures::future::join_all,
    gembot_channels::{ChannelAttachment, ChannelOutbound, IncomingMessage},
    gembot_gemini::Part,
    tracing::{debug, error, info, warn},
};

use crate::{
    chunk::{MAX_CHUNK_CHARS, chunk_message},
    classify::is_supported_media_type,
    session::SessionManager,
    uploader::{MediaUploader, UploadedReference},
};

/// Sent when the model answered with no text at all.
pub const EMPTY_REPLY_NOTICE: &str = "I couldn't generate a response.";

/// Chat notice for a failed provider call, cut to fit one message.
#[must_use]
pub fn error_notice(err: &impl fmt::Display) -> String {
    let mut notice = format!("Sorry, an error occurred: {err}");
    if let Some((end, _)) = notice.char_indices().nth(MAX_CHUNK_CHARS) {
        notice.truncate(end);
    }
    notice
}

/// One element of an outgoing turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversationPart {
    Text(String),
    File(UploadedReference),
}

impl From<ConversationPart> for Part {
    fn from(part: ConversationPart) -> Self {
        match part {
            ConversationPart::Text(text) => Part::text(text),
            ConversationPart::File(file) => file.to_part(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IgnoreReason {
    /// Authored by the bot itself.
    OwnMessage,
    /// No text and no usable attachment.
    NoContent,
}

/// What [`Relay::handle`] did with a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelayOutcome {
    Ignored(IgnoreReason),
    /// The reply went out in `chunks` messages.
    Replied { chunks: usize },
    /// The model returned no text; the fallback notice was sent.
    EmptyReply,
    /// The provider call failed; an error notice was sent.
    ProviderFailed,
}

/// Relays one chat message to Gemini and the answer back.
pub struct Relay {
    self_id: String,
    sessions: Arc<SessionManager>,
    uploader: MediaUploader,
    outbound: Arc<dyn ChannelOutbound>,
}

impl Relay {
    pub fn new(
        self_id: impl Into<String>,
        sessions: Arc<SessionManager>,
        uploader: MediaUploader,
        outbound: Arc<dyn ChannelOutbound>,
    ) -> Self {
        Self {
            self_id: self_id.into(),
            sessions,
            uploader,
            outbound,
        }
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    /// Handle one inbound message end to end. Never fails: every error is
    /// logged here, and provider errors are also reported into the chat.
    pub async fn handle(&self, message: IncomingMessage) -> RelayOutcome {
        let chat_id = message.chat_id.as_str();

        if message.sender_id == self.self_id {
            debug!(chat_id, "ignoring own message");
            return RelayOutcome::Ignored(IgnoreReason::OwnMessage);
        }

        let parts = self.collect_parts(&message).await;
        if parts.is_empty() {
            debug!(chat_id, attachments = message.attachments.len(), "nothing to send");
            return RelayOutcome::Ignored(IgnoreReason::NoContent);
        }

        if let Err(e) = self.outbound.send_typing(chat_id).await {
            debug!(chat_id, error = %e, "typing indicator failed");
        }

        info!(
            chat_id,
            sender_id = %message.sender_id,
            parts = parts.len(),
            "relaying message to gemini"
        );

        let turn: Vec<Part> = parts.into_iter().map(Part::from).collect();
        let response = match self.sessions.send(turn).await {
            Ok(response) => response,
            Err(e) => {
                error!(chat_id, error = %e, "gemini request failed");
                self.deliver(chat_id, &error_notice(&e)).await;
                return RelayOutcome::ProviderFailed;
            },
        };

        let reply = response.text();
        if reply.is_empty() {
            warn!(chat_id, "gemini returned no text");
            self.deliver(chat_id, EMPTY_REPLY_NOTICE).await;
            return RelayOutcome::EmptyReply;
        }

        let chunks = chunk_message(&reply, MAX_CHUNK_CHARS);
        for chunk in &chunks {
            self.deliver(chat_id, chunk).await;
        }
        debug!(chat_id, chunks = chunks.len(), reply_len = reply.len(), "reply sent");

        RelayOutcome::Replied {
            chunks: chunks.len(),
        }
    }

    /// Build the turn: uploaded attachments in message order, then the text.
    ///
    /// Unsupported or failed attachments are dropped. Uploads run
    /// concurrently; `join_all` keeps their order.
    pub async fn collect_parts(&self, message: &IncomingMessage) -> Vec<ConversationPart> {
        let uploads = message
            .attachments
            .iter()
            .filter(|attachment| {
                let supported = is_supported_media_type(&attachment.media_type);
                if !supported {
                    debug!(
                        file_name = %attachment.file_name,
                        media_type = %attachment.media_type,
                        "skipping unsupported attachment"
                    );
                }
                supported
            })
            .map(|attachment| self.upload_one(&message.chat_id, attachment));

        let mut parts: Vec<ConversationPart> = join_all(uploads)
            .await
            .into_iter()
            .flatten()
            .map(ConversationPart::File)
            .collect();

        if !message.text.is_empty() {
            parts.push(ConversationPart::Text(message.text.clone()));
        }
        parts
    }

    async fn upload_one(
        &self,
        chat_id: &str,
        attachment: &ChannelAttachment,
    ) -> Option<UploadedReference> {
        match self.uploader.upload(attachment).await {
            Ok(reference) => Some(reference),
            Err(e) => {
                warn!(
                    chat_id,
                    file_name = %attachment.file_name,
                    error = %e,
                    "dropping attachment"
                );
                None
            },
        }
    }

    async fn deliver(&self, chat_id: &str, text: &str) {
        if let Err(e) = self.outbound.send_text(chat_id, text).await {
            warn!(chat_id, error = %e, "failed to send message");
        }
    }
}
