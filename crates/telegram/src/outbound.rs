use {
    async_trait::async_trait,
    gembot_channels::{ChannelOutbound, ChannelReplyTarget, Error as ChannelError, Result},
    teloxide::{
        payloads::SendMessageSetters,
        prelude::*,
        types::{ChatAction, ChatId, MessageId, ReplyParameters},
    },
    tracing::debug,
};

/// Outbound message sender for Telegram.
///
/// Text goes out verbatim with no parse mode, since model output is arbitrary
/// Markdown that Telegram's parsers would reject.
#[derive(Clone)]
pub struct TelegramOutbound {
    bot: Bot,
}

impl TelegramOutbound {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Sends exactly once. A `RetryAfter` from Telegram surfaces as an error.
    async fn send_message(
        &self,
        to: &str,
        text: &str,
        reply_params: Option<ReplyParameters>,
    ) -> Result<()> {
        let chat_id = parse_chat_id(to)?;
        let mut req = self.bot.send_message(chat_id, text);
        if let Some(rp) = reply_params {
            req = req.reply_parameters(rp);
        }
        req.await
            .map_err(|e| ChannelError::external("telegram send message", e))?;

        debug!(chat_id = to, text_len = text.len(), "telegram message sent");
        Ok(())
    }
}

pub(crate) fn parse_chat_id(to: &str) -> Result<ChatId> {
    to.parse::<i64>()
        .map(ChatId)
        .map_err(|_| ChannelError::invalid_input(format!("not a telegram chat id: {to:?}")))
}

/// Parse a platform message ID string into Telegram `ReplyParameters`.
/// Returns `None` if the string is not a valid i32 (Telegram message IDs are i32).
fn parse_reply_params(reply_to: Option<&str>) -> Option<ReplyParameters> {
    reply_to
        .and_then(|id| id.parse::<i32>().ok())
        .map(|id| ReplyParameters::new(MessageId(id)).allow_sending_without_reply())
}

#[async_trait]
impl ChannelOutbound for TelegramOutbound {
    async fn send_text(&self, to: &str, text: &str) -> Result<()> {
        self.send_message(to, text, None).await
    }

    async fn send_typing(&self, to: &str) -> Result<()> {
        let chat_id = parse_chat_id(to)?;
        self.bot
            .send_chat_action(chat_id, ChatAction::Typing)
            .await
            .map_err(|e| ChannelError::external("telegram typing", e))?;
        Ok(())
    }

    async fn send_reply(&self, target: &ChannelReplyTarget, text: &str) -> Result<()> {
        let rp = parse_reply_params(target.message_id.as_deref());
        self.send_message(&target.chat_id, text, rp).await
    }
}
