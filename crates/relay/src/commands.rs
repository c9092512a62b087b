use std::sync::Arc;

use {
    gembot_channels::{ChannelOutbound, ChannelReplyTarget},
    tracing::{info, warn},
};

use crate::session::SessionManager;

/// Reply to a successful `/clear`.
pub const CLEAR_CONFIRMATION: &str = "Chat history has been cleared!";

/// Slash commands the bot registers with the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Reset the shared conversation.
    Clear,
}

impl Command {
    pub const ALL: &'static [Command] = &[Command::Clear];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Clear => "clear",
        }
    }

    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Clear => "Clear the chat history with Gemini AI",
        }
    }

    /// Look up a command by its bare name (no leading `/`).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }
}

/// Executes commands against the shared session and answers the invoker.
pub struct CommandDispatcher {
    sessions: Arc<SessionManager>,
    outbound: Arc<dyn ChannelOutbound>,
}

impl CommandDispatcher {
    pub fn new(sessions: Arc<SessionManager>, outbound: Arc<dyn ChannelOutbound>) -> Self {
        Self { sessions, outbound }
    }

    pub async fn dispatch(&self, command: Command, target: &ChannelReplyTarget) {
        match command {
            Command::Clear => {
                self.sessions.reset().await;
                info!(chat_id = %target.chat_id, "conversation cleared");
                if let Err(e) = self.outbound.send_reply(target, CLEAR_CONFIRMATION).await {
                    warn!(chat_id = %target.chat_id, error = %e, "failed to confirm clear");
                }
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use {
        super::*,
        crate::test_support::{FakeApi, RecordingOutbound, Sent},
        gembot_gemini::{GenerativeApi, Part},
        rstest::rstest,
    };

    #[rstest]
    #[case("clear", Some(Command::Clear))]
    #[case("Clear", None)]
    #[case("start", None)]
    #[case("", None)]
    fn looks_up_commands_by_name(#[case] name: &str, #[case] expected: Option<Command>) {
        assert_eq!(Command::from_name(name), expected);
    }

    #[test]
    fn clear_is_registered_with_description() {
        assert_eq!(Command::ALL, &[Command::Clear]);
        assert_eq!(Command::Clear.name(), "clear");
        assert_eq!(
            Command::Clear.description(),
            "Clear the chat history with Gemini AI"
        );
    }

    fn target() -> ChannelReplyTarget {
        ChannelReplyTarget {
            chat_id: "42".into(),
            message_id: Some("3".into()),
        }
    }

    #[tokio::test]
    async fn clear_resets_session_and_confirms() {
        let api = Arc::new(FakeApi::replying("pong"));
        let sessions = Arc::new(SessionManager::new(Arc::clone(&api) as Arc<dyn GenerativeApi>));
        let outbound = Arc::new(RecordingOutbound::default());
        let dispatcher = CommandDispatcher::new(
            Arc::clone(&sessions),
            Arc::clone(&outbound) as Arc<dyn ChannelOutbound>,
        );

        sessions.send(vec![Part::text("remember me")]).await.unwrap();
        assert_eq!(sessions.history_len().await, 2);

        dispatcher.dispatch(Command::Clear, &target()).await;

        assert_eq!(sessions.history_len().await, 0);
        assert_eq!(
            outbound.sent(),
            vec![Sent::Reply {
                target: target(),
                text: CLEAR_CONFIRMATION.into()
            }]
        );

        sessions.send(vec![Part::text("fresh")]).await.unwrap();
        assert_eq!(api.last_request().contents.len(), 1);
    }

    #[tokio::test]
    async fn clear_still_resets_when_confirmation_fails() {
        let api = Arc::new(FakeApi::replying("pong"));
        let sessions = Arc::new(SessionManager::new(Arc::clone(&api) as Arc<dyn GenerativeApi>));
        let dispatcher = CommandDispatcher::new(
            Arc::clone(&sessions),
            Arc::new(RecordingOutbound::failing()),
        );

        sessions.send(vec![Part::text("x")]).await.unwrap();
        dispatcher.dispatch(Command::Clear, &target()).await;

        assert_eq!(sessions.history_len().await, 0);
    }
}
