use std::sync::Arc;

use {
    gembot_gemini::{
        ChatSession, GenerateContentResponse, GenerativeApi, HarmBlockThreshold, HarmCategory,
        Part, SafetySetting, SessionConfig,
    },
    tokio::sync::{MappedMutexGuard, Mutex, MutexGuard},
    tracing::info,
};

/// Model every session is created against.
pub const MODEL: &str = "gemini-1.5-pro-latest";

/// Harassment, hate speech and sexually explicit content are all unblocked.
#[must_use]
pub fn default_safety_settings() -> Vec<SafetySetting> {
    [
        HarmCategory::Harassment,
        HarmCategory::HateSpeech,
        HarmCategory::SexuallyExplicit,
    ]
    .into_iter()
    .map(|category| SafetySetting {
        category,
        threshold: HarmBlockThreshold::BlockNone,
    })
    .collect()
}

#[must_use]
pub fn default_session_config() -> SessionConfig {
    SessionConfig {
        model: MODEL.to_string(),
        safety_settings: default_safety_settings(),
    }
}

/// Owns the single conversation shared by every chat and user.
///
/// One lock guards the session: a turn holds it from request to recorded
/// reply, so turns are serialized and a reset never lands in the middle of
/// one. Sessions are created lazily and recreated with the same
/// configuration on reset.
pub struct SessionManager {
    api: Arc<dyn GenerativeApi>,
    config: SessionConfig,
    session: Mutex<Option<ChatSession>>,
}

impl SessionManager {
    pub fn new(api: Arc<dyn GenerativeApi>) -> Self {
        Self {
            api,
            config: default_session_config(),
            session: Mutex::new(None),
        }
    }

    fn new_session(&self) -> ChatSession {
        info!(model = %self.config.model, "starting chat session");
        ChatSession::new(self.config.clone())
    }

    /// The current session, created on first use.
    ///
    /// The guard holds the session lock; drop it before calling [`Self::reset`]
    /// or [`Self::send`].
    pub async fn current(&self) -> MappedMutexGuard<'_, ChatSession> {
        let guard = self.session.lock().await;
        MutexGuard::map(guard, |slot| slot.get_or_insert_with(|| self.new_session()))
    }

    /// Run one turn against the current session.
    pub async fn send(&self, parts: Vec<Part>) -> gembot_gemini::Result<GenerateContentResponse> {
        let mut session = self.current().await;
        session.send_message(self.api.as_ref(), parts).await
    }

    /// Discard the conversation and start an empty one. Waits for any
    /// in-flight turn to finish first.
    pub async fn reset(&self) {
        let mut slot = self.session.lock().await;
        let dropped = slot.as_ref().map_or(0, |s| s.history().len());
        *slot = Some(self.new_session());
        info!(dropped_contents = dropped, "chat session reset");
    }

    /// Number of recorded contents (user and model) in the current session.
    pub async fn history_len(&self) -> usize {
        self.session
            .lock()
            .await
            .as_ref()
            .map_or(0, |s| s.history().len())
    }
}
