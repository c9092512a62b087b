use tracing::debug;

use crate::{
    Result,
    client::GenerativeApi,
    types::{Content, GenerateContentRequest, GenerateContentResponse, Part, SafetySetting},
};

/// Model and safety policy a session is bound to for its whole life.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub model: String,
    pub safety_settings: Vec<SafetySetting>,
}

/// A multi-turn conversation.
///
/// Gemini is stateless, so the history lives here and is replayed on every
/// turn. A turn is recorded only when the model actually answered; failed or
/// empty turns leave the history untouched so roles keep alternating.
#[derive(Debug, Clone)]
pub struct ChatSession {
    config: SessionConfig,
    history: Vec<Content>,
}

impl ChatSession {
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            history: Vec::new(),
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Recorded contents, alternating `user` / `model`.
    pub fn history(&self) -> &[Content] {
        &self.history
    }

    /// Send one user turn and record it together with the reply.
    pub async fn send_message(
        &mut self,
        api: &dyn GenerativeApi,
        parts: Vec<Part>,
    ) -> Result<GenerateContentResponse> {
        let user = Content::user(parts);
        let mut contents = Vec::with_capacity(self.history.len() + 1);
        contents.extend(self.history.iter().cloned());
        contents.push(user.clone());

        let request = GenerateContentRequest {
            contents,
            safety_settings: self.config.safety_settings.clone(),
        };
        let response = api.generate_content(&self.config.model, &request).await?;

        if let Some(reply) = response.first_content() {
            let mut reply = reply.clone();
            reply.role = Some("model".into());
            self.history.push(user);
            self.history.push(reply);
        } else {
            debug!(model = %self.config.model, "reply had no content, turn not recorded");
        }

        Ok(response)
    }
}
