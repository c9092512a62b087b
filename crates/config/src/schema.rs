use {secrecy::Secret, serde::Deserialize};

/// Secrets needed to run the relay.
#[derive(Clone, Deserialize)]
pub struct GembotConfig {
    /// Google AI Studio key used for every Gemini request.
    pub gemini_api_key: Secret<String>,

    /// Bot token from @BotFather.
    pub telegram_bot_token: Secret<String>,
}

impl GembotConfig {
    pub fn new(gemini_api_key: impl Into<String>, telegram_bot_token: impl Into<String>) -> Self {
        Self {
            gemini_api_key: Secret::new(gemini_api_key.into()),
            telegram_bot_token: Secret::new(telegram_bot_token.into()),
        }
    }
}

impl std::fmt::Debug for GembotConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GembotConfig")
            .field("gemini_api_key", &"[REDACTED]")
            .field("telegram_bot_token", &"[REDACTED]")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use {super::*, secrecy::ExposeSecret};

    #[test]
    fn debug_redacts_secrets() {
        let cfg = GembotConfig::new("AIza-secret", "123:tok");
        let printed = format!("{cfg:?}");
        assert!(!printed.contains("AIza-secret"));
        assert!(!printed.contains("123:tok"));
        assert!(printed.contains("[REDACTED]"));
    }

    #[test]
    fn deserialize_from_json() {
        let json = r#"{ "gemini_api_key": "k", "telegram_bot_token": "t" }"#;
        let cfg: GembotConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.gemini_api_key.expose_secret(), "k");
        assert_eq!(cfg.telegram_bot_token.expose_secret(), "t");
    }
}
