use std::path::{Path, PathBuf};

use tracing::debug;

use crate::{Error, Result, schema::GembotConfig};

pub const GEMINI_API_KEY_VAR: &str = "GEMINI_API_KEY";
pub const TELEGRAM_BOT_TOKEN_VAR: &str = "TELEGRAM_BOT_TOKEN";

/// Seed the process environment from a `.env` file.
///
/// With an explicit `path` the file must exist. Without one, `./.env` is
/// used when present and silently skipped otherwise. Variables already set in
/// the environment win over the file.
pub fn load_dotenv(path: Option<&Path>) -> Result<Option<PathBuf>> {
    match path {
        Some(path) => dotenvy::from_path(path)
            .map(|()| Some(path.to_path_buf()))
            .map_err(|source| Error::EnvFile {
                path: path.display().to_string(),
                source,
            }),
        None => match dotenvy::dotenv() {
            Ok(found) => Ok(Some(found)),
            Err(e) if e.not_found() => {
                debug!("no .env file found, using process environment only");
                Ok(None)
            },
            Err(source) => Err(Error::EnvFile {
                path: ".env".into(),
                source,
            }),
        },
    }
}

/// Read the configuration from the process environment.
pub fn from_env() -> Result<GembotConfig> {
    from_lookup(|name| std::env::var(name).ok())
}

/// Read the configuration using a custom lookup function.
///
/// Separate from [`from_env`] so tests never mutate the process environment.
fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<GembotConfig> {
    let required = |name: &'static str| {
        lookup(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| Error::missing_var(name))
    };

    let gemini_api_key = required(GEMINI_API_KEY_VAR)?;
    let telegram_bot_token = required(TELEGRAM_BOT_TOKEN_VAR)?;

    Ok(GembotConfig::new(gemini_api_key, telegram_bot_token))
}
