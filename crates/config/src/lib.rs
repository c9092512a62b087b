//! Runtime configuration.
//!
//! Exactly two secrets are configurable: the Gemini API key and the Telegram
//! bot token. Both come from the process environment, optionally seeded from
//! a `.env` file. Everything else (model, safety policy, chunk size, poll
//! interval) is a compile-time constant in `gembot-relay`.

pub mod error;
pub mod loader;
pub mod schema;

pub use {
    error::{Error, Result},
    loader::{GEMINI_API_KEY_VAR, TELEGRAM_BOT_TOKEN_VAR, from_env, load_dotenv},
    schema::GembotConfig,
};
