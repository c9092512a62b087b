use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// The API answered with a non-success status.
    #[error("Gemini API error HTTP {status}: {body}")]
    Api { status: u16, body: String },

    /// The API answered successfully but the payload was not what the
    /// protocol promises (e.g. no upload URL on a resumable start).
    #[error("unexpected Gemini API response: {message}")]
    Protocol { message: String },
}

impl Error {
    #[must_use]
    pub fn protocol(message: impl Into<String>) -> Self {
        Self::Protocol {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
