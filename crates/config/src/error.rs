use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("required environment variable {name} is not set")]
    MissingVar { name: &'static str },

    #[error("failed to load env file {path}: {source}")]
    EnvFile {
        path: String,
        #[source]
        source: dotenvy::Error,
    },
}

impl Error {
    #[must_use]
    pub fn missing_var(name: &'static str) -> Self {
        Self::MissingVar { name }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
