use thiserror::Error;

/// Failures moving one attachment into the provider. Scoped to that
/// attachment: [`crate::Relay`] logs them and drops the attachment.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport failure fetching an attachment. The URL is stripped since it
    /// may embed the platform token.
    #[error("failed to download attachment: {0}")]
    Download(#[source] reqwest::Error),

    #[error("attachment download returned HTTP {status}")]
    DownloadStatus { status: u16 },

    #[error("failed to upload attachment: {0}")]
    Upload(#[source] gembot_gemini::Error),

    #[error("failed to check status of {name}: {source}")]
    Poll {
        name: String,
        #[source]
        source: gembot_gemini::Error,
    },

    /// The provider gave up processing the file.
    #[error("provider failed to process {name}")]
    ProcessingFailed { name: String },

    /// We gave up waiting; the file may still become ready later.
    #[error("{name} still processing after {attempts} status checks")]
    PollTimeout { name: String, attempts: u32 },

    #[error("{name} is active but has no URI")]
    MissingUri { name: String },
}

pub type Result<T> = std::result::Result<T, Error>;
