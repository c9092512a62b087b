use std::{sync::Arc, time::Duration};

use {
    gembot_channels::ChannelAttachment,
    gembot_gemini::{FileState, GenerativeApi, Part},
    tracing::{debug, info},
};

use crate::{Error, Result};

/// Attachments are small chat files; a stalled download should not pin a
/// turn for longer than this.
const DOWNLOAD_TIMEOUT: Duration = Duration::from_secs(120);

/// How often and how long to wait for an uploaded file to become usable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    /// Five seconds between checks, five minutes in total.
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            max_attempts: 60,
        }
    }
}

/// A provider-side file that finished processing and can go into a turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedReference {
    pub uri: String,
    pub mime_type: Option<String>,
}

impl UploadedReference {
    #[must_use]
    pub fn to_part(&self) -> Part {
        Part::file(self.uri.clone(), self.mime_type.clone())
    }
}

/// Moves one attachment from the chat platform into the Gemini File API.
pub struct MediaUploader {
    http: reqwest::Client,
    api: Arc<dyn GenerativeApi>,
    poll: PollPolicy,
}

impl MediaUploader {
    pub fn new(api: Arc<dyn GenerativeApi>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(DOWNLOAD_TIMEOUT)
            .build()
            .map_err(Error::Download)?;
        Ok(Self::with_http_client(http, api, PollPolicy::default()))
    }

    pub fn with_http_client(
        http: reqwest::Client,
        api: Arc<dyn GenerativeApi>,
        poll: PollPolicy,
    ) -> Self {
        Self { http, api, poll }
    }

    /// Download, upload and wait until the provider reports the file active.
    ///
    /// Any failure is scoped to this attachment; callers drop it and carry on.
    pub async fn upload(&self, attachment: &ChannelAttachment) -> Result<UploadedReference> {
        let data = self.download(&attachment.url).await?;
        debug!(
            file_name = %attachment.file_name,
            media_type = %attachment.media_type,
            size = data.len(),
            "attachment downloaded"
        );

        let file = self
            .api
            .upload_file(data, &attachment.file_name, &attachment.media_type)
            .await
            .map_err(Error::Upload)?;
        info!(file = %file.name, file_name = %attachment.file_name, "attachment uploaded, waiting for processing");

        self.wait_until_active(&file.name).await
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>> {
        // `without_url` keeps the token-bearing URL out of error messages.
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| Error::Download(e.without_url()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(Error::DownloadStatus {
                status: status.as_u16(),
            });
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| Error::Download(e.without_url()))?;
        Ok(bytes.to_vec())
    }

    /// Poll `name` until it is `ACTIVE`, sleeping between checks.
    ///
    /// `FAILED` ends the wait immediately. Running out of attempts is reported
    /// as [`Error::PollTimeout`], distinct from a provider-side failure.
    pub async fn wait_until_active(&self, name: &str) -> Result<UploadedReference> {
        let attempts = self.poll.max_attempts;

        for attempt in 1..=attempts {
            let file = self.api.get_file(name).await.map_err(|source| Error::Poll {
                name: name.to_string(),
                source,
            })?;

            match file.state {
                FileState::Active => {
                    let uri = file.uri.ok_or_else(|| Error::MissingUri {
                        name: name.to_string(),
                    })?;
                    debug!(file = name, attempt, "file active");
                    return Ok(UploadedReference {
                        uri,
                        mime_type: file.mime_type,
                    });
                },
                FileState::Failed => {
                    return Err(Error::ProcessingFailed {
                        name: name.to_string(),
                    });
                },
                state => debug!(file = name, attempt, ?state, "file not ready yet"),
            }

            if attempt < attempts {
                tokio::time::sleep(self.poll.interval).await;
            }
        }

        Err(Error::PollTimeout {
            name: name.to_string(),
            attempts,
        })
    }
}
