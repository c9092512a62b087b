use std::time::Duration;

use {
    async_trait::async_trait,
    secrecy::{ExposeSecret, Secret},
    tracing::{debug, trace, warn},
};

use crate::{
    Error, Result,
    types::{FileRecord, GenerateContentRequest, GenerateContentResponse},
};

pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

/// Upper bound for a single API call. Video prompts can take minutes.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// The narrow provider surface the relay depends on.
#[async_trait]
pub trait GenerativeApi: Send + Sync {
    /// Run one `generateContent` call against `model`.
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse>;

    /// Upload raw bytes to the File API. The returned record is usually still
    /// `PROCESSING`.
    async fn upload_file(
        &self,
        data: Vec<u8>,
        display_name: &str,
        mime_type: &str,
    ) -> Result<FileRecord>;

    /// Look up a file by resource name (`files/...`).
    async fn get_file(&self, name: &str) -> Result<FileRecord>;
}

#[derive(Debug, serde::Deserialize)]
struct UploadFileResponse {
    file: FileRecord,
}

/// Gemini REST client authenticated with an API key.
pub struct GeminiClient {
    api_key: Secret<String>,
    base_url: String,
    client: reqwest::Client,
}

impl GeminiClient {
    pub fn new(api_key: Secret<String>) -> Result<Self> {
        Self::with_base_url(api_key, GEMINI_API_BASE)
    }

    /// Point the client at a different host (tests, proxies).
    pub fn with_base_url(api_key: Secret<String>, base_url: impl Into<String>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }
}

/// Turn a non-2xx response into [`Error::Api`], keeping the body for logs.
async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    warn!(status = %status, body = %body, "gemini API error");
    Err(Error::Api {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl GenerativeApi for GeminiClient {
    async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<GenerateContentResponse> {
        let url = format!("{}/v1beta/models/{model}:generateContent", self.base_url);

        debug!(
            model,
            contents_count = request.contents.len(),
            "gemini generateContent request"
        );
        trace!(body = %serde_json::to_string(request).unwrap_or_default(), "gemini request body");

        let resp = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
            .json(request)
            .send()
            .await?;
        let resp = check_status(resp).await?;

        let body: serde_json::Value = resp.json().await?;
        trace!(response = %body, "gemini raw response");
        Ok(serde_json::from_value(body)?)
    }

    async fn upload_file(
        &self,
        data: Vec<u8>,
        display_name: &str,
        mime_type: &str,
    ) -> Result<FileRecord> {
        // Resumable protocol: `start` returns a session URL, then one
        // `upload, finalize` request carries the bytes.
        let start = self
            .client
            .post(format!("{}/upload/v1beta/files", self.base_url))
            .header("x-goog-api-key", self.api_key.expose_secret())
            .header("X-Goog-Upload-Protocol", "resumable")
            .header("X-Goog-Upload-Command", "start")
            .header("X-Goog-Upload-Header-Content-Length", data.len())
            .header("X-Goog-Upload-Header-Content-Type", mime_type)
            .json(&serde_json::json!({ "file": { "display_name": display_name } }))
            .send()
            .await?;
        let start = check_status(start).await?;

        let upload_url = start
            .headers()
            .get("x-goog-upload-url")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
            .ok_or_else(|| Error::protocol("resumable upload start returned no upload URL"))?;

        debug!(display_name, mime_type, size = data.len(), "gemini file upload");

        let resp = self
            .client
            .post(&upload_url)
            .header("X-Goog-Upload-Offset", "0")
            .header("X-Goog-Upload-Command", "upload, finalize")
            .body(data)
            .send()
            .await?;
        let resp = check_status(resp).await?;

        let uploaded: UploadFileResponse = resp.json().await?;
        Ok(uploaded.file)
    }

    async fn get_file(&self, name: &str) -> Result<FileRecord> {
        let resp = self
            .client
            .get(format!("{}/v1beta/{name}", self.base_url))
            .header("x-goog-api-key", self.api_key.expose_secret())
            .send()
            .await?;
        let resp = check_status(resp).await?;
        Ok(resp.json().await?)
    }
}
