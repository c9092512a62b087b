//! In-memory doubles for the provider and the chat platform.

use std::{
    collections::{HashMap, VecDeque},
    sync::Mutex,
};

use {
    async_trait::async_trait,
    gembot_channels::{ChannelOutbound, ChannelReplyTarget},
    gembot_gemini::{
        Candidate, Content, Error as GeminiError, FileRecord, FileState, GenerateContentRequest,
        GenerateContentResponse, GenerativeApi, Part,
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RecordedUpload {
    pub display_name: String,
    pub mime_type: String,
    pub data: Vec<u8>,
}

/// Scriptable [`GenerativeApi`].
///
/// Uploads become `files/<display name>` in `PROCESSING`; status checks pop
/// the scripted states for that name and report `ACTIVE` once the script runs
/// out.
pub(crate) struct FakeApi {
    reply: Option<String>,
    generate_error: Option<(u16, String)>,
    failing_uploads: Vec<String>,
    failing_status: Vec<String>,
    states: Mutex<HashMap<String, VecDeque<FileState>>>,
    pub requests: Mutex<Vec<GenerateContentRequest>>,
    pub uploads: Mutex<Vec<RecordedUpload>>,
    pub status_checks: Mutex<Vec<String>>,
}

impl FakeApi {
    pub fn replying(text: &str) -> Self {
        Self {
            reply: Some(text.to_string()),
            generate_error: None,
            failing_uploads: Vec::new(),
            failing_status: Vec::new(),
            states: Mutex::new(HashMap::new()),
            requests: Mutex::new(Vec::new()),
            uploads: Mutex::new(Vec::new()),
            status_checks: Mutex::new(Vec::new()),
        }
    }

    /// Every turn comes back with no candidates.
    pub fn silent() -> Self {
        Self {
            reply: None,
            ..Self::replying("")
        }
    }

    pub fn failing() -> Self {
        Self::failing_with(503, "model overloaded")
    }

    /// Every turn fails with an API error carrying `status` and `body`.
    pub fn failing_with(status: u16, body: &str) -> Self {
        Self {
            generate_error: Some((status, body.to_string())),
            ..Self::replying("")
        }
    }

    pub fn fail_upload(mut self, display_name: &str) -> Self {
        self.failing_uploads.push(display_name.to_string());
        self
    }

    pub fn fail_status(mut self, name: &str) -> Self {
        self.failing_status.push(name.to_string());
        self
    }

    pub fn with_states(self, name: &str, states: &[FileState]) -> Self {
        self.states
            .lock()
            .unwrap()
            .insert(name.to_string(), states.iter().copied().collect());
        self
    }

    pub fn last_request(&self) -> GenerateContentRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

pub(crate) fn file_uri(name: &str) -> String {
    format!("https://files.test/v1beta/{name}")
}

#[async_trait]
impl GenerativeApi for FakeApi {
    async fn generate_content(
        &self,
        _model: &str,
        request: &GenerateContentRequest,
    ) -> gembot_gemini::Result<GenerateContentResponse> {
        self.requests.lock().unwrap().push(request.clone());
        if let Some((status, body)) = &self.generate_error {
            return Err(GeminiError::Api {
                status: *status,
                body: body.clone(),
            });
        }
        Ok(GenerateContentResponse {
            candidates: self
                .reply
                .as_ref()
                .map(|text| Candidate {
                    content: Some(Content::model(vec![Part::text(text.clone())])),
                    finish_reason: Some("STOP".into()),
                })
                .into_iter()
                .collect(),
            prompt_feedback: None,
        })
    }

    async fn upload_file(
        &self,
        data: Vec<u8>,
        display_name: &str,
        mime_type: &str,
    ) -> gembot_gemini::Result<FileRecord> {
        self.uploads.lock().unwrap().push(RecordedUpload {
            display_name: display_name.to_string(),
            mime_type: mime_type.to_string(),
            data,
        });
        if self.failing_uploads.iter().any(|n| n == display_name) {
            return Err(GeminiError::Api {
                status: 400,
                body: "unsupported file".into(),
            });
        }
        Ok(FileRecord {
            name: format!("files/{display_name}"),
            display_name: Some(display_name.to_string()),
            mime_type: Some(mime_type.to_string()),
            uri: None,
            state: FileState::Processing,
        })
    }

    async fn get_file(&self, name: &str) -> gembot_gemini::Result<FileRecord> {
        self.status_checks.lock().unwrap().push(name.to_string());
        if self.failing_status.iter().any(|n| n == name) {
            return Err(GeminiError::Api {
                status: 500,
                body: "internal".into(),
            });
        }
        let state = self
            .states
            .lock()
            .unwrap()
            .get_mut(name)
            .and_then(VecDeque::pop_front)
            .unwrap_or(FileState::Active);
        Ok(FileRecord {
            name: name.to_string(),
            display_name: None,
            mime_type: None,
            uri: (state == FileState::Active).then(|| file_uri(name)),
            state,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Sent {
    Text { to: String, text: String },
    Typing { to: String },
    Reply { target: ChannelReplyTarget, text: String },
}

/// Records everything sent to the platform; optionally fails every text send,
/// or only whitespace-only texts the way Telegram does.
#[derive(Default)]
pub(crate) struct RecordingOutbound {
    pub sent: Mutex<Vec<Sent>>,
    pub fail_sends: bool,
    pub reject_blank: bool,
}

impl RecordingOutbound {
    pub fn failing() -> Self {
        Self {
            fail_sends: true,
            ..Self::default()
        }
    }

    pub fn rejecting_blank() -> Self {
        Self {
            reject_blank: true,
            ..Self::default()
        }
    }

    fn check(&self, text: &str) -> gembot_channels::Result<()> {
        if self.fail_sends {
            return Err(gembot_channels::Error::invalid_input("chat is gone"));
        }
        if self.reject_blank && text.trim().is_empty() {
            return Err(gembot_channels::Error::invalid_input("message text is empty"));
        }
        Ok(())
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    /// Texts sent into chats, ignoring typing indicators.
    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text { text, .. } | Sent::Reply { text, .. } => Some(text),
                Sent::Typing { .. } => None,
            })
            .collect()
    }
}

#[async_trait]
impl ChannelOutbound for RecordingOutbound {
    async fn send_text(&self, to: &str, text: &str) -> gembot_channels::Result<()> {
        self.sent.lock().unwrap().push(Sent::Text {
            to: to.to_string(),
            text: text.to_string(),
        });
        self.check(text)
    }

    async fn send_typing(&self, to: &str) -> gembot_channels::Result<()> {
        self.sent
            .lock()
            .unwrap()
            .push(Sent::Typing { to: to.to_string() });
        Ok(())
    }

    async fn send_reply(&self, target: &ChannelReplyTarget, text: &str) -> gembot_channels::Result<()> {
        self.sent.lock().unwrap().push(Sent::Reply {
            target: target.clone(),
            text: text.to_string(),
        });
        self.check(text)
    }
}
