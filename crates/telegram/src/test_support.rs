//! A mock Telegram Bot API served by axum.

use std::sync::{Arc, Mutex};

use {
    axum::{
        Json, Router,
        body::Bytes,
        extract::State,
        http::Uri,
        response::{IntoResponse, Response},
        routing::any,
    },
    serde_json::{Value, json},
    tokio::{sync::oneshot, task::JoinHandle},
};

/// Bytes served for every `/file/...` download.
pub(crate) const FILE_BYTES: &[u8] = b"JPEGDATA";

#[derive(Clone, Default)]
struct MockState {
    requests: Arc<Mutex<Vec<(String, Value)>>>,
    failing: Arc<Vec<String>>,
    rate_limited: Arc<Vec<String>>,
}

/// Captures every Bot API call as `(lowercased method, JSON body)`.
/// File downloads are recorded under the method name `download`.
pub(crate) struct MockTelegramApi {
    state: MockState,
    addr: std::net::SocketAddr,
    shutdown: oneshot::Sender<()>,
    server: JoinHandle<()>,
}

impl MockTelegramApi {
    pub async fn start() -> Self {
        Self::start_failing(&[]).await
    }

    /// Methods listed in `failing` answer with `ok: false`.
    pub async fn start_failing(failing: &[&str]) -> Self {
        Self::serve(MockState {
            failing: Arc::new(methods(failing)),
            ..MockState::default()
        })
        .await
    }

    /// Methods listed in `rate_limited` answer 429 with a long `retry_after`.
    pub async fn start_rate_limited(rate_limited: &[&str]) -> Self {
        Self::serve(MockState {
            rate_limited: Arc::new(methods(rate_limited)),
            ..MockState::default()
        })
        .await
    }

    async fn serve(state: MockState) -> Self {
        let app = Router::new()
            .route("/{*path}", any(telegram_api_handler))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind test listener");
        let addr = listener.local_addr().expect("local addr");
        let (shutdown, shutdown_rx) = oneshot::channel::<()>();
        let server = tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    let _ = shutdown_rx.await;
                })
                .await
                .expect("serve mock telegram api");
        });

        Self {
            state,
            addr,
            shutdown,
            server,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    pub fn bot(&self) -> teloxide::Bot {
        let api_url = reqwest::Url::parse(&self.base_url()).expect("parse api url");
        teloxide::Bot::new("test-token").set_api_url(api_url)
    }

    pub fn methods(&self) -> Vec<String> {
        self.state
            .requests
            .lock()
            .unwrap()
            .iter()
            .map(|(method, _)| method.clone())
            .collect()
    }

    pub fn calls(&self, method: &str) -> Vec<Value> {
        self.state
            .requests
            .lock()
            .unwrap()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, body)| body.clone())
            .collect()
    }

    pub async fn shutdown(self) {
        let _ = self.shutdown.send(());
        self.server.await.expect("server join");
    }
}

fn methods(names: &[&str]) -> Vec<String> {
    names.iter().map(|m| m.to_string()).collect()
}

async fn telegram_api_handler(State(state): State<MockState>, uri: Uri, body: Bytes) -> Response {
    let path = uri.path();

    if let Some(file_path) = path.strip_prefix("/file/") {
        state
            .requests
            .lock()
            .unwrap()
            .push(("download".into(), json!(file_path)));
        return FILE_BYTES.into_response();
    }

    let method = path
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .to_ascii_lowercase();
    let body: Value = serde_json::from_slice(&body).unwrap_or(Value::Null);
    state
        .requests
        .lock()
        .unwrap()
        .push((method.clone(), body.clone()));

    if state.failing.contains(&method) {
        return Json(json!({
            "ok": false,
            "error_code": 400,
            "description": format!("Bad Request: {method} is broken")
        }))
        .into_response();
    }

    if state.rate_limited.contains(&method) {
        return Json(json!({
            "ok": false,
            "error_code": 429,
            "description": "Too Many Requests: retry after 30",
            "parameters": { "retry_after": 30 }
        }))
        .into_response();
    }

    let result = match method.as_str() {
        "getme" => json!({
            "id": 1000,
            "is_bot": true,
            "first_name": "Gembot",
            "username": "gembot",
            "can_join_groups": true,
            "can_read_all_group_messages": false,
            "supports_inline_queries": false,
            "can_connect_to_business": false,
            "has_main_web_app": false
        }),
        "getfile" => json!({
            "file_id": body["file_id"],
            "file_unique_id": "unique-1",
            "file_size": FILE_BYTES.len(),
            "file_path": format!("docs/{}", body["file_id"].as_str().unwrap_or("file"))
        }),
        "sendmessage" => json!({
            "message_id": 500,
            "date": 0,
            "chat": { "id": body["chat_id"], "type": "private", "first_name": "Alice" },
            "text": body["text"]
        }),
        _ => json!(true),
    };
    Json(json!({ "ok": true, "result": result })).into_response()
}
