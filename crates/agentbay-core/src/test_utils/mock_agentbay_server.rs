// src/test_utils/mock_agentbay_server.rs
use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{delete, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::collections::HashSet;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

/// Knobs for simulating provider behavior.
#[derive(Debug, Clone, Default)]
pub struct MockBehavior {
    /// Reject session creation with this message.
    pub refuse_create: Option<String>,
    /// Report every execution as failed with this message.
    pub fail_run: Option<String>,
    /// Delay before answering an execution call.
    pub run_delay_ms: u64,
    /// When set, requests must carry `Bearer <key>`.
    pub expected_api_key: Option<String>,
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: Value,
    pub authorization: Option<String>,
}

#[derive(Clone)]
struct MockServerState {
    behavior: Arc<MockBehavior>,
    sessions: Arc<Mutex<HashSet<String>>>,
    next_id: Arc<AtomicUsize>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

type MockResponse = (StatusCode, Json<Value>);

impl MockServerState {
    fn record(&self, method: &str, path: String, headers: &HeaderMap, body: Value) {
        let authorization = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        self.requests.lock().unwrap().push(RecordedRequest {
            method: method.to_string(),
            path,
            body,
            authorization,
        });
    }

    fn check_auth(&self, headers: &HeaderMap) -> Result<(), MockResponse> {
        let Some(expected) = &self.behavior.expected_api_key else {
            return Ok(());
        };
        let provided = headers.get("authorization").and_then(|v| v.to_str().ok());
        if provided == Some(format!("Bearer {}", expected).as_str()) {
            Ok(())
        } else {
            Err((
                StatusCode::UNAUTHORIZED,
                Json(json!({"success": false, "error_message": "invalid api key"})),
            ))
        }
    }
}

async fn create_session_handler(
    State(state): State<MockServerState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> MockResponse {
    state.record("POST", "/v1/sessions".to_string(), &headers, body);
    if let Err(rejection) = state.check_auth(&headers) {
        return rejection;
    }

    if let Some(message) = &state.behavior.refuse_create {
        return (
            StatusCode::OK,
            Json(json!({"success": false, "error_message": message})),
        );
    }

    let n = state.next_id.fetch_add(1, Ordering::SeqCst);
    let session_id = format!("session-{}", n);
    state.sessions.lock().unwrap().insert(session_id.clone());
    log::debug!("Mock AgentBay server created {}", session_id);

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "session_id": session_id,
            "request_id": format!("req-create-{}", n),
        })),
    )
}

async fn run_code_handler(
    State(state): State<MockServerState>,
    headers: HeaderMap,
    Path(session_id): Path<String>,
    Json(body): Json<Value>,
) -> MockResponse {
    state.record(
        "POST",
        format!("/v1/sessions/{}/code", session_id),
        &headers,
        body.clone(),
    );
    if let Err(rejection) = state.check_auth(&headers) {
        return rejection;
    }

    if !state.sessions.lock().unwrap().contains(&session_id) {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "error_message": "session not found"})),
        );
    }

    if state.behavior.run_delay_ms > 0 {
        tokio::time::sleep(tokio::time::Duration::from_millis(state.behavior.run_delay_ms)).await;
    }

    if let Some(message) = &state.behavior.fail_run {
        return (
            StatusCode::OK,
            Json(json!({"success": false, "error_message": message})),
        );
    }

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "result": body["code"].as_str().unwrap_or_default(),
        })),
    )
}

async fn delete_session_handler(
    State(state): State<MockServerState>,
    headers: HeaderMap,
    Path(session_id): Path<String>,
) -> MockResponse {
    state.record(
        "DELETE",
        format!("/v1/sessions/{}", session_id),
        &headers,
        Value::Null,
    );
    if let Err(rejection) = state.check_auth(&headers) {
        return rejection;
    }

    if state.sessions.lock().unwrap().remove(&session_id) {
        (StatusCode::OK, Json(json!({"success": true})))
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "error_message": "session not found"})),
        )
    }
}

async fn retrieve_summarize_handler(
    State(state): State<MockServerState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> MockResponse {
    state.record(
        "POST",
        "/v1/knowledge/retrieve_summarize".to_string(),
        &headers,
        body.clone(),
    );
    if let Err(rejection) = state.check_auth(&headers) {
        return rejection;
    }

    let query = body["query"].as_str().unwrap_or_default();
    let top_k = body["top_k"].as_u64().unwrap_or(5);
    let insights: Vec<String> = (1..=top_k)
        .map(|i| format!("insight {} about {}", i, query))
        .collect();

    (
        StatusCode::OK,
        Json(json!({
            "success": true,
            "data": {"query": query, "insights": insights},
        })),
    )
}

pub struct MockAgentBayServer {
    addr: SocketAddr,
    shutdown_tx: tokio::sync::oneshot::Sender<()>,
    recorded_requests: Arc<Mutex<Vec<RecordedRequest>>>,
    sessions: Arc<Mutex<HashSet<String>>>,
}

impl MockAgentBayServer {
    pub async fn start(behavior: MockBehavior) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let state = MockServerState {
            behavior: Arc::new(behavior),
            sessions: Arc::new(Mutex::new(HashSet::new())),
            next_id: Arc::new(AtomicUsize::new(1)),
            requests: Arc::new(Mutex::new(Vec::new())),
        };
        let recorded_requests = state.requests.clone();
        let sessions = state.sessions.clone();

        let app = Router::new()
            .route("/v1/sessions", post(create_session_handler))
            .route("/v1/sessions/{session_id}", delete(delete_session_handler))
            .route("/v1/sessions/{session_id}/code", post(run_code_handler))
            .route(
                "/v1/knowledge/retrieve_summarize",
                post(retrieve_summarize_handler),
            )
            .with_state(state);

        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap_or_else(|e| {
            panic!("Failed to bind mock server to 127.0.0.1:0. Error: {}", e);
        });
        let addr = listener.local_addr().unwrap();
        log::info!("Mock AgentBay server listening on {}", addr);

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap_or_else(|e| {
                    log::error!("Mock AgentBay server error: {}", e);
                });
        });

        MockAgentBayServer {
            addr,
            shutdown_tx,
            recorded_requests,
            sessions,
        }
    }

    pub fn address(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn get_requests(&self) -> Vec<RecordedRequest> {
        self.recorded_requests.lock().unwrap().clone()
    }

    /// Sessions created and not yet deleted.
    pub fn live_sessions(&self) -> usize {
        self.sessions.lock().unwrap().len()
    }

    pub async fn shutdown(self) {
        if self.shutdown_tx.send(()).is_err() {
            log::warn!("Mock AgentBay server shutdown signal already sent or receiver dropped.");
        }
    }
}
