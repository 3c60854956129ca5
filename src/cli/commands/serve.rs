//! HTTP API server for tutoring sessions.
//!
//! Runs of the same session are serialised; different sessions proceed
//! concurrently.

use crate::checkpoint::{Checkpoint, SessionId, SessionSummary};
use crate::cli::preflight::{self, Operation};
use crate::cli::Output;
use crate::config::Settings;
use crate::error::HealthBotError;
use crate::workflow::{Interrupt, RunOutcome, RunStatus, TutorWorkflow, WorkflowEvent};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

/// Shared application state.
struct AppState {
    workflow: TutorWorkflow,
    /// One lock per session so its runs never interleave.
    runs: Mutex<HashMap<SessionId, Arc<Mutex<()>>>>,
    /// Conversation shown to clients, per session.
    logs: Mutex<HashMap<SessionId, Vec<LogEntry>>>,
}

impl AppState {
    fn new(workflow: TutorWorkflow) -> Self {
        Self {
            workflow,
            runs: Mutex::new(HashMap::new()),
            logs: Mutex::new(HashMap::new()),
        }
    }

    async fn run_lock(&self, session_id: SessionId) -> Arc<Mutex<()>> {
        self.runs
            .lock()
            .await
            .entry(session_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    async fn record(&self, session_id: SessionId, user: &str, outcome: &RunOutcome) {
        let mut logs = self.logs.lock().await;
        let log = logs.entry(session_id).or_default();
        log.push(LogEntry::user(user));
        log.extend(
            outcome
                .events
                .iter()
                .filter_map(WorkflowEvent::message)
                .map(LogEntry::assistant),
        );
    }

    /// Drop the run lock of a session that can no longer be resumed.
    async fn release(&self, session_id: SessionId) {
        self.runs.lock().await.remove(&session_id);
    }

    async fn forget(&self, session_id: SessionId) {
        self.logs.lock().await.remove(&session_id);
        self.runs.lock().await.remove(&session_id);
    }
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    if let Err(e) = preflight::check(Operation::Tutor, &settings) {
        Output::error(&format!("{}", e));
        Output::info("Run 'healthbot doctor' for detailed diagnostics.");
        return Err(e.into());
    }

    let workflow = TutorWorkflow::from_settings(&settings)?;
    let app = router(workflow);

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("HealthBot API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET    /health");
    Output::kv("Start session", "POST   /sessions");
    Output::kv("List sessions", "GET    /sessions");
    Output::kv("Get session", "GET    /sessions/{id}");
    Output::kv("Resume session", "POST   /sessions/{id}/resume");
    Output::kv("Reset session", "DELETE /sessions/{id}");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(workflow: TutorWorkflow) -> Router {
    app(Arc::new(AppState::new(workflow)))
}

fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/sessions", post(start_session).get(list_sessions))
        .route("/sessions/{id}", get(get_session).delete(reset_session))
        .route("/sessions/{id}/resume", post(resume_session))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct StartRequest {
    subject: String,
}

#[derive(Deserialize)]
struct ResumeRequest {
    value: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LogEntry {
    role: String,
    content: String,
}

impl LogEntry {
    fn user(content: &str) -> Self {
        Self {
            role: "user".to_string(),
            content: content.to_string(),
        }
    }

    fn assistant(content: String) -> Self {
        Self {
            role: "assistant".to_string(),
            content,
        }
    }
}

#[derive(Serialize)]
struct RunResponse {
    session_id: SessionId,
    finished: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    interrupt: Option<Interrupt>,
    events: Vec<WorkflowEvent>,
    checkpoint: Checkpoint,
}

impl From<RunOutcome> for RunResponse {
    fn from(outcome: RunOutcome) -> Self {
        let interrupt = match outcome.status {
            RunStatus::Interrupted(interrupt) => Some(interrupt),
            RunStatus::Finished => None,
        };
        Self {
            session_id: outcome.checkpoint.session_id,
            finished: interrupt.is_none(),
            interrupt,
            events: outcome.events,
            checkpoint: outcome.checkpoint,
        }
    }
}

#[derive(Serialize)]
struct SessionListResponse {
    sessions: Vec<SessionSummary>,
    total: usize,
}

#[derive(Serialize)]
struct SessionDetailResponse {
    checkpoint: Checkpoint,
    messages: Vec<LogEntry>,
}

#[derive(Serialize)]
struct ResetResponse {
    deleted: bool,
    /// Fresh id the client should use from now on.
    session_id: SessionId,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// Library error rendered as a JSON response.
struct ApiError(HealthBotError);

impl From<HealthBotError> for ApiError {
    fn from(e: HealthBotError) -> Self {
        Self(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            HealthBotError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            HealthBotError::SessionNotFound(_) => StatusCode::NOT_FOUND,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (
            status,
            Json(ErrorResponse {
                error: self.0.to_string(),
            }),
        )
            .into_response()
    }
}

type ApiResult<T> = std::result::Result<Json<T>, ApiError>;

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn start_session(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StartRequest>,
) -> ApiResult<RunResponse> {
    let session_id = SessionId::new();
    let lock = state.run_lock(session_id).await;
    let _guard = lock.lock().await;

    info!("Starting session {}", session_id);
    let outcome = match state.workflow.start(session_id, &req.subject).await {
        Ok(outcome) => outcome,
        Err(e) => {
            state.release(session_id).await;
            return Err(e.into());
        }
    };
    state.record(session_id, &req.subject, &outcome).await;
    if matches!(outcome.status, RunStatus::Finished) {
        state.release(session_id).await;
    }
    Ok(Json(outcome.into()))
}

async fn resume_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(req): Json<ResumeRequest>,
) -> ApiResult<RunResponse> {
    let session_id: SessionId = id.parse()?;
    if state.workflow.snapshot(session_id).await?.is_none() {
        return Err(HealthBotError::SessionNotFound(id).into());
    }
    let lock = state.run_lock(session_id).await;
    let _guard = lock.lock().await;

    let outcome = match state.workflow.resume(session_id, &req.value).await {
        Ok(outcome) => outcome,
        Err(e) => {
            // Reset raced this request.
            if matches!(e, HealthBotError::SessionNotFound(_)) {
                state.release(session_id).await;
            }
            return Err(e.into());
        }
    };
    state.record(session_id, &req.value, &outcome).await;
    if matches!(outcome.status, RunStatus::Finished) {
        state.release(session_id).await;
    }
    Ok(Json(outcome.into()))
}

async fn list_sessions(State(state): State<Arc<AppState>>) -> ApiResult<SessionListResponse> {
    let sessions = state.workflow.sessions().await?;
    Ok(Json(SessionListResponse {
        total: sessions.len(),
        sessions,
    }))
}

async fn get_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<SessionDetailResponse> {
    let session_id: SessionId = id.parse()?;
    let checkpoint = state
        .workflow
        .snapshot(session_id)
        .await?
        .ok_or_else(|| HealthBotError::SessionNotFound(id.clone()))?;
    let messages = state
        .logs
        .lock()
        .await
        .get(&session_id)
        .cloned()
        .unwrap_or_default();

    Ok(Json(SessionDetailResponse {
        checkpoint,
        messages,
    }))
}

async fn reset_session(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<ResetResponse> {
    let session_id: SessionId = id.parse()?;
    let lock = state.run_lock(session_id).await;
    let _guard = lock.lock().await;

    let deleted = state.workflow.reset(session_id).await?;
    state.forget(session_id).await;
    if !deleted {
        return Err(HealthBotError::SessionNotFound(id).into());
    }

    info!("Reset session {}", session_id);
    Ok(Json(ResetResponse {
        deleted,
        session_id: SessionId::new(),
    }))
}
