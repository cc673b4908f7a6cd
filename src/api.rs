use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info, warn};

use crate::{
    app_state::{AppState, Status},
    backend::PaperContext,
    error::GraphError,
    graph,
    models::{ExpansionRecord, GraphSnapshot, MergeReport, Message, SelectionSnapshot, ViewMode},
};

type ApiError = (StatusCode, Json<serde_json::Value>);

#[derive(Deserialize)]
pub struct SearchPayload {
    query: String,
}

#[derive(Deserialize)]
pub struct ExpandPayload {
    #[serde(default)]
    node_id: Option<String>,
}

#[derive(Serialize)]
pub struct ExpandResponse {
    report: MergeReport,
    graph: GraphSnapshot,
}

#[derive(Deserialize)]
pub struct SelectPayload {
    node_id: String,
    #[serde(default)]
    mode: Option<ViewMode>,
}

#[derive(Deserialize)]
pub struct ChatPayload {
    message: String,
}

#[derive(Serialize)]
pub struct ChatResponse {
    node_id: String,
    answer: String,
    paper_context: Option<PaperContext>,
    history: Vec<Message>,
}

pub fn create_router(app_state: AppState) -> Router {
    Router::new()
        .route("/api/search", post(search_handler))
        .route("/api/expand", post(expand_handler))
        .route("/api/select", post(select_handler))
        .route("/api/conversation", post(enter_conversation_handler))
        .route("/api/close-panel", post(close_panel_handler))
        .route("/api/reopen-panel", post(reopen_panel_handler))
        .route("/api/chat", post(chat_handler))
        .route("/api/graph", get(graph_handler))
        .route("/api/history/:node_id", get(history_handler))
        .route("/api/sessions", get(sessions_handler))
        .route("/api/reset", post(reset_handler))
        .route("/api/status", get(status_handler))
        .route("/api/backend-health", get(backend_health_handler))
        .route("/api/shutdown", post(shutdown_handler))
        .with_state(app_state)
}

fn graph_error(err: GraphError) -> ApiError {
    let status = match err {
        // Malformed items come from the retrieval backend, not from the client.
        GraphError::Validation { .. } => StatusCode::BAD_GATEWAY,
        GraphError::NotFound { .. } => StatusCode::NOT_FOUND,
        GraphError::NoActiveNode | GraphError::InvalidMode => StatusCode::CONFLICT,
    };
    warn!("Graph operation rejected: {err}");
    (status, Json(json!({ "error": err.to_string() })))
}

fn backend_error(context: &str, err: anyhow::Error) -> ApiError {
    error!("{context}: {err}");
    (
        StatusCode::BAD_GATEWAY,
        Json(json!({ "error": format!("{context}: {err}") })),
    )
}

#[axum::debug_handler]
async fn search_handler(
    State(state): State<AppState>,
    Json(payload): Json<SearchPayload>,
) -> Result<Json<GraphSnapshot>, ApiError> {
    state.begin_request(format!("Searching '{}'...", payload.query));
    let result = state.backend.search(&payload.query).await;
    state.end_request(match &result {
        Ok(items) => format!("Search returned {} results.", items.len()),
        Err(e) => format!("Search failed: {e}"),
    });
    let items = result.map_err(|e| backend_error("Search request failed", e))?;

    // Reject a malformed response before tearing down the current graph.
    graph::validate_items(&items).map_err(graph_error)?;

    let mut session = state.session();
    session.full_reset();
    session.initialize_graph(&items).map_err(graph_error)?;
    info!("Search '{}' produced {} nodes", payload.query, session.nodes().len());
    Ok(Json(session.snapshot()))
}

#[axum::debug_handler]
async fn expand_handler(
    State(state): State<AppState>,
    payload: Option<Json<ExpandPayload>>,
) -> Result<Json<ExpandResponse>, ApiError> {
    let requested = payload.and_then(|Json(p)| p.node_id);

    let (source_id, context) = {
        let session = state.session();
        let source_id = match requested {
            Some(id) => id,
            None => session
                .active_node_id()
                .map(str::to_string)
                .ok_or(GraphError::NoActiveNode)
                .map_err(graph_error)?,
        };
        if session.node(&source_id).is_none() {
            return Err(graph_error(GraphError::NotFound { id: source_id }));
        }
        let context = if state.config.expand_with_conversation {
            session.expansion_context(&source_id)
        } else {
            None
        };
        (source_id, context)
    };

    state.begin_request(format!("Expanding {source_id}..."));
    let result = state.backend.related(&source_id, context.as_deref()).await;
    state.end_request(match &result {
        Ok(items) => format!("Fetched {} related items for {source_id}.", items.len()),
        Err(e) => format!("Expansion of {source_id} failed: {e}"),
    });
    let items = result.map_err(|e| backend_error("Related items request failed", e))?;

    // The source may have vanished through a reset while the request was in flight.
    let mut session = state.session();
    let report = session
        .merge_expansion(&source_id, &items)
        .map_err(graph_error)?;
    Ok(Json(ExpandResponse {
        report,
        graph: session.snapshot(),
    }))
}

#[axum::debug_handler]
async fn graph_handler(State(state): State<AppState>) -> Json<GraphSnapshot> {
    Json(state.session().snapshot())
}

#[axum::debug_handler]
async fn sessions_handler(State(state): State<AppState>) -> Json<Vec<ExpansionRecord>> {
    Json(state.session().expansions().to_vec())
}

#[axum::debug_handler]
async fn reset_handler(State(state): State<AppState>) -> Json<GraphSnapshot> {
    let mut session = state.session();
    session.full_reset();
    Json(session.snapshot())
}

#[axum::debug_handler]
async fn select_handler(
    State(state): State<AppState>,
    Json(payload): Json<SelectPayload>,
) -> Result<Json<SelectionSnapshot>, ApiError> {
    let mut session = state.session();
    session
        .select_node_with_mode(&payload.node_id, payload.mode)
        .map_err(graph_error)?;
    Ok(Json(session.selection()))
}

#[axum::debug_handler]
async fn enter_conversation_handler(
    State(state): State<AppState>,
) -> Result<Json<SelectionSnapshot>, ApiError> {
    let mut session = state.session();
    session.enter_conversation().map_err(graph_error)?;
    Ok(Json(session.selection()))
}

#[axum::debug_handler]
async fn close_panel_handler(State(state): State<AppState>) -> Json<SelectionSnapshot> {
    let mut session = state.session();
    session.close_panel();
    Json(session.selection())
}

#[axum::debug_handler]
async fn reopen_panel_handler(
    State(state): State<AppState>,
) -> Result<Json<SelectionSnapshot>, ApiError> {
    let mut session = state.session();
    session.reopen_panel().map_err(graph_error)?;
    Ok(Json(session.selection()))
}

#[axum::debug_handler]
async fn chat_handler(
    State(state): State<AppState>,
    Json(payload): Json<ChatPayload>,
) -> Result<Json<ChatResponse>, ApiError> {
    let text = payload.message.trim().to_string();
    if text.is_empty() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": "Message cannot be empty." })),
        ));
    }

    // The transcript belongs to the node that was active when the user hit send.
    let (node_id, history, generation) = {
        let session = state.session();
        let node_id = session
            .active_node_id()
            .map(str::to_string)
            .ok_or(GraphError::NoActiveNode)
            .map_err(graph_error)?;
        let history = session.history(&node_id).to_vec();
        (node_id, history, session.generation())
    };

    state.begin_request(format!("Asking about {node_id}..."));
    let result = state.backend.chat(&node_id, &text, &history).await;
    state.end_request(match &result {
        Ok(_) => "Answer received.".to_string(),
        Err(e) => format!("Chat failed: {e}"),
    });
    let reply = result.map_err(|e| backend_error("Chat request failed", e))?;

    if let Some(context) = &reply.paper_context {
        debug!(
            "Answer for {node_id} grounded on '{}' ({} sections)",
            context.title,
            context.relevant_sections.len()
        );
    }

    let mut session = state.session();
    if session.generation() != generation || session.node(&node_id).is_none() {
        warn!("Session was reset while waiting for the answer about {node_id}; answer dropped");
        return Err((
            StatusCode::CONFLICT,
            Json(json!({ "error": "The session was reset while waiting for the answer." })),
        ));
    }
    session.append_message(&node_id, Message::user(text));
    session.append_message(&node_id, Message::assistant(reply.response.clone()));
    Ok(Json(ChatResponse {
        history: session.history(&node_id).to_vec(),
        node_id,
        answer: reply.response,
        paper_context: reply.paper_context,
    }))
}

#[axum::debug_handler]
async fn history_handler(
    State(state): State<AppState>,
    Path(node_id): Path<String>,
) -> Json<Vec<Message>> {
    Json(state.session().history(&node_id).to_vec())
}

#[axum::debug_handler]
async fn status_handler(State(state): State<AppState>) -> Json<Status> {
    Json(state.status().clone())
}

#[axum::debug_handler]
async fn backend_health_handler(
    State(state): State<AppState>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let health = state
        .backend
        .health()
        .await
        .map_err(|e| backend_error("Retrieval backend unreachable", e))?;
    Ok(Json(json!({
        "status": "ok",
        "backend_url": state.config.retrieval_api_url.as_str(),
        "backend": health,
    })))
}

#[axum::debug_handler]
async fn shutdown_handler(State(state): State<AppState>) -> impl IntoResponse {
    info!("Shutdown requested.");
    let sender = state
        .shutdown_sender
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .take();
    if let Some(sender) = sender {
        let _ = sender.send(());
    }
    StatusCode::OK
}
