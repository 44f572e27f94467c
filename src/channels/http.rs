//! HTTP channel — JSON chat endpoint in front of the dialogue router.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{ChannelError, RouteError};
use crate::router::DialogueRouter;

/// Header carrying an explicit session token.
pub const SESSION_HEADER: &str = "x-session-id";

/// Shared state for chat routes.
#[derive(Clone)]
pub struct HttpState {
    pub router: Arc<DialogueRouter>,
}

#[derive(Debug, Deserialize)]
struct AskRequest {
    #[serde(default)]
    question: String,
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Debug, Serialize)]
struct AskResponse {
    answer: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
}

fn error_response(status: StatusCode, error: &'static str) -> Response {
    (status, Json(ErrorBody { error })).into_response()
}

/// Build the chat REST routes.
pub fn chat_routes(router: Arc<DialogueRouter>) -> Router {
    Router::new()
        .route("/api/ask", post(ask).fallback(method_not_allowed))
        .route("/health", get(health))
        .with_state(HttpState { router })
}

/// Serve `app` on `listener`, exposing peer addresses to handlers.
pub async fn serve<F>(listener: TcpListener, app: Router, shutdown: F) -> Result<(), ChannelError>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown)
    .await
    .map_err(|e| ChannelError::StartupFailed {
        name: "http".to_string(),
        reason: e.to_string(),
    })
}

/// Pick the session key: explicit header, then body field, then peer IP.
fn resolve_user_id(headers: &HeaderMap, body_session: Option<&str>, peer: SocketAddr) -> String {
    headers
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .or_else(|| body_session.map(str::trim).filter(|v| !v.is_empty()))
        .map(str::to_string)
        .unwrap_or_else(|| peer.ip().to_string())
}

/// POST /api/ask
///
/// Body: `{"question": "...", "session_id": "..."}`. Returns `{"answer": "..."}`
/// or `{"error": "..."}` with a 4xx/5xx status.
async fn ask(
    State(state): State<HttpState>,
    ConnectInfo(peer): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let request_id = Uuid::new_v4();

    let request: AskRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            let err = ChannelError::InvalidMessage(e.to_string());
            warn!(%request_id, "{}", err);
            return error_response(StatusCode::BAD_REQUEST, "JSON inválido.");
        }
    };

    let user_id = resolve_user_id(&headers, request.session_id.as_deref(), peer);
    let timeout = state.router.responder_timeout();

    match state
        .router
        .route_detailed(&user_id, &request.question, timeout)
        .await
    {
        Ok(reply) => {
            info!(%request_id, user_id = %user_id, path = %reply.path, "Answered");
            Json(AskResponse { answer: reply.text }).into_response()
        }
        Err(RouteError::EmptyMessage) => {
            warn!(%request_id, user_id = %user_id, "Question not provided");
            error_response(StatusCode::BAD_REQUEST, "Pergunta não fornecida.")
        }
        Err(e @ RouteError::ResponderUnavailable { .. }) => {
            warn!(%request_id, user_id = %user_id, "{}", e);
            error_response(StatusCode::SERVICE_UNAVAILABLE, "Erro ao gerar resposta.")
        }
        Err(e @ RouteError::ResponderTimeout { .. }) => {
            warn!(%request_id, user_id = %user_id, "{}", e);
            error_response(StatusCode::GATEWAY_TIMEOUT, "Tempo esgotado ao gerar resposta.")
        }
    }
}

async fn method_not_allowed() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Método não permitido.")
}

/// GET /health
///
/// Reports responder readiness and the number of live sessions.
async fn health(State(state): State<HttpState>) -> impl IntoResponse {
    let responder = state.router.responder();
    let (status, error) = match responder.health_check().await {
        Ok(()) => ("ok", None),
        Err(e) => ("degraded", Some(e.to_string())),
    };
    let mut body = serde_json::json!({
        "status": status,
        "responder": responder.model_name(),
        "sessions": state.router.sessions().len().await,
    });
    if let Some(error) = error {
        body["error"] = serde_json::Value::String(error);
    }
    Json(body)
}
