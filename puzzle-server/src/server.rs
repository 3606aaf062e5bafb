//! HTTP and WebSocket endpoints

use crate::error::TransportError;
use crate::executor::Executor;
use crate::session::{Session, Transport};
use async_trait::async_trait;
use axum::Json;
use axum::Router;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use puzzle_solver::{Identifier, ProblemRegistry, Update};
use serde::Deserialize;
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, error};

/// Shared state passed to handlers
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ProblemRegistry>,
    pub executor: Arc<Executor>,
}

impl AppState {
    pub fn new(registry: Arc<ProblemRegistry>, executor: Arc<Executor>) -> Self {
        Self { registry, executor }
    }
}

/// Build the router with all routes
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/solve/{source}/{year}/{author}/{set}/{problem}", get(solve_handler))
        .route("/problems", get(problems_handler))
        .route("/health", get(health_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Serve until `shutdown` resolves
pub async fn serve<F>(listener: TcpListener, state: AppState, shutdown: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown)
        .await
}

#[derive(Debug, Deserialize)]
struct SolvePath {
    source: String,
    year: u16,
    author: String,
    set: String,
    problem: String,
}

/// Resolve the problem, then upgrade
///
/// The upgrade extractor comes first so plain HTTP requests are turned away before
/// anything is looked up. Unknown problems are answered with 404 and no socket.
async fn solve_handler(
    ws: WebSocketUpgrade,
    Path(path): Path<SolvePath>,
    State(state): State<AppState>,
) -> Response {
    let id = match Identifier::new(path.source, path.year, path.author, path.set, path.problem) {
        Ok(id) => id,
        Err(e) => return (StatusCode::BAD_REQUEST, e.to_string()).into_response(),
    };

    let Some(problem) = state.registry.get(&id) else {
        debug!(%id, "no such problem");
        return (StatusCode::NOT_FOUND, format!("No problem registered at {id}")).into_response();
    };

    let session = Session::new(id, problem, state.executor);
    ws.on_upgrade(move |mut socket| async move {
        // Failures are logged by the session itself.
        let _ = session.run(&mut socket).await;
    })
}

async fn problems_handler(State(state): State<AppState>) -> Response {
    match state.registry.validated_snapshot() {
        Ok(snapshot) => Json(snapshot).into_response(),
        Err(e) => {
            error!(error = %e, "problem metadata failed validation");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

#[async_trait]
impl Transport for WebSocket {
    async fn receive_input(&mut self) -> Result<String, TransportError> {
        while let Some(message) = self.recv().await {
            match message.map_err(|e| TransportError::Io(e.to_string()))? {
                Message::Text(text) => return Ok(text.to_string()),
                Message::Binary(bytes) => {
                    return String::from_utf8(bytes.to_vec()).map_err(|_| TransportError::InvalidInput);
                }
                Message::Close(_) => break,
                Message::Ping(_) | Message::Pong(_) => {}
            }
        }
        Err(TransportError::Closed)
    }

    async fn send(&mut self, update: &Update) -> Result<(), TransportError> {
        let json = serde_json::to_string(update)?;
        WebSocket::send(self, Message::Text(json.into()))
            .await
            .map_err(|e| TransportError::Io(e.to_string()))
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        WebSocket::send(self, Message::Close(None))
            .await
            .map_err(|e| TransportError::Io(e.to_string()))
    }
}
