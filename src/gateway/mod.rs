//! Gateway: forwards browser-facing requests to the agent services and
//! normalizes the three failure domains onto one client-visible contract.
//!
//! Per request: method check, body parse, one forward attempt, then map
//! the upstream outcome. Application-level errors produced by an agent
//! pass through unchanged; only transport problems are synthesized here.

pub mod client;

use crate::agents::AgentKind;
use crate::config::GatewayConfig;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::{Json, Router};
use client::ForwardClient;
use serde_json::{json, Value};
use std::sync::Arc;

pub struct GatewayState {
    client: ForwardClient,
}

impl GatewayState {
    pub fn new(config: GatewayConfig) -> Self {
        Self {
            client: ForwardClient::new(config),
        }
    }
}

pub fn router(state: Arc<GatewayState>) -> Router {
    Router::new()
        .route("/api/validate/", any(validate_proxy))
        .route("/api/validate", any(validate_proxy))
        .route("/api/value/", any(valuation_proxy))
        .route("/api/value", any(valuation_proxy))
        .route("/api/recommend/", any(recommendation_proxy))
        .route("/api/recommend", any(recommendation_proxy))
        .route(
            "/health",
            get(|| async { crate::agents::health_response("gateway") }),
        )
        .with_state(state)
}

async fn validate_proxy(
    State(state): State<Arc<GatewayState>>,
    method: Method,
    body: Bytes,
) -> Response {
    proxy(&state, AgentKind::Validation, method, body).await
}

async fn valuation_proxy(
    State(state): State<Arc<GatewayState>>,
    method: Method,
    body: Bytes,
) -> Response {
    proxy(&state, AgentKind::Valuation, method, body).await
}

async fn recommendation_proxy(
    State(state): State<Arc<GatewayState>>,
    method: Method,
    body: Bytes,
) -> Response {
    proxy(&state, AgentKind::Recommendation, method, body).await
}

async fn proxy(state: &GatewayState, kind: AgentKind, method: Method, body: Bytes) -> Response {
    if method != Method::POST {
        return (
            StatusCode::METHOD_NOT_ALLOWED,
            Json(json!({"error": "Only POST method is allowed"})),
        )
            .into_response();
    }

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(json!({"error": "Invalid JSON in request body"})),
            )
                .into_response()
        }
    };

    let reply = match state.client.forward(kind, &payload).await {
        Ok(reply) => reply,
        Err(e) => {
            tracing::error!(agent = kind.display_name(), error = %e, "upstream unreachable");
            return (
                StatusCode::BAD_GATEWAY,
                Json(json!({"error": e.to_string(), "status": "ERROR"})),
            )
                .into_response();
        }
    };

    let status =
        StatusCode::from_u16(reply.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

    // The gateway is transparent to application-level errors: whatever
    // JSON the agent produced goes back byte-for-byte at its status.
    if serde_json::from_slice::<Value>(&reply.body).is_ok() {
        return (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            reply.body,
        )
            .into_response();
    }

    tracing::error!(
        agent = kind.display_name(),
        status = reply.status,
        "non-JSON body from upstream"
    );
    (
        status,
        Json(json!({
            "error": format!("Invalid response from {} Agent", kind.display_name()),
            "status": "ERROR",
        })),
    )
        .into_response()
}
