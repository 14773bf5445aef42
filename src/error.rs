//! Error types for the agent services.
//!
//! One variant per failure domain: client input stays at 400 and is
//! reported verbatim, engine and decode failures stay at 500 with the
//! detail going to the log, never to the client.

use crate::decode::DecodeError;
use crate::engine::EngineError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Main error type for agent request handling.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Malformed payload, missing required field, or wrong field type.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The rule engine itself failed during load, assert or query.
    #[error("rule evaluation failed: {0}")]
    Engine(#[from] EngineError),

    /// The engine result did not match the agent's expected grammar.
    #[error("{0}")]
    Decode(#[from] DecodeError),
}

impl AgentError {
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        AgentError::InvalidInput(msg.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AgentError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            AgentError::Engine(_) | AgentError::Decode(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Uniform `{"error": ...}` body.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

impl IntoResponse for AgentError {
    fn into_response(self) -> Response {
        let body = match &self {
            AgentError::InvalidInput(msg) => {
                tracing::warn!(error = %msg, "rejected client input");
                ErrorBody::new(format!("Invalid input: {msg}"))
            }
            AgentError::Engine(e) => {
                tracing::error!(error = %e, "rule engine failure");
                ErrorBody::new("Rule evaluation failed. Check logs for details.")
            }
            AgentError::Decode(e) => {
                tracing::error!(error = %e, "could not decode engine result");
                ErrorBody::new("Could not parse rule engine result. Check logs for details.")
            }
        };
        (self.status_code(), Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_failure_domain() {
        assert_eq!(
            AgentError::invalid_input("x").status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AgentError::Engine(EngineError::Parse("x".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn invalid_input_display_is_client_facing() {
        let err = AgentError::invalid_input("'area_sqft' must be a number.");
        assert_eq!(err.to_string(), "Invalid input: 'area_sqft' must be a number.");
    }
}
