//! Agent services: validation, valuation, recommendation.
//!
//! Each agent composes the same pipeline behind its route: validate the
//! request fields, encode them into facts, run one query in a fresh engine
//! context, decode the raw result into a typed outcome.

pub mod recommendation;
pub mod validation;
pub mod valuation;

use crate::engine::QueryExecutor;
use crate::error::AgentError;
use crate::facts::Term;
use axum::Json;
use serde::Serialize;
use serde_json::Value;

/// The three agent roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    Validation,
    Valuation,
    Recommendation,
}

impl AgentKind {
    /// Human-readable name used in gateway error messages.
    pub fn display_name(self) -> &'static str {
        match self {
            AgentKind::Validation => "Validation",
            AgentKind::Valuation => "Valuation",
            AgentKind::Recommendation => "Recommendation",
        }
    }

    /// The agent's own endpoint path.
    pub fn agent_path(self) -> &'static str {
        match self {
            AgentKind::Validation => "/validate",
            AgentKind::Valuation => "/value",
            AgentKind::Recommendation => "/recommend",
        }
    }

    /// Rule module file loaded by this agent.
    pub fn module_file(self) -> &'static str {
        match self {
            AgentKind::Validation => "validation_rules.metta",
            AgentKind::Valuation => "valuation_rules.metta",
            AgentKind::Recommendation => "recommendation_rules.metta",
        }
    }
}

/// Shared per-agent state: the request executor bound to this agent's
/// rule module.
pub struct AppState {
    pub executor: QueryExecutor,
}

impl AppState {
    pub fn new(executor: QueryExecutor) -> Self {
        Self { executor }
    }
}

/// Parse a request body into a JSON object, or reject it the way the
/// agents report a missing payload.
pub(crate) fn parse_payload(body: &[u8]) -> Result<Value, AgentError> {
    let value: Value = serde_json::from_slice(body)
        .map_err(|_| AgentError::invalid_input("No JSON payload"))?;
    if !value.is_object() {
        return Err(AgentError::invalid_input("No JSON payload"));
    }
    Ok(value)
}

/// Coerce an `area_sqft` field to an integer. Accepts a JSON number
/// (floats truncate) or a numeric string; anything else is a client error.
pub(crate) fn parse_area(value: Option<&Value>, default: i64) -> Result<i64, AgentError> {
    let Some(value) = value else {
        return Ok(default);
    };
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .ok_or_else(|| AgentError::invalid_input("'area_sqft' must be a number.")),
        Value::String(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|_| AgentError::invalid_input("'area_sqft' must be a number.")),
        _ => Err(AgentError::invalid_input("'area_sqft' must be a number.")),
    }
}

/// Extract an optional list-of-strings field; absent defaults to empty,
/// present but not list-shaped is a client error.
pub(crate) fn parse_string_list(
    value: Option<&Value>,
    field: &str,
) -> Result<Vec<String>, AgentError> {
    let Some(value) = value else {
        return Ok(Vec::new());
    };
    let items = value.as_array().ok_or_else(|| {
        AgentError::invalid_input(format!("'{field}' must be a list of strings."))
    })?;
    items
        .iter()
        .map(|item| {
            item.as_str().map(str::to_string).ok_or_else(|| {
                AgentError::invalid_input(format!("'{field}' must be a list of strings."))
            })
        })
        .collect()
}

/// Check a user-supplied id that will be embedded as a bare symbol.
/// Symbols are unquoted in the fact language, so unsafe characters are
/// rejected up front rather than escaped.
pub(crate) fn require_symbol(value: &str, field: &str) -> Result<(), AgentError> {
    if Term::is_safe_symbol(value) {
        Ok(())
    } else {
        Err(AgentError::invalid_input(format!(
            "'{field}' contains characters not allowed in an identifier."
        )))
    }
}

/// Health response shared by every service.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub timestamp: String,
}

pub(crate) fn health_response(service: &'static str) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service,
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn payload_must_be_a_json_object() {
        assert!(parse_payload(b"{}").is_ok());
        assert!(parse_payload(br#"{"a":1}"#).is_ok());
        assert!(parse_payload(b"not json").is_err());
        assert!(parse_payload(b"null").is_err());
        assert!(parse_payload(b"[1,2]").is_err());
    }

    #[test]
    fn area_accepts_numbers_and_numeric_strings() {
        assert_eq!(parse_area(None, 1000).unwrap(), 1000);
        assert_eq!(parse_area(Some(&json!(1200)), 0).unwrap(), 1200);
        assert_eq!(parse_area(Some(&json!(1200.9)), 0).unwrap(), 1200);
        assert_eq!(parse_area(Some(&json!("1200")), 0).unwrap(), 1200);
        assert_eq!(parse_area(Some(&json!(" 1200 ")), 0).unwrap(), 1200);
        assert!(parse_area(Some(&json!("12a0")), 0).is_err());
        assert!(parse_area(Some(&json!([1200])), 0).is_err());
        assert!(parse_area(Some(&json!(null)), 0).is_err());
    }

    #[test]
    fn string_lists_default_and_reject_non_lists() {
        assert!(parse_string_list(None, "documents").unwrap().is_empty());
        assert_eq!(
            parse_string_list(Some(&json!(["deed", "noc"])), "documents").unwrap(),
            vec!["deed".to_string(), "noc".to_string()]
        );
        assert!(parse_string_list(Some(&json!("deed")), "documents").is_err());
        assert!(parse_string_list(Some(&json!([1, 2])), "documents").is_err());
    }
}
