//! Property validation agent.
//!
//! Compiles the request into `kyc-status`, `area-sqft` and `has-document`
//! facts about the property, then asks the rules for a
//! `(status reason)` verdict.

use super::{health_response, parse_area, parse_payload, parse_string_list, AppState};
use crate::decode::decode_validation;
use crate::error::AgentError;
use crate::facts::{Fact, Query, Term};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use std::sync::Arc;

/// Validated request fields, defaults already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRequest {
    pub property_id: String,
    pub kyc_status: String,
    pub area_sqft: i64,
    pub documents: Vec<String>,
}

impl ValidationRequest {
    /// Field-level validation; rejects before any fact is encoded.
    pub fn from_payload(payload: &Value) -> Result<Self, AgentError> {
        let property_id = payload
            .get("property_id")
            .and_then(Value::as_str)
            .ok_or_else(|| AgentError::invalid_input("property_id is required"))?
            .to_string();
        let kyc_status = payload
            .get("kyc_status")
            .and_then(Value::as_str)
            .unwrap_or("pending")
            .to_string();
        let area_sqft = parse_area(payload.get("area_sqft"), 0)?;
        let documents = parse_string_list(payload.get("documents"), "documents")?;

        Ok(Self {
            property_id,
            kyc_status,
            area_sqft,
            documents,
        })
    }

    /// One fact per singular field plus one per document.
    pub fn encode_facts(&self) -> Vec<Fact> {
        let subject = Term::str(&self.property_id);
        let mut facts = vec![
            Fact::new("kyc-status", vec![subject.clone(), Term::str(&self.kyc_status)]),
            Fact::new("area-sqft", vec![subject.clone(), Term::Int(self.area_sqft)]),
        ];
        for doc in &self.documents {
            facts.push(Fact::new("has-document", vec![subject.clone(), Term::str(doc)]));
        }
        facts
    }

    pub fn query(&self) -> Query {
        Query::new(
            "validate-property",
            vec![
                Term::str(&self.property_id),
                Term::Var("status"),
                Term::Var("reason"),
            ],
        )
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/validate", post(validate_property))
        .route("/health", get(|| async { health_response("validation-agent") }))
        .with_state(state)
}

async fn validate_property(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request = match parse_payload(&body).and_then(|p| ValidationRequest::from_payload(&p)) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };

    let facts = request.encode_facts();
    let query = request.query();

    let raw = match state.executor.execute(&facts, &query).await {
        Ok(raw) => raw,
        Err(e) => return AgentError::Engine(e).into_response(),
    };

    match decode_validation(&raw, &request.property_id) {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => {
            tracing::error!(error = %e, property_id = %request.property_id,
                "could not decode validation result");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "property_id": request.property_id,
                    "status": "ERROR",
                    "reason": "Could not parse validation result. Check logs.",
                })),
            )
                .into_response()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn applies_documented_defaults() {
        let payload = json!({"property_id": "p1"});
        let request = ValidationRequest::from_payload(&payload).unwrap();
        assert_eq!(request.kyc_status, "pending");
        assert_eq!(request.area_sqft, 0);
        assert!(request.documents.is_empty());
    }

    #[test]
    fn missing_property_id_is_client_error() {
        let err = ValidationRequest::from_payload(&json!({})).unwrap_err();
        assert!(err.to_string().contains("property_id is required"));
    }

    #[test]
    fn numeric_string_area_parses() {
        let payload = json!({"property_id": "p1", "area_sqft": "1200"});
        let request = ValidationRequest::from_payload(&payload).unwrap();
        assert_eq!(request.area_sqft, 1200);
    }

    #[test]
    fn fact_count_is_singulars_plus_list_length() {
        let payload = json!({
            "property_id": "p1",
            "kyc_status": "verified",
            "area_sqft": 1200,
            "documents": ["deed", "noc", "tax-receipt"],
        });
        let request = ValidationRequest::from_payload(&payload).unwrap();
        let facts = request.encode_facts();
        assert_eq!(facts.len(), 2 + 3);
        assert_eq!(
            facts[0].to_string(),
            r#"(kyc-status "p1" "verified")"#
        );
        assert_eq!(facts[1].to_string(), r#"(area-sqft "p1" 1200)"#);
        assert_eq!(
            facts[4].to_string(),
            r#"(has-document "p1" "tax-receipt")"#
        );
    }

    #[test]
    fn hostile_property_id_stays_quoted() {
        let payload = json!({"property_id": r#"p1") (evil-fact ("x"#});
        let request = ValidationRequest::from_payload(&payload).unwrap();
        let rendered = request.encode_facts()[0].to_string();
        // The embedded quote is escaped, so the fact is still one statement.
        assert_eq!(
            rendered,
            r#"(kyc-status "p1\") (evil-fact (\"x" "pending")"#
        );
    }
}
