//! Property valuation agent.
//!
//! The subject id only gives the facts a shared key within the query, so
//! a fixed symbol is used rather than anything request-controlled.

use super::{health_response, parse_area, parse_payload, AppState};
use crate::decode::decode_valuation;
use crate::error::{AgentError, ErrorBody};
use crate::facts::{Fact, Query, Term};
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use std::sync::Arc;

/// Fixed fact subject for the one property being valued.
pub const SUBJECT: &str = "temp_prop";

#[derive(Debug, Clone, PartialEq)]
pub struct ValuationRequest {
    pub area_sqft: i64,
    pub location: String,
    pub feature: Option<String>,
}

impl ValuationRequest {
    pub fn from_payload(payload: &Value) -> Result<Self, AgentError> {
        let area_sqft = parse_area(payload.get("area_sqft"), 1000)?;
        let location = payload
            .get("location")
            .and_then(Value::as_str)
            .unwrap_or("Delhi")
            .to_string();
        let feature = payload
            .get("feature")
            .and_then(Value::as_str)
            .map(str::to_string);

        Ok(Self {
            area_sqft,
            location,
            feature,
        })
    }

    pub fn encode_facts(&self) -> Vec<Fact> {
        let subject = Term::sym(SUBJECT);
        let mut facts = vec![
            Fact::new("area-sqft", vec![subject.clone(), Term::Int(self.area_sqft)]),
            Fact::new("location", vec![subject.clone(), Term::str(&self.location)]),
        ];
        if let Some(feature) = &self.feature {
            facts.push(Fact::new("has-feature", vec![subject, Term::str(feature)]));
        }
        facts
    }

    pub fn query(&self) -> Query {
        Query::new("get-valuation-range", vec![Term::sym(SUBJECT)])
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/value", post(value_property))
        .route("/health", get(|| async { health_response("valuation-agent") }))
        .with_state(state)
}

async fn value_property(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request = match parse_payload(&body).and_then(|p| ValuationRequest::from_payload(&p)) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };

    let facts = request.encode_facts();
    let query = request.query();

    let raw = match state.executor.execute(&facts, &query).await {
        Ok(raw) => raw,
        Err(e) => return AgentError::Engine(e).into_response(),
    };

    match decode_valuation(&raw, SUBJECT) {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "could not decode valuation result");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody::new(
                    "Could not compute valuation. Check logs for details.",
                )),
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
        let request = ValuationRequest::from_payload(&json!({})).unwrap();
        assert_eq!(request.area_sqft, 1000);
        assert_eq!(request.location, "Delhi");
        assert!(request.feature.is_none());
    }

    #[test]
    fn feature_adds_one_fact() {
        let without = ValuationRequest::from_payload(&json!({})).unwrap();
        assert_eq!(without.encode_facts().len(), 2);

        let with = ValuationRequest::from_payload(&json!({"feature": "garden"})).unwrap();
        let facts = with.encode_facts();
        assert_eq!(facts.len(), 3);
        assert_eq!(facts[2].to_string(), r#"(has-feature temp_prop "garden")"#);
    }

    #[test]
    fn subject_is_a_bare_symbol() {
        let request = ValuationRequest::from_payload(&json!({"area_sqft": 1500})).unwrap();
        assert_eq!(
            request.encode_facts()[0].to_string(),
            "(area-sqft temp_prop 1500)"
        );
        assert_eq!(request.query().to_string(), "!(get-valuation-range temp_prop)");
    }

    #[test]
    fn non_numeric_area_is_client_error() {
        let err = ValuationRequest::from_payload(&json!({"area_sqft": "big"})).unwrap_err();
        assert!(err.to_string().contains("'area_sqft' must be a number."));
    }
}
