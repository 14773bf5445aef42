//! Property recommendation agent.
//!
//! Property and user ids end up as bare symbols in the fact language, so
//! they go through the atom-safety check before anything is encoded.

use super::{health_response, parse_payload, parse_string_list, require_symbol, AppState};
use crate::decode::decode_recommendations;
use crate::error::AgentError;
use crate::facts::{Fact, Query, Term};
use axum::body::Bytes;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use std::sync::Arc;

/// One known property the rules can recommend from.
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyEntry {
    pub id: String,
    pub location: String,
    pub property_type: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationRequest {
    pub user_id: String,
    pub user_history: Vec<String>,
    pub all_properties: Vec<PropertyEntry>,
}

impl RecommendationRequest {
    pub fn from_payload(payload: &Value) -> Result<Self, AgentError> {
        let user_id = payload
            .get("user_id")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| AgentError::invalid_input("user_id is required"))?
            .to_string();
        require_symbol(&user_id, "user_id")?;

        let user_history = parse_string_list(payload.get("user_history"), "user_history")?;
        for viewed in &user_history {
            require_symbol(viewed, "user_history")?;
        }

        let all_properties = match payload.get("all_properties") {
            None => Vec::new(),
            Some(value) => {
                let entries = value.as_array().ok_or_else(|| {
                    AgentError::invalid_input("'all_properties' must be a list.")
                })?;
                let mut properties = Vec::new();
                for entry in entries {
                    // Entries missing any of the three fields carry no
                    // usable facts and are skipped.
                    let (Some(id), Some(location), Some(property_type)) = (
                        entry.get("id").and_then(Value::as_str),
                        entry.get("location").and_then(Value::as_str),
                        entry.get("type").and_then(Value::as_str),
                    ) else {
                        tracing::warn!(entry = %entry, "skipping incomplete property entry");
                        continue;
                    };
                    require_symbol(id, "all_properties[].id")?;
                    properties.push(PropertyEntry {
                        id: id.to_string(),
                        location: location.to_string(),
                        property_type: property_type.to_string(),
                    });
                }
                properties
            }
        };

        Ok(Self {
            user_id,
            user_history,
            all_properties,
        })
    }

    /// Two facts per property, one `viewed-by` fact per history entry.
    pub fn encode_facts(&self) -> Vec<Fact> {
        let mut facts = Vec::new();
        for property in &self.all_properties {
            let id = Term::sym(&property.id);
            facts.push(Fact::new("location", vec![id.clone(), Term::str(&property.location)]));
            facts.push(Fact::new("type", vec![id, Term::str(&property.property_type)]));
        }
        for viewed in &self.user_history {
            facts.push(Fact::new(
                "viewed-by",
                vec![Term::sym(&self.user_id), Term::sym(viewed)],
            ));
        }
        facts
    }

    pub fn query(&self) -> Query {
        Query::new(
            "should-recommend",
            vec![Term::sym(&self.user_id), Term::Var("rec")],
        )
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/recommend", post(recommend_properties))
        .route(
            "/health",
            get(|| async { health_response("recommendation-agent") }),
        )
        .with_state(state)
}

async fn recommend_properties(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request = match parse_payload(&body).and_then(|p| RecommendationRequest::from_payload(&p)) {
        Ok(request) => request,
        Err(e) => return e.into_response(),
    };

    let facts = request.encode_facts();
    let query = request.query();

    match state.executor.execute(&facts, &query).await {
        Ok(raw) => Json(decode_recommendations(&raw, &request.user_id)).into_response(),
        Err(e) => AgentError::Engine(e).into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn full_payload() -> Value {
        json!({
            "user_id": "u1",
            "user_history": ["prop1"],
            "all_properties": [
                {"id": "prop1", "location": "Delhi", "type": "apartment"},
                {"id": "prop2", "location": "Mumbai", "type": "villa"},
            ],
        })
    }

    #[test]
    fn missing_user_id_is_client_error() {
        let err = RecommendationRequest::from_payload(&json!({})).unwrap_err();
        assert!(err.to_string().contains("user_id is required"));
    }

    #[test]
    fn fact_count_covers_properties_and_history() {
        let request = RecommendationRequest::from_payload(&full_payload()).unwrap();
        let facts = request.encode_facts();
        // Two per property plus one per viewed id.
        assert_eq!(facts.len(), 2 * 2 + 1);
        assert_eq!(facts[0].to_string(), r#"(location prop1 "Delhi")"#);
        assert_eq!(facts[1].to_string(), r#"(type prop1 "apartment")"#);
        assert_eq!(facts[4].to_string(), "(viewed-by u1 prop1)");
    }

    #[test]
    fn incomplete_property_entries_are_skipped() {
        let payload = json!({
            "user_id": "u1",
            "all_properties": [
                {"id": "prop1", "location": "Delhi"},
                {"id": "prop2", "location": "Mumbai", "type": "villa"},
                "not an object",
            ],
        });
        let request = RecommendationRequest::from_payload(&payload).unwrap();
        assert_eq!(request.all_properties.len(), 1);
        assert_eq!(request.all_properties[0].id, "prop2");
    }

    #[test]
    fn unsafe_ids_are_rejected_not_encoded() {
        let payload = json!({"user_id": "u1) (viewed-by u1 prop9"});
        assert!(RecommendationRequest::from_payload(&payload).is_err());

        let payload = json!({"user_id": "u1", "user_history": ["prop$rec"]});
        assert!(RecommendationRequest::from_payload(&payload).is_err());
    }

    #[test]
    fn query_binds_one_variable() {
        let request = RecommendationRequest::from_payload(&json!({"user_id": "u1"})).unwrap();
        assert_eq!(request.query().to_string(), "!(should-recommend u1 $rec)");
    }
}
