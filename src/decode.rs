//! Decoders from raw engine results to typed outcomes.
//!
//! Each agent has its own result grammar over the same ambiguous nested
//! shape, so each gets its own decoder. All three are total: any input
//! yields either a typed outcome or a [`DecodeError`], never a panic and
//! never a partially populated value.
//!
//! Validation and valuation produce a single authoritative answer, so a
//! malformed shape is unambiguous failure. Recommendation produces an
//! unordered collection where partial success retains value, so malformed
//! rows are skipped individually.

use crate::engine::{EngineResult, EngineValue};
use serde::Serialize;
use std::collections::BTreeSet;

/// Reason reported when the rule module yields no validation rows.
pub const NO_RULE_MATCHED: &str = "No matching validation rule found.";

/// Engine result did not match the agent's expected grammar.
#[derive(Debug, thiserror::Error)]
#[error("unexpected engine result shape: {cause} (raw: {raw})")]
pub struct DecodeError {
    pub cause: String,
    pub raw: String,
}

impl DecodeError {
    fn new(cause: impl Into<String>, raw: &EngineResult) -> Self {
        Self {
            cause: cause.into(),
            raw: raw.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValidationOutcome {
    pub property_id: String,
    pub status: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValuationOutcome {
    pub property_id: String,
    pub valuation_range: ValuationRange,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValuationRange {
    pub lower_bound: f64,
    pub upper_bound: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecommendationOutcome {
    pub user_id: String,
    pub recommendations: BTreeSet<String>,
}

/// Decode a validation result.
///
/// Expected row shape: `(STATUS)` or `(STATUS REASON)` of atoms. An empty
/// result set is a legitimate "no rule fired" outcome, not a decode error.
pub fn decode_validation(
    raw: &EngineResult,
    property_id: &str,
) -> Result<ValidationOutcome, DecodeError> {
    let Some(first) = raw.rows.first() else {
        return Ok(ValidationOutcome {
            property_id: property_id.to_string(),
            status: "REJECTED".to_string(),
            reason: NO_RULE_MATCHED.to_string(),
        });
    };

    let parts = first
        .as_seq()
        .ok_or_else(|| DecodeError::new("validation row is not a sequence", raw))?;
    let (status, reason) = match parts {
        [status] => (status, None),
        [status, reason] => (status, Some(reason)),
        _ => {
            return Err(DecodeError::new(
                format!("expected 1 or 2 elements in validation row, got {}", parts.len()),
                raw,
            ))
        }
    };

    let status = status
        .as_text()
        .ok_or_else(|| DecodeError::new("validation status is not atomic", raw))?;
    let reason = match reason {
        Some(value) => value
            .as_text()
            .ok_or_else(|| DecodeError::new("validation reason is not atomic", raw))?,
        None => "OK",
    };

    Ok(ValidationOutcome {
        property_id: property_id.to_string(),
        status: status.to_string(),
        reason: reason.to_string(),
    })
}

/// Decode a valuation result: exactly one row of exactly two numerics.
pub fn decode_valuation(
    raw: &EngineResult,
    property_id: &str,
) -> Result<ValuationOutcome, DecodeError> {
    let [row] = raw.rows.as_slice() else {
        return Err(DecodeError::new(
            format!("expected exactly one valuation row, got {}", raw.rows.len()),
            raw,
        ));
    };

    let parts = row
        .as_seq()
        .ok_or_else(|| DecodeError::new("valuation row is not a sequence", raw))?;
    let [lower, upper] = parts else {
        return Err(DecodeError::new(
            format!("expected 2 bounds in valuation row, got {}", parts.len()),
            raw,
        ));
    };

    let lower_bound = lower
        .as_f64()
        .ok_or_else(|| DecodeError::new("lower bound is not numeric", raw))?;
    let upper_bound = upper
        .as_f64()
        .ok_or_else(|| DecodeError::new("upper bound is not numeric", raw))?;

    Ok(ValuationOutcome {
        property_id: property_id.to_string(),
        valuation_range: ValuationRange {
            lower_bound,
            upper_bound,
        },
    })
}

/// Decode a recommendation result: each row is a one-element sequence
/// holding one atom. Malformed rows are skipped and logged, never fatal;
/// duplicates collapse into the set.
pub fn decode_recommendations(raw: &EngineResult, user_id: &str) -> RecommendationOutcome {
    let mut recommendations = BTreeSet::new();
    for row in &raw.rows {
        match row.as_seq() {
            Some([atom]) => match atom.as_text() {
                Some(id) => {
                    recommendations.insert(id.to_string());
                }
                None => {
                    tracing::warn!(row = %row, "skipping non-atomic recommendation row");
                }
            },
            _ => {
                tracing::warn!(row = %row, "skipping malformed recommendation row");
            }
        }
    }

    RecommendationOutcome {
        user_id: user_id.to_string(),
        recommendations,
    }
}
