//! Rule-evaluation engine seam.
//!
//! The engine itself is an external collaborator; this module owns the
//! contract with it: a fresh, request-scoped evaluation context that loads
//! one fixed rule module, asserts the request's facts in order, runs
//! exactly one query and hands back the raw nested result.

pub mod metta;
pub mod sexpr;

use crate::facts::{Fact, Query};
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

/// One node of the engine's untyped nested result.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineValue {
    Sym(String),
    Str(String),
    Int(i64),
    Float(f64),
    Seq(Vec<EngineValue>),
}

impl EngineValue {
    /// Child values if this node is a sequence.
    pub fn as_seq(&self) -> Option<&[EngineValue]> {
        match self {
            EngineValue::Seq(items) => Some(items),
            _ => None,
        }
    }

    /// Atomic text of a symbol or string node.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            EngineValue::Sym(s) | EngineValue::Str(s) => Some(s),
            _ => None,
        }
    }

    /// Numeric value of an int or float node.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            EngineValue::Int(n) => Some(*n as f64),
            EngineValue::Float(n) => Some(*n),
            _ => None,
        }
    }
}

impl std::fmt::Display for EngineValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineValue::Sym(s) => write!(f, "{s}"),
            EngineValue::Str(s) => write!(f, "\"{}\"", crate::facts::sanitize(s)),
            EngineValue::Int(n) => write!(f, "{n}"),
            EngineValue::Float(n) => write!(f, "{n}"),
            EngineValue::Seq(items) => {
                write!(f, "(")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{item}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Raw result of one query: zero or more result rows.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EngineResult {
    pub rows: Vec<EngineValue>,
}

impl std::fmt::Display for EngineResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[")?;
        for (i, row) in self.rows.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{row}")?;
        }
        write!(f, "]")
    }
}

/// A named, pre-authored rule module. Fixed per agent at construction;
/// request data never selects the module.
#[derive(Debug, Clone)]
pub struct RuleModule {
    pub path: PathBuf,
}

impl RuleModule {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

/// Engine failures are fatal for the request and never retried here.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("failed to start rule engine: {0}")]
    Spawn(String),

    #[error("rule engine I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("rule engine exited with {code}: {stderr}")]
    Process { code: i32, stderr: String },

    #[error("unparseable engine output: {0}")]
    Parse(String),
}

/// Seam for the external rule-evaluation engine.
///
/// Implementations must give every `evaluate` call a fresh, isolated
/// context; nothing asserted for one request may be visible to another.
pub trait RuleEngine: Send + Sync {
    fn evaluate<'a>(
        &'a self,
        module: &'a RuleModule,
        facts: &'a [Fact],
        query: &'a Query,
    ) -> Pin<Box<dyn Future<Output = Result<EngineResult, EngineError>> + Send + 'a>>;
}

/// Per-agent executor: one fixed rule module, one query per request.
#[derive(Clone)]
pub struct QueryExecutor {
    engine: Arc<dyn RuleEngine>,
    module: RuleModule,
}

impl QueryExecutor {
    pub fn new(engine: Arc<dyn RuleEngine>, module: RuleModule) -> Self {
        Self { engine, module }
    }

    /// Assert `facts` in order into a fresh context and run `query` once.
    pub async fn execute(&self, facts: &[Fact], query: &Query) -> Result<EngineResult, EngineError> {
        tracing::info!(query = %query, fact_count = facts.len(), "running rule query");
        let result = self.engine.evaluate(&self.module, facts, query).await?;
        tracing::info!(result = %result, "rule query returned");
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn engine_value_accessors() {
        assert_eq!(EngineValue::Int(3).as_f64(), Some(3.0));
        assert_eq!(EngineValue::Float(2.5).as_f64(), Some(2.5));
        assert_eq!(EngineValue::Sym("APPROVED".into()).as_text(), Some("APPROVED"));
        assert_eq!(EngineValue::Str("OK".into()).as_text(), Some("OK"));
        assert!(EngineValue::Seq(vec![]).as_text().is_none());
        assert!(EngineValue::Sym("x".into()).as_seq().is_none());
    }

    #[test]
    fn engine_result_display_is_loggable() {
        let result = EngineResult {
            rows: vec![EngineValue::Seq(vec![
                EngineValue::Sym("APPROVED".into()),
                EngineValue::Str("OK".into()),
            ])],
        };
        assert_eq!(result.to_string(), r#"[(APPROVED "OK")]"#);
    }
}
