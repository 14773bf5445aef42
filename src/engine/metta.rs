//! Subprocess-backed MeTTa engine.
//!
//! Each `evaluate` call writes a one-shot script (module import, facts in
//! order, then the query) and runs it in a fresh interpreter process. The
//! process boundary is what gives per-request isolation: no space, fact or
//! rule state can leak between requests, and teardown happens on every
//! exit path when the guard drops.

use super::{sexpr, EngineError, EngineResult, RuleEngine, RuleModule};
use crate::facts::{Fact, Query};
use std::fmt::Write as _;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;
use tokio::process::Command;
use uuid::Uuid;

/// Rule engine that shells out to a MeTTa interpreter binary.
pub struct MettaProcessEngine {
    binary: PathBuf,
}

impl MettaProcessEngine {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    fn render_script(module: &RuleModule, facts: &[Fact], query: &Query) -> String {
        let mut script = String::new();
        let _ = writeln!(script, "!(import! &self {})", module.path.display());
        for fact in facts {
            let _ = writeln!(script, "{fact}");
        }
        let _ = writeln!(script, "{query}");
        script
    }

    async fn run(&self, script: String) -> Result<EngineResult, EngineError> {
        let guard = ScriptFile::create(&script).await?;

        let output = Command::new(&self.binary)
            .arg(&guard.path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| EngineError::Spawn(format!("{}: {e}", self.binary.display())))?;

        if !output.status.success() {
            return Err(EngineError::Process {
                code: output.status.code().unwrap_or(-1),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        // One printed line per `!` expression; the query is the last one.
        let stdout = String::from_utf8_lossy(&output.stdout);
        let line = stdout
            .lines()
            .rev()
            .map(str::trim)
            .find(|l| !l.is_empty())
            .ok_or_else(|| EngineError::Parse("engine produced no output".into()))?;

        let rows = sexpr::parse_results(line)?;
        Ok(EngineResult { rows })
    }
}

impl RuleEngine for MettaProcessEngine {
    fn evaluate<'a>(
        &'a self,
        module: &'a RuleModule,
        facts: &'a [Fact],
        query: &'a Query,
    ) -> Pin<Box<dyn Future<Output = Result<EngineResult, EngineError>> + Send + 'a>> {
        Box::pin(async move {
            let script = Self::render_script(module, facts, query);
            self.run(script).await
        })
    }
}

/// Temp script removed when the guard drops, including on error paths.
struct ScriptFile {
    path: PathBuf,
}

impl ScriptFile {
    async fn create(contents: &str) -> Result<Self, EngineError> {
        let path = std::env::temp_dir().join(format!("property-agents-{}.metta", Uuid::new_v4()));
        tokio::fs::write(&path, contents).await?;
        Ok(Self { path })
    }
}

impl Drop for ScriptFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}
