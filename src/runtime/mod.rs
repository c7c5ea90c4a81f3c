//! JavaScript evaluation
//!
//! Webpack configs and proxy setup scripts are code, not data. They are run in
//! a child `node` process by a generated harness program that reports its
//! result on stdout behind a marker line.

pub mod harness;

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, trace};

/// Prefix of the single stdout line carrying the harness result
pub const RESULT_MARKER: &str = "__WP2VITE_RESULT__";

/// A harness program ready to run
#[derive(Debug, Clone)]
pub struct Program {
    /// JavaScript source
    pub source: String,

    /// Working directory of the evaluation (the project root)
    pub cwd: PathBuf,

    /// Extra environment, visible to the child only
    pub env: Vec<(String, String)>,
}

impl Program {
    pub fn new(source: String, cwd: impl Into<PathBuf>) -> Self {
        Self {
            source,
            cwd: cwd.into(),
            env: Vec::new(),
        }
    }

    /// Export the build mode the way webpack configs expect to read it
    pub fn with_mode(mut self, mode: &str) -> Self {
        self.env.push(("NODE_ENV".to_string(), mode.to_string()));
        self.env.push(("BABEL_ENV".to_string(), mode.to_string()));
        self
    }
}

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("cannot start `{node}`: {reason}")]
    Spawn { node: String, reason: String },

    #[error("{0}")]
    Script(String),

    #[error("harness exited without a result ({0})")]
    NoResult(String),

    #[error("harness result is not valid JSON: {0}")]
    BadResult(String),
}

/// Something that can run a harness program and hand back its JSON result
#[async_trait]
pub trait ScriptRuntime: Send + Sync {
    async fn evaluate(&self, program: &Program) -> Result<Value, EvalError>;
}

/// Runs programs with a `node` executable
pub struct NodeRuntime {
    node: String,
}

impl NodeRuntime {
    pub fn new(node: impl Into<String>) -> Self {
        Self { node: node.into() }
    }

    /// Whether the configured executable answers `--version`
    pub async fn is_available(&self) -> bool {
        Command::new(&self.node)
            .arg("--version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .await
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

#[async_trait]
impl ScriptRuntime for NodeRuntime {
    async fn evaluate(&self, program: &Program) -> Result<Value, EvalError> {
        trace!("Evaluating harness in {}", program.cwd.display());

        let output = Command::new(&self.node)
            .arg("-e")
            .arg(&program.source)
            .current_dir(&program.cwd)
            .envs(program.env.iter().map(|(k, v)| (k.as_str(), v.as_str())))
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|e| EvalError::Spawn {
                node: self.node.clone(),
                reason: e.to_string(),
            })?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        let stderr = String::from_utf8_lossy(&output.stderr);
        if !stderr.trim().is_empty() {
            debug!("node stderr: {}", stderr.trim());
        }

        match parse_result(&stdout)? {
            Some(value) => Ok(value),
            None => Err(EvalError::NoResult(last_line(&stderr).unwrap_or_else(|| {
                format!("exit status {}", output.status)
            }))),
        }
    }
}

/// Extract the harness payload from stdout.
///
/// The payload is `{ "ok": true, "value": ... }` or `{ "ok": false, "error": "..." }`;
/// project code may print anything around it.
pub fn parse_result(stdout: &str) -> Result<Option<Value>, EvalError> {
    let Some(line) = stdout
        .lines()
        .rev()
        .find_map(|l| l.strip_prefix(RESULT_MARKER))
    else {
        return Ok(None);
    };

    let payload: Value =
        serde_json::from_str(line).map_err(|e| EvalError::BadResult(e.to_string()))?;

    if payload.get("ok").and_then(Value::as_bool) == Some(true) {
        Ok(Some(payload.get("value").cloned().unwrap_or(Value::Null)))
    } else {
        let error = payload
            .get("error")
            .and_then(Value::as_str)
            .unwrap_or("unknown error")
            .to_string();
        Err(EvalError::Script(error))
    }
}

fn last_line(text: &str) -> Option<String> {
    text.lines()
        .rev()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .map(str::to_string)
}

/// Test double answering every program with a canned value, keyed by a
/// substring of the program source
#[cfg(test)]
pub(crate) struct FakeRuntime {
    pub answers: Vec<(String, Result<Value, String>)>,
    pub seen: std::sync::Mutex<Vec<Program>>,
}

#[cfg(test)]
impl FakeRuntime {
    pub fn new(answers: Vec<(&str, Result<Value, String>)>) -> Self {
        Self {
            answers: answers
                .into_iter()
                .map(|(k, v)| (k.to_string(), v))
                .collect(),
            seen: std::sync::Mutex::new(Vec::new()),
        }
    }
}

#[cfg(test)]
#[async_trait]
impl ScriptRuntime for FakeRuntime {
    async fn evaluate(&self, program: &Program) -> Result<Value, EvalError> {
        self.seen.lock().unwrap().push(program.clone());
        for (needle, answer) in &self.answers {
            if program.source.contains(needle.as_str()) {
                return answer.clone().map_err(EvalError::Script);
            }
        }
        Err(EvalError::NoResult("no canned answer".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_result_ignores_noise() {
        let stdout = format!(
            "Compiling...\n{}{}\nbye\n",
            RESULT_MARKER,
            json!({"ok": true, "value": {"entry": "./src/index.js"}})
        );
        let value = parse_result(&stdout).unwrap().unwrap();
        assert_eq!(value["entry"], "./src/index.js");
    }

    #[test]
    fn test_parse_result_script_error() {
        let stdout = format!(
            "{}{}\n",
            RESULT_MARKER,
            json!({"ok": false, "error": "Error: Cannot find module 'x'"})
        );
        let err = parse_result(&stdout).unwrap_err();
        assert!(err.to_string().contains("Cannot find module"));
    }

    #[test]
    fn test_parse_result_missing() {
        assert!(parse_result("nothing here\n").unwrap().is_none());
    }

    #[test]
    fn test_mode_is_child_env_only() {
        let program = Program::new(String::new(), "/tmp").with_mode("development");
        assert!(program
            .env
            .contains(&("NODE_ENV".to_string(), "development".to_string())));
        assert!(program
            .env
            .contains(&("BABEL_ENV".to_string(), "development".to_string())));
    }
}
