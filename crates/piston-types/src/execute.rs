//! Piston execution backend wire types
//!
//! The backend answers `POST /execute` with one of two shapes on a 200:
//! a success object (`language`/`version`/`run`/`compile?`) or a bare
//! `{"message": …}` object, which covers both throttling and terminal
//! errors. [`ExecOutcome::from_wire`] resolves that union exactly once;
//! nothing downstream re-interprets field presence.

use serde::{Deserialize, Serialize};

/// Marker prefix the backend puts in `message` when rate limiting.
const THROTTLE_MARKER: &str = "requests limited";

/// A job submitted to the execution backend. Immutable once built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecRequest {
    pub language: String,
    /// `"*"` means "latest available".
    pub version: String,
    pub files: Vec<ExecFile>,
    pub args: Vec<String>,
    pub stdin: String,
}

impl ExecRequest {
    pub fn new(language: &str, code: &str, args: Vec<String>, stdin: &str) -> Self {
        Self {
            language: language.to_string(),
            version: "*".to_string(),
            files: vec![ExecFile {
                content: code.to_string(),
            }],
            args,
            stdin: stdin.to_string(),
        }
    }
}

/// One source file in an execution request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecFile {
    pub content: String,
}

/// Output of one execution stage (compile or run).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageOutput {
    #[serde(default)]
    pub stdout: String,
    #[serde(default)]
    pub stderr: String,
    /// Interleaved stdout + stderr as the backend captured it.
    #[serde(default)]
    pub output: String,
    /// Process exit code; absent when the process was killed by a signal.
    #[serde(default)]
    pub code: Option<i64>,
    #[serde(default)]
    pub signal: Option<String>,
}

/// A successful execution.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExecSuccess {
    pub language: String,
    pub version: String,
    pub run: StageOutput,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compile: Option<StageOutput>,
}

impl ExecSuccess {
    /// Compile-stage output prefixed to run-stage output, newline-joined.
    /// This is the string all length accounting operates on.
    pub fn joined_output(&self) -> String {
        match &self.compile {
            Some(compile) => format!("{}\n{}", compile.output, self.run.output),
            None => self.run.output.clone(),
        }
    }
}

/// Raw wire response from `POST /execute`, before resolution.
#[derive(Debug, Clone, Deserialize)]
pub struct ExecWireResponse {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub run: Option<StageOutput>,
    #[serde(default)]
    pub compile: Option<StageOutput>,
}

/// Terminal classification of one backend call.
#[derive(Debug, Clone, PartialEq)]
pub enum ExecOutcome {
    Success(ExecSuccess),
    /// Rate-limited; retried transparently by the queue, never shown
    /// to users.
    Throttled,
    /// Application-level error reported by the backend (unsupported
    /// language, bad request, …). Surfaced to the user as text.
    Error(String),
}

impl ExecOutcome {
    /// Resolve the success-vs-`{message}` union.
    pub fn from_wire(wire: ExecWireResponse) -> Self {
        if let Some(message) = wire.message {
            if message.to_lowercase().starts_with(THROTTLE_MARKER) {
                return Self::Throttled;
            }
            return Self::Error(message);
        }

        match (wire.language, wire.version, wire.run) {
            (Some(language), Some(version), Some(run)) => Self::Success(ExecSuccess {
                language,
                version,
                run,
                compile: wire.compile,
            }),
            _ => Self::Error("malformed response from execution backend".to_string()),
        }
    }

    pub fn is_throttled(&self) -> bool {
        matches!(self, Self::Throttled)
    }
}

/// One runtime advertised by `GET /runtimes`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Runtime {
    pub language: String,
    pub version: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}
