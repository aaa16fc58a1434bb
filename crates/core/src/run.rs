use std::fmt;

use chrono::{DateTime, Local};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    error::{ErrorKind, PipelineError},
    types::AnalysisResult,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Running,
    Succeeded,
    Failed,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Succeeded | Phase::Failed)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub timestamp: DateTime<Local>,
    pub message: String,
    pub severity: Severity,
}

impl LogEntry {
    pub fn new(message: impl Into<String>, severity: Severity) -> Self {
        Self {
            timestamp: Local::now(),
            message: message.into(),
            severity,
        }
    }

    /// Wall-clock time as HH:MM:SS.
    pub fn clock(&self) -> String {
        self.timestamp.format("%H:%M:%S").to_string()
    }
}

/// Pipeline stages, named after what they do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    #[serde(rename = "media.encode")]
    Encode,
    #[serde(rename = "request.build")]
    BuildRequest,
    #[serde(rename = "model.invoke")]
    InvokeModel,
    #[serde(rename = "result.decode")]
    DecodeResult,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Encode => "media.encode",
            Stage::BuildRequest => "request.build",
            Stage::InvokeModel => "model.invoke",
            Stage::DecodeResult => "result.decode",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageFailure {
    pub stage: Stage,
    pub kind: ErrorKind,
    pub message: String,
}

impl StageFailure {
    pub fn new(stage: Stage, error: &PipelineError) -> Self {
        Self {
            stage,
            kind: error.kind(),
            message: error.to_string(),
        }
    }
}

/// Observable state of the current (or last) run.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    pub run_id: Option<Uuid>,
    pub phase: Phase,
    pub log: Vec<LogEntry>,
    pub result: Option<AnalysisResult>,
    pub failure: Option<StageFailure>,
}

impl Default for PipelineRun {
    fn default() -> Self {
        Self::idle()
    }
}

impl PipelineRun {
    pub fn idle() -> Self {
        Self {
            run_id: None,
            phase: Phase::Idle,
            log: Vec::new(),
            result: None,
            failure: None,
        }
    }

    pub(crate) fn start(run_id: Uuid) -> Self {
        Self {
            run_id: Some(run_id),
            phase: Phase::Running,
            ..Self::idle()
        }
    }

    /// Append to the log. Only a running pipeline accepts entries.
    pub(crate) fn record(&mut self, entry: LogEntry) -> bool {
        if self.phase != Phase::Running {
            return false;
        }
        self.log.push(entry);
        true
    }

    pub(crate) fn succeed(&mut self, result: AnalysisResult) {
        self.phase = Phase::Succeeded;
        self.result = Some(result);
    }

    pub(crate) fn fail(&mut self, failure: StageFailure) {
        self.phase = Phase::Failed;
        self.result = None;
        self.failure = Some(failure);
    }
}
