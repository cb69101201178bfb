//! Execution state models

use crate::core::{decision::PipelineDecision, report::ReportOutcome};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use uuid::Uuid;

/// Overall run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionStatus {
    /// Run has not started
    Pending,
    /// Run is in progress
    Running,
    /// Every stage finished
    Completed,
    /// A fatal error aborted the run
    Failed,
}

/// Pipeline stages, in the only order they can be reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum PipelineStage {
    Idle,
    BinaryReady,
    DataReady,
    ReportsGenerated,
    Cleaned,
}

/// How a single report request ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportStatus {
    Generated { output_dir: PathBuf },
    Skipped { reason: String },
    Failed { error: String },
}

impl From<ReportOutcome> for ReportStatus {
    fn from(outcome: ReportOutcome) -> Self {
        match outcome {
            ReportOutcome::Generated { output_dir } => ReportStatus::Generated { output_dir },
            ReportOutcome::Skipped { reason } => ReportStatus::Skipped { reason },
        }
    }
}

/// One line of the final summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRecord {
    pub name: String,
    #[serde(flatten)]
    pub status: ReportStatus,
}

/// Everything a run did, for the final summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Unique execution ID
    pub execution_id: Uuid,

    pub status: ExecutionStatus,

    /// Furthest stage reached
    pub stage: PipelineStage,

    pub started_at: Option<DateTime<Utc>>,

    pub completed_at: Option<DateTime<Utc>>,

    /// Whether the rendering tool was (re)built during this run
    pub binary_built: bool,

    /// Generator decision, once the data stage ran
    pub decision: Option<PipelineDecision>,

    pub reports: Vec<ReportRecord>,

    /// Whether cleanup deleted the binary
    pub binary_cleaned: bool,

    /// Diagnostic of the fatal error, if any
    pub error: Option<String>,
}

impl RunSummary {
    pub fn new() -> Self {
        Self {
            execution_id: Uuid::new_v4(),
            status: ExecutionStatus::Pending,
            stage: PipelineStage::Idle,
            started_at: None,
            completed_at: None,
            binary_built: false,
            decision: None,
            reports: Vec::new(),
            binary_cleaned: false,
            error: None,
        }
    }

    /// Mark the run as started
    pub fn start(&mut self) {
        self.status = ExecutionStatus::Running;
        self.started_at = Some(Utc::now());
    }

    /// Move to `stage`; stages never go backwards
    pub fn advance(&mut self, stage: PipelineStage) {
        if stage > self.stage {
            self.stage = stage;
        }
    }

    pub fn record_report(&mut self, name: impl Into<String>, status: ReportStatus) {
        self.reports.push(ReportRecord {
            name: name.into(),
            status,
        });
    }

    /// Mark the run as completed
    pub fn complete(&mut self) {
        self.status = ExecutionStatus::Completed;
        self.completed_at = Some(Utc::now());
    }

    /// Mark the run as failed
    pub fn fail(&mut self, error: impl Into<String>) {
        self.status = ExecutionStatus::Failed;
        self.error = Some(error.into());
        self.completed_at = Some(Utc::now());
    }

    /// (generated, failed, skipped) report counts
    pub fn counts(&self) -> (usize, usize, usize) {
        self.reports.iter().fold((0, 0, 0), |(ok, failed, skipped), r| match r.status {
            ReportStatus::Generated { .. } => (ok + 1, failed, skipped),
            ReportStatus::Failed { .. } => (ok, failed + 1, skipped),
            ReportStatus::Skipped { .. } => (ok, failed, skipped + 1),
        })
    }
}

impl Default for RunSummary {
    fn default() -> Self {
        Self::new()
    }
}
