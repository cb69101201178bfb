//! covreport - coverage report orchestrator for the AdlerCov test projects

pub mod cli;
pub mod core;
pub mod execution;

// Re-export commonly used types
pub use core::{Layout, PipelineDecision, Presence, Project, RunSummary};
pub use execution::{CommandRunner, CoveragePipeline, PipelineError, PipelineEvent, ProcessRunner, RunOptions};
