//! Pipeline execution: external commands and stage sequencing

pub mod engine;
pub mod error;
pub mod generators;
pub mod provisioner;
pub mod reports;
pub mod runner;

pub use engine::{CoveragePipeline, EventHandler, PipelineEvent, RunOptions};
pub use error::PipelineError;
pub use generators::{CSharpCoverage, CoverageGenerator, GoCoverage};
pub use provisioner::{BinaryProvisioner, BinaryStatus, CleanupGuard};
pub use reports::ReportDriver;
pub use runner::{CommandRunner, CommandSpec, OutputMode, OutputSink, ProcessRunner, StdoutSink};
