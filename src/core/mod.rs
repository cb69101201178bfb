//! Core domain models for the coverage pipeline
//!
//! Paths, presence checks, decisions and report requests. Nothing in here
//! spawns processes.

pub mod artifact;
pub mod config;
pub mod decision;
pub mod layout;
pub mod report;
pub mod state;

pub use artifact::{check_existing, CoverageArtifact, Presence};
pub use decision::PipelineDecision;
pub use layout::{ArtifactPath, ArtifactRole, Layout, Project};
pub use report::{ReportInput, ReportOutcome, ReportRequest, ReportTypes};
pub use state::*;
