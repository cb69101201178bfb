//! Report driver - invokes the rendering tool for one request

use crate::core::{
    artifact::CoverageArtifact,
    report::{ReportOutcome, ReportRequest},
};
use crate::execution::{CommandRunner, CommandSpec, OutputMode, PipelineError};
use std::path::PathBuf;
use tracing::debug;

/// Runs the rendering tool binary
#[derive(Debug, Clone)]
pub struct ReportDriver {
    binary: PathBuf,
}

impl ReportDriver {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
        }
    }

    /// Command line for `request`
    pub fn command(&self, request: &ReportRequest) -> CommandSpec {
        CommandSpec::new(self.binary.display().to_string()).args(request.to_args())
    }

    /// Render one report
    ///
    /// Absent inputs skip the request without running anything. A failure of
    /// the rendering tool itself is fatal.
    pub async fn generate(
        &self,
        runner: &dyn CommandRunner,
        request: &ReportRequest,
    ) -> Result<ReportOutcome, PipelineError> {
        let missing: Vec<_> = request
            .input
            .paths()
            .into_iter()
            .filter(|path| !CoverageArtifact::new(path).is_present())
            .collect();

        if !missing.is_empty() {
            let reason = format!(
                "coverage file not found: {}",
                missing
                    .iter()
                    .map(|p| p.display().to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            debug!("Skipping {} report, {}", request.name, reason);
            return Ok(ReportOutcome::Skipped { reason });
        }

        debug!("Generating {} report...", request.name);
        std::fs::create_dir_all(&request.output_dir).map_err(|e| {
            PipelineError::io(
                format!("Failed to create {}", request.output_dir.display()),
                e,
            )
        })?;

        runner.run(&self.command(request), OutputMode::Stream).await?;

        Ok(ReportOutcome::Generated {
            output_dir: request.output_dir.clone(),
        })
    }
}
