//! Coverage generators - one per sub-project toolchain

use crate::core::layout::{CSharpPaths, GoPaths, Project};
use crate::execution::{CommandRunner, CommandSpec, OutputMode, PipelineError};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Produces a project's coverage artifact with its native toolchain
#[async_trait]
pub trait CoverageGenerator: Send + Sync {
    fn project(&self) -> Project;

    /// Run the toolchain and verify the expected artifact exists
    async fn generate(&self, runner: &dyn CommandRunner) -> Result<(), PipelineError>;
}

/// `dotnet test` with coverlet writing Cobertura XML
#[derive(Debug, Clone)]
pub struct CSharpCoverage {
    test_project: PathBuf,
    coverage_dir: PathBuf,
    cobertura_xml: PathBuf,
    configuration: String,
}

impl CSharpCoverage {
    pub fn new(paths: &CSharpPaths, configuration: impl Into<String>) -> Self {
        Self {
            test_project: paths.test_project.path.clone(),
            coverage_dir: paths.coverage_dir.path.clone(),
            cobertura_xml: paths.cobertura_xml.path.clone(),
            configuration: configuration.into(),
        }
    }

    fn test_command(&self) -> CommandSpec {
        CommandSpec::new("dotnet")
            .arg("test")
            .arg(self.test_project.display().to_string())
            .args(["--configuration", self.configuration.as_str()])
            .args(["/p:CollectCoverage=true", "/p:CoverletOutputFormat=cobertura"])
            .arg(format!("/p:CoverletOutput={}", self.cobertura_xml.display()))
    }
}

#[async_trait]
impl CoverageGenerator for CSharpCoverage {
    fn project(&self) -> Project {
        Project::CSharp
    }

    async fn generate(&self, runner: &dyn CommandRunner) -> Result<(), PipelineError> {
        debug!("Generating C# coverage...");
        ensure_dir(&self.coverage_dir)?;

        runner.run(&self.test_command(), OutputMode::Capture).await?;

        expect_file(&self.cobertura_xml)
    }
}

/// `go test -coverprofile`, then `gocover-cobertura` conversion
#[derive(Debug, Clone)]
pub struct GoCoverage {
    project_dir: PathBuf,
    coverage_out: PathBuf,
    cobertura_xml: PathBuf,
}

impl GoCoverage {
    pub fn new(paths: &GoPaths) -> Self {
        Self {
            project_dir: paths.project_dir.path.clone(),
            coverage_out: paths.coverage_out.path.clone(),
            cobertura_xml: paths.cobertura_xml.path.clone(),
        }
    }

    fn test_command(&self) -> CommandSpec {
        CommandSpec::new("go")
            .arg("test")
            .arg(format!("-coverprofile={}", file_name(&self.coverage_out)))
            .arg("./...")
            .current_dir(&self.project_dir)
    }

    fn convert_command(&self) -> CommandSpec {
        CommandSpec::new("gocover-cobertura")
            .stdin_file(&self.coverage_out)
            .stdout_file(&self.cobertura_xml)
            .current_dir(&self.project_dir)
    }
}

#[async_trait]
impl CoverageGenerator for GoCoverage {
    fn project(&self) -> Project {
        Project::Go
    }

    async fn generate(&self, runner: &dyn CommandRunner) -> Result<(), PipelineError> {
        debug!("Generating Go coverage...");
        ensure_dir(&self.project_dir)?;

        // A failed run must not leave old files that pass the staleness check
        remove_stale(&self.coverage_out)?;
        remove_stale(&self.cobertura_xml)?;

        runner.run(&self.test_command(), OutputMode::Capture).await?;
        expect_file(&self.coverage_out)?;

        runner.run(&self.convert_command(), OutputMode::Capture).await?;
        expect_file(&self.cobertura_xml)
    }
}

fn ensure_dir(path: &Path) -> Result<(), PipelineError> {
    std::fs::create_dir_all(path)
        .map_err(|e| PipelineError::io(format!("Failed to create {}", path.display()), e))
}

fn remove_stale(path: &Path) -> Result<(), PipelineError> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!("Removed stale {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(PipelineError::io(format!("Failed to remove {}", path.display()), e)),
    }
}

fn expect_file(path: &Path) -> Result<(), PipelineError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(PipelineError::ArtifactMissingAfterGeneration {
            path: path.to_path_buf(),
        })
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
