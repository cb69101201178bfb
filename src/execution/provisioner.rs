//! Rendering tool binary: build on demand, clean up on request

use crate::core::layout::ToolPaths;
use crate::execution::{CommandRunner, CommandSpec, OutputMode, PipelineError};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// What `ensure_binary` did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryStatus {
    /// An existing binary was kept
    Reused,
    /// The binary was (re)built
    Built,
}

/// Builds the rendering tool from its Go sources
#[derive(Debug, Clone)]
pub struct BinaryProvisioner {
    source_dir: PathBuf,
    binary: PathBuf,
}

impl BinaryProvisioner {
    pub fn new(tool: &ToolPaths) -> Self {
        Self {
            source_dir: tool.source_dir.path.clone(),
            binary: tool.binary.path.clone(),
        }
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    /// Make sure the binary exists, rebuilding it when missing or when forced
    pub async fn ensure_binary(
        &self,
        runner: &dyn CommandRunner,
        force_rebuild: bool,
    ) -> Result<BinaryStatus, PipelineError> {
        if self.binary.exists() && !force_rebuild {
            debug!("Using existing binary: {}", self.binary.display());
            return Ok(BinaryStatus::Reused);
        }

        info!("Building rendering tool at {}", self.binary.display());
        self.remove_binary()?;

        let build = CommandSpec::new("go")
            .args(["build", "-o"])
            .arg(self.binary.display().to_string())
            .arg("./main.go")
            .current_dir(&self.source_dir);
        runner.run(&build, OutputMode::Capture).await?;

        if !self.binary.exists() {
            return Err(PipelineError::ArtifactMissingAfterGeneration {
                path: self.binary.clone(),
            });
        }

        make_executable(&self.binary)?;
        Ok(BinaryStatus::Built)
    }

    /// Delete the binary; returns whether a file was removed
    pub fn clean(&self) -> Result<bool, PipelineError> {
        if !self.binary.exists() {
            return Ok(false);
        }
        info!("Removing binary {}", self.binary.display());
        self.remove_binary()?;
        Ok(true)
    }

    /// Guard that runs `clean` when finished or dropped, if `armed`
    pub fn cleanup_guard(&self, armed: bool) -> CleanupGuard<'_> {
        CleanupGuard {
            provisioner: self,
            armed,
        }
    }

    fn remove_binary(&self) -> Result<(), PipelineError> {
        match std::fs::remove_file(&self.binary) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(PipelineError::io(
                format!("Failed to remove {}", self.binary.display()),
                e,
            )),
        }
    }
}

#[cfg(unix)]
fn make_executable(path: &Path) -> Result<(), PipelineError> {
    use std::os::unix::fs::PermissionsExt;

    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755))
        .map_err(|e| PipelineError::io(format!("Failed to chmod {}", path.display()), e))
}

#[cfg(not(unix))]
fn make_executable(_path: &Path) -> Result<(), PipelineError> {
    Ok(())
}

/// Scoped binary cleanup
///
/// `finish` performs the cleanup and reports the result. A guard dropped
/// without `finish` (early return, unwind) still cleans up when armed.
#[must_use = "dropping the guard immediately deletes the binary"]
pub struct CleanupGuard<'a> {
    provisioner: &'a BinaryProvisioner,
    armed: bool,
}

impl CleanupGuard<'_> {
    pub fn is_armed(&self) -> bool {
        self.armed
    }

    /// Run the cleanup now; returns whether the binary was deleted
    pub fn finish(mut self) -> Result<bool, PipelineError> {
        if !std::mem::replace(&mut self.armed, false) {
            return Ok(false);
        }
        self.provisioner.clean()
    }
}

impl Drop for CleanupGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            if let Err(e) = self.provisioner.clean() {
                warn!("Binary cleanup failed: {}", e);
            }
        }
    }
}
