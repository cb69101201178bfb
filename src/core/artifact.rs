//! Coverage artifacts and the staleness check

use crate::core::layout::{ArtifactPath, Layout, Project};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A coverage file produced by an external toolchain
#[derive(Debug, Clone, Copy)]
pub struct CoverageArtifact<'a> {
    path: &'a Path,
}

impl<'a> CoverageArtifact<'a> {
    pub fn new(path: &'a Path) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        self.path
    }

    /// Present means a regular file with non-zero size.
    ///
    /// A zero-byte leftover from a failed run counts as absent.
    pub fn is_present(&self) -> bool {
        is_present(self.path)
    }
}

impl<'a> From<&'a ArtifactPath> for CoverageArtifact<'a> {
    fn from(artifact: &'a ArtifactPath) -> Self {
        Self::new(artifact.path())
    }
}

/// Whether `path` is a non-empty regular file
pub fn is_present(path: &Path) -> bool {
    std::fs::metadata(path)
        .map(|meta| meta.is_file() && meta.len() > 0)
        .unwrap_or(false)
}

/// Per-project presence of primary coverage data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Presence {
    pub csharp: bool,
    pub go: bool,
}

impl Presence {
    pub fn get(&self, project: Project) -> bool {
        match project {
            Project::CSharp => self.csharp,
            Project::Go => self.go,
        }
    }

    pub fn all_present(&self) -> bool {
        self.csharp && self.go
    }

    /// Projects whose data is absent, in pipeline order
    pub fn missing(&self) -> Vec<Project> {
        Project::ALL
            .into_iter()
            .filter(|p| !self.get(*p))
            .collect()
    }
}

/// Inspect both projects' primary coverage files
pub fn check_existing(layout: &Layout) -> Presence {
    let present = |project| CoverageArtifact::from(layout.primary_coverage(project)).is_present();
    Presence {
        csharp: present(Project::CSharp),
        go: present(Project::Go),
    }
}
