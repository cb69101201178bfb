//! Artifact locations, resolved once from the anchor directory
//!
//! Nothing here touches the filesystem. Every path is derived from the anchor
//! and the configuration when the layout is built, and never changes after.

use crate::core::{
    config::Config,
    report::{ReportInput, ReportRequest, ReportTypes},
};
use serde::Serialize;
use std::path::{Path, PathBuf};

/// What a resolved path is used for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactRole {
    TestProject,
    RawCoverage,
    ConvertedCoverage,
    OutputDirectory,
    ToolSource,
    ToolBinary,
}

/// A filesystem location tagged with its role
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactPath {
    pub role: ArtifactRole,
    pub path: PathBuf,
}

impl ArtifactPath {
    fn new(role: ArtifactRole, path: PathBuf) -> Self {
        Self { role, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Sub-projects whose coverage is orchestrated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Project {
    CSharp,
    Go,
}

impl Project {
    pub const ALL: [Project; 2] = [Project::CSharp, Project::Go];

    pub fn display_name(self) -> &'static str {
        match self {
            Project::CSharp => "C#",
            Project::Go => "Go",
        }
    }
}

impl std::fmt::Display for Project {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// C# project: coverlet writes Cobertura directly
#[derive(Debug, Clone)]
pub struct CSharpPaths {
    pub test_project: ArtifactPath,
    pub coverage_dir: ArtifactPath,
    /// Raw and expected format are the same file
    pub cobertura_xml: ArtifactPath,
}

/// Go project: native cover profile plus converted Cobertura
#[derive(Debug, Clone)]
pub struct GoPaths {
    pub project_dir: ArtifactPath,
    pub coverage_out: ArtifactPath,
    pub cobertura_xml: ArtifactPath,
}

/// Rendering tool sources and binary
#[derive(Debug, Clone)]
pub struct ToolPaths {
    pub source_dir: ArtifactPath,
    pub binary: ArtifactPath,
}

/// Report output directories
#[derive(Debug, Clone)]
pub struct ReportPaths {
    pub base: ArtifactPath,
    pub csharp: ArtifactPath,
    pub go: ArtifactPath,
    pub merged: ArtifactPath,
}

/// Every path the pipeline reads or writes
#[derive(Debug, Clone)]
pub struct Layout {
    pub anchor: PathBuf,
    pub csharp: CSharpPaths,
    pub go: GoPaths,
    pub tool: ToolPaths,
    pub reports: ReportPaths,
}

/// Platform-specific file name of the rendering tool
pub fn binary_name(tool_name: &str, os: &str) -> String {
    if os == "windows" {
        format!("{}.exe", tool_name)
    } else {
        tool_name.to_string()
    }
}

impl Layout {
    /// Resolve the layout for the host operating system
    pub fn new(anchor: impl Into<PathBuf>, config: &Config) -> Self {
        Self::for_os(anchor, config, std::env::consts::OS)
    }

    /// Resolve the layout for the given OS identifier (`std::env::consts::OS` values)
    pub fn for_os(anchor: impl Into<PathBuf>, config: &Config, os: &str) -> Self {
        use ArtifactRole::*;

        let anchor = anchor.into();
        let projects = anchor.join(&config.projects_dir);

        let csharp_dir = projects.join("CSharp");
        let csharp_reports = csharp_dir.join("Reports");
        let csharp = CSharpPaths {
            test_project: ArtifactPath::new(
                TestProject,
                csharp_dir
                    .join("Project_DotNetCore")
                    .join("UnitTests")
                    .join("UnitTests.csproj"),
            ),
            cobertura_xml: ArtifactPath::new(
                RawCoverage,
                csharp_reports.join("coverage.cobertura.xml"),
            ),
            coverage_dir: ArtifactPath::new(OutputDirectory, csharp_reports),
        };

        let go_dir = projects.join("Go");
        let go = GoPaths {
            coverage_out: ArtifactPath::new(RawCoverage, go_dir.join("coverage.out")),
            cobertura_xml: ArtifactPath::new(
                ConvertedCoverage,
                go_dir.join("coverage.cobertura.xml"),
            ),
            project_dir: ArtifactPath::new(TestProject, go_dir),
        };

        let tool = ToolPaths {
            source_dir: ArtifactPath::new(ToolSource, anchor.join("cmd")),
            binary: ArtifactPath::new(
                ToolBinary,
                anchor.join(binary_name(&config.tool_name, os)),
            ),
        };

        let reports_base = anchor.join(&config.reports_dir);
        let reports = ReportPaths {
            csharp: ArtifactPath::new(
                OutputDirectory,
                reports_base.join("cobertura_csharp_report"),
            ),
            go: ArtifactPath::new(OutputDirectory, reports_base.join("gocover_reports")),
            merged: ArtifactPath::new(
                OutputDirectory,
                reports_base.join("merged_all_reports"),
            ),
            base: ArtifactPath::new(OutputDirectory, reports_base),
        };

        Self {
            anchor,
            csharp,
            go,
            tool,
            reports,
        }
    }

    /// Coverage file whose presence decides whether a project is stale
    pub fn primary_coverage(&self, project: Project) -> &ArtifactPath {
        match project {
            Project::CSharp => &self.csharp.cobertura_xml,
            Project::Go => &self.go.coverage_out,
        }
    }

    /// Report request for a single project
    pub fn project_report(&self, project: Project, report_types: &ReportTypes) -> ReportRequest {
        let (output_dir, source_dirs) = match project {
            Project::CSharp => (&self.reports.csharp, vec![]),
            Project::Go => (
                &self.reports.go,
                vec![self.go.project_dir.path.clone()],
            ),
        };

        ReportRequest {
            name: project.display_name().to_string(),
            input: ReportInput::Single(self.primary_coverage(project).path.clone()),
            output_dir: output_dir.path.clone(),
            report_types: report_types.clone(),
            source_dirs,
        }
    }

    /// Report request spanning both projects
    pub fn merged_report(&self, report_types: &ReportTypes) -> ReportRequest {
        ReportRequest {
            name: "merged".to_string(),
            input: ReportInput::Merged(
                Project::ALL
                    .iter()
                    .map(|p| self.primary_coverage(*p).path.clone())
                    .collect(),
            ),
            output_dir: self.reports.merged.path.clone(),
            report_types: report_types.clone(),
            source_dirs: vec![self.go.project_dir.path.clone()],
        }
    }
}
