//! Report requests passed to the rendering tool

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Separator the rendering tool expects between multiple inputs or source dirs
pub const LIST_SEPARATOR: &str = ";";

/// Comma-separated report-type tags, e.g. `Html,TextSummary,Lcov`
///
/// Tags are passed through to the rendering tool untouched; only their shape
/// is checked here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ReportTypes(Vec<String>);

impl ReportTypes {
    pub fn tags(&self) -> &[String] {
        &self.0
    }
}

impl FromStr for ReportTypes {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tags: Vec<String> = s.split(',').map(str::to_string).collect();

        if tags.iter().any(|tag| tag.is_empty()) {
            return Err(format!("Invalid report types '{}': empty tag", s));
        }

        Ok(Self(tags))
    }
}

impl TryFrom<String> for ReportTypes {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ReportTypes> for String {
    fn from(types: ReportTypes) -> Self {
        types.to_string()
    }
}

impl fmt::Display for ReportTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join(","))
    }
}

/// Coverage input of a report request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportInput {
    /// One project's coverage file
    Single(PathBuf),
    /// Several projects' coverage files, merged by the rendering tool
    Merged(Vec<PathBuf>),
}

impl ReportInput {
    /// All coverage files this input depends on, in order
    pub fn paths(&self) -> Vec<&Path> {
        match self {
            ReportInput::Single(path) => vec![path.as_path()],
            ReportInput::Merged(paths) => paths.iter().map(PathBuf::as_path).collect(),
        }
    }

    pub fn is_merged(&self) -> bool {
        matches!(self, ReportInput::Merged(_))
    }

    /// Value of the rendering tool's `--report` flag
    pub fn to_argument(&self) -> String {
        join_paths(self.paths())
    }
}

/// A single invocation of the rendering tool
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    /// Human-readable name, e.g. "C#" or "merged"
    pub name: String,

    pub input: ReportInput,

    /// Directory the rendering tool writes into
    pub output_dir: PathBuf,

    pub report_types: ReportTypes,

    /// Source directory hints, empty when the coverage file has absolute paths
    pub source_dirs: Vec<PathBuf>,
}

impl ReportRequest {
    /// Arguments for the rendering tool, binary excluded
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            format!("--report={}", self.input.to_argument()),
            format!("--output={}", self.output_dir.display()),
            "--verbose".to_string(),
            format!("--reporttypes={}", self.report_types),
        ];

        if !self.source_dirs.is_empty() {
            args.push(format!(
                "--sourcedirs={}",
                join_paths(self.source_dirs.iter().map(PathBuf::as_path))
            ));
        }

        args
    }
}

/// Result of handing a request to the report driver
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReportOutcome {
    /// Rendering tool ran and exited successfully
    Generated { output_dir: PathBuf },
    /// A required coverage file was absent, nothing was run
    Skipped { reason: String },
}

fn join_paths<'a>(paths: impl IntoIterator<Item = &'a Path>) -> String {
    paths
        .into_iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(LIST_SEPARATOR)
}
