//! Which coverage generators a run needs

use crate::core::{artifact::Presence, layout::Project};
use serde::{Deserialize, Serialize};

/// Generators to run, computed once per invocation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PipelineDecision {
    pub force: bool,
    pub regenerate_csharp: bool,
    pub regenerate_go: bool,
}

impl PipelineDecision {
    /// Force regenerates everything; otherwise only absent data is regenerated
    pub fn compute(force: bool, presence: Presence) -> Self {
        if force {
            return Self {
                force,
                regenerate_csharp: true,
                regenerate_go: true,
            };
        }

        Self {
            force,
            regenerate_csharp: !presence.csharp,
            regenerate_go: !presence.go,
        }
    }

    /// Generators to run, C# first
    pub fn generators(&self) -> Vec<Project> {
        Project::ALL
            .into_iter()
            .filter(|p| self.regenerates(*p))
            .collect()
    }

    pub fn regenerates(&self, project: Project) -> bool {
        match project {
            Project::CSharp => self.regenerate_csharp,
            Project::Go => self.regenerate_go,
        }
    }

    /// No generator runs; existing data is used as-is
    pub fn is_noop(&self) -> bool {
        !self.regenerate_csharp && !self.regenerate_go
    }

    /// One-line explanation for the console
    pub fn describe(&self) -> String {
        match (self.force, self.regenerate_csharp, self.regenerate_go) {
            (true, _, _) => "Force mode: regenerating all coverage data".to_string(),
            (false, true, true) => "No existing coverage data found, generating all".to_string(),
            (false, true, false) => "Missing C# coverage, generating".to_string(),
            (false, false, true) => "Missing Go coverage, generating".to_string(),
            (false, false, false) => "Using existing coverage data".to_string(),
        }
    }
}
