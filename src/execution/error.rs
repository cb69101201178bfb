//! Fatal pipeline errors

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort the whole run
///
/// A missing input at report time is not an error: the report driver returns
/// `ReportOutcome::Skipped` instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Command not found: {program}")]
    ToolMissing { program: String },

    #[error("{program} {}", describe_exit(.code))]
    ToolFailed {
        program: String,
        code: Option<i32>,
        /// Captured stdout/stderr; empty for streamed commands
        output: String,
    },

    #[error("Expected file was not produced: {}", .path.display())]
    ArtifactMissingAfterGeneration { path: PathBuf },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Interrupted")]
    Interrupted,
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("failed with return code {}", code),
        None => "was terminated by a signal".to_string(),
    }
}

impl PipelineError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        PipelineError::Io {
            context: context.into(),
            source,
        }
    }

    /// Process exit status for this error
    ///
    /// 127 for a missing executable and 130 for an interrupt, as shells
    /// report them; 1 for everything else.
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::ToolMissing { .. } => 127,
            PipelineError::Interrupted => 130,
            _ => 1,
        }
    }

    /// Captured command output worth showing alongside the message
    pub fn captured_output(&self) -> Option<&str> {
        match self {
            PipelineError::ToolFailed { output, .. } if !output.trim().is_empty() => {
                Some(output.as_str())
            }
            _ => None,
        }
    }
}
