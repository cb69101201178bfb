//! CLI output formatting

use crate::{
    core::{
        report::ReportOutcome,
        state::{ExecutionStatus, PipelineStage, ReportStatus, RunSummary},
    },
    execution::{BinaryStatus, CommandRunner, CommandSpec, OutputMode, PipelineError, PipelineEvent},
};
use async_trait::async_trait;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SKIP: Emoji<'_, '_> = Emoji("⚪ ", "- ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "!");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");
pub static BROOM: Emoji<'_, '_> = Emoji("🧹 ", "~ ");

/// Create a spinner for a command whose output is captured
pub fn create_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    if let Ok(template) = ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}") {
        spinner.set_style(template);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Format a pipeline stage for display
pub fn format_stage(stage: PipelineStage) -> String {
    match stage {
        PipelineStage::Idle => style("IDLE").dim().to_string(),
        PipelineStage::BinaryReady => style("BINARY READY").cyan().to_string(),
        PipelineStage::DataReady => style("DATA READY").cyan().to_string(),
        PipelineStage::ReportsGenerated => style("REPORTS GENERATED").green().to_string(),
        PipelineStage::Cleaned => style("CLEANED").green().to_string(),
    }
}

/// Format an execution status for display
pub fn format_status(status: ExecutionStatus) -> String {
    match status {
        ExecutionStatus::Pending => style("PENDING").dim().to_string(),
        ExecutionStatus::Running => style("RUNNING").yellow().to_string(),
        ExecutionStatus::Completed => style("COMPLETED").green().to_string(),
        ExecutionStatus::Failed => style("FAILED").red().to_string(),
    }
}

/// Format a pipeline event for display; `None` for events not worth a line
pub fn format_pipeline_event(event: &PipelineEvent) -> Option<String> {
    let line = match event {
        PipelineEvent::StageReached { .. } => return None,
        PipelineEvent::BinaryReady { status } => match status {
            BinaryStatus::Reused => format!("{} Using existing rendering tool binary", INFO),
            BinaryStatus::Built => format!("{} Built rendering tool binary", CHECK),
        },
        PipelineEvent::DecisionMade { decision, .. } => {
            format!("{} {}", ROCKET, style(decision.describe()).bold())
        }
        PipelineEvent::GenerationStarted { project } => {
            format!("{} Generating {} coverage...", INFO, style(project).cyan())
        }
        PipelineEvent::GenerationCompleted { project } => {
            format!("{} {} coverage ready", CHECK, style(project).green())
        }
        PipelineEvent::ReportStarted { name } => {
            format!("{} Generating {} report...", INFO, style(name).cyan())
        }
        PipelineEvent::ReportFinished { name, outcome } => match outcome {
            ReportOutcome::Generated { output_dir } => format!(
                "{} {} report saved to {}",
                CHECK,
                style(name).green(),
                style(output_dir.display()).dim()
            ),
            ReportOutcome::Skipped { reason } => format!(
                "{} {} report skipped ({})",
                WARN,
                style(name).yellow(),
                style(reason).dim()
            ),
        },
        PipelineEvent::MergedReportSkipped { missing } => {
            let mut line = format!("{} Missing coverage files, skipping merged report", WARN);
            for project in missing {
                line.push_str(&format!("\n  - {} coverage is missing", project));
            }
            line
        }
        PipelineEvent::BinaryCleaned { removed } => {
            if *removed {
                format!("{} Removed rendering tool binary", BROOM)
            } else {
                format!("{} No rendering tool binary to remove", BROOM)
            }
        }
    };
    Some(line)
}

/// Format the end-of-run summary
pub fn format_summary(summary: &RunSummary) -> String {
    let rule = "=".repeat(80);
    let mut out = format!("\n{}\n {}\n{}\n", rule, style("Report Generation Summary").bold(), rule);

    for record in &summary.reports {
        out.push_str(&format!("\nReport : {}\n", style(&record.name).bold()));
        match &record.status {
            ReportStatus::Generated { output_dir } => {
                out.push_str(&format!("Status : {}SUCCESS\n", CHECK));
                out.push_str(&format!("Output : {}\n", output_dir.display()));
            }
            ReportStatus::Skipped { reason } => {
                out.push_str(&format!("Status : {}SKIPPED\n", SKIP));
                out.push_str(&format!("Reason : {}\n", reason));
            }
            ReportStatus::Failed { error } => {
                out.push_str(&format!("Status : {}FAILED\n", CROSS));
                out.push_str(&format!("Details:\n  {}\n", error.replace('\n', "\n  ")));
            }
        }
    }

    let (ok, failed, skipped) = summary.counts();
    out.push_str(&format!("\n{}\n", "-".repeat(80)));
    out.push_str(&format!(
        "Summary: {} succeeded, {} failed, {} skipped. Stage: {}. Status: {}.\n",
        style(ok).green(),
        style(failed).red(),
        style(skipped).dim(),
        format_stage(summary.stage),
        format_status(summary.status)
    ));
    if summary.binary_cleaned {
        out.push_str(&format!("{} Rendering tool binary removed\n", BROOM));
    }
    out.push_str(&rule);
    out
}

/// Format a fatal error, including captured command output
pub fn format_error(error: &PipelineError) -> String {
    let mut out = format!("{} {}", CROSS, style(error).red());
    if let Some(output) = error.captured_output() {
        out.push_str(&format!("\n{}", style("Command output:").bold()));
        for line in output.lines() {
            out.push_str(&format!("\n  {}", line));
        }
    }
    out
}

/// Wraps a runner with console feedback
///
/// Captured commands get a spinner; streamed commands get a header line so
/// their output is attributable.
pub struct ConsoleRunner<R> {
    inner: R,
}

impl<R: CommandRunner> ConsoleRunner<R> {
    pub fn new(inner: R) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<R: CommandRunner> CommandRunner for ConsoleRunner<R> {
    async fn run(&self, spec: &CommandSpec, mode: OutputMode) -> Result<(), PipelineError> {
        match mode {
            OutputMode::Capture => {
                let spinner = create_spinner(spec.display());
                let result = self.inner.run(spec, mode).await;
                spinner.finish_and_clear();
                result
            }
            OutputMode::Stream => {
                println!("\n{} {}", style(">>> Running:").dim(), spec.display());
                self.inner.run(spec, mode).await
            }
        }
    }
}
