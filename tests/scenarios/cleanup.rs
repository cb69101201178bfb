//! Test: `--clean` removes the rendering tool however the run ends

use crate::helpers::*;
use covreport::core::state::{ExecutionStatus, PipelineStage, RunSummary};
use covreport::execution::{PipelineError, PipelineEvent};
use std::time::Duration;

fn clean_options() -> covreport::RunOptions {
    let mut opts = options();
    opts.clean = true;
    opts
}

#[tokio::test]
async fn test_clean_after_success() {
    let fixture = Fixture::new()
        .with_binary()
        .with_csharp_coverage()
        .with_go_coverage();
    let (result, _pipeline) = run_pipeline(fixture.pipeline(clean_options(), MockRunner::new())).await;

    assert!(result.is_success());
    assert!(!fixture.binary_exists());
    assert!(result.summary.binary_cleaned);
    assert_eq!(result.summary.stage, PipelineStage::Cleaned);
    assert!(result
        .events
        .iter()
        .any(|e| matches!(e, PipelineEvent::BinaryCleaned { removed: true })));
}

/// Cleanup still happens when a report fails, and the render error is kept
#[tokio::test]
async fn test_clean_after_render_failure() {
    let fixture = Fixture::new()
        .with_binary()
        .with_csharp_coverage()
        .with_go_coverage();
    let runner = MockRunner::new().failing_render(1, 2);
    let (result, _pipeline) = run_pipeline(fixture.pipeline(clean_options(), runner)).await;

    assert!(!result.is_success());
    assert!(result.result.as_ref().unwrap_err().to_string().contains("return code 2"));
    assert!(!fixture.binary_exists());
    assert!(result.summary.binary_cleaned);
    assert_eq!(result.summary.stage, PipelineStage::DataReady);
}

#[tokio::test]
async fn test_clean_after_generation_failure() {
    let fixture = Fixture::new().with_binary();
    let runner = MockRunner::new().failing(Tool::DotnetTest, Failure::Exit(1));
    let (result, _pipeline) = run_pipeline(fixture.pipeline(clean_options(), runner)).await;

    assert!(!result.is_success());
    assert!(!fixture.binary_exists());
}

/// Without `--clean` the binary is kept for the next run
#[tokio::test]
async fn test_binary_kept_without_clean() {
    let fixture = Fixture::new()
        .with_binary()
        .with_csharp_coverage()
        .with_go_coverage();
    let (result, _pipeline) = run_pipeline(fixture.pipeline(options(), MockRunner::new())).await;

    assert!(result.is_success());
    assert!(fixture.binary_exists());
    assert!(!result.summary.binary_cleaned);
    assert_eq!(result.summary.stage, PipelineStage::ReportsGenerated);
}

/// Nothing to clean when provisioning never produced a binary
#[tokio::test]
async fn test_clean_not_armed_when_build_fails() {
    let fixture = Fixture::new();
    let runner = MockRunner::new().failing(Tool::GoBuild, Failure::Exit(1));
    let (result, _pipeline) = run_pipeline(fixture.pipeline(clean_options(), runner)).await;

    assert!(!result.is_success());
    assert!(!result
        .events
        .iter()
        .any(|e| matches!(e, PipelineEvent::BinaryCleaned { .. })));
}

/// Interrupting a run mid-render still removes the binary
#[tokio::test]
async fn test_clean_after_interrupt() {
    let fixture = Fixture::new()
        .with_binary()
        .with_csharp_coverage()
        .with_go_coverage();
    let runner = MockRunner::new().failing(Tool::Render, Failure::Hang);
    let pipeline = fixture.pipeline(clean_options(), runner);
    let mut summary = RunSummary::new();

    let interrupt = tokio::time::sleep(Duration::from_millis(50));
    let result = pipeline.run_until(&mut summary, interrupt).await;

    let error = result.unwrap_err();
    assert!(matches!(error, PipelineError::Interrupted));
    assert_eq!(error.exit_code(), 130);
    assert_eq!(pipeline.runner().tools(), vec![Tool::Render]);
    assert!(!fixture.binary_exists());
    assert!(summary.binary_cleaned);
    assert_eq!(summary.status, ExecutionStatus::Failed);
    assert_eq!(summary.error.as_deref(), Some("Interrupted"));
}

#[tokio::test]
async fn test_interrupt_without_clean_keeps_binary() {
    let fixture = Fixture::new()
        .with_binary()
        .with_csharp_coverage()
        .with_go_coverage();
    let runner = MockRunner::new().failing(Tool::Render, Failure::Hang);
    let pipeline = fixture.pipeline(options(), runner);
    let mut summary = RunSummary::new();

    let interrupt = tokio::time::sleep(Duration::from_millis(50));
    let result = pipeline.run_until(&mut summary, interrupt).await;

    assert!(matches!(result, Err(PipelineError::Interrupted)));
    assert!(fixture.binary_exists());
    assert!(!summary.binary_cleaned);
}

/// An interrupt that never fires leaves the run untouched
#[tokio::test]
async fn test_run_until_completes_without_interrupt() {
    let fixture = Fixture::new()
        .with_binary()
        .with_csharp_coverage()
        .with_go_coverage();
    let pipeline = fixture.pipeline(clean_options(), MockRunner::new());
    let mut summary = RunSummary::new();

    pipeline
        .run_until(&mut summary, std::future::pending())
        .await
        .unwrap();

    assert_eq!(summary.stage, PipelineStage::Cleaned);
    assert!(!fixture.binary_exists());
}
