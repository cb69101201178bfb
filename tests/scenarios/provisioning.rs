//! Test: building and reusing the rendering tool binary

use crate::helpers::*;
use covreport::execution::{BinaryStatus, OutputMode, PipelineEvent};
use covreport::PipelineError;

fn binary_status(result: &RunResult) -> Option<BinaryStatus> {
    result.events.iter().find_map(|e| match e {
        PipelineEvent::BinaryReady { status } => Some(*status),
        _ => None,
    })
}

#[tokio::test]
async fn test_missing_binary_is_built_first() {
    let fixture = Fixture::new().with_csharp_coverage().with_go_coverage();
    let (result, pipeline) = run_pipeline(fixture.pipeline(options(), MockRunner::new())).await;

    assert!(result.is_success());
    assert!(result.summary.binary_built);
    assert_eq!(binary_status(&result), Some(BinaryStatus::Built));

    let calls = pipeline.runner().calls();
    let (build, mode) = &calls[0];
    assert_eq!(Tool::of(build), Tool::GoBuild);
    assert_eq!(*mode, OutputMode::Capture);
    assert_eq!(build.working_dir.as_ref(), Some(&fixture.layout.tool.source_dir.path));
    assert_eq!(build.args.last().map(String::as_str), Some("./main.go"));
    assert!(fixture.binary_exists());
}

#[tokio::test]
async fn test_existing_binary_is_reused() {
    let fixture = Fixture::new()
        .with_binary()
        .with_csharp_coverage()
        .with_go_coverage();
    let (result, pipeline) = run_pipeline(fixture.pipeline(options(), MockRunner::new())).await;

    assert!(result.is_success());
    assert!(!result.summary.binary_built);
    assert_eq!(binary_status(&result), Some(BinaryStatus::Reused));
    assert!(!pipeline.runner().tools().contains(&Tool::GoBuild));
}

#[tokio::test]
async fn test_rebuild_flag_rebuilds_existing_binary() {
    let fixture = Fixture::new()
        .with_binary()
        .with_csharp_coverage()
        .with_go_coverage();
    let mut opts = options();
    opts.rebuild_binary = true;
    let (result, pipeline) = run_pipeline(fixture.pipeline(opts, MockRunner::new())).await;

    assert!(result.is_success());
    assert_eq!(pipeline.runner().tools()[0], Tool::GoBuild);
    assert_eq!(
        std::fs::read(&fixture.layout.tool.binary.path).unwrap(),
        b"simulated output"
    );
}

#[tokio::test]
async fn test_missing_go_toolchain() {
    let fixture = Fixture::new();
    let runner = MockRunner::new().failing(Tool::GoBuild, Failure::Missing);
    let (result, _pipeline) = run_pipeline(fixture.pipeline(options(), runner)).await;

    let error = result.result.as_ref().unwrap_err();
    assert!(matches!(error, PipelineError::ToolMissing { program } if program == "go"));
    assert_eq!(error.exit_code(), 127);
}

/// `go build` exiting 0 without writing the binary is an error
#[tokio::test]
async fn test_build_without_output_fails() {
    let fixture = Fixture::new();
    let runner = MockRunner::new().failing(Tool::GoBuild, Failure::NoOutput);
    let (result, _pipeline) = run_pipeline(fixture.pipeline(options(), runner)).await;

    assert!(matches!(
        result.result,
        Err(PipelineError::ArtifactMissingAfterGeneration { ref path }) if *path == fixture.layout.tool.binary.path
    ));
}
