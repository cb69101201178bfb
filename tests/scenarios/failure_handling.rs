//! Test: fatal errors stop the run at the failing stage

use crate::helpers::*;
use covreport::core::state::{ExecutionStatus, PipelineStage, ReportStatus};
use covreport::PipelineError;

#[tokio::test]
async fn test_csharp_failure_skips_go_and_reports() {
    let fixture = Fixture::new().with_binary();
    let runner = MockRunner::new().failing(Tool::DotnetTest, Failure::Exit(1));
    let (result, pipeline) = run_pipeline(fixture.pipeline(options(), runner)).await;

    match &result.result {
        Err(PipelineError::ToolFailed { program, code, output }) => {
            assert_eq!(program, "dotnet");
            assert_eq!(*code, Some(1));
            assert!(output.contains("blew up"));
        }
        other => panic!("unexpected result: {:?}", other),
    }
    assert_eq!(pipeline.runner().tools(), vec![Tool::DotnetTest]);
    assert_eq!(result.summary.status, ExecutionStatus::Failed);
    assert_eq!(result.summary.stage, PipelineStage::BinaryReady);
    assert!(result.summary.reports.is_empty());
    assert_eq!(result.result.as_ref().unwrap_err().exit_code(), 1);
}

/// The converter never runs when `go test` fails
#[tokio::test]
async fn test_go_test_failure_skips_conversion() {
    let fixture = Fixture::new().with_binary().with_csharp_coverage();
    let runner = MockRunner::new().failing(Tool::GoTest, Failure::Exit(2));
    let (result, pipeline) = run_pipeline(fixture.pipeline(options(), runner)).await;

    assert!(!result.is_success());
    assert_eq!(pipeline.runner().tools(), vec![Tool::GoTest]);
    assert!(!fixture.layout.go.cobertura_xml.path.exists());
}

#[tokio::test]
async fn test_missing_converter_is_reported_as_missing_tool() {
    let fixture = Fixture::new().with_binary().with_csharp_coverage();
    let runner = MockRunner::new().failing(Tool::Convert, Failure::Missing);
    let (result, _pipeline) = run_pipeline(fixture.pipeline(options(), runner)).await;

    let error = result.result.as_ref().unwrap_err();
    assert!(matches!(error, PipelineError::ToolMissing { program } if program == "gocover-cobertura"));
    assert_eq!(error.exit_code(), 127);
    assert!(result.summary.error.as_deref().unwrap().contains("gocover-cobertura"));
}

/// A failing render is fatal: later reports do not run
#[tokio::test]
async fn test_render_failure_stops_remaining_reports() {
    let fixture = Fixture::new()
        .with_binary()
        .with_csharp_coverage()
        .with_go_coverage();
    let runner = MockRunner::new().failing_render(2, 3);
    let (result, pipeline) = run_pipeline(fixture.pipeline(options(), runner)).await;

    assert!(!result.is_success());
    assert_eq!(pipeline.runner().tools().len(), 2);
    assert!(matches!(result.report_status("C#"), Some(ReportStatus::Generated { .. })));
    match result.report_status("Go") {
        Some(ReportStatus::Failed { error }) => assert!(error.contains("return code 3")),
        other => panic!("unexpected Go status: {:?}", other),
    }
    assert_eq!(result.report_status("merged"), None);
    assert_eq!(result.summary.stage, PipelineStage::DataReady);
}

#[tokio::test]
async fn test_build_failure_stops_before_data() {
    let fixture = Fixture::new().with_csharp_coverage().with_go_coverage();
    let runner = MockRunner::new().failing(Tool::GoBuild, Failure::Exit(1));
    let (result, pipeline) = run_pipeline(fixture.pipeline(options(), runner)).await;

    assert!(!result.is_success());
    assert_eq!(pipeline.runner().tools(), vec![Tool::GoBuild]);
    assert_eq!(result.summary.stage, PipelineStage::Idle);
    assert!(result.summary.decision.is_none());
}
