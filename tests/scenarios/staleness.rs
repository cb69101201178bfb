//! Test: which generators run for each combination of existing data

use crate::helpers::*;
use covreport::core::state::PipelineStage;
use covreport::execution::PipelineEvent;
use covreport::Project;

fn generated_projects(result: &RunResult) -> Vec<Project> {
    result
        .events
        .iter()
        .filter_map(|event| match event {
            PipelineEvent::GenerationCompleted { project } => Some(*project),
            _ => None,
        })
        .collect()
}

/// Nothing exists: both generators run, then all three reports
#[tokio::test]
async fn test_fresh_workspace_generates_everything() {
    let fixture = Fixture::new().with_binary();
    let (result, pipeline) = run_pipeline(fixture.pipeline(options(), MockRunner::new())).await;

    assert!(result.is_success(), "{:?}", result.result);
    assert_eq!(generated_projects(&result), vec![Project::CSharp, Project::Go]);
    assert_eq!(
        pipeline.runner().tools(),
        vec![
            Tool::DotnetTest,
            Tool::GoTest,
            Tool::Convert,
            Tool::Render,
            Tool::Render,
            Tool::Render
        ]
    );
    assert_eq!(result.summary.counts(), (3, 0, 0));
    assert_eq!(result.summary.stage, PipelineStage::ReportsGenerated);
}

/// Both present: no generator runs
#[tokio::test]
async fn test_existing_data_is_reused() {
    let fixture = Fixture::new()
        .with_binary()
        .with_csharp_coverage()
        .with_go_coverage();
    let (result, pipeline) = run_pipeline(fixture.pipeline(options(), MockRunner::new())).await;

    assert!(result.is_success());
    assert!(generated_projects(&result).is_empty());
    assert!(result.summary.decision.unwrap().is_noop());
    assert!(pipeline.runner().tools().iter().all(|t| *t == Tool::Render));
    assert_eq!(pipeline.runner().tools().len(), 3);
}

/// Only Go present: only the C# generator runs
#[tokio::test]
async fn test_only_missing_project_is_regenerated() {
    let fixture = Fixture::new().with_binary().with_go_coverage();
    let (result, pipeline) = run_pipeline(fixture.pipeline(options(), MockRunner::new())).await;

    assert!(result.is_success());
    assert_eq!(generated_projects(&result), vec![Project::CSharp]);
    assert!(!pipeline.runner().tools().contains(&Tool::GoTest));
    assert_eq!(result.summary.counts(), (3, 0, 0));
}

/// Only C# present: only the Go generator runs
#[tokio::test]
async fn test_only_go_regenerated_when_csharp_present() {
    let fixture = Fixture::new().with_binary().with_csharp_coverage();
    let (result, _pipeline) = run_pipeline(fixture.pipeline(options(), MockRunner::new())).await;

    assert!(result.is_success());
    assert_eq!(generated_projects(&result), vec![Project::Go]);
}

/// A zero-byte coverage file counts as absent
#[tokio::test]
async fn test_empty_coverage_file_triggers_regeneration() {
    let fixture = Fixture::new()
        .with_binary()
        .with_csharp_coverage()
        .with_empty_go_coverage();
    let (result, _pipeline) = run_pipeline(fixture.pipeline(options(), MockRunner::new())).await;

    assert!(result.is_success());
    assert_eq!(generated_projects(&result), vec![Project::Go]);
}

/// Force regenerates both even when everything exists
#[tokio::test]
async fn test_force_regenerates_existing_data() {
    let fixture = Fixture::new()
        .with_binary()
        .with_csharp_coverage()
        .with_go_coverage();
    let mut opts = options();
    opts.force = true;
    let (result, _pipeline) = run_pipeline(fixture.pipeline(opts, MockRunner::new())).await;

    assert!(result.is_success());
    assert_eq!(generated_projects(&result), vec![Project::CSharp, Project::Go]);

    // Force bypasses the staleness check entirely
    let decision_presence = result.events.iter().find_map(|event| match event {
        PipelineEvent::DecisionMade { presence, .. } => Some(*presence),
        _ => None,
    });
    assert_eq!(decision_presence, Some(None));
}
