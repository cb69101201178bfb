//! Pipeline controller - sequences provisioning, generation and reports

use crate::{
    core::{
        artifact::{check_existing, Presence},
        decision::PipelineDecision,
        layout::{Layout, Project},
        report::{ReportOutcome, ReportRequest, ReportTypes},
        state::{PipelineStage, ReportStatus, RunSummary},
    },
    execution::{
        BinaryProvisioner, BinaryStatus, CSharpCoverage, CommandRunner, CoverageGenerator,
        GoCoverage, PipelineError, ReportDriver,
    },
};
use std::sync::Arc;
use std::future::Future;
use tracing::{debug, error, warn};

/// Flags controlling a single run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunOptions {
    /// Regenerate all coverage data regardless of what exists
    pub force: bool,
    /// Rebuild the rendering tool even if present
    pub rebuild_binary: bool,
    /// Delete the rendering tool when the run ends, success or not
    pub clean: bool,
    pub report_types: ReportTypes,
    /// Build configuration for `dotnet test`
    pub dotnet_configuration: String,
}

/// Events emitted while the pipeline runs
#[derive(Debug, Clone)]
pub enum PipelineEvent {
    StageReached {
        stage: PipelineStage,
    },
    BinaryReady {
        status: BinaryStatus,
    },
    DecisionMade {
        presence: Option<Presence>,
        decision: PipelineDecision,
    },
    GenerationStarted {
        project: Project,
    },
    GenerationCompleted {
        project: Project,
    },
    ReportStarted {
        name: String,
    },
    ReportFinished {
        name: String,
        outcome: ReportOutcome,
    },
    MergedReportSkipped {
        missing: Vec<Project>,
    },
    BinaryCleaned {
        removed: bool,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(&PipelineEvent) + Send + Sync>;

/// Runs the whole coverage pipeline once
pub struct CoveragePipeline<R> {
    layout: Layout,
    options: RunOptions,
    runner: R,
    provisioner: BinaryProvisioner,
    driver: ReportDriver,
    event_handlers: Vec<EventHandler>,
}

impl<R: CommandRunner> CoveragePipeline<R> {
    pub fn new(layout: Layout, options: RunOptions, runner: R) -> Self {
        let provisioner = BinaryProvisioner::new(&layout.tool);
        let driver = ReportDriver::new(layout.tool.binary.path.clone());

        Self {
            layout,
            options,
            runner,
            provisioner,
            driver,
            event_handlers: Vec::new(),
        }
    }

    /// Add an event handler
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(&PipelineEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    fn emit(&self, event: PipelineEvent) {
        for handler in &self.event_handlers {
            handler(&event);
        }
    }

    fn reach(&self, summary: &mut RunSummary, stage: PipelineStage) {
        summary.advance(stage);
        self.emit(PipelineEvent::StageReached { stage });
    }

    /// Execute every stage, recording progress in `summary`
    ///
    /// The first fatal error stops the run. When cleanup was requested it
    /// still runs once the binary stage has passed.
    pub async fn run(&self, summary: &mut RunSummary) -> Result<(), PipelineError> {
        summary.start();

        let result = self.run_stages(summary).await;

        match &result {
            Ok(()) => summary.complete(),
            Err(e) => {
                error!("Pipeline failed: {}", e);
                summary.fail(e.to_string());
            }
        }
        result
    }

    /// Like [`run`](Self::run), but stop as soon as `interrupt` resolves
    ///
    /// The in-flight stage is dropped, which kills its child process and lets
    /// an armed cleanup guard delete the binary.
    pub async fn run_until<F>(&self, summary: &mut RunSummary, interrupt: F) -> Result<(), PipelineError>
    where
        F: Future<Output = ()>,
    {
        let finished = tokio::select! {
            result = self.run(summary) => Some(result),
            _ = interrupt => None,
        };
        if let Some(result) = finished {
            return result;
        }

        warn!("Pipeline interrupted");
        // The guard is armed together with BinaryReady, and its drop already ran
        if self.options.clean && summary.stage >= PipelineStage::BinaryReady {
            let removed = !self.provisioner.binary().exists();
            summary.binary_cleaned = removed;
            self.emit(PipelineEvent::BinaryCleaned { removed });
        }
        let error = PipelineError::Interrupted;
        summary.fail(error.to_string());
        Err(error)
    }

    async fn run_stages(&self, summary: &mut RunSummary) -> Result<(), PipelineError> {
        let status = self
            .provisioner
            .ensure_binary(&self.runner, self.options.rebuild_binary)
            .await?;
        summary.binary_built = status == BinaryStatus::Built;
        self.emit(PipelineEvent::BinaryReady { status });
        self.reach(summary, PipelineStage::BinaryReady);

        let guard = self.provisioner.cleanup_guard(self.options.clean);

        let result = self.data_and_reports(summary).await;

        if guard.is_armed() {
            match guard.finish() {
                Ok(removed) => {
                    summary.binary_cleaned = removed;
                    self.emit(PipelineEvent::BinaryCleaned { removed });
                    if result.is_ok() {
                        self.reach(summary, PipelineStage::Cleaned);
                    }
                }
                // The run's own error takes precedence over a cleanup error
                Err(e) if result.is_ok() => return Err(e),
                Err(e) => error!("Binary cleanup failed: {}", e),
            }
        }

        result
    }

    async fn data_and_reports(&self, summary: &mut RunSummary) -> Result<(), PipelineError> {
        self.prepare_data(summary).await?;
        self.reach(summary, PipelineStage::DataReady);

        self.generate_reports(summary).await?;
        self.reach(summary, PipelineStage::ReportsGenerated);
        Ok(())
    }

    /// BinaryReady -> DataReady
    async fn prepare_data(&self, summary: &mut RunSummary) -> Result<(), PipelineError> {
        let presence = if self.options.force {
            None
        } else {
            Some(check_existing(&self.layout))
        };
        let decision = PipelineDecision::compute(self.options.force, presence.unwrap_or_default());

        debug!("{}", decision.describe());
        summary.decision = Some(decision);
        self.emit(PipelineEvent::DecisionMade { presence, decision });

        for generator in decision.generators().into_iter().map(|p| self.generator(p)) {
            let project = generator.project();
            self.emit(PipelineEvent::GenerationStarted { project });
            generator.generate(&self.runner).await?;
            self.emit(PipelineEvent::GenerationCompleted { project });
        }

        Ok(())
    }

    fn generator(&self, project: Project) -> Box<dyn CoverageGenerator> {
        match project {
            Project::CSharp => Box::new(CSharpCoverage::new(
                &self.layout.csharp,
                self.options.dotnet_configuration.clone(),
            )),
            Project::Go => Box::new(GoCoverage::new(&self.layout.go)),
        }
    }

    /// DataReady -> ReportsGenerated
    async fn generate_reports(&self, summary: &mut RunSummary) -> Result<(), PipelineError> {
        let types = &self.options.report_types;

        // Merged eligibility is fixed when the stage begins
        let presence = check_existing(&self.layout);

        for project in Project::ALL {
            let request = self.layout.project_report(project, types);
            self.render(summary, &request).await?;
        }

        if presence.all_present() {
            let request = self.layout.merged_report(types);
            self.render(summary, &request).await?;
        } else {
            let missing = presence.missing();
            let reason = format!(
                "missing coverage: {}",
                missing
                    .iter()
                    .map(|p| p.display_name())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
            debug!("Skipping merged report, {}", reason);
            summary.record_report("merged", ReportStatus::Skipped { reason });
            self.emit(PipelineEvent::MergedReportSkipped { missing });
        }

        Ok(())
    }

    async fn render(&self, summary: &mut RunSummary, request: &ReportRequest) -> Result<(), PipelineError> {
        self.emit(PipelineEvent::ReportStarted {
            name: request.name.clone(),
        });

        match self.driver.generate(&self.runner, request).await {
            Ok(outcome) => {
                summary.record_report(request.name.clone(), outcome.clone().into());
                self.emit(PipelineEvent::ReportFinished {
                    name: request.name.clone(),
                    outcome,
                });
                Ok(())
            }
            Err(e) => {
                summary.record_report(
                    request.name.clone(),
                    ReportStatus::Failed {
                        error: e.to_string(),
                    },
                );
                Err(e)
            }
        }
    }
}
