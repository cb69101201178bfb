use anyhow::{Context, Result};
use covreport::cli::output::*;
use covreport::cli::Cli;
use covreport::core::{config::Config, Layout, RunSummary};
use covreport::execution::{CoveragePipeline, ProcessRunner};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    let code = run(&cli).await?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        debug!("Ctrl-C handler unavailable: {}", e);
        std::future::pending::<()>().await;
    }
}

/// Run the pipeline; returns the process exit code
async fn run(cli: &Cli) -> Result<i32> {
    let anchor = cli.anchor().context("Failed to resolve root directory")?;
    let config = Config::discover(&anchor, cli.config.as_deref())
        .context("Failed to load configuration")?;
    let options = cli.run_options(&config)?;
    let layout = Layout::new(&anchor, &config);

    debug!("Anchor directory: {}", anchor.display());
    println!(
        "{} Reports will be written under {}",
        INFO,
        style(layout.reports.base.path.display()).dim()
    );

    let runner = ConsoleRunner::new(ProcessRunner::new());
    let mut pipeline = CoveragePipeline::new(layout, options, runner);
    pipeline.add_event_handler(|event| {
        if let Some(line) = format_pipeline_event(event) {
            println!("{}", line);
        }
    });

    let mut summary = RunSummary::new();
    let result = pipeline.run_until(&mut summary, ctrl_c()).await;

    println!("{}", format_summary(&summary));
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }

    match result {
        Ok(()) => {
            println!("\n{} Report generation {}", CHECK, style("complete").green());
            Ok(0)
        }
        Err(e) => {
            eprintln!("\n{}", format_error(&e));
            Ok(e.exit_code())
        }
    }
}
