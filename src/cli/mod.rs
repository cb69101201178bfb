//! Command-line interface

pub mod output;

use crate::core::{config::Config, report::ReportTypes};
use crate::execution::RunOptions;
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

/// Generate coverage reports from existing data, or regenerate everything with --force
#[derive(Debug, Parser, Clone)]
#[command(name = "covreport")]
#[command(version)]
#[command(about = "Generate coverage reports for the C# and Go test projects", long_about = None)]
pub struct Cli {
    /// Regenerate all coverage data, ignoring existing files
    #[arg(long)]
    pub force: bool,

    /// Comma-separated report types [default: Html,TextSummary,Lcov]
    #[arg(long, value_name = "CSV")]
    pub report_types: Option<ReportTypes>,

    /// Rebuild the rendering tool binary even if it exists
    #[arg(long)]
    pub rebuild_binary: bool,

    /// Delete the rendering tool binary after the run, even on failure
    #[arg(long)]
    pub clean: bool,

    /// Directory all paths are resolved from [default: current directory]
    #[arg(long, value_name = "DIR")]
    pub root: Option<PathBuf>,

    /// Path to a YAML configuration file [default: <root>/covreport.yaml if present]
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Print the run summary as JSON
    #[arg(long)]
    pub json: bool,
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }

    /// Absolute anchor directory
    pub fn anchor(&self) -> std::io::Result<PathBuf> {
        let cwd = std::env::current_dir()?;
        Ok(match &self.root {
            Some(root) if root.is_absolute() => root.clone(),
            Some(root) => cwd.join(root),
            None => cwd,
        })
    }

    /// Merge CLI flags with configuration defaults
    pub fn run_options(&self, config: &Config) -> anyhow::Result<RunOptions> {
        let report_types = match &self.report_types {
            Some(types) => types.clone(),
            None => config.report_types()?,
        };

        Ok(RunOptions {
            force: self.force,
            rebuild_binary: self.rebuild_binary,
            clean: self.clean,
            report_types,
            dotnet_configuration: config.dotnet_configuration.clone(),
        })
    }
}
