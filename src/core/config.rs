//! Orchestrator configuration from YAML

use crate::core::report::ReportTypes;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// File name looked up in the anchor directory when no `--config` is given
pub const DEFAULT_CONFIG_FILE: &str = "covreport.yaml";

/// Report types requested when neither the CLI nor the config file says otherwise
pub const DEFAULT_REPORT_TYPES: &str = "Html,TextSummary,Lcov";

/// Top-level configuration, every field optional in YAML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Directory holding the test projects, relative to the anchor
    pub projects_dir: String,

    /// Base directory for rendered reports, relative to the anchor
    pub reports_dir: String,

    /// Rendering tool binary name, without platform suffix
    pub tool_name: String,

    /// Build configuration passed to `dotnet test`
    pub dotnet_configuration: String,

    /// Report types used when `--report-types` is not given
    pub default_report_types: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            projects_dir: "Testprojects".to_string(),
            reports_dir: "reports".to_string(),
            tool_name: "adlercov".to_string(),
            dotnet_configuration: "Release".to_string(),
            default_report_types: DEFAULT_REPORT_TYPES.to_string(),
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml(&content)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    /// Parse configuration from a YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        // An empty document deserializes to unit, not to a map
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let config: Config = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, else the default file under `anchor` if it exists,
    /// else the built-in defaults
    pub fn discover(anchor: &Path, path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => {
                let default_path = anchor.join(DEFAULT_CONFIG_FILE);
                if default_path.is_file() {
                    Self::from_file(default_path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        let names = [
            ("projects_dir", &self.projects_dir),
            ("reports_dir", &self.reports_dir),
            ("tool_name", &self.tool_name),
            ("dotnet_configuration", &self.dotnet_configuration),
        ];
        for (field, value) in names {
            if value.trim().is_empty() {
                anyhow::bail!("Config field '{}' must not be empty", field);
            }
        }

        if self.tool_name.contains(['/', '\\']) {
            anyhow::bail!(
                "Config field 'tool_name' must be a file name, got '{}'",
                self.tool_name
            );
        }

        self.default_report_types
            .parse::<ReportTypes>()
            .map_err(|e| anyhow::anyhow!("Config field 'default_report_types': {}", e))?;

        Ok(())
    }

    /// Report types used when the CLI does not override them
    pub fn report_types(&self) -> Result<ReportTypes> {
        self.default_report_types
            .parse()
            .map_err(|e| anyhow::anyhow!("{}", e))
    }
}
