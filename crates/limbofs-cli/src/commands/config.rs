//! Config command - View and validate limbofs configuration
//!
//! Provides the `limbofs config` CLI command which:
//! 1. Shows the effective configuration (YAML or JSON)
//! 2. Validates the configuration file and reports errors

use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Subcommand;
use limbofs_core::config::Config;
use tracing::info;

use crate::output::{OutputFormat, Reporter};

/// Config subcommands
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Display the effective configuration
    Show,
    /// Validate the configuration file
    Validate,
}

impl ConfigCommand {
    /// Execute the config command
    pub fn execute(&self, config_path: Option<&str>, format: OutputFormat) -> Result<()> {
        match self {
            ConfigCommand::Show => self.execute_show(config_path, format),
            ConfigCommand::Validate => self.execute_validate(config_path, format),
        }
    }

    fn load(config_path: Option<&str>) -> Config {
        match config_path {
            Some(path) => Config::load_or_default(Path::new(path)),
            None => Config::default(),
        }
    }

    fn execute_show(&self, config_path: Option<&str>, format: OutputFormat) -> Result<()> {
        let reporter = Reporter::new(format);
        let config = Self::load(config_path);

        info!(path = ?config_path, "Showing configuration");

        if format.is_json() {
            let json = serde_json::to_value(&config)
                .context("Failed to serialize configuration to JSON")?;
            reporter.document(&json);
        } else {
            reporter.pass("Configuration");
            let yaml = serde_yaml::to_string(&config)
                .context("Failed to serialize configuration to YAML")?;
            for line in yaml.lines() {
                reporter.detail(line);
            }
        }

        Ok(())
    }

    fn execute_validate(&self, config_path: Option<&str>, format: OutputFormat) -> Result<()> {
        let reporter = Reporter::new(format);
        let config = Self::load(config_path);

        let errors = config.validate();
        if format.is_json() {
            let messages: Vec<String> = errors.iter().map(ToString::to_string).collect();
            reporter.document(&serde_json::json!({
                "valid": errors.is_empty(),
                "errors": messages,
            }));
        } else if errors.is_empty() {
            reporter.pass("Configuration is valid");
        } else {
            for error in &errors {
                reporter.fail(&error.to_string());
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            bail!("configuration has {} error(s)", errors.len());
        }
    }
}
