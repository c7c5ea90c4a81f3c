//! Inspect command implementation

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde_json::json;

use crate::config::Settings;
use crate::migrator::Migrator;

/// Print what a migration would produce, without writing anything
#[derive(Args, Debug)]
pub struct InspectCommand {
    /// Project root
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Webpack config to inspect instead of the conventional one
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

impl InspectCommand {
    pub async fn execute(&self, settings_path: &str) -> Result<()> {
        let settings = Settings::discover(&self.root, settings_path)?;

        eprintln!("{} Inspecting {}...", "→".blue(), self.root.display());

        let synthesis = Migrator::new(settings)
            .synthesize(&self.root, self.config.as_deref())
            .await
            .with_context(|| format!("Failed to inspect {}", self.root.display()))?;

        let report = json!({
            "flavor": synthesis.profile.flavor,
            "profile": synthesis.profile,
            "config": synthesis.config_path,
            "descriptor": synthesis.descriptor,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);

        Ok(())
    }
}
