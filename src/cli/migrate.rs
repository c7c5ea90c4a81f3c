//! Migrate command implementation

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tracing::{info, warn};

use crate::config::Settings;
use crate::migrator::{MigrateOptions, Migrator};
use crate::runtime::NodeRuntime;
use crate::utils::{format_duration, relative_path};

/// Migrate a webpack project to Vite
#[derive(Args, Debug)]
pub struct MigrateCommand {
    /// Project root
    #[arg(default_value = ".")]
    pub root: PathBuf,

    /// Webpack config to migrate instead of the conventional one
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Generated config file name
    #[arg(short, long)]
    pub out: Option<String>,

    /// Print the generated files instead of writing them
    #[arg(long)]
    pub dry_run: bool,
}

impl MigrateCommand {
    pub async fn execute(&self, settings_path: &str) -> Result<()> {
        let start = Instant::now();

        info!("Loading settings from {}", settings_path);
        let mut settings = Settings::discover(&self.root, settings_path)?;
        if let Some(out) = &self.out {
            settings.output = out.clone();
        }

        if !NodeRuntime::new(settings.node.clone()).is_available().await {
            warn!("`{} --version` failed; webpack configs cannot be evaluated", settings.node);
        }

        eprintln!("{} Migrating {}...", "→".blue(), self.root.display());

        let migrator = Migrator::new(settings);
        let result = migrator
            .migrate(&MigrateOptions {
                root: self.root.clone(),
                config: self.config.clone(),
                dry_run: self.dry_run,
            })
            .await
            .with_context(|| format!("Failed to migrate {}", self.root.display()))?;

        let root = &result.synthesis.project.root;
        eprintln!(
            "  {} {} project, config {}",
            "•".dimmed(),
            result.synthesis.profile.flavor.to_string().cyan(),
            display_path(root, &result.synthesis.config_path).dimmed()
        );

        if self.dry_run {
            for file in &result.plan.files {
                println!("// {}\n{}", display_path(root, &file.path), file.contents);
            }
            eprintln!("\n{} Dry run, nothing written\n", "✓".green().bold());
            return Ok(());
        }

        eprintln!(
            "\n{} Migrated in {}\n",
            "✓".green().bold(),
            format_duration(start.elapsed())
        );
        for file in &result.plan.files {
            eprintln!("  {} {}", "•".dimmed(), display_path(root, &file.path).cyan());
        }

        eprintln!("\n  Next steps:");
        eprintln!("    cd {}", self.root.display());
        eprintln!("    npm install");
        eprintln!("    npm run start\n");

        Ok(())
    }
}

fn display_path(root: &std::path::Path, path: &std::path::Path) -> String {
    relative_path(root, path).unwrap_or_else(|| path.display().to_string())
}
