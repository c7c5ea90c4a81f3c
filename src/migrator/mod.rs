//! Migration pipeline
//!
//! Classifies the project, loads its webpack config, extracts aliases,
//! entries and proxies, and assembles the Vite description. Writing only
//! happens after every extraction step has produced a value.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::config::Settings;
use crate::error::Result;
use crate::extract::{
    alias, extract_entries, resolve_config_path, AliasTable, ConfigLoader, ProxyExtractor,
};
use crate::output::OutputPlan;
use crate::project::{ProjectDescriptor, ProjectProfile};
use crate::runtime::{NodeRuntime, ScriptRuntime};
use crate::synth::{self, SynthesisDescriptor};

/// Options for one migration run
#[derive(Debug, Clone)]
pub struct MigrateOptions {
    /// Project root
    pub root: PathBuf,

    /// Explicit webpack config, overriding flavor conventions
    pub config: Option<PathBuf>,

    /// Render everything but write nothing
    pub dry_run: bool,
}

/// What was learned about a project
#[derive(Debug, Clone)]
pub struct Synthesis {
    pub project: ProjectDescriptor,
    pub profile: ProjectProfile,
    pub config_path: PathBuf,
    pub descriptor: SynthesisDescriptor,
}

/// Result of a migration
#[derive(Debug)]
pub struct MigrateResult {
    pub synthesis: Synthesis,
    pub plan: OutputPlan,
    pub written: bool,
}

/// The migration engine
pub struct Migrator {
    settings: Settings,
    runtime: Arc<dyn ScriptRuntime>,
}

impl Migrator {
    /// Create a migrator evaluating scripts with the configured `node`
    pub fn new(settings: Settings) -> Self {
        let runtime = Arc::new(NodeRuntime::new(settings.node.clone()));
        Self::with_runtime(settings, runtime)
    }

    pub fn with_runtime(settings: Settings, runtime: Arc<dyn ScriptRuntime>) -> Self {
        Self { settings, runtime }
    }

    /// Derive the Vite description for a project without writing anything
    pub async fn synthesize(&self, root: &Path, explicit: Option<&Path>) -> Result<Synthesis> {
        let start = Instant::now();
        let root = root.canonicalize()?;

        // 1. Classify
        let project = ProjectDescriptor::read(&root).await?;
        let profile = ProjectProfile::from_manifest(&project.manifest);
        info!("Detected {} project", profile.flavor);

        // 2. Locate and load the webpack config
        let explicit = explicit.or(self.settings.config.as_deref());
        let config_path = resolve_config_path(&root, profile.flavor, explicit)?;
        let loader = ConfigLoader::new(self.runtime.clone(), self.settings.mode.clone());
        let config = loader
            .load(&root, profile.flavor, &config_path, explicit.is_some())
            .await?;

        // 3. Aliases
        info!("Extracting aliases...");
        let declared = alias::aliases_from_config(&root, &config.alias_table);
        let inferred = match alias::infer_aliases(&root) {
            Ok(table) => table,
            Err(err) if err.is_recoverable() => {
                warn!("{}; using webpack aliases only", err);
                AliasTable::new()
            }
            Err(err) => return Err(err),
        };
        let aliases = alias::merge_aliases(declared, inferred);
        debug!("{} alias(es)", aliases.len());

        // 4. Entries
        let entries = extract_entries(&config.entry, &root, &self.settings.vendor_dir);
        match entries.first() {
            Some(primary) => info!("Primary entry {}", primary),
            None => warn!("No entry found in webpack config"),
        }

        // 5. Proxies
        info!("Extracting proxy rules...");
        let proxy = ProxyExtractor::new(self.runtime.clone(), self.settings.proxy.clone())
            .extract(&root, profile.flavor, &config)
            .await;

        let descriptor = synth::assemble(&profile, aliases, proxy, entries);
        debug!("Synthesis completed in {:?}", start.elapsed());

        Ok(Synthesis {
            project,
            profile,
            config_path,
            descriptor,
        })
    }

    /// Run the whole migration
    pub async fn migrate(&self, options: &MigrateOptions) -> Result<MigrateResult> {
        let synthesis = self
            .synthesize(&options.root, options.config.as_deref())
            .await?;

        let config_out = self.settings.output_path(&synthesis.project.root);
        let plan = OutputPlan::prepare(
            &synthesis.project,
            synthesis.profile.flavor,
            &synthesis.descriptor,
            &config_out,
        )
        .await?;

        if options.dry_run {
            info!("Dry run, {} file(s) not written", plan.files.len());
        } else {
            info!("Writing {} file(s)...", plan.files.len());
            plan.commit().await?;
        }

        Ok(MigrateResult {
            synthesis,
            plan,
            written: !options.dry_run,
        })
    }
}
