//! Output files
//!
//! Every output is rendered in memory first; [`OutputPlan::commit`] only runs
//! once all of them exist, so a failure never leaves a half-migrated project.

pub mod html;
pub mod package;

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::error::{MigrateError, Result};
use crate::project::{Flavor, ProjectDescriptor, MANIFEST_FILE};
use crate::synth::{render_vite_config, SynthesisDescriptor};

/// A file about to be written
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    pub path: PathBuf,
    pub contents: String,
}

/// All files a migration writes
#[derive(Debug, Clone, Default)]
pub struct OutputPlan {
    pub files: Vec<PlannedFile>,
}

impl OutputPlan {
    /// Render the Vite config, the patched HTML page and the manifest
    pub async fn prepare(
        project: &ProjectDescriptor,
        flavor: Flavor,
        descriptor: &SynthesisDescriptor,
        config_out: &Path,
    ) -> Result<Self> {
        let entry = descriptor.primary_entry().ok_or(MigrateError::MissingEntry)?;
        let mut files = vec![PlannedFile {
            path: config_out.to_path_buf(),
            contents: render_vite_config(descriptor),
        }];

        match html::html_source(&project.root, flavor) {
            Some(source) => {
                debug!("Patching {}", source.display());
                let page = tokio::fs::read_to_string(&source).await?;
                files.push(PlannedFile {
                    path: project.root.join("index.html"),
                    contents: html::patch_html(&page, entry),
                });
            }
            None => warn!("No index.html template found; add one that loads {}", entry),
        }

        let manifest = package::rewrite_manifest(&project.manifest.raw, &descriptor.dev_dependencies);
        files.push(PlannedFile {
            path: project.root.join(MANIFEST_FILE),
            contents: package::to_manifest_string(&manifest),
        });

        Ok(Self { files })
    }

    /// Write every planned file
    pub async fn commit(&self) -> Result<()> {
        for file in &self.files {
            if let Some(parent) = file.path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&file.path, &file.contents).await?;
            debug!("Wrote {}", file.path.display());
        }
        Ok(())
    }
}
