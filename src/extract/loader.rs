//! Loading and normalizing webpack configs
//!
//! A config file exports one of three shapes. Each maps to one harness
//! program, so the loader never branches on `typeof` at runtime.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use super::config_path::base_config_path;
use crate::error::{MigrateError, Result};
use crate::project::Flavor;
use crate::runtime::{harness, EvalError, ScriptRuntime};

/// What a config module exports
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigShape {
    /// A plain config object
    Static(PathBuf),
    /// `module.exports = (mode) => config`
    Factory(PathBuf),
    /// `module.exports = (config, mode) => config`, applied to a base factory
    Override { overrides: PathBuf, base: PathBuf },
}

impl ConfigShape {
    /// File the shape was read from, used in error reports
    pub fn path(&self) -> &Path {
        match self {
            ConfigShape::Static(p) | ConfigShape::Factory(p) => p,
            ConfigShape::Override { overrides, .. } => overrides,
        }
    }
}

/// Webpack config reduced to the parts the migration reads
#[derive(Debug, Clone, Default, Serialize)]
pub struct NormalizedConfig {
    /// `resolve.alias` entries with string targets
    pub alias_table: IndexMap<String, String>,

    /// `entry`, in whichever shape the config used
    pub entry: Value,

    /// The whole serialized config
    #[serde(skip)]
    pub raw: Value,
}

impl NormalizedConfig {
    pub fn from_value(raw: Value) -> Option<Self> {
        if !raw.is_object() {
            return None;
        }

        let alias_table = raw
            .pointer("/resolve/alias")
            .and_then(Value::as_object)
            .map(|aliases| {
                aliases
                    .iter()
                    .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                    .collect()
            })
            .unwrap_or_default();

        let entry = raw.get("entry").cloned().unwrap_or(Value::Null);

        Some(Self {
            alias_table,
            entry,
            raw,
        })
    }

    /// `devServer` section, if the config has one
    pub fn dev_server(&self) -> Option<&Value> {
        self.raw.get("devServer")
    }
}

/// Evaluates config modules through a [`ScriptRuntime`]
pub struct ConfigLoader {
    runtime: Arc<dyn ScriptRuntime>,
    mode: String,
}

impl ConfigLoader {
    pub fn new(runtime: Arc<dyn ScriptRuntime>, mode: impl Into<String>) -> Self {
        Self {
            runtime,
            mode: mode.into(),
        }
    }

    /// Load the config at `path` for a project of the given flavor
    pub async fn load(
        &self,
        root: &Path,
        flavor: Flavor,
        path: &Path,
        explicit: bool,
    ) -> Result<NormalizedConfig> {
        let shape = self.shape_for(root, flavor, path, explicit).await?;
        info!("Loading webpack config {}", shape.path().display());
        self.normalize(root, &shape).await
    }

    /// Decide the shape of a config module.
    ///
    /// Overrides are known from the flavor; otherwise the export is probed.
    pub async fn shape_for(
        &self,
        root: &Path,
        flavor: Flavor,
        path: &Path,
        explicit: bool,
    ) -> Result<ConfigShape> {
        if flavor == Flavor::ReactAppRewired && !explicit {
            return Ok(ConfigShape::Override {
                overrides: path.to_path_buf(),
                base: base_config_path(root)?,
            });
        }

        let program = harness::probe_export(path, &self.mode, root);
        let kind = self
            .runtime
            .evaluate(&program)
            .await
            .map_err(|e| load_error(path, e))?;

        debug!("{} exports a {}", path.display(), kind);
        match kind.as_str() {
            Some("function") => Ok(ConfigShape::Factory(path.to_path_buf())),
            _ => Ok(ConfigShape::Static(path.to_path_buf())),
        }
    }

    /// Evaluate a shape in the configured mode
    pub async fn normalize(&self, root: &Path, shape: &ConfigShape) -> Result<NormalizedConfig> {
        let program = harness::load_config(shape, &self.mode, root);
        let raw = self
            .runtime
            .evaluate(&program)
            .await
            .map_err(|e| load_error(shape.path(), e))?;

        NormalizedConfig::from_value(raw).ok_or_else(|| MigrateError::ConfigLoad {
            path: shape.path().to_path_buf(),
            cause: "config did not evaluate to an object".to_string(),
        })
    }
}

fn load_error(path: &Path, err: EvalError) -> MigrateError {
    match err {
        EvalError::Spawn { node, reason } => MigrateError::RuntimeUnavailable(node, reason),
        other => MigrateError::ConfigLoad {
            path: path.to_path_buf(),
            cause: other.to_string(),
        },
    }
}
