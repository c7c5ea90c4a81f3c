//! Locating the webpack config on disk

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{MigrateError, Result};
use crate::project::Flavor;

/// Conventional config locations per flavor, in probe order
pub fn candidates(flavor: Flavor) -> &'static [&'static str] {
    match flavor {
        Flavor::CraNoEject => &["node_modules/react-scripts/config/webpack.config.js"],
        Flavor::CraEjected => &["config/webpack.config.js", "config/webpack.config.dev.js"],
        Flavor::ReactAppRewired => &["config-overrides.js"],
        Flavor::VueCli => &["node_modules/@vue/cli-service/webpack.config.js"],
        Flavor::VuePlain | Flavor::Other => &["webpack.config.js", "build/webpack.dev.conf.js"],
    }
}

/// First existing config path for a flavor.
///
/// An explicit path wins over every convention and is never second-guessed:
/// if it does not exist the lookup fails instead of falling back.
pub fn resolve_config_path(root: &Path, flavor: Flavor, explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(explicit) = explicit {
        let path = if explicit.is_absolute() {
            explicit.to_path_buf()
        } else {
            root.join(explicit)
        };
        debug!("Using explicit config path {}", path.display());
        return if path.is_file() {
            Ok(path)
        } else {
            Err(MigrateError::ConfigNotFound { tried: vec![path] })
        };
    }

    let tried: Vec<PathBuf> = candidates(flavor).iter().map(|c| root.join(c)).collect();
    match tried.iter().find(|p| p.is_file()) {
        Some(found) => {
            debug!("Found {} config at {}", flavor, found.display());
            Ok(found.clone())
        }
        None => Err(MigrateError::ConfigNotFound { tried }),
    }
}

/// The un-overridden CRA config a react-app-rewired override is layered on
pub fn base_config_path(root: &Path) -> Result<PathBuf> {
    resolve_config_path(root, Flavor::CraNoEject, None)
}
