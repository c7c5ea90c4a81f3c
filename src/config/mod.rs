//! Settings handling for wp2vite
//!
//! Parses the optional `wp2vite.toml` found next to the project.

mod schema;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{MigrateError, Result};

pub use schema::*;

/// Default settings file name, looked up in the project root
pub const SETTINGS_FILE: &str = "wp2vite.toml";

/// Tool settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    /// Node executable used to evaluate project scripts
    #[serde(default = "default_node")]
    pub node: String,

    /// Mode passed to config factories and exported as NODE_ENV
    #[serde(default = "default_mode")]
    pub mode: String,

    /// Generated config file, relative to the project root
    #[serde(default = "default_output")]
    pub output: String,

    /// Dependency vendor directory name
    #[serde(default = "default_vendor_dir")]
    pub vendor_dir: String,

    /// Explicit webpack config path, bypassing flavor conventions
    #[serde(default)]
    pub config: Option<PathBuf>,

    /// Proxy extraction
    #[serde(default)]
    pub proxy: ProxySettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            node: default_node(),
            mode: default_mode(),
            output: default_output(),
            vendor_dir: default_vendor_dir(),
            config: None,
            proxy: ProxySettings::default(),
        }
    }
}

impl Settings {
    /// Load settings from a file path
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = fs::read_to_string(path)?;
        let settings: Settings = toml::from_str(&content).map_err(|e| MigrateError::Settings {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        debug!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Load settings for a project, falling back to defaults
    ///
    /// A relative `path` is looked up under `root`. A missing file is not an
    /// error; a malformed one is.
    pub fn discover(root: &Path, path: &str) -> Result<Self> {
        let candidate = if Path::new(path).is_absolute() {
            PathBuf::from(path)
        } else {
            root.join(path)
        };

        if candidate.is_file() {
            Self::load(&candidate)
        } else {
            debug!("No settings file at {}, using defaults", candidate.display());
            Ok(Self::default())
        }
    }

    /// Absolute path of the generated config file
    pub fn output_path(&self, root: &Path) -> PathBuf {
        root.join(&self.output)
    }
}

fn default_node() -> String {
    "node".to_string()
}

fn default_mode() -> String {
    "development".to_string()
}

fn default_output() -> String {
    "vite.config.js".to_string()
}

fn default_vendor_dir() -> String {
    "node_modules".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let settings = Settings::discover(dir.path(), SETTINGS_FILE).unwrap();

        assert_eq!(settings.mode, "development");
        assert_eq!(settings.output, "vite.config.js");
        assert_eq!(settings.proxy.package, "http-proxy-middleware");
        assert!(settings.config.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join(SETTINGS_FILE),
            r#"
node = "/opt/node/bin/node"
config = "build/webpack.js"

[proxy]
setup_script = "src/proxy.js"

[[proxy.policy]]
min_version = "0.0.0"
binding = { kind = "default" }
"#,
        )
        .unwrap();

        let settings = Settings::discover(dir.path(), SETTINGS_FILE).unwrap();
        assert_eq!(settings.node, "/opt/node/bin/node");
        assert_eq!(settings.config, Some(PathBuf::from("build/webpack.js")));
        assert_eq!(settings.proxy.setup_script, "src/proxy.js");
        assert_eq!(settings.proxy.package, "http-proxy-middleware");
        assert_eq!(settings.proxy.policy.len(), 1);
        assert_eq!(settings.vendor_dir, "node_modules");
    }

    #[test]
    fn test_malformed_file_is_error() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(SETTINGS_FILE), "node = [").unwrap();

        let err = Settings::discover(dir.path(), SETTINGS_FILE).unwrap_err();
        assert!(matches!(err, MigrateError::Settings { .. }));
    }
}
