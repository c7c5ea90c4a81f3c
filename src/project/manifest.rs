//! package.json snapshot

use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{MigrateError, Result};

pub const MANIFEST_FILE: &str = "package.json";

/// Parsed package.json
///
/// Only the fields the migration reads are modeled; `raw` keeps the whole
/// document so a rewritten copy can preserve everything else.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub dependencies: IndexMap<String, String>,

    #[serde(default, rename = "devDependencies")]
    pub dev_dependencies: IndexMap<String, String>,

    #[serde(default)]
    pub scripts: IndexMap<String, String>,

    #[serde(skip)]
    pub raw: Value,
}

impl Manifest {
    /// Parse a manifest from JSON text
    pub fn parse(path: &Path, content: &str) -> Result<Self> {
        let raw: Value = serde_json::from_str(content).map_err(|e| MigrateError::ManifestRead {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        let mut manifest: Manifest =
            serde_json::from_value(raw.clone()).map_err(|e| MigrateError::ManifestRead {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;
        manifest.raw = raw;
        Ok(manifest)
    }

    /// Read `package.json` from a project root
    pub async fn read(root: &Path) -> Result<Self> {
        let path = root.join(MANIFEST_FILE);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| MigrateError::ManifestRead {
                path: path.clone(),
                reason: e.to_string(),
            })?;

        debug!("Read manifest {}", path.display());
        Self::parse(&path, &content)
    }

    /// Version spec of a package from dependencies or devDependencies
    pub fn dependency(&self, name: &str) -> Option<&str> {
        self.dependencies
            .get(name)
            .or_else(|| self.dev_dependencies.get(name))
            .map(String::as_str)
    }

    pub fn has_dependency(&self, name: &str) -> bool {
        self.dependency(name).is_some()
    }

    /// Whether any script command contains `needle`
    pub fn script_mentions(&self, needle: &str) -> bool {
        self.scripts.values().any(|cmd| cmd.contains(needle))
    }
}

/// Immutable view of the project being migrated
#[derive(Debug, Clone)]
pub struct ProjectDescriptor {
    pub root: PathBuf,
    pub manifest: Manifest,
}

impl ProjectDescriptor {
    pub async fn read(root: &Path) -> Result<Self> {
        let manifest = Manifest::read(root).await?;
        Ok(Self {
            root: root.to_path_buf(),
            manifest,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_manifest() {
        let manifest = Manifest::parse(
            Path::new("package.json"),
            r#"{
                "name": "app",
                "dependencies": { "react": "^17.0.2" },
                "devDependencies": { "react-scripts": "4.0.3" },
                "scripts": { "start": "react-scripts start" },
                "browserslist": ["> 0.2%"]
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.dependency("react"), Some("^17.0.2"));
        assert_eq!(manifest.dependency("react-scripts"), Some("4.0.3"));
        assert!(!manifest.has_dependency("vue"));
        assert!(manifest.script_mentions("react-scripts"));
        assert_eq!(manifest.raw["browserslist"][0], "> 0.2%");
    }

    #[test]
    fn test_malformed_manifest() {
        let err = Manifest::parse(Path::new("package.json"), "{ nope").unwrap_err();
        assert!(matches!(err, MigrateError::ManifestRead { .. }));
    }

    #[tokio::test]
    async fn test_missing_manifest() {
        let dir = tempfile::TempDir::new().unwrap();
        let err = ProjectDescriptor::read(dir.path()).await.unwrap_err();
        assert!(matches!(err, MigrateError::ManifestRead { .. }));
    }
}
