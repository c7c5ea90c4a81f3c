//! Error taxonomy for the migration pipeline

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, MigrateError>;

#[derive(Debug, Error)]
pub enum MigrateError {
    // Fatal: the pipeline cannot continue
    #[error("could not read package.json at {path}: {reason}")]
    ManifestRead { path: PathBuf, reason: String },

    #[error(
        "no webpack config found for this project (tried: {}); pass it explicitly with --config",
        .tried.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
    )]
    ConfigNotFound { tried: Vec<PathBuf> },

    #[error("failed to load webpack config {path}: {cause}")]
    ConfigLoad { path: PathBuf, cause: String },

    #[error("node executable `{0}` is not available: {1}")]
    RuntimeUnavailable(String, String),

    #[error("no entry module could be derived from the webpack config")]
    MissingEntry,

    // Recovered: logged and replaced with an empty value
    #[error("could not infer aliases from {path}: {reason}")]
    AliasInference { path: PathBuf, reason: String },

    #[error("proxy extraction failed: {0}")]
    ProxyExtraction(String),

    #[error("invalid settings file {path}: {reason}")]
    Settings { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl MigrateError {
    /// Whether the pipeline may substitute a default and carry on.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            MigrateError::AliasInference { .. } | MigrateError::ProxyExtraction(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_not_found_mentions_override() {
        let err = MigrateError::ConfigNotFound {
            tried: vec![PathBuf::from("/p/config/webpack.config.js")],
        };
        let msg = err.to_string();
        assert!(msg.contains("--config"));
        assert!(msg.contains("/p/config/webpack.config.js"));
    }

    #[test]
    fn test_recoverable_split() {
        assert!(MigrateError::ProxyExtraction("boom".into()).is_recoverable());
        assert!(!MigrateError::MissingEntry.is_recoverable());
    }
}
