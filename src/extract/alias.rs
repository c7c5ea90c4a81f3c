//! Alias extraction
//!
//! Aliases come from two places: the webpack `resolve.alias` table and the
//! `baseUrl` of tsconfig.json / jsconfig.json, whose child directories are
//! importable as bare specifiers.

use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{MigrateError, Result};
use crate::utils::{clean_path, relative_path, strip_json_comments};

/// Where an alias points
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AliasTarget {
    /// A path inside the project, relative to its root
    Project(String),
    /// Anything else, passed through untouched (usually a package name)
    Literal(String),
}

pub type AliasTable = IndexMap<String, AliasTarget>;

/// Project reference files, in lookup order
const REFERENCE_FILES: &[&str] = &["tsconfig.json", "jsconfig.json"];

/// Turn the webpack alias table into alias targets.
///
/// Targets under `root` become root-relative; everything else is literal.
pub fn aliases_from_config(root: &Path, declared: &IndexMap<String, String>) -> AliasTable {
    declared
        .iter()
        .map(|(name, target)| {
            let target_path = Path::new(target);
            let alias = if target_path.is_absolute() && target_path.starts_with(root) {
                AliasTarget::Project(relative_path(root, target_path).unwrap_or_default())
            } else {
                AliasTarget::Literal(target.clone())
            };
            (name.clone(), alias)
        })
        .collect()
}

/// Infer aliases from the project reference file's `baseUrl`.
///
/// No reference file or no `baseUrl` yields an empty table. A file that
/// cannot be parsed or a `baseUrl` that is not a directory is an
/// `AliasInference` error.
pub fn infer_aliases(root: &Path) -> Result<AliasTable> {
    let Some(file) = REFERENCE_FILES
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.is_file())
    else {
        return Ok(AliasTable::new());
    };

    let inference_error = |reason: String| MigrateError::AliasInference {
        path: file.clone(),
        reason,
    };

    let content = fs::read_to_string(&file).map_err(|e| inference_error(e.to_string()))?;
    let json: Value = serde_json::from_str(&strip_json_comments(&content))
        .map_err(|e| inference_error(e.to_string()))?;

    let Some(base_url) = json
        .pointer("/compilerOptions/baseUrl")
        .and_then(Value::as_str)
    else {
        return Ok(AliasTable::new());
    };
    debug!("baseUrl of {} is {}", file.display(), base_url);

    let base_dir = root.join(base_url);
    if !base_dir.is_dir() {
        return Err(inference_error(format!(
            "baseUrl {} is not a directory",
            base_dir.display()
        )));
    }

    let mut aliases = AliasTable::new();
    for entry in WalkDir::new(&base_dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.map_err(|e| inference_error(e.to_string()))?;
        if !entry.file_type().is_dir() {
            continue;
        }
        let name = entry.file_name().to_string_lossy().to_string();
        let target = clean_path(&format!("{}/{}", base_url, name));
        aliases.insert(name, AliasTarget::Project(target));
    }

    Ok(aliases)
}

/// Merge inferred and declared aliases; declared ones win on collision
pub fn merge_aliases(declared: AliasTable, inferred: AliasTable) -> AliasTable {
    let mut merged = inferred;
    for (name, target) in declared {
        merged.insert(name, target);
    }
    merged
}
