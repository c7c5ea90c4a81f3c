//! Entry extraction

use std::path::Path;

use serde_json::Value;
use tracing::debug;

use crate::utils::to_slash;

/// Flatten a webpack `entry` into workspace-relative module paths.
///
/// Accepts a string, an array of strings, or a map of named entries whose
/// values are strings, arrays or `{ import }` descriptors. Paths inside the
/// vendor directory are dropped; the rest lose their `cwd` prefix. Any other
/// shape yields an empty list.
pub fn extract_entries(descriptor: &Value, cwd: &Path, vendor_dir: &str) -> Vec<String> {
    let mut leaves = Vec::new();

    match descriptor {
        Value::String(_) | Value::Array(_) => collect_leaves(descriptor, &mut leaves),
        Value::Object(named) => {
            for value in named.values() {
                match value.get("import") {
                    Some(import) => collect_leaves(import, &mut leaves),
                    None => collect_leaves(value, &mut leaves),
                }
            }
        }
        _ => {}
    }

    let cwd = to_slash(cwd);
    let entries: Vec<String> = leaves
        .into_iter()
        .filter(|path| !path.contains(vendor_dir))
        .map(|path| workspace_relative(path, &cwd))
        .collect();

    debug!("Entries: {:?}", entries);
    entries
}

fn collect_leaves<'a>(value: &'a Value, leaves: &mut Vec<&'a str>) {
    match value {
        Value::String(s) => leaves.push(s.as_str()),
        Value::Array(items) => leaves.extend(items.iter().filter_map(Value::as_str)),
        _ => {}
    }
}

fn workspace_relative(path: &str, cwd: &str) -> String {
    let path = path.replace('\\', "/");
    let relative = match Path::new(&path).strip_prefix(cwd) {
        Ok(rest) => to_slash(rest),
        Err(_) => path.strip_prefix('.').unwrap_or(&path).to_string(),
    };

    if relative.starts_with('/') {
        relative
    } else {
        format!("/{}", relative)
    }
}
