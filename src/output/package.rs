//! package.json rewriting

use indexmap::IndexMap;
use serde_json::{Map, Value};

/// CLI wrappers whose dev/build scripts are replaced by Vite
const WEBPACK_WRAPPERS: &[&str] = &["react-scripts", "react-app-rewired", "vue-cli-service"];

/// Copy of `raw` with Vite scripts and dev dependencies.
///
/// Start/serve and build invocations of the webpack wrappers are replaced;
/// every other field and script is kept in its original order. Dependencies
/// already present are not touched.
pub fn rewrite_manifest(raw: &Value, dev_dependencies: &IndexMap<String, String>) -> Value {
    let mut manifest = match raw {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };

    if let Some(Value::Object(scripts)) = manifest.get_mut("scripts") {
        for command in scripts.values_mut() {
            if let Some(replacement) = command.as_str().and_then(vite_script) {
                *command = Value::String(replacement.to_string());
            }
        }
    }

    let dev = manifest
        .entry("devDependencies")
        .or_insert_with(|| Value::Object(Map::new()));
    if let Value::Object(dev) = dev {
        for (package, version) in dev_dependencies {
            let declared = dev.contains_key(package)
                || raw
                    .get("dependencies")
                    .and_then(|d| d.get(package))
                    .is_some();
            if !declared {
                dev.insert(package.clone(), Value::String(version.clone()));
            }
        }
    }

    Value::Object(manifest)
}

/// Vite equivalent of a webpack wrapper script, if it has one
fn vite_script(command: &str) -> Option<&'static str> {
    let mut words = command.split_whitespace();
    words.find(|w| WEBPACK_WRAPPERS.contains(w))?;
    match words.next()? {
        "start" | "serve" => Some("vite"),
        "build" => Some("vite build"),
        _ => None,
    }
}

/// Serialize a manifest the way npm writes it
pub fn to_manifest_string(manifest: &Value) -> String {
    let mut out = serde_json::to_string_pretty(manifest).unwrap_or_else(|_| manifest.to_string());
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn deps() -> IndexMap<String, String> {
        let mut deps = IndexMap::new();
        deps.insert("vite".to_string(), "^4.5.0".to_string());
        deps.insert("vite-plugin-react-js-support".to_string(), "^1.0.7".to_string());
        deps
    }

    #[test]
    fn test_scripts_rewritten_others_kept() {
        let raw = json!({
            "name": "app",
            "scripts": {
                "start": "react-scripts start",
                "build": "GENERATE_SOURCEMAP=false react-app-rewired build",
                "test": "react-scripts test",
                "lint": "eslint src"
            },
            "eslintConfig": { "extends": "react-app" }
        });

        let out = rewrite_manifest(&raw, &deps());

        assert_eq!(out["scripts"]["start"], "vite");
        assert_eq!(out["scripts"]["build"], "vite build");
        assert_eq!(out["scripts"]["test"], "react-scripts test");
        assert_eq!(out["scripts"]["lint"], "eslint src");
        assert_eq!(out["eslintConfig"], json!({ "extends": "react-app" }));
        assert_eq!(out["devDependencies"]["vite"], "^4.5.0");

        let keys: Vec<&String> = out.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["name", "scripts", "eslintConfig", "devDependencies"]);
    }

    #[test]
    fn test_existing_dependencies_untouched() {
        let raw = json!({
            "dependencies": { "vite-plugin-react-js-support": "1.0.0" },
            "devDependencies": { "vite": "^2.0.0" }
        });

        let out = rewrite_manifest(&raw, &deps());
        assert_eq!(out["devDependencies"], json!({ "vite": "^2.0.0" }));
    }

    #[test]
    fn test_vue_cli_serve() {
        assert_eq!(vite_script("vue-cli-service serve --port 8081"), Some("vite"));
        assert_eq!(vite_script("vue-cli-service lint"), None);
        assert_eq!(vite_script("node scripts/start.js"), None);
    }
}
