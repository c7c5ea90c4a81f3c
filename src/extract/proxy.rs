//! Proxy rule extraction
//!
//! CRA projects register proxies imperatively in `src/setupProxy.js`, so the
//! rules only exist as side effects of running that script. The script is run
//! with the middleware factory swapped for a recorder. Vue projects declare
//! `devServer.proxy` statically and are read directly.

use std::path::Path;
use std::sync::Arc;

use indexmap::IndexMap;
use semver::Version;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info, warn};

use super::loader::NormalizedConfig;
use crate::config::ProxySettings;
use crate::error::{MigrateError, Result};
use crate::project::{version, Flavor};
use crate::runtime::{harness, ScriptRuntime};

/// One dev-server proxy registration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProxyRule {
    #[serde(rename = "matchPattern")]
    pub match_pattern: String,
    pub options: Value,
}

/// Proxy rules keyed by pattern, in registration order.
///
/// Registering a pattern again replaces its options but keeps its position.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ProxyRuleSet(IndexMap<String, Value>);

impl ProxyRuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, match_pattern: impl Into<String>, options: Value) {
        self.0.insert(match_pattern.into(), options);
    }

    pub fn get(&self, match_pattern: &str) -> Option<&Value> {
        self.0.get(match_pattern)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn rules(&self) -> impl Iterator<Item = ProxyRule> + '_ {
        self.0.iter().map(|(pattern, options)| ProxyRule {
            match_pattern: pattern.clone(),
            options: options.clone(),
        })
    }

    /// Register one recorded `(context, options)` call.
    ///
    /// An array context registers every pattern in it; a filter function
    /// arrives as `null` and cannot be expressed, so it is skipped.
    fn record(&mut self, context: &Value, options: &Value) {
        match context {
            Value::String(pattern) => self.register(pattern.clone(), options.clone()),
            Value::Array(patterns) => {
                for pattern in patterns.iter().filter_map(Value::as_str) {
                    self.register(pattern, options.clone());
                }
            }
            other => warn!("Skipping proxy with unsupported context {}", other),
        }
    }
}

/// Recovers proxy rules for a project
pub struct ProxyExtractor {
    runtime: Arc<dyn ScriptRuntime>,
    settings: ProxySettings,
}

impl ProxyExtractor {
    pub fn new(runtime: Arc<dyn ScriptRuntime>, settings: ProxySettings) -> Self {
        Self { runtime, settings }
    }

    /// Proxy rules for the project; failures are logged and yield no rules
    pub async fn extract(&self, root: &Path, flavor: Flavor, config: &NormalizedConfig) -> ProxyRuleSet {
        let outcome = if flavor.is_react() {
            self.from_setup_script(root).await
        } else if flavor.is_vue() {
            from_dev_server(config)
        } else {
            debug!("No proxy extraction for {} projects", flavor);
            Ok(ProxyRuleSet::new())
        };

        match outcome {
            Ok(rules) => {
                info!("Recovered {} proxy rule(s)", rules.len());
                rules
            }
            Err(err) => {
                warn!("{}; continuing without proxy rules", err);
                ProxyRuleSet::new()
            }
        }
    }

    /// Run the setup script against a recording stand-in for the middleware
    pub async fn from_setup_script(&self, root: &Path) -> Result<ProxyRuleSet> {
        let setup = root.join(&self.settings.setup_script);
        if !setup.is_file() {
            debug!("No {}, skipping proxy extraction", self.settings.setup_script);
            return Ok(ProxyRuleSet::new());
        }

        let Some(installed) = self.installed_version(&setup, root).await? else {
            debug!("{} is not installed, skipping proxy extraction", self.settings.package);
            return Ok(ProxyRuleSet::new());
        };

        let binding = self.settings.binding_for(&installed).ok_or_else(|| {
            MigrateError::ProxyExtraction(format!(
                "no binding policy covers {} {}",
                self.settings.package, installed
            ))
        })?;
        debug!("{} {} binds its factory as {:?}", self.settings.package, installed, binding);

        let program = harness::intercept_proxy(&setup, &self.settings.package, binding, root);
        let result = self
            .runtime
            .evaluate(&program)
            .await
            .map_err(|e| MigrateError::ProxyExtraction(e.to_string()))?;

        if result.get("restored").and_then(Value::as_bool) != Some(true) {
            warn!("{} binding was not restored after interception", self.settings.package);
        }
        if let Some(error) = result.get("error").and_then(Value::as_str) {
            return Err(MigrateError::ProxyExtraction(error.to_string()));
        }

        let mut rules = ProxyRuleSet::new();
        for call in result
            .get("rules")
            .and_then(Value::as_array)
            .into_iter()
            .flatten()
        {
            let context = call.get(0).unwrap_or(&Value::Null);
            let options = call.get(1).cloned().unwrap_or_else(|| Value::Object(Default::default()));
            rules.record(context, &options);
        }

        Ok(rules)
    }

    /// Version of the middleware package that `require` finds from the setup
    /// script, which is the copy the harness intercepts
    async fn installed_version(&self, setup: &Path, root: &Path) -> Result<Option<Version>> {
        let from = setup.parent().unwrap_or(root);
        let program = harness::locate_package(&self.settings.package, from, root);
        let located = self
            .runtime
            .evaluate(&program)
            .await
            .map_err(|e| MigrateError::ProxyExtraction(e.to_string()))?;

        if located.is_null() {
            return Ok(None);
        }
        let manifest = located.get("manifest").and_then(Value::as_str).unwrap_or_default();
        debug!("{} resolves to {}", self.settings.package, manifest);

        located
            .get("version")
            .and_then(Value::as_str)
            .and_then(version::parse_loose)
            .map(Some)
            .ok_or_else(|| {
                MigrateError::ProxyExtraction(format!("{} has no usable version", manifest))
            })
    }
}

/// Read webpack-dev-server's static `devServer.proxy`
///
/// Object form maps patterns to options (or a bare target string); array
/// form lists `{ context, ...options }` entries.
pub fn from_dev_server(config: &NormalizedConfig) -> Result<ProxyRuleSet> {
    let mut rules = ProxyRuleSet::new();
    let Some(proxy) = config.dev_server().and_then(|d| d.get("proxy")) else {
        return Ok(rules);
    };

    match proxy {
        Value::Object(map) => {
            for (pattern, options) in map {
                let options = match options {
                    Value::String(target) => serde_json::json!({ "target": target }),
                    other => other.clone(),
                };
                rules.register(pattern.clone(), options);
            }
        }
        Value::Array(entries) => {
            for entry in entries {
                let mut options = entry.clone();
                let context = options
                    .as_object_mut()
                    .and_then(|o| o.shift_remove("context"))
                    .unwrap_or(Value::Null);
                rules.record(&context, &options);
            }
        }
        Value::String(target) => {
            return Err(MigrateError::ProxyExtraction(format!(
                "catch-all devServer.proxy \"{}\" has no Vite equivalent",
                target
            )));
        }
        _ => {}
    }

    Ok(rules)
}
