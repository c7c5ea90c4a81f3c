//! Settings schema definitions

use semver::Version;
use serde::{Deserialize, Serialize};

/// Proxy extraction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProxySettings {
    /// Package whose factory the setup script calls
    #[serde(default = "default_proxy_package")]
    pub package: String,

    /// Setup script, relative to the project root
    #[serde(default = "default_setup_script")]
    pub setup_script: String,

    /// Version boundaries deciding where the factory binding lives
    #[serde(default = "default_policy")]
    pub policy: Vec<BindingPolicy>,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            package: default_proxy_package(),
            setup_script: default_setup_script(),
            policy: default_policy(),
        }
    }
}

impl ProxySettings {
    /// Binding for an installed middleware version.
    ///
    /// The policy entry with the highest `min_version` not above `version` wins,
    /// so the table does not have to be written in any particular order.
    pub fn binding_for(&self, version: &Version) -> Option<&Binding> {
        self.policy
            .iter()
            .filter(|p| &p.min_version <= version)
            .max_by(|a, b| a.min_version.cmp(&b.min_version))
            .map(|p| &p.binding)
    }
}

/// One row of the version policy table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingPolicy {
    /// Lowest middleware version this row applies to
    pub min_version: Version,

    /// Where the factory function is bound
    pub binding: Binding,
}

/// Binding site of the proxy factory inside the middleware module
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Binding {
    /// `const { createProxyMiddleware } = require(pkg)`
    Named { export: String },

    /// `const proxy = require(pkg)`
    Default,
}

fn default_proxy_package() -> String {
    "http-proxy-middleware".to_string()
}

fn default_setup_script() -> String {
    "src/setupProxy.js".to_string()
}

fn default_policy() -> Vec<BindingPolicy> {
    vec![
        BindingPolicy {
            min_version: Version::new(1, 0, 0),
            binding: Binding::Named {
                export: "createProxyMiddleware".to_string(),
            },
        },
        BindingPolicy {
            min_version: Version::new(0, 0, 0),
            binding: Binding::Default,
        },
    ]
}
