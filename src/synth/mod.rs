//! Synthesis of the Vite configuration description
//!
//! Combines the extracted aliases, proxy rules and entries with the fixed
//! plugins and serve-time tweaks every migrated project needs.

mod render;

use indexmap::IndexMap;
use serde::Serialize;

use crate::extract::{AliasTable, ProxyRuleSet};
use crate::project::{Flavor, ProjectProfile};

pub use render::render_vite_config;

/// Vite release the generated config targets
pub const VITE_VERSION: &str = "^4.5.0";

/// Vite command a conditional block applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViteCommand {
    Serve,
    Build,
}

impl ViteCommand {
    pub fn as_str(&self) -> &'static str {
        match self {
            ViteCommand::Serve => "serve",
            ViteCommand::Build => "build",
        }
    }
}

/// Code applied to one of the config's mutable option objects
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConditionalBlock {
    /// Option object the body mutates (`optimizeDeps`, `rollupOptions`)
    pub target: String,
    pub command: ViteCommand,
    pub body: String,
}

/// Everything the renderer needs to write `vite.config.js`
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SynthesisDescriptor {
    /// Import binding -> package
    pub imports: IndexMap<String, String>,

    pub alias_table: AliasTable,

    pub proxy_rules: ProxyRuleSet,

    /// Plugin constructor calls, spliced verbatim
    pub plugins: Vec<String>,

    pub conditional_blocks: Vec<ConditionalBlock>,

    /// All entries; the first is injected into index.html
    pub entries: Vec<String>,

    /// Packages the generated config imports, with versions
    pub dev_dependencies: IndexMap<String, String>,
}

impl SynthesisDescriptor {
    pub fn primary_entry(&self) -> Option<&str> {
        self.entries.first().map(String::as_str)
    }

    fn add_plugin(&mut self, binding: &str, package: &str, version: &str, call: String) {
        self.imports.insert(binding.to_string(), package.to_string());
        self.dev_dependencies
            .insert(package.to_string(), version.to_string());
        self.plugins.push(call);
    }
}

/// Build the descriptor. Pure; empty aliases or proxies are valid.
pub fn assemble(
    profile: &ProjectProfile,
    alias_table: AliasTable,
    proxy_rules: ProxyRuleSet,
    entries: Vec<String>,
) -> SynthesisDescriptor {
    let mut descriptor = SynthesisDescriptor {
        alias_table,
        proxy_rules,
        entries,
        ..Default::default()
    };
    descriptor
        .dev_dependencies
        .insert("vite".to_string(), VITE_VERSION.to_string());

    match profile.flavor {
        Flavor::CraNoEject | Flavor::CraEjected | Flavor::ReactAppRewired => {
            // CRA allows JSX in .js files, which Vite does not parse by default
            descriptor.add_plugin(
                "vitePluginReactJsSupport",
                "vite-plugin-react-js-support",
                "^1.0.7",
                format!(
                    "vitePluginReactJsSupport([], {{ jsxInject: {} }})",
                    profile.modern_jsx
                ),
            );
        }
        Flavor::VueCli | Flavor::VuePlain => {
            if profile.vue_major == Some(2) {
                descriptor.add_plugin("vue2", "@vitejs/plugin-vue2", "^2.3.1", "vue2()".to_string());
            } else {
                descriptor.add_plugin("vue", "@vitejs/plugin-vue", "^4.5.0", "vue()".to_string());
            }
        }
        Flavor::Other => {}
    }

    descriptor.conditional_blocks = vec![
        ConditionalBlock {
            target: "optimizeDeps".to_string(),
            command: ViteCommand::Serve,
            body: "optimizeDeps.entries = false;".to_string(),
        },
        ConditionalBlock {
            target: "rollupOptions".to_string(),
            command: ViteCommand::Serve,
            body: "rollupOptions.input = [];".to_string(),
        },
    ];

    descriptor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::AliasTarget;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn profile(flavor: Flavor) -> ProjectProfile {
        ProjectProfile {
            flavor,
            modern_jsx: true,
            vue_major: None,
            declares_webpack: false,
        }
    }

    #[test]
    fn test_react_descriptor() {
        let mut aliases = AliasTable::new();
        aliases.insert("@".into(), AliasTarget::Project("src".into()));
        let mut proxy = ProxyRuleSet::new();
        proxy.register("/api", json!({"target": "http://localhost:3000"}));

        let d = assemble(
            &profile(Flavor::CraNoEject),
            aliases,
            proxy,
            vec!["/src/index.js".into()],
        );

        assert_eq!(
            d.imports.get("vitePluginReactJsSupport").map(String::as_str),
            Some("vite-plugin-react-js-support")
        );
        assert_eq!(d.plugins, vec!["vitePluginReactJsSupport([], { jsxInject: true })"]);
        assert_eq!(d.primary_entry(), Some("/src/index.js"));
        assert_eq!(d.conditional_blocks.len(), 2);
        assert!(d
            .conditional_blocks
            .iter()
            .all(|b| b.command == ViteCommand::Serve));
        assert!(d.dev_dependencies.contains_key("vite"));
    }

    #[test]
    fn test_vue_plugin_by_major() {
        let mut vue2 = profile(Flavor::VueCli);
        vue2.vue_major = Some(2);
        let d = assemble(&vue2, AliasTable::new(), ProxyRuleSet::new(), vec![]);
        assert_eq!(d.plugins, vec!["vue2()"]);

        let mut vue3 = profile(Flavor::VuePlain);
        vue3.vue_major = Some(3);
        let d = assemble(&vue3, AliasTable::new(), ProxyRuleSet::new(), vec![]);
        assert_eq!(d.plugins, vec!["vue()"]);
    }

    #[test]
    fn test_other_has_no_plugins_but_keeps_blocks() {
        let d = assemble(&profile(Flavor::Other), AliasTable::new(), ProxyRuleSet::new(), vec![]);
        assert!(d.plugins.is_empty());
        assert!(d.imports.is_empty());
        assert_eq!(d.conditional_blocks.len(), 2);
        assert_eq!(d.primary_entry(), None);
    }

    #[test]
    fn test_assembly_is_deterministic() {
        let build = || {
            let mut aliases = AliasTable::new();
            aliases.insert("b".into(), AliasTarget::Literal("b-pkg".into()));
            aliases.insert("a".into(), AliasTarget::Project("src/a".into()));
            assemble(&profile(Flavor::CraEjected), aliases, ProxyRuleSet::new(), vec![])
        };
        let first = serde_json::to_string(&build()).unwrap();
        let second = serde_json::to_string(&build()).unwrap();
        assert_eq!(first, second);
        assert!(first.find("\"b\"").unwrap() < first.find("\"a\"").unwrap());
    }
}
