//! `vite.config.js` rendering

use std::fmt::Write;

use serde_json::{Map, Value};

use super::SynthesisDescriptor;
use crate::extract::AliasTarget;

/// Render the descriptor as Vite config source text
pub fn render_vite_config(descriptor: &SynthesisDescriptor) -> String {
    let mut out = String::new();

    out.push_str("import { defineConfig } from 'vite';\n");
    out.push_str("import path from 'path';\n");
    for (binding, package) in &descriptor.imports {
        let _ = writeln!(out, "import {} from {};", binding, js_str(package));
    }

    out.push_str("\n// https://vitejs.dev/config/\n");
    out.push_str("export default defineConfig(({ command }) => {\n");

    let mut targets: Vec<&str> = Vec::new();
    for block in &descriptor.conditional_blocks {
        if !targets.contains(&block.target.as_str()) {
            targets.push(&block.target);
        }
    }
    for target in &targets {
        let _ = writeln!(out, "  const {} = {{}};", target);
    }
    if !targets.is_empty() {
        out.push('\n');
    }
    for block in &descriptor.conditional_blocks {
        let _ = writeln!(out, "  if (command === '{}') {{", block.command.as_str());
        for line in block.body.lines() {
            let _ = writeln!(out, "    {}", line);
        }
        out.push_str("  }\n");
    }
    if !descriptor.conditional_blocks.is_empty() {
        out.push('\n');
    }

    out.push_str("  return {\n");

    out.push_str("    resolve: {\n      alias: {\n");
    for (name, target) in &descriptor.alias_table {
        let value = match target {
            AliasTarget::Project(rel) => {
                format!("path.resolve(__dirname, {})", js_str(&format!("./{}", rel)))
            }
            AliasTarget::Literal(literal) => js_str(literal),
        };
        let _ = writeln!(out, "        {}: {},", js_str(name), value);
    }
    out.push_str("      },\n    },\n");

    out.push_str("    server: {\n      proxy: {\n");
    for rule in descriptor.proxy_rules.rules() {
        let _ = writeln!(
            out,
            "        {}: {},",
            js_str(&rule.match_pattern),
            proxy_options(&rule.options)
        );
    }
    out.push_str("      },\n    },\n");

    out.push_str("    plugins: [\n");
    for plugin in &descriptor.plugins {
        let _ = writeln!(out, "      {},", plugin);
    }
    out.push_str("    ],\n");

    if targets.contains(&"optimizeDeps") {
        out.push_str("    optimizeDeps,\n");
    }
    if targets.contains(&"rollupOptions") {
        out.push_str("    build: {\n      rollupOptions,\n    },\n");
    }

    out.push_str("  };\n});\n");
    out
}

/// Proxy options as a JS object literal.
///
/// http-proxy-middleware's `pathRewrite` map becomes Vite's `rewrite`.
fn proxy_options(options: &Value) -> String {
    let mut options = match options {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    };

    let rewrite = match options.shift_remove("pathRewrite") {
        Some(Value::Object(rewrites)) if !rewrites.is_empty() => {
            let mut expr = String::from("p");
            for (pattern, replacement) in &rewrites {
                let replacement = replacement.as_str().unwrap_or_default();
                let _ = write!(
                    expr,
                    ".replace(new RegExp({}), {})",
                    js_str(pattern),
                    js_str(replacement)
                );
            }
            Some(format!("rewrite: (p) => {}", expr))
        }
        _ => None,
    };

    let object = Value::Object(options).to_string();
    match rewrite {
        None => object,
        Some(rewrite) if object == "{}" => format!("{{ {} }}", rewrite),
        Some(rewrite) => format!("{}, {} }}", &object[..object.len() - 1], rewrite),
    }
}

fn js_str(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{AliasTable, ProxyRuleSet};
    use crate::project::{Flavor, ProjectProfile};
    use crate::synth::assemble;
    use serde_json::json;

    fn react_descriptor() -> SynthesisDescriptor {
        let mut aliases = AliasTable::new();
        aliases.insert("@".into(), AliasTarget::Project("src".into()));
        aliases.insert("react-native".into(), AliasTarget::Literal("react-native-web".into()));
        let mut proxy = ProxyRuleSet::new();
        proxy.register("/api", json!({"target": "http://localhost:3000", "changeOrigin": true}));

        assemble(
            &ProjectProfile {
                flavor: Flavor::CraNoEject,
                modern_jsx: true,
                vue_major: None,
                declares_webpack: false,
            },
            aliases,
            proxy,
            vec!["/src/index.js".into()],
        )
    }

    #[test]
    fn test_render_react_config() {
        let source = render_vite_config(&react_descriptor());

        assert!(source.contains("import vitePluginReactJsSupport from \"vite-plugin-react-js-support\";"));
        assert!(source.contains("\"@\": path.resolve(__dirname, \"./src\"),"));
        assert!(source.contains("\"react-native\": \"react-native-web\","));
        assert!(source.contains(
            "\"/api\": {\"target\":\"http://localhost:3000\",\"changeOrigin\":true},"
        ));
        assert!(source.contains("vitePluginReactJsSupport([], { jsxInject: true }),"));
        assert!(source.contains("  if (command === 'serve') {\n    optimizeDeps.entries = false;\n  }"));
        assert!(source.contains("    optimizeDeps,\n    build: {\n      rollupOptions,\n    },"));
        assert!(source.ends_with("  };\n});\n"));
    }

    #[test]
    fn test_render_is_byte_identical() {
        assert_eq!(
            render_vite_config(&react_descriptor()),
            render_vite_config(&react_descriptor())
        );
    }

    #[test]
    fn test_path_rewrite_becomes_rewrite() {
        let rendered = proxy_options(&json!({
            "target": "http://localhost:3000",
            "pathRewrite": { "^/api": "" }
        }));
        assert_eq!(
            rendered,
            "{\"target\":\"http://localhost:3000\", rewrite: (p) => p.replace(new RegExp(\"^/api\"), \"\") }"
        );

        let only_rewrite = proxy_options(&json!({ "pathRewrite": { "^/old": "/new" } }));
        assert_eq!(
            only_rewrite,
            "{ rewrite: (p) => p.replace(new RegExp(\"^/old\"), \"/new\") }"
        );
    }

    #[test]
    fn test_empty_descriptor_renders() {
        let source = render_vite_config(&SynthesisDescriptor::default());
        assert!(source.contains("alias: {\n      },"));
        assert!(source.contains("plugins: [\n    ],"));
        assert!(!source.contains("esbuild"));
        assert!(!source.contains("optimizeDeps,"));
    }
}
