//! Harness programs
//!
//! Every program shares a prelude that serializes arbitrary config objects
//! (functions dropped, regexes as source, cycles cut) and reports through
//! [`RESULT_MARKER`](super::RESULT_MARKER).

use std::path::Path;

use serde_json::{json, Value};

use super::{Program, RESULT_MARKER};
use crate::config::Binding;
use crate::extract::ConfigShape;

const MAX_DEPTH: usize = 12;

fn prelude() -> String {
    format!(
        r#"
const __MARKER = {marker};
const __Module = require('module');
const __path = require('path');
function __serialize(value) {{
  const ancestors = new WeakSet();
  const walk = (v, depth) => {{
    if (v === null) return null;
    if (v === undefined || typeof v === 'function' || typeof v === 'symbol') return undefined;
    if (typeof v === 'bigint') return v.toString();
    if (v instanceof RegExp) return v.toString();
    if (typeof v !== 'object') return v;
    if (ancestors.has(v) || depth > {max_depth}) return undefined;
    ancestors.add(v);
    let out;
    if (Array.isArray(v)) {{
      out = v.map((item) => {{
        const r = walk(item, depth + 1);
        return r === undefined ? null : r;
      }});
    }} else {{
      out = {{}};
      for (const key of Object.keys(v)) {{
        const r = walk(v[key], depth + 1);
        if (r !== undefined) out[key] = r;
      }}
    }}
    ancestors.delete(v);
    return out;
  }};
  return walk(value, 0);
}}
function __emit(payload) {{
  process.stdout.write('\n' + __MARKER + JSON.stringify(payload) + '\n');
}}
function __unwrap(m) {{
  return m && m.__esModule && 'default' in m ? m.default : m;
}}
"#,
        marker = js_str(RESULT_MARKER),
        max_depth = MAX_DEPTH,
    )
}

/// Wrap an async function body; its return value becomes the result
fn program(body: &str, cwd: &Path) -> Program {
    let source = format!(
        r#"{prelude}
(async () => {{
  try {{
    const value = await (async () => {{
{body}
    }})();
    __emit({{ ok: true, value: __serialize(value) }});
  }} catch (e) {{
    __emit({{ ok: false, error: String((e && e.stack) || e) }});
  }}
}})();
"#,
        prelude = prelude(),
        body = body,
    );
    Program::new(source, cwd)
}

/// JavaScript string literal
fn js_str(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

fn js_path(p: &Path) -> String {
    js_str(&p.to_string_lossy())
}

/// Report `typeof` of a module's export.
///
/// Module-level code runs here too, so the mode is already in the environment.
pub fn probe_export(path: &Path, mode: &str, cwd: &Path) -> Program {
    let body = format!(
        "      return typeof __unwrap(require({path}));",
        path = js_path(path)
    );
    program(&body, cwd).with_mode(mode)
}

/// Locate the `package.json` of `package` as `require` sees it from `from`.
///
/// The result is `{ manifest, version }`, or `null` when the package does not
/// resolve.
pub fn locate_package(package: &str, from: &Path, cwd: &Path) -> Program {
    let body = format!(
        r#"      const fs = require('fs');
      const name = {package};
      let resolved;
      try {{
        resolved = require.resolve(name, {{ paths: [{from}] }});
      }} catch (e) {{
        if (e && e.code === 'MODULE_NOT_FOUND') return null;
        throw e;
      }}
      const findPackageManifest = (start) => {{
        for (let dir = start; ; ) {{
          const candidate = __path.join(dir, 'package.json');
          if (fs.existsSync(candidate)) {{
            const manifest = JSON.parse(fs.readFileSync(candidate, 'utf8'));
            if (manifest.name === name) return {{ manifest: candidate, version: manifest.version }};
          }}
          const parent = __path.dirname(dir);
          if (parent === dir) return null;
          dir = parent;
        }}
      }};
      return findPackageManifest(__path.dirname(resolved));"#,
        package = js_str(package),
        from = js_path(from),
    );
    program(&body, cwd)
}

/// Evaluate a config in the given shape and return the resulting object
pub fn load_config(shape: &ConfigShape, mode: &str, cwd: &Path) -> Program {
    let mode_lit = js_str(mode);
    let body = match shape {
        ConfigShape::Static(path) => format!(
            "      return __unwrap(require({path}));",
            path = js_path(path)
        ),
        ConfigShape::Factory(path) => format!(
            "      return await __unwrap(require({path}))({mode});",
            path = js_path(path),
            mode = mode_lit
        ),
        ConfigShape::Override { overrides, base } => format!(
            r#"      const factory = __unwrap(require({base}));
      const baseConfig = typeof factory === 'function' ? await factory({mode}) : factory;
      const overrides = __unwrap(require({overrides}));
      const override = typeof overrides === 'function' ? overrides : overrides && overrides.webpack;
      if (typeof override !== 'function') {{
        throw new Error('override module exports no webpack function');
      }}
      return await override(baseConfig, {mode});"#,
            base = js_path(base),
            overrides = js_path(overrides),
            mode = mode_lit
        ),
    };
    program(&body, cwd).with_mode(mode)
}

fn binding_literal(binding: &Binding) -> String {
    match binding {
        Binding::Named { export } => json!({ "kind": "named", "export": export }).to_string(),
        Binding::Default => json!({ "kind": "default" }).to_string(),
    }
}

/// Run a proxy setup script with the middleware factory swapped for a recorder.
///
/// The result is `{ rules: [[context, options], ...], restored, error }`.
/// Middleware created from options alone takes the path it is mounted on
/// with `app.use(path, middleware)`, or `/` when mounted without one.
/// `restored` is a probe taken after the swap, on success and failure alike,
/// confirming the real factory is what `require` returns again; `error` is the
/// script's exception, if any.
pub fn intercept_proxy(setup: &Path, package: &str, binding: &Binding, cwd: &Path) -> Program {
    let body = format!(
        r#"      const setupFile = {setup};
      const binding = {binding};
      const filename = require.resolve({package}, {{ paths: [__path.dirname(setupFile)] }});
      const records = [];
      // options-only middleware, keyed to its record until a mount path names it
      const unmounted = new WeakMap();
      const stub = function (context, options) {{
        let mountable = false;
        if (options === undefined && context && typeof context === 'object' && !Array.isArray(context)) {{
          options = context;
          context = '/';
          mountable = true;
        }}
        records.push([context, options === undefined ? {{}} : options]);
        const middleware = function proxyStub(req, res, next) {{
          if (typeof next === 'function') next();
        }};
        if (mountable) unmounted.set(middleware, records.length - 1);
        return middleware;
      }};
      const app = {{
        use(...args) {{
          const mountPath = typeof args[0] === 'string' || Array.isArray(args[0]) ? args[0] : null;
          if (mountPath !== null) {{
            for (const handler of args.slice(1).flat()) {{
              if (typeof handler === 'function' && unmounted.has(handler)) {{
                records[unmounted.get(handler)][0] = mountPath;
                unmounted.delete(handler);
              }}
            }}
          }}
          return app;
        }},
      }};

      const withSubstitutedBinding = async (fn) => {{
        const previous = require.cache[filename];
        try {{
          const fake = new __Module(filename, null);
          fake.filename = filename;
          fake.loaded = true;
          if (binding.kind === 'named') {{
            fake.exports = Object.assign({{}}, require(filename), {{ [binding.export]: stub }});
          }} else {{
            fake.exports = stub;
          }}
          require.cache[filename] = fake;
          return await fn();
        }} finally {{
          delete require.cache[filename];
          if (previous) require.cache[filename] = previous;
        }}
      }};

      let failure = null;
      try {{
        await withSubstitutedBinding(async () => {{
          const setup = __unwrap(require(setupFile));
          if (typeof setup !== 'function') {{
            throw new Error('proxy setup script exports no function');
          }}
          await setup(app);
        }});
      }} catch (e) {{
        failure = String((e && e.stack) || e);
      }} finally {{
        delete require.cache[setupFile];
      }}

      const after = require(filename);
      const restored = binding.kind === 'named' ? after[binding.export] !== stub : after !== stub;
      return {{ rules: records, restored, error: failure }};"#,
        setup = js_path(setup),
        binding = binding_literal(binding),
        package = js_str(package),
    );
    program(&body, cwd)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_paths_are_escaped() {
        let program = probe_export(
            Path::new("/proj/it's \"odd\"/webpack.config.js"),
            "development",
            Path::new("/proj"),
        );
        assert!(program
            .source
            .contains(r#"require("/proj/it's \"odd\"/webpack.config.js")"#));
    }

    #[test]
    fn test_export_typeof_sets_mode_before_require() {
        let program = probe_export(Path::new("/p/config/webpack.config.js"), "development", Path::new("/p"));
        assert!(program
            .env
            .contains(&("NODE_ENV".to_string(), "development".to_string())));
        assert!(program
            .env
            .contains(&("BABEL_ENV".to_string(), "development".to_string())));
    }

    #[test]
    fn test_locate_program_resolves_from_setup_dir() {
        let program = locate_package("http-proxy-middleware", Path::new("/p/src"), Path::new("/p"));
        assert!(program
            .source
            .contains(r#"require.resolve(name, { paths: ["/p/src"] })"#));
        assert!(program.env.is_empty());
    }

    #[test]
    fn test_factory_program_passes_mode() {
        let shape = ConfigShape::Factory(PathBuf::from("/p/config/webpack.config.js"));
        let program = load_config(&shape, "development", Path::new("/p"));

        assert!(program
            .source
            .contains(r#"__unwrap(require("/p/config/webpack.config.js"))("development")"#));
        assert_eq!(program.cwd, PathBuf::from("/p"));
        assert!(program
            .env
            .contains(&("NODE_ENV".to_string(), "development".to_string())));
    }

    #[test]
    fn test_override_program_loads_base_first() {
        let shape = ConfigShape::Override {
            overrides: PathBuf::from("/p/config-overrides.js"),
            base: PathBuf::from("/p/node_modules/react-scripts/config/webpack.config.js"),
        };
        let source = load_config(&shape, "development", Path::new("/p")).source;

        let base_at = source.find("react-scripts/config/webpack.config.js").unwrap();
        let override_at = source.find("config-overrides.js").unwrap();
        assert!(base_at < override_at);
        assert!(source.contains("override(baseConfig, \"development\")"));
    }

    #[test]
    fn test_intercept_program_binding() {
        let named = intercept_proxy(
            Path::new("/p/src/setupProxy.js"),
            "http-proxy-middleware",
            &Binding::Named { export: "createProxyMiddleware".into() },
            Path::new("/p"),
        );
        assert!(named
            .source
            .contains(r#"{"kind":"named","export":"createProxyMiddleware"}"#));
        assert!(named.source.contains("delete require.cache[filename]"));
        assert!(named.source.contains("delete require.cache[setupFile]"));
        assert!(named.env.is_empty());
    }
}
