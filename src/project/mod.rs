//! Project inspection
//!
//! Reads the manifest and decides which webpack toolchain the project is
//! built with.

mod manifest;
pub mod version;

use serde::Serialize;

pub use manifest::{Manifest, ProjectDescriptor, MANIFEST_FILE};

/// Script wrapper present in every un-ejected CRA project
const CRA_SCRIPTS: &str = "react-scripts";
/// Override tooling layered on top of CRA
const REWIRED: &str = "react-app-rewired";
const VUE_CLI_SERVICE_PKG: &str = "@vue/cli-service";
const VUE_CLI_SERVICE_BIN: &str = "vue-cli-service";

/// Build-tooling variant of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum Flavor {
    /// Create React App, still delegating through `react-scripts`
    CraNoEject,
    /// Create React App after `eject`
    CraEjected,
    /// CRA with `config-overrides.js`
    ReactAppRewired,
    /// Vue CLI (`@vue/cli-service`)
    VueCli,
    /// Vue with a hand-rolled webpack config
    VuePlain,
    /// Anything else
    Other,
}

impl Flavor {
    pub fn is_react(&self) -> bool {
        matches!(
            self,
            Flavor::CraNoEject | Flavor::CraEjected | Flavor::ReactAppRewired
        )
    }

    pub fn is_vue(&self) -> bool {
        matches!(self, Flavor::VueCli | Flavor::VuePlain)
    }
}

impl std::fmt::Display for Flavor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Flavor::CraNoEject => "create-react-app",
            Flavor::CraEjected => "create-react-app (ejected)",
            Flavor::ReactAppRewired => "react-app-rewired",
            Flavor::VueCli => "vue-cli",
            Flavor::VuePlain => "vue (webpack)",
            Flavor::Other => "webpack",
        };
        f.write_str(name)
    }
}

/// Classify a project from its manifest alone.
///
/// `react` wins over `vue`. Within the React family the override tooling
/// beats the ejection check, which itself looks for the CRA wrapper in the
/// scripts rather than in the dependencies.
pub fn classify(manifest: &Manifest) -> Flavor {
    if manifest.has_dependency("react") {
        if manifest.has_dependency(REWIRED) {
            Flavor::ReactAppRewired
        } else if manifest.script_mentions(CRA_SCRIPTS) {
            Flavor::CraNoEject
        } else {
            Flavor::CraEjected
        }
    } else if manifest.has_dependency("vue") {
        if manifest.has_dependency(VUE_CLI_SERVICE_PKG)
            || manifest.script_mentions(VUE_CLI_SERVICE_BIN)
        {
            Flavor::VueCli
        } else {
            Flavor::VuePlain
        }
    } else {
        Flavor::Other
    }
}

/// Facts about the project beyond its flavor
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectProfile {
    pub flavor: Flavor,

    /// React >= 17 or react-scripts >= 4, i.e. the automatic JSX runtime
    pub modern_jsx: bool,

    /// Major version of `vue`, when it is a dependency
    pub vue_major: Option<u64>,

    /// The manifest lists `webpack` itself
    pub declares_webpack: bool,
}

impl ProjectProfile {
    pub fn from_manifest(manifest: &Manifest) -> Self {
        let flavor = classify(manifest);

        let modern_jsx = manifest
            .dependency("react")
            .is_some_and(|v| version::at_least(v, "17.0.0"))
            || manifest
                .dependency(CRA_SCRIPTS)
                .is_some_and(|v| version::at_least(v, "4.0.0"));

        let vue_major = manifest
            .dependency("vue")
            .and_then(version::parse_loose)
            .map(|v| v.major);

        Self {
            flavor,
            modern_jsx,
            vue_major,
            declares_webpack: manifest.has_dependency("webpack"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    fn manifest(json: &str) -> Manifest {
        Manifest::parse(Path::new("package.json"), json).unwrap()
    }

    #[test]
    fn test_cra_no_eject() {
        let m = manifest(
            r#"{"dependencies":{"react":"^17.0.2","react-scripts":"4.0.3"},
                "scripts":{"start":"react-scripts start","build":"react-scripts build"}}"#,
        );
        assert_eq!(classify(&m), Flavor::CraNoEject);
    }

    #[test]
    fn test_cra_ejected() {
        let m = manifest(
            r#"{"dependencies":{"react":"^16.13.1","webpack":"4.44.2"},
                "scripts":{"start":"node scripts/start.js"}}"#,
        );
        assert_eq!(classify(&m), Flavor::CraEjected);
    }

    #[test]
    fn test_rewired_overrides_eject_check() {
        let m = manifest(
            r#"{"dependencies":{"react":"^17.0.0","react-scripts":"4.0.0"},
                "devDependencies":{"react-app-rewired":"^2.1.8"},
                "scripts":{"start":"react-app-rewired start"}}"#,
        );
        assert_eq!(classify(&m), Flavor::ReactAppRewired);
    }

    #[test]
    fn test_vue_cli_by_dependency_or_script() {
        let by_dep = manifest(
            r#"{"dependencies":{"vue":"^2.6.11"},"devDependencies":{"@vue/cli-service":"~4.5.0"}}"#,
        );
        let by_script = manifest(
            r#"{"dependencies":{"vue":"^3.0.0"},"scripts":{"serve":"vue-cli-service serve"}}"#,
        );
        assert_eq!(classify(&by_dep), Flavor::VueCli);
        assert_eq!(classify(&by_script), Flavor::VueCli);
    }

    #[test]
    fn test_vue_plain_and_other() {
        let plain = manifest(r#"{"dependencies":{"vue":"^2.5.2","webpack":"^3.6.0"}}"#);
        let other = manifest(r#"{"dependencies":{"lodash":"^4.17.0"}}"#);
        let empty = manifest("{}");
        assert_eq!(classify(&plain), Flavor::VuePlain);
        assert_eq!(classify(&other), Flavor::Other);
        assert_eq!(classify(&empty), Flavor::Other);
    }

    #[test]
    fn test_classification_is_deterministic() {
        let json = r#"{"dependencies":{"react":"18.2.0"},"scripts":{"a":"react-scripts test"}}"#;
        let first = classify(&manifest(json));
        for _ in 0..5 {
            assert_eq!(classify(&manifest(json)), first);
        }
    }

    #[test]
    fn test_profile() {
        let m = manifest(
            r#"{"dependencies":{"react":"^16.14.0","react-scripts":"4.0.1","webpack":"4"}}"#,
        );
        let profile = ProjectProfile::from_manifest(&m);
        assert!(profile.modern_jsx);
        assert!(profile.declares_webpack);
        assert_eq!(profile.vue_major, None);

        let vue = ProjectProfile::from_manifest(&manifest(r#"{"dependencies":{"vue":"^3.2.0"}}"#));
        assert_eq!(vue.vue_major, Some(3));
        assert!(!vue.modern_jsx);
    }
}
