//! Fact extraction from an existing webpack project
//!
//! - `config_path`: where the webpack config lives
//! - `loader`: evaluating it into a [`NormalizedConfig`]
//! - `alias`, `entry`, `proxy`: the slices the Vite config needs

pub mod alias;
pub mod config_path;
pub mod entry;
pub mod loader;
pub mod proxy;

pub use alias::{AliasTable, AliasTarget};
pub use config_path::resolve_config_path;
pub use entry::extract_entries;
pub use loader::{ConfigLoader, ConfigShape, NormalizedConfig};
pub use proxy::{ProxyExtractor, ProxyRule, ProxyRuleSet};
