//! wp2vite library
//!
//! Classifies webpack projects, evaluates their configs and synthesizes the
//! equivalent Vite setup.

pub mod cli;
pub mod config;
pub mod error;
pub mod extract;
pub mod migrator;
pub mod output;
pub mod project;
pub mod runtime;
pub mod synth;
pub mod utils;

pub use cli::Cli;
pub use config::Settings;
pub use error::MigrateError;
pub use migrator::Migrator;
