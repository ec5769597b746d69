//! GitLab Runner installer library.
//!
//! Provides programmatic access to the installer so the pipeline can
//! be driven from other tooling as well as the CLI.
//!
//! # Example
//!
//! ```ignore
//! use runnerctl::{InstallConfig, Installer};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = InstallConfig {
//!         runner_token: "glrt-...".into(),
//!         ..InstallConfig::default()
//!     };
//!     Installer::new(config)?.run().await
//! }
//! ```

// Allow product names without backticks in doc comments
#![allow(clippy::doc_markdown)]

pub mod cluster;
pub mod commands;
pub mod config;
pub mod exec;
pub mod helm;
pub mod manifests;
pub mod orchestrator;
pub mod preflight;
pub mod steps;
pub mod ui;

// Re-export commonly used types at the crate root
pub use config::{InstallConfig, RegistryCredentials};
pub use orchestrator::Installer;
pub use steps::InstallStep;
