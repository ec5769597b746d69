//! CLI subcommands.

pub mod check;
pub mod install;
pub mod render;
pub mod uninstall;

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use crate::config::InstallConfig;

/// Configuration sources shared by the subcommands.
///
/// Precedence: built-in defaults, then the TOML file, then flags.
#[derive(Args, Debug, Default)]
pub struct ConfigOverrides {
    /// Configuration file path (TOML)
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// GitLab instance URL
    #[arg(long, value_name = "URL")]
    pub gitlab_url: Option<String>,

    /// Runner authentication token
    #[arg(long, value_name = "TOKEN", env = "RUNNER_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Target namespace
    #[arg(short, long, value_name = "NAMESPACE")]
    pub namespace: Option<String>,

    /// Directory for generated files
    #[arg(short, long, value_name = "DIR")]
    pub output_dir: Option<PathBuf>,
}

impl ConfigOverrides {
    /// Resolve the effective configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be loaded.
    pub fn resolve(&self) -> Result<InstallConfig> {
        let mut config = match &self.config {
            Some(path) => InstallConfig::load(path)?,
            None => InstallConfig::default(),
        };

        if let Some(url) = &self.gitlab_url {
            config.gitlab_url = url.clone();
        }
        if let Some(token) = &self.token {
            config.runner_token = token.clone();
        }
        if let Some(namespace) = &self.namespace {
            config.namespace = namespace.clone();
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_without_file_or_flags() {
        let overrides = ConfigOverrides::default();
        let config = overrides.resolve().unwrap();
        assert_eq!(config.namespace, "gitlab-runner");
        assert!(config.runner_token.is_empty());
    }

    #[test]
    fn test_flags_override_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "runner_token = \"glrt-from-file\"").unwrap();
        writeln!(file, "namespace = \"from-file\"").unwrap();

        let overrides = ConfigOverrides {
            config: Some(file.path().to_path_buf()),
            namespace: Some("from-flag".into()),
            ..ConfigOverrides::default()
        };

        let config = overrides.resolve().unwrap();
        assert_eq!(config.runner_token, "glrt-from-file");
        assert_eq!(config.namespace, "from-flag");
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let overrides = ConfigOverrides {
            config: Some(PathBuf::from("/nonexistent/runnerctl.toml")),
            ..ConfigOverrides::default()
        };
        assert!(overrides.resolve().is_err());
    }
}
