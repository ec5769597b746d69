//! Installation configuration types.
//!
//! Configuration can come from a TOML file, CLI flags, or the built-in
//! defaults, in that order of precedence (flags win).

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Container registry credentials for the image pull secret.
///
/// When present, the installer recreates a `docker-registry` secret in
/// the target namespace and wires it into the runner values as an
/// `imagePullSecrets` entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryCredentials {
    /// Registry server (e.g., "registry.gitlab.com").
    pub server: String,
    /// Registry username.
    pub username: String,
    /// Registry password or access token.
    pub password: String,
    /// Email attached to the docker-registry secret.
    pub email: String,
}

/// Full installation configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InstallConfig {
    // GitLab
    /// GitLab instance URL the runner registers against.
    pub gitlab_url: String,
    /// Runner authentication token. Must be non-empty before any
    /// cluster mutation happens.
    pub runner_token: String,

    // Cluster placement
    /// Namespace the runner is installed into.
    pub namespace: String,
    /// Helm release name.
    pub release_name: String,
    /// Service account the runner pods run as.
    pub service_account: String,
    /// Name of the image pull secret, when registry credentials are set.
    pub pull_secret_name: String,

    // Chart
    /// Local name for the Helm repository.
    pub chart_repo_name: String,
    /// URL of the Helm repository.
    pub chart_repo_url: String,
    /// Chart reference passed to helm install/upgrade.
    pub chart: String,

    // Runner tuning
    /// Maximum number of concurrent jobs.
    pub concurrent: u32,
    /// Comma-separated runner tags.
    pub runner_tags: String,
    /// Whether the runner picks up untagged jobs.
    pub run_untagged: bool,
    /// Run job containers in privileged mode (needed for docker-in-docker).
    pub privileged: bool,
    /// Default job image when a pipeline does not specify one.
    pub default_image: String,

    // Output
    /// Directory for generated files (values, RBAC manifest, sample pipeline).
    pub output_dir: PathBuf,
    /// Timeout in seconds for the runner pods to become ready.
    pub ready_timeout_secs: u64,

    /// Registry credentials for private images (optional).
    ///
    /// Kept last so the TOML serializer emits the table after all
    /// scalar values.
    pub registry: Option<RegistryCredentials>,
}

impl Default for InstallConfig {
    fn default() -> Self {
        Self {
            gitlab_url: "https://gitlab.com".into(),
            runner_token: String::new(),
            namespace: "gitlab-runner".into(),
            release_name: "gitlab-runner".into(),
            service_account: "gitlab-runner".into(),
            pull_secret_name: "gitlab-registry".into(),
            registry: None,
            chart_repo_name: "gitlab".into(),
            chart_repo_url: "https://charts.gitlab.io".into(),
            chart: "gitlab/gitlab-runner".into(),
            concurrent: 4,
            runner_tags: "kubernetes".into(),
            run_untagged: true,
            privileged: true,
            default_image: "ubuntu:22.04".into(),
            output_dir: PathBuf::from("runner-install"),
            ready_timeout_secs: 300,
        }
    }
}

impl InstallConfig {
    /// Load configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Validate the configuration before any cluster mutation.
    ///
    /// # Errors
    ///
    /// Returns an error if the runner token is empty, the namespace is
    /// empty, or the GitLab URL is not an http(s) URL.
    pub fn validate(&self) -> Result<()> {
        if self.runner_token.trim().is_empty() {
            anyhow::bail!(
                "Runner token is empty. Set runner_token in the config file, \
                 pass --token, or export RUNNER_TOKEN."
            );
        }
        if self.namespace.trim().is_empty() {
            anyhow::bail!("Namespace must not be empty");
        }
        if !self.gitlab_url.starts_with("https://") && !self.gitlab_url.starts_with("http://") {
            anyhow::bail!(
                "GitLab URL must start with http:// or https://, got: {}",
                self.gitlab_url
            );
        }
        Ok(())
    }

    /// Get the path of the rendered Helm values file.
    #[must_use]
    pub fn values_file(&self) -> PathBuf {
        self.output_dir.join("gitlab-runner-values.yaml")
    }

    /// Get the path of the rendered RBAC manifest.
    #[must_use]
    pub fn rbac_file(&self) -> PathBuf {
        self.output_dir.join("gitlab-runner-rbac.yaml")
    }

    /// Get the path of the sample pipeline file.
    #[must_use]
    pub fn sample_pipeline_file(&self) -> PathBuf {
        self.output_dir.join("sample-gitlab-ci.yml")
    }

    /// Runner tags as a list.
    #[must_use]
    pub fn tag_list(&self) -> Vec<String> {
        self.runner_tags
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = InstallConfig::default();
        assert_eq!(config.gitlab_url, "https://gitlab.com");
        assert_eq!(config.namespace, "gitlab-runner");
        assert_eq!(config.release_name, "gitlab-runner");
        assert_eq!(config.chart, "gitlab/gitlab-runner");
        assert_eq!(config.concurrent, 4);
        assert!(config.registry.is_none());
        assert_eq!(
            config.values_file(),
            PathBuf::from("runner-install/gitlab-runner-values.yaml")
        );
    }

    #[test]
    fn test_empty_token_rejected() {
        let config = InstallConfig::default();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("token is empty"));
    }

    #[test]
    fn test_valid_config_accepted() {
        let config = InstallConfig {
            runner_token: "glrt-abc123".into(),
            ..InstallConfig::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_bad_url_rejected() {
        let config = InstallConfig {
            runner_token: "glrt-abc123".into(),
            gitlab_url: "gitlab.example.com".into(),
            ..InstallConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("http"));
    }

    #[test]
    fn test_empty_namespace_rejected() {
        let config = InstallConfig {
            runner_token: "glrt-abc123".into(),
            namespace: "  ".into(),
            ..InstallConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_toml_round_trip() {
        let config = InstallConfig {
            runner_token: "glrt-abc123".into(),
            registry: Some(RegistryCredentials {
                server: "registry.gitlab.com".into(),
                username: "ci-bot".into(),
                password: "hunter2".into(),
                email: "ci@example.com".into(),
            }),
            ..InstallConfig::default()
        };

        let toml_text = toml::to_string(&config).unwrap();
        let parsed: InstallConfig = toml::from_str(&toml_text).unwrap();
        assert_eq!(parsed.runner_token, "glrt-abc123");
        assert_eq!(parsed.registry.unwrap().server, "registry.gitlab.com");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: InstallConfig =
            toml::from_str("runner_token = \"glrt-xyz\"\nnamespace = \"ci\"").unwrap();
        assert_eq!(parsed.runner_token, "glrt-xyz");
        assert_eq!(parsed.namespace, "ci");
        assert_eq!(parsed.chart_repo_url, "https://charts.gitlab.io");
    }

    #[test]
    fn test_tag_list_parsing() {
        let config = InstallConfig {
            runner_tags: "docker, kubernetes,  linux".into(),
            ..InstallConfig::default()
        };
        assert_eq!(config.tag_list(), vec!["docker", "kubernetes", "linux"]);
    }
}
