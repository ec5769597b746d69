//! Rendered artifacts: Helm values, RBAC manifest, sample pipeline.
//!
//! Everything is built as typed structures and serialized, never
//! string-templated, so tests can parse the output back and assert on
//! fields.

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::json;

use crate::config::InstallConfig;

/// Top-level Helm values for the gitlab-runner chart.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunnerValues {
    gitlab_url: String,
    runner_token: String,
    concurrent: u32,
    rbac: RbacValues,
    runners: RunnersSection,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    image_pull_secrets: Vec<NameRef>,
}

/// RBAC wiring: the chart must not create its own service account
/// because the installer applies one with a scoped role first.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RbacValues {
    create: bool,
    service_account_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunnersSection {
    /// Runner TOML config template, rendered separately (see
    /// [`runner_config_template`]).
    config: String,
    tags: String,
    run_untagged: bool,
}

#[derive(Debug, Serialize)]
struct NameRef {
    name: String,
}

/// TOML config template embedded in the values under `runners.config`.
#[derive(Debug, Serialize)]
struct RunnerConfigTemplate {
    runners: Vec<RunnerEntry>,
}

#[derive(Debug, Serialize)]
struct RunnerEntry {
    kubernetes: KubernetesExecutor,
}

#[derive(Debug, Serialize)]
struct KubernetesExecutor {
    namespace: String,
    image: String,
    privileged: bool,
    service_account: String,
}

impl RunnerValues {
    /// Build the values document from the installation config.
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded TOML template cannot be
    /// serialized.
    pub fn from_config(config: &InstallConfig) -> Result<Self> {
        let pull_secrets = if config.registry.is_some() {
            vec![NameRef {
                name: config.pull_secret_name.clone(),
            }]
        } else {
            Vec::new()
        };

        Ok(Self {
            gitlab_url: config.gitlab_url.clone(),
            runner_token: config.runner_token.clone(),
            concurrent: config.concurrent,
            rbac: RbacValues {
                create: false,
                service_account_name: config.service_account.clone(),
            },
            runners: RunnersSection {
                config: runner_config_template(config)?,
                tags: config.runner_tags.clone(),
                run_untagged: config.run_untagged,
            },
            image_pull_secrets: pull_secrets,
        })
    }
}

/// Render the `runners.config` TOML template for the Kubernetes executor.
///
/// # Errors
///
/// Returns an error if TOML serialization fails.
pub fn runner_config_template(config: &InstallConfig) -> Result<String> {
    let template = RunnerConfigTemplate {
        runners: vec![RunnerEntry {
            kubernetes: KubernetesExecutor {
                namespace: config.namespace.clone(),
                image: config.default_image.clone(),
                privileged: config.privileged,
                service_account: config.service_account.clone(),
            },
        }],
    };

    toml::to_string(&template).context("Failed to render runner config template")
}

/// Render the Helm values document as YAML.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_values(config: &InstallConfig) -> Result<String> {
    let values = RunnerValues::from_config(config)?;
    serde_yaml::to_string(&values).context("Failed to render values file")
}

/// Render the RBAC manifest: service account, role, role binding.
///
/// The role covers what the Kubernetes executor needs to spawn and
/// attach to job pods.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_rbac(config: &InstallConfig) -> Result<String> {
    let namespace = &config.namespace;
    let account = &config.service_account;
    let role_name = format!("{account}-role");

    let service_account = json!({
        "apiVersion": "v1",
        "kind": "ServiceAccount",
        "metadata": { "name": account, "namespace": namespace },
    });

    let role = json!({
        "apiVersion": "rbac.authorization.k8s.io/v1",
        "kind": "Role",
        "metadata": { "name": role_name, "namespace": namespace },
        "rules": [{
            "apiGroups": [""],
            "resources": [
                "pods", "pods/exec", "pods/attach", "pods/log",
                "secrets", "configmaps", "services",
            ],
            "verbs": ["get", "list", "watch", "create", "patch", "delete"],
        }],
    });

    let role_binding = json!({
        "apiVersion": "rbac.authorization.k8s.io/v1",
        "kind": "RoleBinding",
        "metadata": { "name": format!("{account}-binding"), "namespace": namespace },
        "roleRef": {
            "apiGroup": "rbac.authorization.k8s.io",
            "kind": "Role",
            "name": role_name,
        },
        "subjects": [{
            "kind": "ServiceAccount",
            "name": account,
            "namespace": namespace,
        }],
    });

    let docs = [service_account, role, role_binding]
        .iter()
        .map(|doc| serde_yaml::to_string(doc).context("Failed to render RBAC manifest"))
        .collect::<Result<Vec<_>>>()?;

    Ok(docs.join("---\n"))
}

/// Render the sample `.gitlab-ci.yml` demonstrating the installed runner.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn render_sample_pipeline(config: &InstallConfig) -> Result<String> {
    let pipeline = json!({
        "stages": ["test"],
        "runner-smoke-test": {
            "stage": "test",
            "image": config.default_image,
            "tags": config.tag_list(),
            "script": [
                "echo \"Hello from the Kubernetes runner\"",
                "uname -a",
            ],
        },
    });

    serde_yaml::to_string(&pipeline).context("Failed to render sample pipeline")
}

/// Write a rendered artifact, creating the output directory as needed.
///
/// # Errors
///
/// Returns an error if the directory or file cannot be written.
pub fn write_artifact(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create output directory {}", parent.display()))?;
    }
    std::fs::write(path, content)
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RegistryCredentials;

    fn config() -> InstallConfig {
        InstallConfig {
            runner_token: "glrt-abc123".into(),
            ..InstallConfig::default()
        }
    }

    fn config_with_registry() -> InstallConfig {
        InstallConfig {
            registry: Some(RegistryCredentials {
                server: "registry.gitlab.com".into(),
                username: "ci-bot".into(),
                password: "hunter2".into(),
                email: "ci@example.com".into(),
            }),
            ..config()
        }
    }

    fn parse(yaml: &str) -> serde_yaml::Value {
        serde_yaml::from_str(yaml).unwrap()
    }

    #[test]
    fn test_values_core_fields() {
        let yaml = render_values(&config()).unwrap();
        let values = parse(&yaml);

        assert_eq!(values["gitlabUrl"], "https://gitlab.com");
        assert_eq!(values["runnerToken"], "glrt-abc123");
        assert_eq!(values["concurrent"], 4);
        assert_eq!(values["rbac"]["create"], false);
        assert_eq!(values["rbac"]["serviceAccountName"], "gitlab-runner");
        assert_eq!(values["runners"]["runUntagged"], true);
    }

    #[test]
    fn test_values_pull_secret_only_with_registry() {
        let without = parse(&render_values(&config()).unwrap());
        assert!(without.get("imagePullSecrets").is_none());

        let with = parse(&render_values(&config_with_registry()).unwrap());
        assert_eq!(with["imagePullSecrets"][0]["name"], "gitlab-registry");
    }

    #[test]
    fn test_runner_config_template_is_valid_toml() {
        let template = runner_config_template(&config()).unwrap();
        let parsed: toml::Value = toml::from_str(&template).unwrap();

        let kubernetes = &parsed["runners"][0]["kubernetes"];
        assert_eq!(kubernetes["namespace"].as_str(), Some("gitlab-runner"));
        assert_eq!(kubernetes["image"].as_str(), Some("ubuntu:22.04"));
        assert_eq!(kubernetes["privileged"].as_bool(), Some(true));
        assert_eq!(kubernetes["service_account"].as_str(), Some("gitlab-runner"));
    }

    #[test]
    fn test_values_embed_config_template() {
        let yaml = render_values(&config()).unwrap();
        let values = parse(&yaml);

        let embedded = values["runners"]["config"].as_str().unwrap();
        let parsed: toml::Value = toml::from_str(embedded).unwrap();
        assert!(parsed["runners"][0]["kubernetes"]["privileged"].as_bool().unwrap());
    }

    #[test]
    fn test_rbac_has_three_documents() {
        let yaml = render_rbac(&config()).unwrap();
        let docs: Vec<serde_yaml::Value> = yaml
            .split("---\n")
            .filter(|d| !d.trim().is_empty())
            .map(|d| serde_yaml::from_str(d).unwrap())
            .collect();

        assert_eq!(docs.len(), 3);
        assert_eq!(docs[0]["kind"], "ServiceAccount");
        assert_eq!(docs[1]["kind"], "Role");
        assert_eq!(docs[2]["kind"], "RoleBinding");
        assert_eq!(docs[2]["roleRef"]["name"], "gitlab-runner-role");
        assert_eq!(docs[2]["subjects"][0]["name"], "gitlab-runner");
    }

    #[test]
    fn test_rbac_role_covers_exec() {
        let yaml = render_rbac(&config()).unwrap();
        assert!(yaml.contains("pods/exec"));
        assert!(yaml.contains("pods/attach"));
    }

    #[test]
    fn test_sample_pipeline_uses_runner_tags() {
        let mut cfg = config();
        cfg.runner_tags = "docker,kubernetes".into();

        let yaml = render_sample_pipeline(&cfg).unwrap();
        let pipeline = parse(&yaml);

        assert_eq!(pipeline["stages"][0], "test");
        assert_eq!(pipeline["runner-smoke-test"]["tags"][0], "docker");
        assert_eq!(pipeline["runner-smoke-test"]["tags"][1], "kubernetes");
    }

    #[test]
    fn test_write_artifact_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("values.yaml");

        write_artifact(&path, "gitlabUrl: https://gitlab.com\n").unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("gitlabUrl"));
    }
}
