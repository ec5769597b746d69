//! kubectl-facing cluster operations.
//!
//! Each operation shells out to `kubectl` and aborts on the first
//! failing command. Argument vectors are built by pure helpers so the
//! exact invocations can be unit tested without a cluster.

use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use tracing::info;

use crate::config::RegistryCredentials;
use crate::exec;
use crate::ui;

/// Create the namespace if it does not already exist.
///
/// # Errors
///
/// Returns an error if kubectl fails for a reason other than the
/// namespace being absent.
pub fn ensure_namespace(namespace: &str) -> Result<()> {
    info!(namespace, "Ensuring namespace exists");

    if exec::succeeds("kubectl", &str_slice(&get_namespace_args(namespace)))? {
        ui::print_progress(&format!("Namespace {namespace} already exists"));
        return Ok(());
    }

    exec::kubectl(&str_slice(&create_namespace_args(namespace)))?;
    ui::print_progress(&format!("Created namespace {namespace}"));
    Ok(())
}

/// Recreate the registry pull secret: delete if present, then create.
///
/// The delete uses `--ignore-not-found` so a fresh cluster and a
/// re-run behave the same.
///
/// # Errors
///
/// Returns an error if either kubectl command fails.
pub fn recreate_pull_secret(
    namespace: &str,
    name: &str,
    creds: &RegistryCredentials,
) -> Result<()> {
    info!(namespace, secret = name, "Recreating registry pull secret");

    exec::kubectl(&str_slice(&delete_secret_args(namespace, name)))?;
    exec::kubectl(&str_slice(&create_pull_secret_args(namespace, name, creds)))?;

    ui::print_progress(&format!("Recreated pull secret {name}"));
    Ok(())
}

/// Apply a rendered manifest over stdin.
///
/// # Errors
///
/// Returns an error if kubectl apply fails.
pub fn apply_manifest(namespace: &str, yaml: &str) -> Result<()> {
    exec::kubectl_stdin(&["-n", namespace, "apply", "-f", "-"], yaml)?;
    Ok(())
}

/// Delete a rendered manifest over stdin, tolerating absent objects.
///
/// # Errors
///
/// Returns an error if kubectl delete fails.
pub fn delete_manifest(namespace: &str, yaml: &str) -> Result<()> {
    exec::kubectl_stdin(
        &["-n", namespace, "delete", "--ignore-not-found", "-f", "-"],
        yaml,
    )?;
    Ok(())
}

/// Block until the runner deployment reports a successful rollout.
///
/// Polls `kubectl rollout status` in 30s slices until the overall
/// timeout elapses.
///
/// # Errors
///
/// Returns an error if the deployment is not ready within `timeout`.
pub async fn wait_runner_ready(namespace: &str, release: &str, timeout: Duration) -> Result<()> {
    let start = Instant::now();

    loop {
        if start.elapsed() > timeout {
            anyhow::bail!(
                "Timeout waiting for deployment {namespace}/{release} to be ready \
                 (waited {}s)",
                timeout.as_secs()
            );
        }

        if exec::succeeds("kubectl", &str_slice(&rollout_status_args(namespace, release)))? {
            return Ok(());
        }

        tokio::time::sleep(Duration::from_secs(10)).await;
    }
}

/// Print pod status and recent runner logs.
///
/// # Errors
///
/// Returns an error if kubectl cannot list pods. Missing logs are
/// downgraded to a warning since the pod may still be starting its
/// first job.
pub fn dump_runner_status(namespace: &str, release: &str) -> Result<()> {
    let pods = exec::kubectl(&["get", "pods", "-n", namespace, "-o", "wide"])
        .context("Failed to list runner pods")?;
    println!("{pods}");

    match exec::kubectl(&str_slice(&runner_logs_args(namespace, release))) {
        Ok(logs) if !logs.trim().is_empty() => {
            ui::print_info("Recent runner logs:");
            println!("{logs}");
        }
        Ok(_) => ui::print_info("Runner has not produced logs yet"),
        Err(e) => ui::print_warning(&format!("Could not fetch runner logs: {e}")),
    }

    Ok(())
}

/// Check that the cluster answers API requests.
///
/// # Errors
///
/// Returns an error if `kubectl cluster-info` fails.
pub fn check_cluster_reachable() -> Result<()> {
    exec::kubectl(&["cluster-info"])
        .context("Cluster is not reachable - check your kubeconfig context")?;
    Ok(())
}

// --- Argument builders ---

pub(crate) fn get_namespace_args(namespace: &str) -> Vec<String> {
    vec!["get".into(), "namespace".into(), namespace.into()]
}

pub(crate) fn create_namespace_args(namespace: &str) -> Vec<String> {
    vec!["create".into(), "namespace".into(), namespace.into()]
}

pub(crate) fn delete_secret_args(namespace: &str, name: &str) -> Vec<String> {
    vec![
        "-n".into(),
        namespace.into(),
        "delete".into(),
        "secret".into(),
        name.into(),
        "--ignore-not-found".into(),
    ]
}

pub(crate) fn create_pull_secret_args(
    namespace: &str,
    name: &str,
    creds: &RegistryCredentials,
) -> Vec<String> {
    vec![
        "-n".into(),
        namespace.into(),
        "create".into(),
        "secret".into(),
        "docker-registry".into(),
        name.into(),
        format!("--docker-server={}", creds.server),
        format!("--docker-username={}", creds.username),
        format!("--docker-password={}", creds.password),
        format!("--docker-email={}", creds.email),
    ]
}

pub(crate) fn rollout_status_args(namespace: &str, release: &str) -> Vec<String> {
    vec![
        "rollout".into(),
        "status".into(),
        "deployment".into(),
        release.into(),
        "-n".into(),
        namespace.into(),
        "--timeout=30s".into(),
    ]
}

pub(crate) fn runner_logs_args(namespace: &str, release: &str) -> Vec<String> {
    vec![
        "logs".into(),
        format!("deployment/{release}"),
        "-n".into(),
        namespace.into(),
        "--tail=40".into(),
    ]
}

/// Borrow a `Vec<String>` as `&[&str]` for the exec layer.
pub(crate) fn str_slice(args: &[String]) -> Vec<&str> {
    args.iter().map(String::as_str).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> RegistryCredentials {
        RegistryCredentials {
            server: "registry.gitlab.com".into(),
            username: "ci-bot".into(),
            password: "hunter2".into(),
            email: "ci@example.com".into(),
        }
    }

    #[test]
    fn test_namespace_args() {
        assert_eq!(get_namespace_args("ci"), ["get", "namespace", "ci"]);
        assert_eq!(create_namespace_args("ci"), ["create", "namespace", "ci"]);
    }

    #[test]
    fn test_delete_secret_is_idempotent() {
        let args = delete_secret_args("ci", "gitlab-registry");
        assert!(args.contains(&"--ignore-not-found".to_string()));
        assert_eq!(args[0..2], ["-n".to_string(), "ci".to_string()]);
    }

    #[test]
    fn test_create_pull_secret_args() {
        let args = create_pull_secret_args("ci", "gitlab-registry", &creds());
        assert_eq!(args[2..6], [
            "create".to_string(),
            "secret".to_string(),
            "docker-registry".to_string(),
            "gitlab-registry".to_string(),
        ]);
        assert!(args.contains(&"--docker-server=registry.gitlab.com".to_string()));
        assert!(args.contains(&"--docker-username=ci-bot".to_string()));
        assert!(args.contains(&"--docker-password=hunter2".to_string()));
        assert!(args.contains(&"--docker-email=ci@example.com".to_string()));
    }

    #[test]
    fn test_rollout_status_args() {
        let args = rollout_status_args("gitlab-runner", "gitlab-runner");
        assert_eq!(args[0..4], [
            "rollout".to_string(),
            "status".to_string(),
            "deployment".to_string(),
            "gitlab-runner".to_string(),
        ]);
        assert!(args.contains(&"--timeout=30s".to_string()));
    }

    #[test]
    fn test_runner_logs_args() {
        let args = runner_logs_args("ci", "my-runner");
        assert_eq!(args[0], "logs");
        assert_eq!(args[1], "deployment/my-runner");
        assert!(args.contains(&"--tail=40".to_string()));
    }
}
