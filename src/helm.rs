//! helm-facing release operations.
//!
//! Mirrors the shell workflow: sync the chart repository, then branch
//! on whether the release already exists to pick install or upgrade.

use std::path::Path;

use anyhow::Result;
use tracing::info;

use crate::cluster::str_slice;
use crate::exec;
use crate::ui;

/// Add the chart repository and refresh the index.
///
/// `helm repo add` fails when the repo is already registered, so that
/// failure is tolerated; `helm repo update` is always run and must
/// succeed.
///
/// # Errors
///
/// Returns an error if the repo update fails.
pub fn sync_repo(name: &str, url: &str) -> Result<()> {
    info!(repo = name, url, "Syncing Helm repository");

    if exec::helm(&str_slice(&repo_add_args(name, url))).is_err() {
        ui::print_progress(&format!("Helm repo {name} already registered"));
    }
    exec::helm(&["repo", "update"])?;

    Ok(())
}

/// Check whether a release exists in the namespace.
///
/// # Errors
///
/// Returns an error if helm cannot be spawned.
pub fn release_exists(release: &str, namespace: &str) -> Result<bool> {
    exec::succeeds("helm", &str_slice(&status_args(release, namespace)))
}

/// Install or upgrade the release with the rendered values file.
///
/// # Errors
///
/// Returns an error if the helm command fails.
pub fn install_or_upgrade(
    release: &str,
    chart: &str,
    namespace: &str,
    values: &Path,
    exists: bool,
) -> Result<()> {
    let values = values.display().to_string();
    let args = release_args(release, chart, namespace, &values, exists);

    if exists {
        info!(release, "Release exists, upgrading");
        ui::print_progress(&format!("Upgrading existing release {release}"));
    } else {
        info!(release, "Installing new release");
        ui::print_progress(&format!("Installing release {release}"));
    }

    exec::helm(&str_slice(&args))?;
    Ok(())
}

/// Remove the release from the namespace.
///
/// # Errors
///
/// Returns an error if helm uninstall fails.
pub fn uninstall(release: &str, namespace: &str) -> Result<()> {
    info!(release, namespace, "Uninstalling release");
    exec::helm(&str_slice(&uninstall_args(release, namespace)))?;
    Ok(())
}

// --- Argument builders ---

pub(crate) fn repo_add_args(name: &str, url: &str) -> Vec<String> {
    vec!["repo".into(), "add".into(), name.into(), url.into()]
}

pub(crate) fn status_args(release: &str, namespace: &str) -> Vec<String> {
    vec![
        "status".into(),
        release.into(),
        "-n".into(),
        namespace.into(),
    ]
}

pub(crate) fn release_args(
    release: &str,
    chart: &str,
    namespace: &str,
    values: &str,
    exists: bool,
) -> Vec<String> {
    let verb = if exists { "upgrade" } else { "install" };
    vec![
        verb.into(),
        release.into(),
        chart.into(),
        "-n".into(),
        namespace.into(),
        "--values".into(),
        values.into(),
    ]
}

pub(crate) fn uninstall_args(release: &str, namespace: &str) -> Vec<String> {
    vec![
        "uninstall".into(),
        release.into(),
        "-n".into(),
        namespace.into(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_add_args() {
        assert_eq!(
            repo_add_args("gitlab", "https://charts.gitlab.io"),
            ["repo", "add", "gitlab", "https://charts.gitlab.io"]
        );
    }

    #[test]
    fn test_status_args() {
        assert_eq!(
            status_args("gitlab-runner", "ci"),
            ["status", "gitlab-runner", "-n", "ci"]
        );
    }

    #[test]
    fn test_install_branch() {
        let args = release_args(
            "gitlab-runner",
            "gitlab/gitlab-runner",
            "ci",
            "out/values.yaml",
            false,
        );
        assert_eq!(args[0], "install");
        assert_eq!(args[1], "gitlab-runner");
        assert_eq!(args[2], "gitlab/gitlab-runner");
        assert_eq!(args[5..7], ["--values".to_string(), "out/values.yaml".to_string()]);
    }

    #[test]
    fn test_upgrade_branch() {
        let args = release_args(
            "gitlab-runner",
            "gitlab/gitlab-runner",
            "ci",
            "out/values.yaml",
            true,
        );
        assert_eq!(args[0], "upgrade");
    }

    #[test]
    fn test_uninstall_args() {
        assert_eq!(
            uninstall_args("gitlab-runner", "ci"),
            ["uninstall", "gitlab-runner", "-n", "ci"]
        );
    }
}
