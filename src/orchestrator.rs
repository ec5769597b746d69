//! Installer orchestration module.
//!
//! Drives the install pipeline in order: preflight, namespace, pull
//! secret, RBAC, values, chart repo, release, verification, artifacts.
//! Any failing step aborts the run immediately; there are no retries
//! and no rollback.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info};

use crate::cluster;
use crate::config::InstallConfig;
use crate::helm;
use crate::manifests;
use crate::preflight::PreflightValidator;
use crate::steps::InstallStep;
use crate::ui;

/// Main installer struct that orchestrates the full installation.
pub struct Installer {
    config: InstallConfig,
}

impl Installer {
    /// Create an installer for a validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid (empty token,
    /// bad URL). Validation happens here so no cluster mutation can
    /// occur with a broken config.
    pub fn new(config: InstallConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Run the pipeline to completion.
    ///
    /// # Errors
    ///
    /// Returns the first step failure, with the failing command's
    /// stderr in the error chain.
    pub async fn run(&self) -> Result<()> {
        ui::print_section("Installing GitLab Runner");

        let mut step = InstallStep::Preflight;
        while step != InstallStep::Complete {
            ui::print_progress_step(step.step_number(), InstallStep::TOTAL_STEPS, step.description());
            info!(step = %step, "Executing step");

            if let Err(e) = self.execute_step(step).await {
                error!(step = %step, error = %e, "Installation failed");
                ui::print_error(&format!("Installation failed at step '{step}': {e}"));
                return Err(e);
            }

            step = step.next();
        }

        self.print_success_summary();
        Ok(())
    }

    async fn execute_step(&self, step: InstallStep) -> Result<()> {
        match step {
            InstallStep::Preflight => PreflightValidator::new().validate(),
            InstallStep::EnsuringNamespace => cluster::ensure_namespace(&self.config.namespace),
            InstallStep::EnsuringPullSecret => self.ensure_pull_secret(),
            InstallStep::ApplyingRbac => self.apply_rbac(),
            InstallStep::RenderingValues => self.render_values(),
            InstallStep::SyncingChartRepo => {
                helm::sync_repo(&self.config.chart_repo_name, &self.config.chart_repo_url)
            }
            InstallStep::InstallingRelease => self.install_release(),
            InstallStep::VerifyingRunner => self.verify_runner().await,
            InstallStep::EmittingArtifacts => self.emit_artifacts(),
            InstallStep::Complete => Ok(()),
        }
    }

    // --- Steps ---

    fn ensure_pull_secret(&self) -> Result<()> {
        match &self.config.registry {
            Some(creds) => cluster::recreate_pull_secret(
                &self.config.namespace,
                &self.config.pull_secret_name,
                creds,
            ),
            None => {
                ui::print_progress("No registry credentials configured, skipping pull secret");
                Ok(())
            }
        }
    }

    fn apply_rbac(&self) -> Result<()> {
        let manifest = manifests::render_rbac(&self.config)?;

        // Keep a copy next to the values file for inspection.
        manifests::write_artifact(&self.config.rbac_file(), &manifest)?;
        cluster::apply_manifest(&self.config.namespace, &manifest)
            .context("Failed to apply RBAC manifest")?;

        ui::print_progress(&format!(
            "Applied service account {} with scoped role",
            self.config.service_account
        ));
        Ok(())
    }

    fn render_values(&self) -> Result<()> {
        let values = manifests::render_values(&self.config)?;
        let path = self.config.values_file();
        manifests::write_artifact(&path, &values)?;

        ui::print_progress(&format!("Wrote {}", path.display()));
        Ok(())
    }

    fn install_release(&self) -> Result<()> {
        let exists = helm::release_exists(&self.config.release_name, &self.config.namespace)?;
        helm::install_or_upgrade(
            &self.config.release_name,
            &self.config.chart,
            &self.config.namespace,
            &self.config.values_file(),
            exists,
        )
    }

    async fn verify_runner(&self) -> Result<()> {
        let timeout = Duration::from_secs(self.config.ready_timeout_secs);

        ui::print_progress(&format!(
            "Waiting up to {}s for runner pods to be ready",
            timeout.as_secs()
        ));
        cluster::wait_runner_ready(&self.config.namespace, &self.config.release_name, timeout)
            .await?;

        cluster::dump_runner_status(&self.config.namespace, &self.config.release_name)?;
        Ok(())
    }

    fn emit_artifacts(&self) -> Result<()> {
        let pipeline = manifests::render_sample_pipeline(&self.config)?;
        let path = self.config.sample_pipeline_file();
        manifests::write_artifact(&path, &pipeline)?;

        ui::print_progress(&format!("Wrote {}", path.display()));
        Ok(())
    }

    /// Remove the release and the generated cluster objects.
    ///
    /// The namespace itself is left in place; deleting it would take
    /// unrelated workloads with it.
    ///
    /// # Errors
    ///
    /// Returns an error if helm uninstall or manifest deletion fails.
    pub fn uninstall(&self) -> Result<()> {
        ui::print_section("Uninstalling GitLab Runner");

        if helm::release_exists(&self.config.release_name, &self.config.namespace)? {
            helm::uninstall(&self.config.release_name, &self.config.namespace)?;
            ui::print_success(&format!("Removed release {}", self.config.release_name));
        } else {
            ui::print_info(&format!(
                "Release {} not found in namespace {}",
                self.config.release_name, self.config.namespace
            ));
        }

        let manifest = manifests::render_rbac(&self.config)?;
        cluster::delete_manifest(&self.config.namespace, &manifest)
            .context("Failed to delete RBAC objects")?;
        ui::print_success("Removed RBAC objects");

        if self.config.registry.is_some() {
            crate::exec::kubectl(&cluster::str_slice(&cluster::delete_secret_args(
                &self.config.namespace,
                &self.config.pull_secret_name,
            )))?;
            ui::print_success(&format!(
                "Removed pull secret {}",
                self.config.pull_secret_name
            ));
        }

        ui::print_info(&format!(
            "Namespace {} was left in place",
            self.config.namespace
        ));
        Ok(())
    }

    /// Print post-install summary and next steps.
    fn print_success_summary(&self) {
        ui::print_section("Installation Complete!");
        ui::print_success("Your GitLab Runner is ready to pick up jobs.");

        ui::print_kv("GitLab URL", &self.config.gitlab_url);
        ui::print_kv("Namespace", &self.config.namespace);
        ui::print_kv("Release", &self.config.release_name);
        ui::print_kv("Tags", &self.config.runner_tags);
        ui::print_kv(
            "Values file",
            &self.config.values_file().display().to_string(),
        );
        ui::print_kv(
            "Sample pipeline",
            &self.config.sample_pipeline_file().display().to_string(),
        );

        ui::print_section("Quick Start");
        ui::print_numbered_step(1, "Verify the runner appears in GitLab:");
        ui::print_info(&format!(
            "   {}/admin/runners (or your project's Settings > CI/CD > Runners)",
            self.config.gitlab_url
        ));
        ui::print_numbered_step(2, "Watch the runner pods:");
        ui::print_info(&format!(
            "   kubectl get pods -n {} -w",
            self.config.namespace
        ));
        ui::print_numbered_step(3, "Try the sample pipeline:");
        ui::print_info(&format!(
            "   cp {} <your-repo>/.gitlab-ci.yml && git push",
            self.config.sample_pipeline_file().display()
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_installer_rejects_empty_token() {
        let config = InstallConfig::default();
        assert!(Installer::new(config).is_err());
    }

    #[test]
    fn test_installer_accepts_valid_config() {
        let config = InstallConfig {
            runner_token: "glrt-abc123".into(),
            ..InstallConfig::default()
        };
        assert!(Installer::new(config).is_ok());
    }
}
