//! Preflight checks run before any cluster mutation.

use std::process::Command;

use anyhow::Result;

use crate::cluster;
use crate::ui;

/// Validates prerequisites for the runner installation.
pub struct PreflightValidator {
    requirements: Vec<Requirement>,
}

struct Requirement {
    name: String,
    check: Box<dyn Fn() -> Result<bool>>,
    install_instructions: String,
}

fn cli_available(binary: &'static str, version_args: &'static [&'static str]) -> Result<bool> {
    if which::which(binary).is_err() {
        return Ok(false);
    }
    Ok(Command::new(binary)
        .args(version_args)
        .output()
        .map(|output| output.status.success())
        .unwrap_or(false))
}

impl PreflightValidator {
    #[must_use]
    pub fn new() -> Self {
        let requirements = vec![
            Requirement {
                name: "kubectl".to_string(),
                check: Box::new(|| cli_available("kubectl", &["version", "--client"])),
                install_instructions: "Install kubectl from https://kubernetes.io/docs/tasks/tools/"
                    .to_string(),
            },
            Requirement {
                name: "Helm".to_string(),
                check: Box::new(|| cli_available("helm", &["version"])),
                install_instructions: "Install Helm from https://helm.sh/docs/intro/install/"
                    .to_string(),
            },
            Requirement {
                name: "Cluster reachable".to_string(),
                check: Box::new(|| Ok(cluster::check_cluster_reachable().is_ok())),
                install_instructions:
                    "Check your kubeconfig context with: kubectl config current-context"
                        .to_string(),
            },
        ];

        Self { requirements }
    }

    /// Run all checks, printing a result line per requirement.
    ///
    /// # Errors
    ///
    /// Returns an error if any requirement fails.
    pub fn validate(&self) -> Result<()> {
        println!();
        let mut failures = Vec::new();

        for requirement in &self.requirements {
            if let Ok(true) = (requirement.check)() {
                ui::print_check_result(&requirement.name, true, None);
            } else {
                ui::print_check_result(&requirement.name, false, None);
                failures.push(requirement);
            }
        }

        println!();

        if failures.is_empty() {
            ui::print_success("All prerequisites met!");
            return Ok(());
        }

        ui::print_warning("Some prerequisites are not met:");
        for failure in &failures {
            ui::print_info(&format!("{} - {}", failure.name, failure.install_instructions));
        }
        println!();

        Err(anyhow::anyhow!(
            "Prerequisites not met. Please install the required tools and try again."
        ))
    }
}

impl Default for PreflightValidator {
    fn default() -> Self {
        Self::new()
    }
}
