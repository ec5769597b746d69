//! The `install` subcommand.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm};

use super::ConfigOverrides;
use crate::config::InstallConfig;
use crate::orchestrator::Installer;
use crate::ui;

/// Install the GitLab Runner on the current cluster
#[derive(Args)]
pub struct InstallCommand {
    #[command(flatten)]
    overrides: ConfigOverrides,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

impl InstallCommand {
    /// Run the install subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or any pipeline
    /// step fails.
    pub async fn run(&self) -> Result<()> {
        let config = self.overrides.resolve()?;

        print_config_summary(&config);
        println!();

        if !self.yes {
            let proceed = Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt("Proceed with installation?")
                .default(true)
                .interact()?;

            if !proceed {
                println!("{}", "Installation cancelled.".yellow());
                return Ok(());
            }
        }

        let installer = Installer::new(config)?;
        installer.run().await
    }
}

fn print_config_summary(config: &InstallConfig) {
    ui::print_section("Configuration");
    ui::print_kv("GitLab URL", &config.gitlab_url);
    ui::print_kv("Token", &mask_token(&config.runner_token));
    ui::print_kv("Namespace", &config.namespace);
    ui::print_kv("Release", &config.release_name);
    ui::print_kv("Chart", &config.chart);
    ui::print_kv("Tags", &config.runner_tags);
    ui::print_kv(
        "Pull secret",
        if config.registry.is_some() {
            config.pull_secret_name.as_str()
        } else {
            "(none)"
        },
    );
    ui::print_kv("Output dir", &config.output_dir.display().to_string());
}

/// Show enough of the token to recognize it without leaking it.
fn mask_token(token: &str) -> String {
    if token.is_empty() {
        return "(not set)".into();
    }
    let visible: String = token.chars().take(6).collect();
    format!("{visible}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_token() {
        assert_eq!(mask_token(""), "(not set)");
        assert_eq!(mask_token("glrt-abcdef123456"), "glrt-a…");
        assert_eq!(mask_token("abc"), "abc…");
    }
}
