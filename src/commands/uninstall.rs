//! The `uninstall` subcommand.

use anyhow::Result;
use clap::Args;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Confirm};

use super::ConfigOverrides;
use crate::orchestrator::Installer;

/// Remove the runner release and its generated cluster objects
#[derive(Args)]
pub struct UninstallCommand {
    #[command(flatten)]
    overrides: ConfigOverrides,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    yes: bool,
}

impl UninstallCommand {
    /// Run the uninstall subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if removal fails.
    pub fn run(&self) -> Result<()> {
        let mut config = self.overrides.resolve()?;
        // Uninstall does not talk to GitLab, so a placeholder token is
        // enough to pass validation.
        if config.runner_token.is_empty() {
            config.runner_token = "unused".into();
        }

        if !self.yes {
            let proceed = Confirm::with_theme(&ColorfulTheme::default())
                .with_prompt(format!(
                    "Remove release {} from namespace {}?",
                    config.release_name, config.namespace
                ))
                .default(false)
                .interact()?;

            if !proceed {
                println!("{}", "Uninstall cancelled.".yellow());
                return Ok(());
            }
        }

        let installer = Installer::new(config)?;
        installer.uninstall()
    }
}
