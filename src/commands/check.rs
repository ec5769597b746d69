//! The `check` subcommand: preflight only, no cluster mutation.

use anyhow::Result;
use clap::Args;

use crate::preflight::PreflightValidator;
use crate::ui;

/// Run preflight checks without installing anything
#[derive(Args)]
pub struct CheckCommand {}

impl CheckCommand {
    /// Run the check subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if any prerequisite is missing.
    pub fn run(&self) -> Result<()> {
        ui::print_section("Preflight Checks");
        PreflightValidator::new().validate()
    }
}
