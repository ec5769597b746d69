//! The `render` subcommand: write all generated files without touching
//! the cluster.

use anyhow::Result;
use clap::Args;

use super::ConfigOverrides;
use crate::manifests;
use crate::ui;

/// Render the values file, RBAC manifest, and sample pipeline to disk
#[derive(Args)]
pub struct RenderCommand {
    #[command(flatten)]
    overrides: ConfigOverrides,
}

impl RenderCommand {
    /// Run the render subcommand.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration is invalid or a file cannot
    /// be written.
    pub fn run(&self) -> Result<()> {
        let config = self.overrides.resolve()?;
        config.validate()?;

        ui::print_section("Rendering artifacts");

        let values = manifests::render_values(&config)?;
        manifests::write_artifact(&config.values_file(), &values)?;
        ui::print_success(&format!("Wrote {}", config.values_file().display()));

        let rbac = manifests::render_rbac(&config)?;
        manifests::write_artifact(&config.rbac_file(), &rbac)?;
        ui::print_success(&format!("Wrote {}", config.rbac_file().display()));

        let pipeline = manifests::render_sample_pipeline(&config)?;
        manifests::write_artifact(&config.sample_pipeline_file(), &pipeline)?;
        ui::print_success(&format!(
            "Wrote {}",
            config.sample_pipeline_file().display()
        ));

        Ok(())
    }
}
