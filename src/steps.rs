//! Ordered installation steps.
//!
//! The pipeline is strictly sequential; each step must succeed before
//! the next one starts.

/// Installation pipeline steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum InstallStep {
    /// Checking required CLIs and cluster reachability.
    Preflight,
    /// Creating the namespace if absent.
    EnsuringNamespace,
    /// Recreating the registry pull secret.
    EnsuringPullSecret,
    /// Applying the service account, role, and role binding.
    ApplyingRbac,
    /// Writing the Helm values file.
    RenderingValues,
    /// Adding and updating the chart repository.
    SyncingChartRepo,
    /// Installing or upgrading the Helm release.
    InstallingRelease,
    /// Waiting for the runner pods and dumping status.
    VerifyingRunner,
    /// Writing the sample pipeline and printing instructions.
    EmittingArtifacts,
    /// Installation complete.
    Complete,
}

impl InstallStep {
    /// Get the next step in the sequence.
    #[must_use]
    pub fn next(&self) -> Self {
        match self {
            Self::Preflight => Self::EnsuringNamespace,
            Self::EnsuringNamespace => Self::EnsuringPullSecret,
            Self::EnsuringPullSecret => Self::ApplyingRbac,
            Self::ApplyingRbac => Self::RenderingValues,
            Self::RenderingValues => Self::SyncingChartRepo,
            Self::SyncingChartRepo => Self::InstallingRelease,
            Self::InstallingRelease => Self::VerifyingRunner,
            Self::VerifyingRunner => Self::EmittingArtifacts,
            Self::EmittingArtifacts | Self::Complete => Self::Complete,
        }
    }

    /// Get a human-readable description of the step.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Preflight => "Checking prerequisites",
            Self::EnsuringNamespace => "Ensuring namespace",
            Self::EnsuringPullSecret => "Ensuring registry pull secret",
            Self::ApplyingRbac => "Applying RBAC manifest",
            Self::RenderingValues => "Rendering Helm values",
            Self::SyncingChartRepo => "Syncing chart repository",
            Self::InstallingRelease => "Installing Helm release",
            Self::VerifyingRunner => "Verifying runner pods",
            Self::EmittingArtifacts => "Writing sample pipeline",
            Self::Complete => "Complete",
        }
    }

    /// Get the step number for progress display.
    #[must_use]
    pub fn step_number(&self) -> u8 {
        match self {
            Self::Preflight => 1,
            Self::EnsuringNamespace => 2,
            Self::EnsuringPullSecret => 3,
            Self::ApplyingRbac => 4,
            Self::RenderingValues => 5,
            Self::SyncingChartRepo => 6,
            Self::InstallingRelease => 7,
            Self::VerifyingRunner => 8,
            Self::EmittingArtifacts | Self::Complete => 9,
        }
    }

    /// Total number of steps.
    pub const TOTAL_STEPS: u8 = 9;
}

impl std::fmt::Display for InstallStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}
