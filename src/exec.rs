//! External command execution.
//!
//! Thin wrappers around `kubectl` and `helm`. Every non-zero exit aborts
//! the caller with the command's stderr in the error chain; there are no
//! retries at this layer.

use std::io::Write;
use std::process::{Command, Stdio};

use anyhow::{Context, Result};
use tracing::debug;

/// Run `kubectl` with the given arguments and return its stdout.
///
/// # Errors
///
/// Returns an error if kubectl cannot be spawned or exits non-zero.
pub fn kubectl(args: &[&str]) -> Result<String> {
    run("kubectl", args)
}

/// Run `helm` with the given arguments and return its stdout.
///
/// # Errors
///
/// Returns an error if helm cannot be spawned or exits non-zero.
pub fn helm(args: &[&str]) -> Result<String> {
    run("helm", args)
}

fn run(program: &str, args: &[&str]) -> Result<String> {
    debug!(program, ?args, "Running command");

    let output = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("Failed to execute {program}"))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("{program} {} failed: {}", args.join(" "), stderr.trim());
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Run a command and report whether it exited successfully.
///
/// Used for existence probes (`kubectl get namespace`, `helm status`)
/// where a non-zero exit is an answer, not a failure.
///
/// # Errors
///
/// Returns an error only if the command cannot be spawned at all.
pub fn succeeds(program: &str, args: &[&str]) -> Result<bool> {
    debug!(program, ?args, "Probing command");

    let output = Command::new(program)
        .args(args)
        .output()
        .with_context(|| format!("Failed to execute {program}"))?;

    Ok(output.status.success())
}

/// Pipe a YAML document into `kubectl` over stdin.
///
/// Used for applying rendered manifests without writing temp files.
///
/// # Errors
///
/// Returns an error if kubectl cannot be spawned, stdin cannot be
/// written, or the command exits non-zero.
pub fn kubectl_stdin(args: &[&str], yaml: &str) -> Result<String> {
    debug!(?args, "Piping manifest to kubectl");

    let mut child = Command::new("kubectl")
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .context("Failed to spawn kubectl")?;

    if let Some(ref mut stdin) = child.stdin {
        stdin
            .write_all(yaml.as_bytes())
            .context("Failed to write YAML to kubectl stdin")?;
    }

    let output = child.wait_with_output().context("Failed to wait for kubectl")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!("kubectl {} failed: {}", args.join(" "), stderr.trim());
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}
