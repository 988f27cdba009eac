use anyhow::{Context, Result};
use std::fs::{self, OpenOptions};

use crate::config::Config;

/// Initialize telemetry logging
///
/// # Errors
/// Returns error if the log file or its parent directory cannot be created
pub fn init(enabled: bool, log_path: &str) -> Result<()> {
    if !enabled {
        // Basic stdout logging only
        tracing_subscriber::fmt().with_target(false).init();
        return Ok(());
    }

    let expanded_path = Config::expand_path(log_path)?;

    // Create parent directory if needed
    if let Some(parent) = expanded_path.parent() {
        fs::create_dir_all(parent).context("failed to create log directory")?;
    }

    // Set up file appender
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&expanded_path)
        .context("failed to open log file")?;

    tracing_subscriber::fmt()
        .with_writer(file)
        .with_target(false)
        .with_ansi(false)
        .init();

    tracing::info!("telemetry initialized: {}", expanded_path.display());

    Ok(())
}

#[cfg(test)]
mod tests {
    #[test]
    #[ignore] // Requires global tracing subscriber initialization (can only init once per process)
    fn test_init_with_telemetry_enabled() {
        // Would need a temp HOME, a writable log path, and a fresh process.
        // Covered manually; the expansion logic is tested in config.rs.
    }
}
