use std::sync::Arc;

use anyhow::Result;

use secure_cam::authorization::{self, PlatformAuthorization};
use secure_cam::capture::FfmpegBackend;
use secure_cam::config::Config;
use secure_cam::progress::LogProgress;
use secure_cam::recorder::Recorder;
use secure_cam::{output, telemetry};

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration
    let config = Config::load()?;
    println!("✓ Config loaded from ~/.secure-cam.toml");

    // Initialize telemetry
    telemetry::init(config.telemetry.enabled, &config.telemetry.log_path)?;
    tracing::info!("secure-cam starting");
    println!("✓ Telemetry initialized");

    // Authorization gate: camera first, then microphone
    let provider = PlatformAuthorization;
    if let Err(e) = authorization::check_authorizations(&provider).await {
        // The platform owns the consent UI; a closed gate is a quiet no-op
        tracing::debug!(error = %e, "authorization gate closed");
        return Ok(());
    }
    println!("✓ Camera and microphone authorized");

    let output_dir = output::default_output_dir();
    let mut recorder = Recorder::new(
        Arc::new(FfmpegBackend),
        output_dir.clone(),
        config.recording.restart_on_finish,
    );
    recorder.subscribe(Arc::new(LogProgress));

    println!("\nSecure Cam is recording to {}.", output_dir.display());
    println!("Press Ctrl+C to exit.\n");

    tokio::select! {
        result = recorder.run() => {
            if let Err(e) = result {
                tracing::warn!(error = %e, "recorder stopped");
            }
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("shutdown signal received");
            println!("\nShutting down...");
        }
    }

    Ok(())
}
