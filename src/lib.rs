//! Secure Cam - macOS timed clip recorder
//!
//! This library exports core modules for testing and potential future reuse.

/// Camera and microphone authorization gate
pub mod authorization;
/// Capture session, devices and movie sink
pub mod capture;
/// Configuration management
pub mod config;
/// Clip output paths
pub mod output;
/// Recording progress reporting
pub mod progress;
/// Timed recording workflow
pub mod recorder;
/// Telemetry and crash logging
pub mod telemetry;
