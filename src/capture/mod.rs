//! Capture session lifecycle: default devices, inputs, and the movie sink.

mod ffmpeg;
mod session;
mod sink;

pub use ffmpeg::FfmpegBackend;
pub use session::{CaptureInput, CaptureSession, SessionPreset};
pub use sink::{MovieSink, RecordingFinished};

use crate::authorization::MediaKind;

/// Capture failure taxonomy
///
/// Every variant aborts the current run; none is surfaced to the user beyond
/// the log.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// Authorization gate closed for a media kind
    #[error("capture access denied for {0:?}")]
    PermissionDenied(MediaKind),
    /// No default device available for a media kind
    #[error("no default {0:?} capture device")]
    DeviceUnavailable(MediaKind),
    /// Session refused a capture input
    #[error("capture input rejected for {0:?}")]
    InputRejected(MediaKind),
    /// Session configuration could not be committed or started
    #[error("capture session configuration failed: {0}")]
    ConfigurationFailed(String),
    /// Movie sink could not start, stop, or finalize
    #[error("movie sink failed: {0}")]
    SinkFailed(String),
}

/// A capture device resolved by a backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Media kind the device provides
    pub kind: MediaKind,
    /// Human-readable device name
    pub name: String,
    /// Backend-specific device index
    pub index: u32,
}

/// Source of capture devices and movie sinks
pub trait CaptureBackend: Send + Sync {
    /// Default device for the given media kind, if one is present
    fn default_device(&self, kind: MediaKind) -> Option<DeviceInfo>;

    /// Build a movie sink recording from the given device pair
    fn open_sink(&self, video: &DeviceInfo, audio: &DeviceInfo) -> Box<dyn MovieSink>;
}
