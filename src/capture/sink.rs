use std::path::Path;

use async_trait::async_trait;
use tokio::sync::mpsc;

use super::{CaptureError, SessionPreset};

/// Event delivered when the movie sink stops writing
///
/// Fires once per recording, whether the stop was deadline-driven or the sink
/// was closed externally.
#[derive(Debug)]
pub struct RecordingFinished {
    /// Present when the sink terminated abnormally
    pub error: Option<CaptureError>,
}

/// Movie-file output attached to a capture session
///
/// A sink writes one QuickTime container per recording and delivers exactly
/// one [`RecordingFinished`] event on the channel handed to
/// [`start_recording`](MovieSink::start_recording).
#[async_trait]
pub trait MovieSink: Send {
    /// Begin writing to `path` at the session preset's resolution
    ///
    /// # Errors
    /// Returns `SinkFailed` if the sink is already recording or cannot start
    async fn start_recording(
        &mut self,
        path: &Path,
        preset: SessionPreset,
        events: mpsc::UnboundedSender<RecordingFinished>,
    ) -> Result<(), CaptureError>;

    /// Request a graceful stop; the finished event follows asynchronously
    ///
    /// # Errors
    /// Returns `SinkFailed` if the stop request cannot be delivered
    async fn stop_recording(&mut self) -> Result<(), CaptureError>;
}
