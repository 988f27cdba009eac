use std::path::Path;

use tokio::sync::mpsc;

use super::{CaptureError, DeviceInfo, MovieSink, RecordingFinished};
use crate::authorization::MediaKind;

/// Session resolution preset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPreset {
    /// 640x480, the fixed low-resolution recording preset
    Vga640x480,
    /// 1280x720
    Hd1280x720,
}

impl SessionPreset {
    /// Frame dimensions for this preset
    #[must_use]
    pub const fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Vga640x480 => (640, 480),
            Self::Hd1280x720 => (1280, 720),
        }
    }
}

/// A capture device wrapped for attachment to a session
#[derive(Debug, Clone)]
pub struct CaptureInput {
    device: DeviceInfo,
}

impl CaptureInput {
    /// Wrap a device as a session input
    #[must_use]
    pub const fn new(device: DeviceInfo) -> Self {
        Self { device }
    }

    /// Media kind this input provides
    #[must_use]
    pub const fn kind(&self) -> MediaKind {
        self.device.kind
    }

    /// The wrapped device
    #[must_use]
    pub const fn device(&self) -> &DeviceInfo {
        &self.device
    }
}

/// An active binding of capture inputs to a movie sink
///
/// Holds at most one input per media kind and one sink. Configuration must be
/// committed before the session starts running; inputs cannot change while it
/// runs. The recorder's state flag keeps at most one session active at a time.
pub struct CaptureSession {
    video_input: Option<CaptureInput>,
    audio_input: Option<CaptureInput>,
    sink: Option<Box<dyn MovieSink>>,
    preset: SessionPreset,
    committed: bool,
    running: bool,
}

impl Default for CaptureSession {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSession {
    /// Create an empty, unconfigured session
    #[must_use]
    pub const fn new() -> Self {
        Self {
            video_input: None,
            audio_input: None,
            sink: None,
            preset: SessionPreset::Vga640x480,
            committed: false,
            running: false,
        }
    }

    /// Whether the given input can be attached
    ///
    /// Rejects inputs while the session runs and duplicate media kinds.
    #[must_use]
    pub const fn can_add_input(&self, input: &CaptureInput) -> bool {
        if self.running {
            return false;
        }
        match input.kind() {
            MediaKind::Video => self.video_input.is_none(),
            MediaKind::Audio => self.audio_input.is_none(),
        }
    }

    /// Attach a capture input
    ///
    /// # Errors
    /// Returns `InputRejected` when [`can_add_input`](Self::can_add_input) is false
    pub fn add_input(&mut self, input: CaptureInput) -> Result<(), CaptureError> {
        if !self.can_add_input(&input) {
            return Err(CaptureError::InputRejected(input.kind()));
        }
        self.committed = false;
        match input.kind() {
            MediaKind::Video => self.video_input = Some(input),
            MediaKind::Audio => self.audio_input = Some(input),
        }
        Ok(())
    }

    /// Attach the movie-file output, replacing any previous sink
    pub fn add_output(&mut self, sink: Box<dyn MovieSink>) {
        self.committed = false;
        self.sink = Some(sink);
    }

    /// Set the session resolution preset
    pub fn set_preset(&mut self, preset: SessionPreset) {
        self.preset = preset;
    }

    /// Validate and commit the pending configuration
    ///
    /// # Errors
    /// Returns `ConfigurationFailed` unless both inputs and a sink are attached
    pub fn commit_configuration(&mut self) -> Result<(), CaptureError> {
        if self.video_input.is_none() || self.audio_input.is_none() {
            return Err(CaptureError::ConfigurationFailed(
                "session requires one video and one audio input".to_owned(),
            ));
        }
        if self.sink.is_none() {
            return Err(CaptureError::ConfigurationFailed(
                "session requires a movie output".to_owned(),
            ));
        }
        self.committed = true;
        Ok(())
    }

    /// Start the session running
    ///
    /// # Errors
    /// Returns `ConfigurationFailed` if configuration was never committed
    pub fn start_running(&mut self) -> Result<(), CaptureError> {
        if !self.committed {
            return Err(CaptureError::ConfigurationFailed(
                "configuration not committed".to_owned(),
            ));
        }
        self.running = true;
        Ok(())
    }

    /// Stop the session
    pub fn stop_running(&mut self) {
        self.running = false;
    }

    /// Whether the session is running
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Begin writing a clip through the attached sink
    ///
    /// # Errors
    /// Returns `ConfigurationFailed` if the session is not running, or the
    /// sink's own start error
    pub async fn start_recording(
        &mut self,
        path: &Path,
        events: mpsc::UnboundedSender<RecordingFinished>,
    ) -> Result<(), CaptureError> {
        if !self.running {
            return Err(CaptureError::ConfigurationFailed(
                "session is not running".to_owned(),
            ));
        }
        let preset = self.preset;
        match self.sink.as_mut() {
            Some(sink) => sink.start_recording(path, preset, events).await,
            None => Err(CaptureError::SinkFailed("no output attached".to_owned())),
        }
    }

    /// Ask the attached sink to stop and finalize the clip
    ///
    /// # Errors
    /// Returns the sink's stop error
    pub async fn stop_recording(&mut self) -> Result<(), CaptureError> {
        match self.sink.as_mut() {
            Some(sink) => sink.stop_recording().await,
            None => Ok(()),
        }
    }
}
