use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::authorization::MediaKind;
use crate::capture::{
    CaptureBackend, CaptureError, CaptureInput, CaptureSession, RecordingFinished, SessionPreset,
};
use crate::output;
use crate::progress::{ProgressCounter, ProgressObserver};

/// Maximum clip length in seconds. Fixed by design.
pub const MAX_CLIP_SECS: u32 = 300;

const TICK: Duration = Duration::from_secs(1);

/// Explicit single-active-session flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// No session exists
    Idle,
    /// Devices are being acquired and configured
    Starting,
    /// A session is running and a clip is being written
    Running,
    /// The deadline fired; waiting for the sink to finalize
    Stopping,
}

/// Drives the timed-recording workflow
///
/// Owns the one active capture session, the 1 Hz progress tick, and the
/// 300-second deadline. A finished recording restarts a fresh session when
/// `restart_on_finish` is set; otherwise the recorder returns to idle.
pub struct Recorder {
    backend: Arc<dyn CaptureBackend>,
    observers: Vec<Arc<dyn ProgressObserver>>,
    output_dir: PathBuf,
    restart_on_finish: bool,
    state: SessionState,
    counter: ProgressCounter,
}

impl Recorder {
    /// Create a recorder writing clips under `output_dir`
    #[must_use]
    pub fn new(
        backend: Arc<dyn CaptureBackend>,
        output_dir: PathBuf,
        restart_on_finish: bool,
    ) -> Self {
        Self {
            backend,
            observers: Vec::new(),
            output_dir,
            restart_on_finish,
            state: SessionState::Idle,
            counter: ProgressCounter::new(MAX_CLIP_SECS),
        }
    }

    /// Subscribe an observer to progress updates
    pub fn subscribe(&mut self, observer: Arc<dyn ProgressObserver>) {
        self.observers.push(observer);
    }

    /// Current session state
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Record clips until setup fails or, with restart disabled, one clip ends
    ///
    /// # Errors
    /// Returns the setup error that aborted the workflow; a completed clip is
    /// never an error
    pub async fn run(&mut self) -> Result<(), CaptureError> {
        loop {
            let (session, events) = match self.start_session().await {
                Ok(active) => active,
                Err(e) => {
                    warn!(error = %e, "capture setup aborted");
                    return Err(e);
                }
            };

            let finished = self.drive(session, events).await;
            match finished.error {
                Some(error) => warn!(error = %error, "recording finished with error"),
                None => info!("recording finished"),
            }

            if !self.restart_on_finish {
                return Ok(());
            }
            debug!("restarting capture session");
        }
    }

    /// Acquire devices, configure the session, and begin writing a clip
    async fn start_session(
        &mut self,
    ) -> Result<(CaptureSession, mpsc::UnboundedReceiver<RecordingFinished>), CaptureError> {
        if self.state != SessionState::Idle {
            return Err(CaptureError::ConfigurationFailed(
                "a session is already active".to_owned(),
            ));
        }
        self.state = SessionState::Starting;

        match self.configure_and_start().await {
            Ok(active) => {
                self.state = SessionState::Running;
                Ok(active)
            }
            Err(e) => {
                self.state = SessionState::Idle;
                Err(e)
            }
        }
    }

    async fn configure_and_start(
        &mut self,
    ) -> Result<(CaptureSession, mpsc::UnboundedReceiver<RecordingFinished>), CaptureError> {
        let video = self
            .backend
            .default_device(MediaKind::Video)
            .ok_or(CaptureError::DeviceUnavailable(MediaKind::Video))?;
        let audio = self
            .backend
            .default_device(MediaKind::Audio)
            .ok_or(CaptureError::DeviceUnavailable(MediaKind::Audio))?;

        let mut session = CaptureSession::new();
        for device in [&video, &audio] {
            let input = CaptureInput::new(device.clone());
            if !session.can_add_input(&input) {
                return Err(CaptureError::InputRejected(input.kind()));
            }
            session.add_input(input)?;
        }

        session.add_output(self.backend.open_sink(&video, &audio));
        session.set_preset(SessionPreset::Vga640x480);
        session.commit_configuration()?;
        session.start_running()?;

        let path = output::clip_path(&self.output_dir, chrono::Utc::now());
        output::prepare(&path);

        let (tx, rx) = mpsc::unbounded_channel();
        if let Err(e) = session.start_recording(&path, tx).await {
            session.stop_running();
            return Err(e);
        }

        info!(path = %path.display(), "recording started");
        Ok((session, rx))
    }

    /// Drive one recording to its finished event
    ///
    /// The deadline branch disarms itself after firing; tick branches stop
    /// once the session leaves `Running`, so no tick follows the stop.
    async fn drive(
        &mut self,
        mut session: CaptureSession,
        mut events: mpsc::UnboundedReceiver<RecordingFinished>,
    ) -> RecordingFinished {
        let deadline = tokio::time::sleep(Duration::from_secs(u64::from(MAX_CLIP_SECS)));
        tokio::pin!(deadline);
        let mut deadline_armed = true;

        let start = tokio::time::Instant::now();
        let mut ticker = tokio::time::interval_at(start + TICK, TICK);

        loop {
            tokio::select! {
                biased;

                _ = ticker.tick(), if self.state == SessionState::Running => {
                    let seconds = self.counter.increment();
                    for observer in &self.observers {
                        observer.on_tick(seconds);
                    }
                }

                () = &mut deadline, if deadline_armed => {
                    deadline_armed = false;
                    self.state = SessionState::Stopping;
                    debug!("deadline reached, stopping recording");
                    if let Err(e) = session.stop_recording().await {
                        warn!(error = %e, "stop request failed");
                    }
                    session.stop_running();
                }

                finished = events.recv() => {
                    let finished = finished.unwrap_or_else(|| RecordingFinished {
                        error: Some(CaptureError::SinkFailed(
                            "finished event channel closed".to_owned(),
                        )),
                    });
                    if session.is_running() {
                        // The sink stopped on its own before the deadline
                        debug!("recording finished externally");
                        session.stop_running();
                    }
                    self.counter.reset();
                    for observer in &self.observers {
                        observer.on_reset();
                    }
                    self.state = SessionState::Idle;
                    return finished;
                }
            }
        }
    }
}
