use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait};
use nokhwa::utils::{ApiBackend, CameraIndex};
use tokio::io::AsyncWriteExt;
use tokio::process::{ChildStdin, Command};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::{CaptureBackend, CaptureError, DeviceInfo, MovieSink, RecordingFinished, SessionPreset};
use crate::authorization::MediaKind;

/// Capture backend that records through an `ffmpeg` child process
///
/// Device discovery goes through `nokhwa` (camera) and `cpal` (microphone);
/// encoding and QuickTime muxing are delegated to ffmpeg's platform capture
/// inputs.
pub struct FfmpegBackend;

impl CaptureBackend for FfmpegBackend {
    fn default_device(&self, kind: MediaKind) -> Option<DeviceInfo> {
        match kind {
            MediaKind::Video => {
                let cameras = match nokhwa::query(ApiBackend::Auto) {
                    Ok(cameras) => cameras,
                    Err(e) => {
                        warn!("camera enumeration failed: {e}");
                        return None;
                    }
                };
                let camera = cameras.into_iter().next()?;
                let index = match camera.index() {
                    CameraIndex::Index(i) => i.to_owned(),
                    CameraIndex::String(_) => 0,
                };
                let name = camera.human_name();
                info!("using video device: {name}");
                Some(DeviceInfo { kind, name, index })
            }
            MediaKind::Audio => {
                let host = cpal::default_host();
                let device = host.default_input_device()?;
                let name = device.name().unwrap_or_else(|_| "default".to_owned());
                info!("using audio device: {name}");
                Some(DeviceInfo {
                    kind,
                    name,
                    index: 0,
                })
            }
        }
    }

    fn open_sink(&self, video: &DeviceInfo, audio: &DeviceInfo) -> Box<dyn MovieSink> {
        Box::new(FfmpegSink::new(video.clone(), audio.clone()))
    }
}

/// Movie sink writing through a spawned ffmpeg process
pub struct FfmpegSink {
    video: DeviceInfo,
    audio: DeviceInfo,
    stdin: Option<ChildStdin>,
}

impl FfmpegSink {
    const fn new(video: DeviceInfo, audio: DeviceInfo) -> Self {
        Self {
            video,
            audio,
            stdin: None,
        }
    }
}

/// Platform capture input arguments for ffmpeg
fn input_args(video: &DeviceInfo, audio: &DeviceInfo, preset: SessionPreset) -> Vec<String> {
    let (width, height) = preset.dimensions();
    let size = format!("{width}x{height}");
    if cfg!(target_os = "macos") {
        vec![
            "-f".to_owned(),
            "avfoundation".to_owned(),
            "-framerate".to_owned(),
            "30".to_owned(),
            "-video_size".to_owned(),
            size,
            "-i".to_owned(),
            format!("{}:{}", video.index, audio.index),
        ]
    } else {
        vec![
            "-f".to_owned(),
            "v4l2".to_owned(),
            "-framerate".to_owned(),
            "30".to_owned(),
            "-video_size".to_owned(),
            size,
            "-i".to_owned(),
            format!("/dev/video{}", video.index),
            "-f".to_owned(),
            "alsa".to_owned(),
            "-i".to_owned(),
            "default".to_owned(),
        ]
    }
}

#[async_trait]
impl MovieSink for FfmpegSink {
    async fn start_recording(
        &mut self,
        path: &Path,
        preset: SessionPreset,
        events: mpsc::UnboundedSender<RecordingFinished>,
    ) -> Result<(), CaptureError> {
        if self.stdin.is_some() {
            return Err(CaptureError::SinkFailed("already recording".to_owned()));
        }

        let mut cmd = Command::new("ffmpeg");
        cmd.args(["-hide_banner", "-loglevel", "error", "-y"])
            .args(input_args(&self.video, &self.audio, preset))
            .args([
                "-c:v", "libx264", "-preset", "veryfast", "-pix_fmt", "yuv420p", "-c:a", "aac",
                "-f", "mov",
            ])
            .arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        debug!(
            video = %self.video.name,
            audio = %self.audio.name,
            path = %path.display(),
            "spawning ffmpeg"
        );

        let mut child = cmd
            .spawn()
            .map_err(|e| CaptureError::SinkFailed(format!("failed to spawn ffmpeg: {e}")))?;
        self.stdin = child.stdin.take();

        // The child is owned by the monitor; its exit becomes the finished event
        tokio::spawn(async move {
            let error = match child.wait().await {
                Ok(status) if status.success() => None,
                Ok(status) => Some(CaptureError::SinkFailed(format!(
                    "ffmpeg exited with {status}"
                ))),
                Err(e) => Some(CaptureError::SinkFailed(e.to_string())),
            };
            let _ = events.send(RecordingFinished { error });
        });

        Ok(())
    }

    async fn stop_recording(&mut self) -> Result<(), CaptureError> {
        if let Some(mut stdin) = self.stdin.take() {
            // 'q' asks ffmpeg to finalize the container; dropping the pipe is
            // the fallback when the write fails
            if let Err(e) = stdin.write_all(b"q").await {
                warn!("stop request write failed: {e}");
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn device(kind: MediaKind, index: u32) -> DeviceInfo {
        DeviceInfo {
            kind,
            name: "test device".to_owned(),
            index,
        }
    }

    #[test]
    fn test_input_args_use_preset_resolution() {
        let args = input_args(
            &device(MediaKind::Video, 0),
            &device(MediaKind::Audio, 0),
            SessionPreset::Vga640x480,
        );
        assert!(args.contains(&"640x480".to_owned()));
        assert!(args.contains(&"-video_size".to_owned()));
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn test_input_args_address_both_devices() {
        let args = input_args(
            &device(MediaKind::Video, 1),
            &device(MediaKind::Audio, 2),
            SessionPreset::Vga640x480,
        );
        assert!(args.contains(&"avfoundation".to_owned()));
        assert!(args.contains(&"1:2".to_owned()));
    }

    #[test]
    #[ignore = "requires camera and microphone hardware"]
    fn test_default_devices_resolve() {
        let backend = FfmpegBackend;
        assert!(backend.default_device(MediaKind::Video).is_some());
        assert!(backend.default_device(MediaKind::Audio).is_some());
    }
}
