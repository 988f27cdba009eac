use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{debug, warn};

/// Suffix appended to every clip name
pub const CLIP_SUFFIX: &str = "-rec.mov";

/// Clip file name for the given instant: `<ISO8601 timestamp>-rec.mov`
///
/// Unique per invocation at one-second clock resolution.
#[must_use]
pub fn clip_name(now: DateTime<Utc>) -> String {
    format!("{}{CLIP_SUFFIX}", now.to_rfc3339_opts(SecondsFormat::Secs, true))
}

/// Full clip path under the output directory
#[must_use]
pub fn clip_path(dir: &Path, now: DateTime<Utc>) -> PathBuf {
    dir.join(clip_name(now))
}

/// Default clip directory: the user's documents directory, falling back to home
#[must_use]
pub fn default_output_dir() -> PathBuf {
    dirs::document_dir()
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Best-effort removal of a stale file at the target path
///
/// Removal failure is logged and ignored; recording proceeds either way.
pub fn prepare(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => debug!(path = %path.display(), "removed stale clip"),
        Err(e) if e.kind() == ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), "failed to remove stale clip: {e}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_clip_name_is_iso8601_with_suffix() {
        let ts = Utc.with_ymd_and_hms(2022, 5, 28, 10, 30, 0).unwrap();
        assert_eq!(clip_name(ts), "2022-05-28T10:30:00Z-rec.mov");
    }

    #[test]
    fn test_clip_names_unique_per_second() {
        let a = Utc.with_ymd_and_hms(2022, 5, 28, 10, 30, 0).unwrap();
        let b = Utc.with_ymd_and_hms(2022, 5, 28, 10, 30, 1).unwrap();
        assert_ne!(clip_name(a), clip_name(b));
    }

    #[test]
    fn test_clip_path_joins_directory() {
        let ts = Utc.with_ymd_and_hms(2022, 5, 28, 10, 30, 0).unwrap();
        let path = clip_path(Path::new("/tmp/docs"), ts);
        assert_eq!(
            path,
            PathBuf::from("/tmp/docs/2022-05-28T10:30:00Z-rec.mov")
        );
    }

    #[test]
    fn test_prepare_removes_stale_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2022-05-28T10:30:00Z-rec.mov");
        fs::write(&path, b"stale clip").unwrap();

        prepare(&path);
        assert!(!path.exists());
    }

    #[test]
    fn test_prepare_ignores_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing-rec.mov");

        // Must not panic or create anything
        prepare(&path);
        assert!(!path.exists());
    }

    #[test]
    fn test_default_output_dir_is_not_empty() {
        let dir = default_output_dir();
        assert!(!dir.as_os_str().is_empty());
    }
}
