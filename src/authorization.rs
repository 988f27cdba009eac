use async_trait::async_trait;
use tracing::{debug, info};

use crate::capture::CaptureError;

/// Media kind gated by the platform consent store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// Camera
    Video,
    /// Microphone
    Audio,
}

/// Platform consent status for a protected capture device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationState {
    /// Access previously granted
    Authorized,
    /// User has not been asked yet
    NotDetermined,
    /// Access previously denied by the user
    Denied,
    /// Access blocked by policy (e.g. parental controls)
    Restricted,
    /// Status not recognized
    Unknown,
}

/// Source of authorization state and consent requests
///
/// The platform authorization store is the source of truth; outcomes are
/// never persisted by this crate.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuthorizationProvider: Send + Sync {
    /// Current authorization state for the given media kind
    fn status(&self, kind: MediaKind) -> AuthorizationState;

    /// Issue the asynchronous consent request, resolving to granted/denied
    async fn request_access(&self, kind: MediaKind) -> bool;
}

/// Check camera then microphone authorization, requesting consent when needed
///
/// Video is fully resolved before the audio check begins. A first-time
/// `NotDetermined` state triggers the system consent prompt and proceeds only
/// on grant; there is no retry on denial within a run.
///
/// # Errors
/// Returns `PermissionDenied` for the first media kind that does not resolve
/// to authorized.
pub async fn check_authorizations(provider: &dyn AuthorizationProvider) -> Result<(), CaptureError> {
    ensure_authorized(provider, MediaKind::Video).await?;
    ensure_authorized(provider, MediaKind::Audio).await
}

async fn ensure_authorized(
    provider: &dyn AuthorizationProvider,
    kind: MediaKind,
) -> Result<(), CaptureError> {
    match provider.status(kind) {
        AuthorizationState::Authorized => Ok(()),
        AuthorizationState::NotDetermined => {
            info!(?kind, "requesting capture consent");
            if provider.request_access(kind).await {
                info!(?kind, "capture consent granted");
                Ok(())
            } else {
                debug!(?kind, "capture consent refused");
                Err(CaptureError::PermissionDenied(kind))
            }
        }
        state => {
            debug!(?kind, ?state, "capture access unavailable");
            Err(CaptureError::PermissionDenied(kind))
        }
    }
}

#[cfg(target_os = "macos")]
#[allow(unsafe_code)]
mod platform {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use block2::RcBlock;
    use objc2::runtime::Bool;
    use objc2_av_foundation::{
        AVAuthorizationStatus, AVCaptureDevice, AVMediaType, AVMediaTypeAudio, AVMediaTypeVideo,
    };
    use tokio::sync::oneshot;

    use super::{AuthorizationProvider, AuthorizationState, MediaKind};

    /// Authorization provider backed by the AVFoundation consent store
    pub struct PlatformAuthorization;

    fn media_type(kind: MediaKind) -> &'static AVMediaType {
        unsafe {
            match kind {
                MediaKind::Video => AVMediaTypeVideo,
                MediaKind::Audio => AVMediaTypeAudio,
            }
        }
    }

    #[async_trait]
    impl AuthorizationProvider for PlatformAuthorization {
        fn status(&self, kind: MediaKind) -> AuthorizationState {
            let status =
                unsafe { AVCaptureDevice::authorizationStatusForMediaType(media_type(kind)) };
            if status == AVAuthorizationStatus::Authorized {
                AuthorizationState::Authorized
            } else if status == AVAuthorizationStatus::NotDetermined {
                AuthorizationState::NotDetermined
            } else if status == AVAuthorizationStatus::Denied {
                AuthorizationState::Denied
            } else if status == AVAuthorizationStatus::Restricted {
                AuthorizationState::Restricted
            } else {
                AuthorizationState::Unknown
            }
        }

        async fn request_access(&self, kind: MediaKind) -> bool {
            let (tx, rx) = oneshot::channel();
            // The completion handler is Fn, so the one-shot sender sits behind a mutex
            let tx = Mutex::new(Some(tx));
            let handler = RcBlock::new(move |granted: Bool| {
                if let Ok(mut slot) = tx.lock() {
                    if let Some(sender) = slot.take() {
                        let _ = sender.send(granted.as_bool());
                    }
                }
            });
            unsafe {
                AVCaptureDevice::requestAccessForMediaType_completionHandler(
                    media_type(kind),
                    &handler,
                );
            }
            rx.await.unwrap_or(false)
        }
    }
}

#[cfg(not(target_os = "macos"))]
mod platform {
    use async_trait::async_trait;

    use super::{AuthorizationProvider, AuthorizationState, MediaKind};

    /// Stand-in provider for hosts without a consent store
    pub struct PlatformAuthorization;

    #[async_trait]
    impl AuthorizationProvider for PlatformAuthorization {
        fn status(&self, _kind: MediaKind) -> AuthorizationState {
            AuthorizationState::Authorized
        }

        async fn request_access(&self, _kind: MediaKind) -> bool {
            true
        }
    }
}

pub use platform::PlatformAuthorization;

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;
    use mockall::Sequence;

    #[tokio::test]
    async fn test_both_authorized_proceeds() {
        let mut provider = MockAuthorizationProvider::new();
        let mut seq = Sequence::new();
        provider
            .expect_status()
            .with(eq(MediaKind::Video))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(AuthorizationState::Authorized);
        provider
            .expect_status()
            .with(eq(MediaKind::Audio))
            .times(1)
            .in_sequence(&mut seq)
            .return_const(AuthorizationState::Authorized);

        assert!(check_authorizations(&provider).await.is_ok());
    }

    #[tokio::test]
    async fn test_video_denied_short_circuits_audio() {
        let mut provider = MockAuthorizationProvider::new();
        // No expectation for Audio: any audio query would panic the mock
        provider
            .expect_status()
            .with(eq(MediaKind::Video))
            .times(1)
            .return_const(AuthorizationState::Denied);

        let err = check_authorizations(&provider).await.unwrap_err();
        assert!(matches!(err, CaptureError::PermissionDenied(MediaKind::Video)));
    }

    #[tokio::test]
    async fn test_not_determined_granted_proceeds() {
        let mut provider = MockAuthorizationProvider::new();
        provider
            .expect_status()
            .with(eq(MediaKind::Video))
            .return_const(AuthorizationState::NotDetermined);
        provider
            .expect_request_access()
            .with(eq(MediaKind::Video))
            .times(1)
            .return_const(true);
        provider
            .expect_status()
            .with(eq(MediaKind::Audio))
            .return_const(AuthorizationState::Authorized);

        assert!(check_authorizations(&provider).await.is_ok());
    }

    #[tokio::test]
    async fn test_not_determined_refused_aborts() {
        let mut provider = MockAuthorizationProvider::new();
        provider
            .expect_status()
            .with(eq(MediaKind::Video))
            .return_const(AuthorizationState::Authorized);
        provider
            .expect_status()
            .with(eq(MediaKind::Audio))
            .return_const(AuthorizationState::NotDetermined);
        provider
            .expect_request_access()
            .with(eq(MediaKind::Audio))
            .times(1)
            .return_const(false);

        let err = check_authorizations(&provider).await.unwrap_err();
        assert!(matches!(err, CaptureError::PermissionDenied(MediaKind::Audio)));
    }

    #[tokio::test]
    async fn test_restricted_and_unknown_abort() {
        for state in [AuthorizationState::Restricted, AuthorizationState::Unknown] {
            let mut provider = MockAuthorizationProvider::new();
            provider
                .expect_status()
                .with(eq(MediaKind::Video))
                .return_const(state);

            let err = check_authorizations(&provider).await.unwrap_err();
            assert!(matches!(err, CaptureError::PermissionDenied(MediaKind::Video)));
        }
    }
}
