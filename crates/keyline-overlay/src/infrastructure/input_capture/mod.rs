//! Input capture infrastructure for the overlay.
//!
//! On Windows, this creates a hidden window registered for raw
//! keyboard and mouse input (`RIDEV_INPUTSINK`, so events arrive even while
//! another application has focus).  Each `WM_INPUT` payload is copied out
//! and handed to an [`InputRecorder`], which never blocks the callback.
//!
//! # Lifetime
//!
//! [`InputSource::start`] returns a [`CaptureGuard`].  The subscription lives
//! exactly as long as the guard: dropping it unregisters the devices, closes
//! the window and joins the message-loop thread.
//!
//! # Testability
//!
//! The `InputSource` trait allows tests to inject synthetic payloads through
//! [`mock::MockInputSource`] without a Windows message loop.

use tracing::info;

use crate::application::record_input::InputRecorder;

pub mod mock;

#[cfg(target_os = "windows")]
pub mod windows;

/// Error type for input capture operations.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to create capture window: {0}")]
    WindowCreationFailed(String),
    #[error("failed to register raw input devices: {0}")]
    RegistrationFailed(String),
    #[error("capture is already running for this source")]
    AlreadyStarted,
    #[error("platform not supported: {0}")]
    UnsupportedPlatform(String),
}

/// Trait abstracting the OS raw input subscription.
///
/// The production implementation uses a hidden Win32 window; tests use
/// [`mock::MockInputSource`].
pub trait InputSource: Send + Sync {
    /// Short name used in log lines.
    fn name(&self) -> &'static str;

    /// Starts delivering payloads to `recorder` until the guard is dropped.
    fn start(&self, recorder: InputRecorder) -> Result<CaptureGuard, CaptureError>;
}

/// Scoped raw input subscription.  Releases OS resources on drop.
#[must_use = "capture stops as soon as the guard is dropped"]
pub struct CaptureGuard {
    source: &'static str,
    release: Option<Box<dyn FnOnce() + Send>>,
}

impl CaptureGuard {
    /// Wraps the teardown routine of a started subscription.
    pub fn new(source: &'static str, release: impl FnOnce() + Send + 'static) -> Self {
        Self {
            source,
            release: Some(Box::new(release)),
        }
    }

    pub fn source(&self) -> &'static str {
        self.source
    }

    /// Stops capture now instead of at end of scope.
    pub fn stop(self) {
        drop(self);
    }
}

impl std::fmt::Debug for CaptureGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CaptureGuard")
            .field("source", &self.source)
            .field("active", &self.release.is_some())
            .finish()
    }
}

impl Drop for CaptureGuard {
    fn drop(&mut self) {
        if let Some(release) = self.release.take() {
            release();
            info!(source = self.source, "raw input capture stopped");
        }
    }
}

/// Stand-in source for platforms without raw input.  `start` always fails,
/// so the overlay runs but records nothing.
#[derive(Debug, Default)]
pub struct UnsupportedSource;

impl InputSource for UnsupportedSource {
    fn name(&self) -> &'static str {
        "unsupported"
    }

    fn start(&self, _recorder: InputRecorder) -> Result<CaptureGuard, CaptureError> {
        Err(CaptureError::UnsupportedPlatform(
            std::env::consts::OS.to_string(),
        ))
    }
}

/// The raw input source for the current platform.
pub fn platform_source() -> Box<dyn InputSource> {
    #[cfg(target_os = "windows")]
    {
        Box::new(windows::RawInputWindow::new())
    }

    #[cfg(not(target_os = "windows"))]
    {
        Box::new(UnsupportedSource)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_guard_runs_release_once_on_drop() {
        // Arrange
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let guard = CaptureGuard::new("test", move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        // Act
        guard.stop();

        // Assert
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[cfg(not(target_os = "windows"))]
    #[test]
    fn test_platform_source_is_unsupported_off_windows() {
        // Arrange
        let (tx, _rx) = crate::application::record_input::event_channel();
        let recorder = InputRecorder::new(
            Arc::default(),
            Arc::default(),
            tx,
            Arc::new(keyline_core::ManualClock::new(0)),
        );

        // Act
        let result = platform_source().start(recorder);

        // Assert
        assert!(matches!(result, Err(CaptureError::UnsupportedPlatform(_))));
    }
}
