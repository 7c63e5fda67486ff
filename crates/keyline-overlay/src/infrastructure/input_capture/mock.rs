//! Mock input source for unit testing.
//!
//! Allows tests to inject raw payloads, or reports that are encoded into
//! payloads first, without requiring a running Windows message loop.

use std::sync::{Arc, Mutex, PoisonError};

use keyline_core::protocol::raw_input::{encode_raw_input, RawInput};

use super::{CaptureError, CaptureGuard, InputSource};
use crate::application::record_input::{InputRecorder, Recorded};

type Slot = Arc<Mutex<Option<InputRecorder>>>;

/// A mock implementation of [`InputSource`] that allows tests to inject payloads.
#[derive(Clone, Default)]
pub struct MockInputSource {
    recorder: Slot,
    fail_with_registration_error: bool,
}

impl MockInputSource {
    /// Creates a new mock input source.
    pub fn new() -> Self {
        Self::default()
    }

    /// A source whose `start` always fails, as when device registration is
    /// refused by the OS.
    pub fn failing() -> Self {
        Self {
            recorder: Slot::default(),
            fail_with_registration_error: true,
        }
    }

    /// Injects a raw payload, as if delivered with `WM_INPUT`.
    ///
    /// Panics if capture is not running.
    pub fn inject_payload(&self, bytes: &[u8]) -> Recorded {
        let guard = self.recorder.lock().unwrap_or_else(PoisonError::into_inner);
        match guard.as_ref() {
            Some(recorder) => recorder.handle_payload(bytes),
            None => panic!("MockInputSource::inject_payload called while not capturing"),
        }
    }

    /// Encodes `input` and injects it.
    pub fn inject(&self, input: RawInput) -> Recorded {
        self.inject_payload(&encode_raw_input(&input))
    }

    /// Returns `true` while a guard from [`InputSource::start`] is alive.
    pub fn is_capturing(&self) -> bool {
        self.recorder
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

impl InputSource for MockInputSource {
    fn name(&self) -> &'static str {
        "mock"
    }

    fn start(&self, recorder: InputRecorder) -> Result<CaptureGuard, CaptureError> {
        if self.fail_with_registration_error {
            return Err(CaptureError::RegistrationFailed(
                "mock source configured to fail".to_string(),
            ));
        }

        let mut slot = self.recorder.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.is_some() {
            return Err(CaptureError::AlreadyStarted);
        }
        *slot = Some(recorder);

        let shared = Arc::clone(&self.recorder);
        Ok(CaptureGuard::new(self.name(), move || {
            *shared.lock().unwrap_or_else(PoisonError::into_inner) = None;
        }))
    }
}
