//! InputRecorder: turns raw capture payloads into timeline events.
//!
//! This use case runs on the capture context, inside the OS callback.  It
//! decodes the payload, resolves keys to rows through the current bindings
//! snapshot, updates the lock-free [`InputDiagnostics`], and hands the
//! resulting [`TimelineEvent`] to the render context through a bounded
//! channel.  It never blocks: a full channel drops the event and bumps a
//! counter.
//!
//! # Architecture
//!
//! ```text
//!  OS callback ──► InputRecorder::handle_payload
//!                      ├─ decode_raw_input        (rejects malformed payloads)
//!                      ├─ RowBindings snapshot    (Arc<RwLock<_>>)
//!                      ├─ InputDiagnostics        (relaxed atomics)
//!                      └─ SyncSender::try_send ──► render context drains per frame
//! ```

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicI64, AtomicU64, Ordering};
use std::sync::mpsc::{self, Receiver, SyncSender, TrySendError};
use std::sync::{Arc, PoisonError, RwLock};

use keyline_core::{
    decode_raw_input,
    protocol::raw_input::{KeyboardReport, MouseReport},
    Clock, MouseButton, RawInput, RawInputError, RowBindings, TimelineEvent, ROW_COUNT,
};
use serde::Serialize;
use tracing::trace;

/// Capacity of the capture-to-render event channel.
pub const EVENT_CHANNEL_CAPACITY: usize = 4096;

/// Creates the bounded channel that carries events to the render context.
pub fn event_channel() -> (SyncSender<TimelineEvent>, Receiver<TimelineEvent>) {
    mpsc::sync_channel(EVENT_CHANNEL_CAPACITY)
}

const MOUSE_BUTTON_COUNT: usize = 3;

fn button_index(button: MouseButton) -> usize {
    match button {
        MouseButton::Primary => 0,
        MouseButton::Secondary => 1,
        MouseButton::Middle => 2,
    }
}

/// Scalar input state shared between the capture and render contexts.
///
/// Every field is a relaxed atomic; readers only need eventual consistency.
#[derive(Debug, Default)]
pub struct InputDiagnostics {
    key_down: [AtomicBool; ROW_COUNT],
    mouse_down: [AtomicBool; MOUSE_BUTTON_COUNT],
    last_dx: AtomicI32,
    last_dy: AtomicI32,
    total_dx: AtomicI64,
    total_dy: AtomicI64,
    key_events: AtomicU64,
    mouse_events: AtomicU64,
    ignored_repeats: AtomicU64,
    rejected_payloads: AtomicU64,
    dropped_events: AtomicU64,
}

/// Point-in-time copy of [`InputDiagnostics`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DiagnosticsSnapshot {
    pub key_down: [bool; ROW_COUNT],
    pub mouse_down: [bool; MOUSE_BUTTON_COUNT],
    pub last_motion: (i32, i32),
    pub total_motion: (i64, i64),
    pub key_events: u64,
    pub mouse_events: u64,
    pub ignored_repeats: u64,
    pub rejected_payloads: u64,
    pub dropped_events: u64,
}

impl InputDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if the key bound to `row_index` is currently held.
    pub fn is_key_down(&self, row_index: usize) -> bool {
        self.key_down
            .get(row_index)
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    pub fn is_button_down(&self, button: MouseButton) -> bool {
        self.mouse_down[button_index(button)].load(Ordering::Relaxed)
    }

    /// Clears every per-row down flag.  Called when the bindings change, since
    /// a flag set for the old key would otherwise never be cleared.
    pub fn reset_key_flags(&self) {
        for flag in &self.key_down {
            flag.store(false, Ordering::Relaxed);
        }
    }

    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        let load = |v: &AtomicU64| v.load(Ordering::Relaxed);
        DiagnosticsSnapshot {
            key_down: std::array::from_fn(|i| self.key_down[i].load(Ordering::Relaxed)),
            mouse_down: std::array::from_fn(|i| self.mouse_down[i].load(Ordering::Relaxed)),
            last_motion: (
                self.last_dx.load(Ordering::Relaxed),
                self.last_dy.load(Ordering::Relaxed),
            ),
            total_motion: (
                self.total_dx.load(Ordering::Relaxed),
                self.total_dy.load(Ordering::Relaxed),
            ),
            key_events: load(&self.key_events),
            mouse_events: load(&self.mouse_events),
            ignored_repeats: load(&self.ignored_repeats),
            rejected_payloads: load(&self.rejected_payloads),
            dropped_events: load(&self.dropped_events),
        }
    }

    /// Sets the down flag for `row_index` and returns its previous value.
    fn swap_key_down(&self, row_index: usize, down: bool) -> bool {
        self.key_down[row_index].swap(down, Ordering::Relaxed)
    }

    fn record_motion(&self, dx: i32, dy: i32) {
        self.last_dx.store(dx, Ordering::Relaxed);
        self.last_dy.store(dy, Ordering::Relaxed);
        self.total_dx.fetch_add(i64::from(dx), Ordering::Relaxed);
        self.total_dy.fetch_add(i64::from(dy), Ordering::Relaxed);
    }
}

/// What happened to one raw payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Recorded {
    /// A timeline event was queued for the render context.
    Queued(TimelineEvent),
    /// A timeline event was produced but the channel was full or closed.
    Dropped(TimelineEvent),
    /// The payload was valid but carries nothing for the timeline
    /// (unbound key, repeat, button release, motion, other devices).
    Ignored,
    /// The payload failed validation.
    Rejected(RawInputError),
}

/// The capture-side use case.
///
/// Cheap to clone; every clone feeds the same channel and diagnostics.
#[derive(Clone)]
pub struct InputRecorder {
    bindings: Arc<RwLock<RowBindings>>,
    diagnostics: Arc<InputDiagnostics>,
    events: SyncSender<TimelineEvent>,
    clock: Arc<dyn Clock>,
}

impl InputRecorder {
    /// Creates a new recorder.
    pub fn new(
        bindings: Arc<RwLock<RowBindings>>,
        diagnostics: Arc<InputDiagnostics>,
        events: SyncSender<TimelineEvent>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            bindings,
            diagnostics,
            events,
            clock,
        }
    }

    /// Handles one raw payload exactly as delivered by the OS.
    ///
    /// Malformed payloads are counted and discarded; nothing is propagated.
    pub fn handle_payload(&self, bytes: &[u8]) -> Recorded {
        match decode_raw_input(bytes) {
            Ok(input) => self.handle(input),
            Err(e) => self.reject(e),
        }
    }

    /// Counts a payload the capture boundary refused before decoding, such
    /// as one whose reported size is already over the limit.
    pub fn reject(&self, error: RawInputError) -> Recorded {
        self.diagnostics
            .rejected_payloads
            .fetch_add(1, Ordering::Relaxed);
        trace!("discarding raw input payload: {error}");
        Recorded::Rejected(error)
    }

    /// Handles an already decoded report.
    pub fn handle(&self, input: RawInput) -> Recorded {
        match input {
            RawInput::Keyboard(report) => self.handle_keyboard(report),
            RawInput::Mouse(report) => self.handle_mouse(report),
            RawInput::Hid => Recorded::Ignored,
        }
    }

    pub fn diagnostics(&self) -> &Arc<InputDiagnostics> {
        &self.diagnostics
    }

    // ── Private helpers ───────────────────────────────────────────────────────

    fn handle_keyboard(&self, report: KeyboardReport) -> Recorded {
        self.diagnostics.key_events.fetch_add(1, Ordering::Relaxed);

        // Copy the snapshot out so the read lock is held for one lookup only.
        let bindings = *self
            .bindings
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let Some(row) = bindings.row_for_key(report.vkey) else {
            return Recorded::Ignored;
        };

        let at_ms = self.clock.now_ms();
        if report.is_break() {
            self.diagnostics.swap_key_down(row.index(), false);
            return self.enqueue(TimelineEvent::KeyUp { row, at_ms });
        }

        if self.diagnostics.swap_key_down(row.index(), true) {
            self.diagnostics
                .ignored_repeats
                .fetch_add(1, Ordering::Relaxed);
            return Recorded::Ignored;
        }
        self.enqueue(TimelineEvent::KeyDown { row, at_ms })
    }

    fn handle_mouse(&self, report: MouseReport) -> Recorded {
        self.diagnostics.mouse_events.fetch_add(1, Ordering::Relaxed);
        if report.last_x != 0 || report.last_y != 0 {
            self.diagnostics.record_motion(report.last_x, report.last_y);
        }

        let mut clicked = false;
        for (button, pressed) in report.button_transitions() {
            self.diagnostics.mouse_down[button_index(button)].store(pressed, Ordering::Relaxed);
            clicked |= button == MouseButton::Primary && pressed;
        }

        if clicked {
            let at_ms = self.clock.now_ms();
            self.enqueue(TimelineEvent::Click { at_ms })
        } else {
            Recorded::Ignored
        }
    }

    fn enqueue(&self, event: TimelineEvent) -> Recorded {
        match self.events.try_send(event) {
            Ok(()) => Recorded::Queued(event),
            Err(TrySendError::Full(event)) | Err(TrySendError::Disconnected(event)) => {
                self.diagnostics
                    .dropped_events
                    .fetch_add(1, Ordering::Relaxed);
                trace!(?event, "event channel unavailable; dropping event");
                Recorded::Dropped(event)
            }
        }
    }
}
