//! The overlay source instance the host creates, updates, renders and
//! destroys.
//!
//! [`OverlaySource`] owns both execution contexts' shared state: the capture
//! subscription feeding the event channel, and the timeline only the render
//! context touches.  Each [`OverlaySource::render`] drains pending events into
//! the timeline before drawing, so the timeline never needs a lock.

use std::sync::mpsc::Receiver;
use std::sync::{Arc, PoisonError, RwLock};

use keyline_core::{
    Applied, Clock, OverlaySettings, Row, RowBindings, Timeline, TimelineEvent,
};
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

use super::schema::{settings_schema, PropertyDescriptor};
use super::settings::{apply_host, HostSettings};
use crate::application::record_input::{
    event_channel, DiagnosticsSnapshot, InputDiagnostics, InputRecorder, EVENT_CHANNEL_CAPACITY,
};
use crate::application::render_timeline::{render_frame, DrawSurface, FrameStats};
use crate::infrastructure::input_capture::{CaptureGuard, InputSource};

/// One overlay instance.
pub struct OverlaySource {
    id: Uuid,
    settings: OverlaySettings,
    bindings: Arc<RwLock<RowBindings>>,
    diagnostics: Arc<InputDiagnostics>,
    events: Receiver<TimelineEvent>,
    recorder: InputRecorder,
    timeline: Timeline,
    clock: Arc<dyn Clock>,
    capture: Option<CaptureGuard>,
    frames: u64,
}

impl OverlaySource {
    /// Creates an instance from the host's settings table and starts capture.
    pub fn create(host: &dyn HostSettings, input: &dyn InputSource, clock: Arc<dyn Clock>) -> Self {
        let mut settings = OverlaySettings::default();
        apply_host(&mut settings, host);
        Self::with_settings(settings, input, clock)
    }

    /// Creates an instance from already resolved settings and starts capture.
    ///
    /// A capture failure is logged and the instance keeps working without
    /// input; the host still gets a drawable source.
    pub fn with_settings(
        mut settings: OverlaySettings,
        input: &dyn InputSource,
        clock: Arc<dyn Clock>,
    ) -> Self {
        settings.sanitize();
        let id = Uuid::new_v4();
        let bindings = Arc::new(RwLock::new(settings.bindings()));
        let diagnostics = Arc::new(InputDiagnostics::new());
        let (tx, events) = event_channel();
        let recorder = InputRecorder::new(
            Arc::clone(&bindings),
            Arc::clone(&diagnostics),
            tx,
            Arc::clone(&clock),
        );

        let capture = match input.start(recorder.clone()) {
            Ok(guard) => Some(guard),
            Err(e) => {
                warn!(%id, source = input.name(), "input capture unavailable: {e}");
                None
            }
        };

        info!(%id, width = settings.width, height = settings.height, "overlay source created");
        Self {
            id,
            settings,
            bindings,
            diagnostics,
            events,
            recorder,
            timeline: Timeline::new(),
            clock,
            capture,
            frames: 0,
        }
    }

    /// Re-reads the host's settings table.
    pub fn update(&mut self, host: &dyn HostSettings) {
        let mut settings = self.settings.clone();
        apply_host(&mut settings, host);
        self.apply_settings(settings);
    }

    /// Replaces the settings and publishes the new key bindings to capture.
    ///
    /// Events queued under the old bindings are applied first.  A row whose
    /// key changed while held has its open segment closed now, and held-key
    /// flags are cleared, so the first press of the new key starts a fresh
    /// segment.
    pub fn apply_settings(&mut self, mut settings: OverlaySettings) {
        settings.sanitize();
        let bindings = settings.bindings();
        let previous = std::mem::replace(
            &mut *self
                .bindings
                .write()
                .unwrap_or_else(PoisonError::into_inner),
            bindings,
        );
        self.drain_events();

        let now_ms = self.clock.now_ms();
        for row in Row::ALL {
            if previous.key(row) != bindings.key(row)
                && self.timeline.close_latest_open(row, now_ms)
            {
                debug!(id = %self.id, ?row, "closed held segment of rebound row");
            }
        }
        self.diagnostics.reset_key_flags();
        debug!(id = %self.id, keys = ?bindings.keys(), "overlay settings updated");
        self.settings = settings;
    }

    pub fn width(&self) -> u32 {
        self.settings.width
    }

    /// Output height; follows the visible rows when dynamic height is on.
    pub fn height(&self) -> u32 {
        self.settings.output_height()
    }

    /// Applies at most one channel's worth of pending events to the timeline.
    pub fn drain_events(&mut self) -> usize {
        let mut applied = 0;
        for event in self.events.try_iter().take(EVENT_CHANNEL_CAPACITY) {
            if let Applied::RepeatIgnored = self.timeline.apply(event) {
                trace!(id = %self.id, ?event, "press on held row ignored");
            }
            applied += 1;
        }
        applied
    }

    /// Draws one frame.
    ///
    /// Returns `None` without touching the timeline when the surface is not
    /// ready.
    pub fn render(&mut self, surface: &mut dyn DrawSurface) -> Option<FrameStats> {
        if !surface.is_ready() {
            return None;
        }
        let events_applied = self.drain_events();
        let now_ms = self.clock.now_ms();
        let mut stats = render_frame(surface, &mut self.timeline, &self.settings, now_ms)?;
        stats.events_applied = events_applied;
        self.frames += 1;
        trace!(id = %self.id, frame = self.frames, ?stats, "frame rendered");
        Some(stats)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn settings(&self) -> &OverlaySettings {
        &self.settings
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn diagnostics(&self) -> DiagnosticsSnapshot {
        self.diagnostics.snapshot()
    }

    /// The capture-side recorder, for sources driven by the embedding host.
    pub fn recorder(&self) -> &InputRecorder {
        &self.recorder
    }

    pub fn is_capturing(&self) -> bool {
        self.capture.is_some()
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// The settings schema titled for the current keys and locale.
    pub fn properties(&self) -> Vec<PropertyDescriptor> {
        settings_schema(self.settings.locale, &self.settings)
    }
}

impl Drop for OverlaySource {
    fn drop(&mut self) {
        // Stop capture before the channel receiver goes away.
        self.capture.take();
        info!(id = %self.id, frames = self.frames, "overlay source destroyed");
    }
}
