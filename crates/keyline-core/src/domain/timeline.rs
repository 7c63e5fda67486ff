//! Timeline state: key-press segments, click events, and the last-key cursor.
//!
//! The timeline converts a stream of normalized [`TimelineEvent`]s into:
//!
//! - **Key segments** – one press-to-release interval per row.  At most one
//!   segment per row is open (still held down) at any time; repeated press
//!   events while a row is held are ignored.
//! - **Click events** – one per primary-button press, attributed to the most
//!   recently pressed row together with the reaction time since that press.
//!
//! # Row state machine
//!
//! ```text
//!            press                     release
//!   Idle ───────────► Pressed ───────────────► Idle
//!                      │  ▲
//!                      └──┘ press (repeat, ignored)
//! ```
//!
//! # Retention
//!
//! Both sequences are append-ordered and evicted from the front only
//! ([`Timeline::evict_before`]).  A segment that is still open is never
//! evicted, so eviction stops at the first open segment even if closed
//! segments behind it are already stale.
//!
//! # Open-segment index
//!
//! Each row remembers the absolute id of its open segment.  Ids count every
//! segment ever appended, and `evicted` counts how many were popped from the
//! front, so `id - evicted` is the current position in the deque.  Open
//! segments are never evicted, which keeps every stored id valid.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::trace;

use super::clock::Millis;
use super::row::{Row, FALLBACK_ROW, ROW_COUNT};

/// How long history is kept, relative to "now".
pub const RETENTION_MS: Millis = 30_000;

/// One press-to-release interval for a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySegment {
    pub row: Row,
    pub start_ms: Millis,
    /// `None` while the key is still held down.
    pub end_ms: Option<Millis>,
}

impl KeySegment {
    /// Returns `true` while the key is still held down.
    pub fn is_open(&self) -> bool {
        self.end_ms.is_none()
    }

    /// End timestamp, or `now_ms` for a segment that is still open.
    pub fn effective_end(&self, now_ms: Millis) -> Millis {
        self.end_ms.unwrap_or(now_ms)
    }
}

/// A primary mouse-button press annotated with the reaction time since the
/// last novel key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickEvent {
    /// Row of the last pressed key, or [`FALLBACK_ROW`] if none.
    pub row: Row,
    pub time_ms: Millis,
    /// `max(0, time_ms - last_key_down_ms)`; zero when no key was ever pressed.
    pub delta_ms: Millis,
}

/// The most recent novel key press across all rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyCursor {
    last: Option<(Row, Millis)>,
}

impl KeyCursor {
    /// Returns `false` until the first press ever occurs.
    pub fn is_valid(&self) -> bool {
        self.last.is_some()
    }

    /// Row of the last novel press.
    pub fn row(&self) -> Option<Row> {
        self.last.map(|(row, _)| row)
    }

    /// Timestamp of the last novel press.
    pub fn pressed_at(&self) -> Option<Millis> {
        self.last.map(|(_, t)| t)
    }

    /// Row and delta for a click at `time_ms`.
    pub fn attribute(&self, time_ms: Millis) -> (Row, Millis) {
        match self.last {
            Some((row, pressed_at)) => (row, (time_ms - pressed_at).max(0)),
            None => (FALLBACK_ROW, 0),
        }
    }

    fn record(&mut self, row: Row, time_ms: Millis) {
        self.last = Some((row, time_ms));
    }
}

/// A normalized input transition, produced by the capture context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineEvent {
    /// A monitored key went down (including OS auto-repeat).
    KeyDown { row: Row, at_ms: Millis },
    /// A monitored key was released.
    KeyUp { row: Row, at_ms: Millis },
    /// The primary mouse button went down.
    Click { at_ms: Millis },
}

/// Outcome of applying one [`TimelineEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// A new open segment was created and the cursor moved.
    SegmentOpened,
    /// The press repeated an already-held row and was ignored.
    RepeatIgnored,
    /// An open segment was closed.
    SegmentClosed,
    /// The release had no matching open segment.
    NoOpenSegment,
    /// A click event was appended.
    ClickRecorded(ClickEvent),
}

/// Bounded rolling history of segments and clicks plus the last-key cursor.
#[derive(Debug, Default)]
pub struct Timeline {
    segments: VecDeque<KeySegment>,
    clicks: VecDeque<ClickEvent>,
    cursor: KeyCursor,
    open: [Option<u64>; ROW_COUNT],
    evicted: u64,
}

impl Timeline {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one normalized event.
    pub fn apply(&mut self, event: TimelineEvent) -> Applied {
        match event {
            TimelineEvent::KeyDown { row, at_ms } => {
                if self.press(row, at_ms) {
                    Applied::SegmentOpened
                } else {
                    Applied::RepeatIgnored
                }
            }
            TimelineEvent::KeyUp { row, at_ms } => {
                if self.close_latest_open(row, at_ms) {
                    Applied::SegmentClosed
                } else {
                    Applied::NoOpenSegment
                }
            }
            TimelineEvent::Click { at_ms } => Applied::ClickRecorded(self.click(at_ms)),
        }
    }

    /// Handles a press: opens a segment and moves the cursor, unless the row is
    /// already held, in which case nothing changes.
    ///
    /// Returns `true` when the press was novel.
    pub fn press(&mut self, row: Row, at_ms: Millis) -> bool {
        if !self.append_segment_open(row, at_ms) {
            return false;
        }
        self.cursor.record(row, at_ms);
        true
    }

    /// Handles a primary click: attributes it via the cursor and appends it.
    pub fn click(&mut self, at_ms: Millis) -> ClickEvent {
        let (row, delta_ms) = self.cursor.attribute(at_ms);
        self.append_click(row, at_ms, delta_ms)
    }

    /// Appends an open segment for `row` unless one is already open.
    ///
    /// Returns `false` if the row already had an open segment.  Does not touch
    /// the cursor.
    pub fn append_segment_open(&mut self, row: Row, at_ms: Millis) -> bool {
        if self.open[row.index()].is_some() {
            return false;
        }
        let id = self.evicted + self.segments.len() as u64;
        self.segments.push_back(KeySegment {
            row,
            start_ms: at_ms,
            end_ms: None,
        });
        self.open[row.index()] = Some(id);
        true
    }

    /// Closes the open segment for `row` at `at_ms`.
    ///
    /// Returns `false` if the row had no open segment.
    pub fn close_latest_open(&mut self, row: Row, at_ms: Millis) -> bool {
        let Some(id) = self.open[row.index()].take() else {
            return false;
        };
        let pos = (id - self.evicted) as usize;
        match self.segments.get_mut(pos) {
            Some(segment) => {
                segment.end_ms = Some(at_ms.max(segment.start_ms));
                true
            }
            None => false,
        }
    }

    /// Appends a click event as given.
    pub fn append_click(&mut self, row: Row, at_ms: Millis, delta_ms: Millis) -> ClickEvent {
        let click = ClickEvent {
            row,
            time_ms: at_ms,
            delta_ms: delta_ms.max(0),
        };
        self.clicks.push_back(click);
        click
    }

    /// Drops history older than `horizon_ms` from the front of both sequences.
    ///
    /// Clicks go while their timestamp is before the horizon.  Segments go
    /// while they are closed and their end is before the horizon; the first
    /// open segment stops eviction.
    ///
    /// Returns `(segments_evicted, clicks_evicted)`.
    pub fn evict_before(&mut self, horizon_ms: Millis) -> (usize, usize) {
        let mut clicks_evicted = 0;
        while self
            .clicks
            .front()
            .is_some_and(|c| c.time_ms < horizon_ms)
        {
            self.clicks.pop_front();
            clicks_evicted += 1;
        }

        let mut segments_evicted = 0;
        while self
            .segments
            .front()
            .is_some_and(|s| s.end_ms.is_some_and(|end| end < horizon_ms))
        {
            self.segments.pop_front();
            self.evicted += 1;
            segments_evicted += 1;
        }

        (segments_evicted, clicks_evicted)
    }

    /// Applies the retention policy relative to `now_ms`.
    pub fn curate(&mut self, now_ms: Millis) -> (usize, usize) {
        let (segments, clicks) = self.evict_before(now_ms - RETENTION_MS);
        if segments + clicks > 0 {
            trace!(segments, clicks, "evicted expired history");
        }
        (segments, clicks)
    }

    /// Segments in creation order.
    pub fn segments(&self) -> impl Iterator<Item = &KeySegment> {
        self.segments.iter()
    }

    /// Clicks in creation order.
    pub fn clicks(&self) -> impl Iterator<Item = &ClickEvent> {
        self.clicks.iter()
    }

    /// The open segment for `row`, if the row is held.
    pub fn open_segment(&self, row: Row) -> Option<&KeySegment> {
        let id = self.open[row.index()]?;
        self.segments.get((id - self.evicted) as usize)
    }

    pub fn cursor(&self) -> &KeyCursor {
        &self.cursor
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn click_count(&self) -> usize {
        self.clicks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty() && self.clicks.is_empty()
    }
}
