//! Moving time window: maps absolute timestamps onto the horizontal timeline.
//!
//! The window always ends at "now" and spans [`WINDOW_MS`] milliseconds.  The
//! oldest visible instant maps to the left edge of the timeline region and
//! "now" maps to the right edge.

use super::clock::Millis;

/// Duration of the visible window.
pub const WINDOW_MS: Millis = 5_000;

/// Spacing of grid lines and axis ticks.
pub const TICK_MS: Millis = 1_000;

/// A fixed-duration window ending at a given instant, bound to a pixel span.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeWindow {
    pub start_ms: Millis,
    pub end_ms: Millis,
    /// Left edge of the timeline region.
    pub x0: f32,
    /// Width of the timeline region.
    pub width: f32,
}

impl TimeWindow {
    /// Window of `duration_ms` ending at `now_ms`.
    pub fn ending_at(now_ms: Millis, duration_ms: Millis, x0: f32, width: f32) -> Self {
        Self {
            start_ms: now_ms - duration_ms,
            end_ms: now_ms,
            x0,
            width,
        }
    }

    pub fn duration_ms(&self) -> Millis {
        self.end_ms - self.start_ms
    }

    /// Right edge of the timeline region.
    pub fn x1(&self) -> f32 {
        self.x0 + self.width
    }

    /// Maps `t` linearly onto the timeline.
    ///
    /// Instants outside the window map outside `[x0, x1]`; callers clamp with
    /// [`TimeWindow::x_of_clamped`] before using the value as bar geometry.  A
    /// degenerate window (duration <= 0) maps everything to `x0`.
    pub fn x_of(&self, t: Millis) -> f32 {
        let denom = self.duration_ms() as f64;
        if denom <= 0.0 {
            return self.x0;
        }
        let u = (t - self.start_ms) as f64 / denom;
        self.x0 + (u * self.width as f64) as f32
    }

    /// Like [`TimeWindow::x_of`] but clamped to the timeline region.
    pub fn x_of_clamped(&self, t: Millis) -> f32 {
        self.x_of(t).clamp(self.x0, self.x1().max(self.x0))
    }

    /// Returns `true` if `t` lies within `[start, end]`.
    pub fn contains(&self, t: Millis) -> bool {
        t >= self.start_ms && t <= self.end_ms
    }

    /// Returns `true` if the interval `[start, end]` intersects the window.
    pub fn overlaps(&self, start_ms: Millis, end_ms: Millis) -> bool {
        end_ms >= self.start_ms && start_ms <= self.end_ms
    }

    /// Horizontal positions of the whole-second ticks, left to right.
    ///
    /// Tick `i` sits `i * TICK_MS` after the window start.
    pub fn tick_positions(&self) -> impl Iterator<Item = (usize, f32)> + '_ {
        let count = if self.duration_ms() > 0 {
            (self.duration_ms() / TICK_MS) as usize + 1
        } else {
            1
        };
        (0..count).map(move |i| {
            let offset = i as f64 * TICK_MS as f64;
            let span = self.duration_ms().max(1) as f64;
            (i, self.x0 + ((offset / span) * self.width as f64) as f32)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window() -> TimeWindow {
        TimeWindow::ending_at(10_000, WINDOW_MS, 100.0, 1000.0)
    }

    #[test]
    fn test_window_start_maps_to_left_edge() {
        assert_eq!(window().x_of(5_000), 100.0);
    }

    #[test]
    fn test_now_maps_to_right_edge() {
        assert_eq!(window().x_of(10_000), 1100.0);
    }

    #[test]
    fn test_before_window_maps_outside_left_edge() {
        let w = window();
        assert!(w.x_of(4_999) < w.x0);
        assert_eq!(w.x_of_clamped(4_999), w.x0);
    }

    #[test]
    fn test_midpoint_maps_to_center() {
        assert_eq!(window().x_of(7_500), 600.0);
    }

    #[test]
    fn test_degenerate_window_maps_everything_to_x0() {
        let w = TimeWindow::ending_at(10_000, 0, 40.0, 500.0);
        assert_eq!(w.x_of(0), 40.0);
        assert_eq!(w.x_of(10_000), 40.0);
        assert_eq!(w.x_of(99_999), 40.0);
    }

    #[test]
    fn test_contains_and_overlaps() {
        let w = window();
        assert!(w.contains(5_000));
        assert!(w.contains(10_000));
        assert!(!w.contains(4_999));
        assert!(!w.contains(10_001));

        assert!(w.overlaps(0, 5_000));
        assert!(w.overlaps(9_000, 20_000));
        assert!(!w.overlaps(0, 4_999));
    }

    #[test]
    fn test_tick_positions_cover_zero_to_five_seconds() {
        let ticks: Vec<_> = window().tick_positions().collect();

        assert_eq!(ticks.len(), 6);
        assert_eq!(ticks[0], (0, 100.0));
        assert_eq!(ticks[5], (5, 1100.0));
        assert_eq!(ticks[1].1, 300.0);
    }
}
