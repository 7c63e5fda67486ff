//! Render pass: draws one frame of the timeline onto a [`DrawSurface`].
//!
//! Draw order, back to front:
//!
//! 1. background fill
//! 2. vertical grid lines at each whole second
//! 3. row labels
//! 4. key-interval bars
//! 5. click markers with their delta labels
//! 6. time axis, tick marks and the `0S`..`5S` labels
//!
//! After drawing, history older than the retention horizon is curated.
//! Everything is expressed as filled rectangles, so the only thing a host
//! has to provide is [`DrawSurface::fill_rect`].

use keyline_core::{
    domain::layout::{AXIS_OFFSET, AXIS_THICKNESS, BOTTOM_PAD, LABEL_X, LEFT_PAD, RIGHT_PAD, TOP_PAD},
    glyph::{layout_text, text_height},
    keymap::key_label,
    Millis, OverlaySettings, Rgba, RowLayout, TimeWindow, Timeline, WINDOW_MS,
};
use serde::Serialize;

/// Fraction of the row slot height used by a key bar.
const BAR_HEIGHT_RATIO: f32 = 0.297_562_5;
const BAR_ALPHA: f32 = 0.95;
const CLICK_ALPHA: f32 = 0.90;
const LABEL_ALPHA: f32 = 0.92;

const GRID_WIDTH: f32 = 2.0;
/// Grid lines start this far above the first row.
const GRID_OVERHANG: f32 = 6.0;
const TICK_WIDTH: f32 = 2.0;
const TICK_HEIGHT: f32 = 12.0;
const TICK_LABEL_SCALE: f32 = 2.28;
const CLICK_LINE_WIDTH: f32 = 2.0;
const CLICK_LABEL_SCALE: f32 = 3.0;
const MIN_BAR: f32 = 2.0;

/// The drawing primitive supplied by the host.
#[cfg_attr(test, mockall::automock)]
pub trait DrawSurface {
    /// `false` while the host's drawing resources are unavailable.
    fn is_ready(&self) -> bool;

    /// Fills an axis-aligned rectangle in overlay-local coordinates.
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba);
}

/// One recorded rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FilledRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub color: Rgba,
}

/// A [`DrawSurface`] that records every rectangle.
///
/// Used by the preview binary and by tests.
#[derive(Debug, Clone, Default)]
pub struct DrawList {
    rects: Vec<FilledRect>,
    unavailable: bool,
}

impl DrawList {
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface whose drawing resources are missing.
    pub fn unavailable() -> Self {
        Self {
            rects: Vec::new(),
            unavailable: true,
        }
    }

    pub fn rects(&self) -> &[FilledRect] {
        &self.rects
    }

    pub fn clear(&mut self) {
        self.rects.clear();
    }
}

impl DrawSurface for DrawList {
    fn is_ready(&self) -> bool {
        !self.unavailable
    }

    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        self.rects.push(FilledRect { x, y, w, h, color });
    }
}

/// Counters for one rendered frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FrameStats {
    pub rects: usize,
    pub bars: usize,
    pub clicks: usize,
    pub segments_evicted: usize,
    pub clicks_evicted: usize,
    /// Events drained from the capture channel before drawing.
    pub events_applied: usize,
}

/// Overlay geometry derived from the settings for one frame.
#[derive(Debug, Clone, Copy)]
pub struct FrameGeometry {
    pub width: f32,
    pub height: f32,
    pub rows: RowLayout,
    pub timeline_x0: f32,
    pub timeline_width: f32,
    /// Top of the time axis.
    pub axis_y: f32,
}

impl FrameGeometry {
    pub fn new(settings: &OverlaySettings) -> Self {
        let rows = settings.row_layout();
        let width = settings.width as f32;
        let height = if settings.dynamic_height {
            rows.visible_height()
        } else {
            settings.height as f32
        };
        Self {
            width,
            height,
            rows,
            timeline_x0: LEFT_PAD,
            timeline_width: (width - RIGHT_PAD - LEFT_PAD).max(0.0),
            axis_y: height - BOTTOM_PAD + AXIS_OFFSET,
        }
    }

    /// Bottom of the time axis; click lines and grid lines end here.
    pub fn axis_bottom(&self) -> f32 {
        self.axis_y + AXIS_THICKNESS
    }

    /// `false` when the overlay is too narrow to leave any room for the
    /// timeline between the label column and the right pad.
    pub fn has_timeline(&self) -> bool {
        self.timeline_width > 0.0
    }

    pub fn window(&self, now_ms: Millis) -> TimeWindow {
        TimeWindow::ending_at(now_ms, WINDOW_MS, self.timeline_x0, self.timeline_width)
    }
}

/// Counts rectangles as they go to the surface.
struct Painter<'a> {
    surface: &'a mut dyn DrawSurface,
    rects: usize,
}

impl Painter<'_> {
    fn rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba) {
        self.surface.fill_rect(x, y, w, h, color);
        self.rects += 1;
    }

    fn text(&mut self, x: f32, y: f32, text: &str, scale: f32, color: Rgba) {
        for cell in layout_text(x, y, text, scale) {
            self.rect(cell.x, cell.y, cell.size, cell.size, color);
        }
    }
}

fn label_scale(label: &str) -> f32 {
    match label.chars().count() {
        n if n > 16 => 2.0 * 0.85,
        n if n > 10 => 3.0 * 0.85,
        _ => 4.0 * 0.85,
    }
}

/// Draws one frame and then curates the timeline.
///
/// Returns `None` without touching the timeline when the surface is not
/// ready, so a missing resource costs nothing and the next frame retries.
pub fn render_frame(
    surface: &mut dyn DrawSurface,
    timeline: &mut Timeline,
    settings: &OverlaySettings,
    now_ms: Millis,
) -> Option<FrameStats> {
    if !surface.is_ready() {
        return None;
    }

    let geo = FrameGeometry::new(settings);
    let window = geo.window(now_ms);
    let mut stats = FrameStats::default();
    let mut p = Painter { surface, rects: 0 };

    p.rect(0.0, 0.0, geo.width, geo.height, settings.background());

    // Grid
    let grid_top = TOP_PAD - GRID_OVERHANG;
    let grid_h = (geo.axis_bottom() - grid_top).max(GRID_WIDTH);
    if geo.has_timeline() {
        for (_, x) in window.tick_positions() {
            p.rect(x, grid_top, GRID_WIDTH, grid_h, Rgba::GRID);
        }
    }

    // Row labels
    let row_h = geo.rows.row_height;
    let label_color = Rgba::WHITE.with_alpha(LABEL_ALPHA);
    for (row, y) in geo.rows.slots() {
        let label = key_label(settings.row(row).key);
        let scale = label_scale(&label);
        let top = y + row_h * 0.5 - text_height(scale) * 0.5;
        p.text(LABEL_X, top, &label, scale, label_color);
    }

    // Key bars
    let bar_h = (row_h * BAR_HEIGHT_RATIO).round().max(MIN_BAR);
    let bar_offset = ((row_h - bar_h) * 0.5).round();
    for segment in timeline.segments().filter(|_| geo.has_timeline()) {
        let Some(row_y) = geo.rows.row_y(segment.row) else {
            continue;
        };
        let end = segment.effective_end(now_ms);
        if !window.overlaps(segment.start_ms, end) {
            continue;
        }
        let x0 = window.x_of_clamped(segment.start_ms);
        let x1 = window.x_of_clamped(end);
        p.rect(
            x0,
            row_y + bar_offset,
            (x1 - x0).max(MIN_BAR),
            bar_h,
            settings.row_color(segment.row, BAR_ALPHA),
        );
        stats.bars += 1;
    }

    // Click markers
    for click in timeline.clicks().filter(|_| geo.has_timeline()) {
        let Some(row_y) = geo.rows.row_y(click.row) else {
            continue;
        };
        if !window.contains(click.time_ms) {
            continue;
        }
        let x = window.x_of(click.time_ms);
        let color = settings.row_color(click.row, CLICK_ALPHA);
        let h = (geo.axis_bottom() - row_y).max(CLICK_LINE_WIDTH);
        p.rect(x, row_y, CLICK_LINE_WIDTH, h, color);
        p.text(
            x + 6.0,
            row_y - 6.0 + 0.1,
            &click.delta_ms.to_string(),
            CLICK_LABEL_SCALE,
            color,
        );
        stats.clicks += 1;
    }

    // Axis, ticks and tick labels
    p.rect(
        geo.timeline_x0,
        geo.axis_y,
        geo.timeline_width,
        AXIS_THICKNESS,
        Rgba::GRID,
    );
    for (i, x) in window.tick_positions().filter(|_| geo.has_timeline()) {
        p.rect(x, geo.axis_y, TICK_WIDTH, TICK_HEIGHT, Rgba::GRID);
        p.text(
            x - 10.0,
            geo.axis_y + 10.0,
            &format!("{i}S"),
            TICK_LABEL_SCALE,
            Rgba::GRID,
        );
    }

    stats.rects = p.rects;
    let (segments_evicted, clicks_evicted) = timeline.curate(now_ms);
    stats.segments_evicted = segments_evicted;
    stats.clicks_evicted = clicks_evicted;
    Some(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyline_core::{glyph, Row, TimelineEvent, RETENTION_MS};

    const NOW: Millis = 10_000;

    fn settings() -> OverlaySettings {
        OverlaySettings::default()
    }

    fn rects_with_color(list: &DrawList, color: Rgba) -> Vec<FilledRect> {
        list.rects()
            .iter()
            .copied()
            .filter(|r| r.color == color)
            .collect()
    }

    // ── Geometry ──────────────────────────────────────────────────────────────

    #[test]
    fn test_default_geometry_matches_overlay_constants() {
        let geo = FrameGeometry::new(&settings());

        assert_eq!(geo.width, 1500.0);
        assert_eq!(geo.height, 517.0);
        assert_eq!(geo.rows.row_height, 96.0);
        assert_eq!(geo.timeline_x0, 91.0);
        assert_eq!(geo.timeline_width, 1500.0 - 20.0 - 91.0);
        assert_eq!(geo.axis_y, 517.0 - 55.0 + 22.0);
    }

    #[test]
    fn test_fixed_height_uses_configured_height() {
        let s = OverlaySettings {
            dynamic_height: false,
            ..settings()
        };

        assert_eq!(FrameGeometry::new(&s).height, 520.0);
    }

    // ── Surface readiness ─────────────────────────────────────────────────────

    #[test]
    fn test_unready_surface_is_a_no_op() {
        // Arrange
        let mut surface = MockDrawSurface::new();
        surface.expect_is_ready().times(1).return_const(false);
        surface.expect_fill_rect().never();
        let mut timeline = Timeline::new();
        timeline.apply(TimelineEvent::Click { at_ms: 0 });

        // Act
        let stats = render_frame(&mut surface, &mut timeline, &settings(), RETENTION_MS * 2);

        // Assert: nothing drawn and nothing evicted
        assert!(stats.is_none());
        assert_eq!(timeline.click_count(), 1);
    }

    #[test]
    fn test_mock_surface_receives_every_rectangle() {
        // Arrange: record the frame once to learn how many rectangles it has
        let s = settings();
        let mut timeline = Timeline::new();
        timeline.apply(TimelineEvent::KeyDown { row: Row::W, at_ms: 9_000 });
        let mut list = DrawList::new();
        let expected = render_frame(&mut list, &mut timeline, &s, NOW).unwrap().rects;

        let mut surface = MockDrawSurface::new();
        surface.expect_is_ready().return_const(true);
        surface
            .expect_fill_rect()
            .withf(|_, _, w, h, _| *w >= 0.0 && *h >= 0.0)
            .times(expected)
            .return_const(());

        // Act
        let stats = render_frame(&mut surface, &mut timeline, &s, NOW);

        // Assert
        assert_eq!(stats.map(|s| s.rects), Some(expected));
    }

    #[test]
    fn test_background_is_drawn_first() {
        let s = settings();
        let mut list = DrawList::new();

        render_frame(&mut list, &mut Timeline::new(), &s, NOW).unwrap();

        assert_eq!(
            list.rects()[0],
            FilledRect {
                x: 0.0,
                y: 0.0,
                w: 1500.0,
                h: 517.0,
                color: s.background()
            }
        );
    }

    // ── Empty frame ───────────────────────────────────────────────────────────

    #[test]
    fn test_empty_timeline_draws_grid_axis_and_labels_only() {
        let mut list = DrawList::new();

        let stats = render_frame(&mut list, &mut Timeline::new(), &settings(), NOW).unwrap();

        assert_eq!(stats.bars, 0);
        assert_eq!(stats.clicks, 0);
        assert_eq!(stats.rects, list.rects().len());
        // 6 grid lines + axis + 6 ticks, plus tick label cells
        let grid = rects_with_color(&list, Rgba::GRID);
        assert!(grid.len() > 13);
        let grid_lines: Vec<_> = grid.iter().filter(|r| r.w == 2.0 && r.h > 12.0).collect();
        assert_eq!(grid_lines.len(), 6);
        assert_eq!(grid_lines[0].x, 91.0);
        assert_eq!(grid_lines[0].y, 12.0);
    }

    #[test]
    fn test_row_labels_drawn_for_enabled_rows() {
        let mut s = settings();
        s.row_mut(Row::S).enabled = false;
        let mut list = DrawList::new();

        render_frame(&mut list, &mut Timeline::new(), &s, NOW).unwrap();

        let label_color = Rgba::WHITE.with_alpha(LABEL_ALPHA);
        let cells = rects_with_color(&list, label_color);
        // "W", "A", "D" at scale 3.4 (cell 3)
        let lit = |ch| {
            glyph::glyph(ch)
                .iter()
                .map(|b| b.count_ones() as usize)
                .sum::<usize>()
        };
        assert_eq!(cells.len(), lit('W') + lit('A') + lit('D'));
        assert!(cells.iter().all(|c| c.x >= LABEL_X && c.w == 3.0 && c.h == 3.0));
    }

    // ── Bars ──────────────────────────────────────────────────────────────────

    #[test]
    fn test_closed_segment_bar_geometry() {
        // Arrange: W held from 6 s to 8.5 s, rendered at 10 s
        let s = settings();
        let mut timeline = Timeline::new();
        timeline.apply(TimelineEvent::KeyDown { row: Row::W, at_ms: 6_000 });
        timeline.apply(TimelineEvent::KeyUp { row: Row::W, at_ms: 8_500 });
        let mut list = DrawList::new();

        // Act
        let stats = render_frame(&mut list, &mut timeline, &s, NOW).unwrap();

        // Assert
        assert_eq!(stats.bars, 1);
        let bar = rects_with_color(&list, s.row_color(Row::W, BAR_ALPHA))[0];
        let tw = 1500.0 - 20.0 - 91.0;
        assert!((bar.x - (91.0 + 0.2 * tw)).abs() < 1e-3);
        assert!((bar.w - 0.5 * tw).abs() < 1e-3);
        // rowH 96 -> bar height round(28.566) = 29, offset round(33.5) = 34
        assert_eq!(bar.h, 29.0);
        assert_eq!(bar.y, 18.0 + 34.0);
    }

    #[test]
    fn test_open_segment_extends_to_right_edge_and_is_clamped_left() {
        let s = settings();
        let mut timeline = Timeline::new();
        timeline.apply(TimelineEvent::KeyDown { row: Row::D, at_ms: 1_000 });
        let mut list = DrawList::new();

        render_frame(&mut list, &mut timeline, &s, NOW).unwrap();

        let bar = rects_with_color(&list, s.row_color(Row::D, BAR_ALPHA))[0];
        assert_eq!(bar.x, 91.0);
        assert_eq!(bar.x + bar.w, 1480.0);
    }

    #[test]
    fn test_out_of_window_and_disabled_rows_are_skipped() {
        // Arrange
        let mut s = settings();
        s.row_mut(Row::A).enabled = false;
        let mut timeline = Timeline::new();
        timeline.apply(TimelineEvent::KeyDown { row: Row::W, at_ms: 1_000 });
        timeline.apply(TimelineEvent::KeyUp { row: Row::W, at_ms: 2_000 });
        timeline.apply(TimelineEvent::KeyDown { row: Row::A, at_ms: 9_000 });
        let mut list = DrawList::new();

        // Act
        let stats = render_frame(&mut list, &mut timeline, &s, NOW).unwrap();

        // Assert
        assert_eq!(stats.bars, 0);
    }

    #[test]
    fn test_very_short_press_gets_minimum_width() {
        let s = settings();
        let mut timeline = Timeline::new();
        timeline.apply(TimelineEvent::KeyDown { row: Row::S, at_ms: 9_000 });
        timeline.apply(TimelineEvent::KeyUp { row: Row::S, at_ms: 9_000 });
        let mut list = DrawList::new();

        render_frame(&mut list, &mut timeline, &s, NOW).unwrap();

        let bar = rects_with_color(&list, s.row_color(Row::S, BAR_ALPHA))[0];
        assert_eq!(bar.w, MIN_BAR);
    }

    // ── Clicks ────────────────────────────────────────────────────────────────

    #[test]
    fn test_click_marker_spans_row_top_to_axis_with_delta_label() {
        // Arrange: press A at 8 s, click at 8.35 s
        let s = settings();
        let mut timeline = Timeline::new();
        timeline.apply(TimelineEvent::KeyDown { row: Row::A, at_ms: 8_000 });
        timeline.apply(TimelineEvent::Click { at_ms: 8_350 });
        let mut list = DrawList::new();

        // Act
        let stats = render_frame(&mut list, &mut timeline, &s, NOW).unwrap();

        // Assert
        assert_eq!(stats.clicks, 1);
        let color = s.row_color(Row::A, CLICK_ALPHA);
        let drawn = rects_with_color(&list, color);
        let geo = FrameGeometry::new(&s);
        let row_y = geo.rows.row_y(Row::A).unwrap();
        let line = drawn[0];
        assert_eq!(line.y, row_y);
        assert_eq!(line.w, 2.0);
        assert_eq!(line.y + line.h, geo.axis_bottom());
        let digits: usize = "350"
            .chars()
            .map(|ch| glyph::glyph(ch).iter().map(|b| b.count_ones() as usize).sum::<usize>())
            .sum();
        assert_eq!(drawn.len(), 1 + digits);
    }

    #[test]
    fn test_click_on_disabled_row_is_not_drawn() {
        let mut s = settings();
        s.row_mut(Row::D).enabled = false;
        let mut timeline = Timeline::new();
        timeline.apply(TimelineEvent::Click { at_ms: 9_000 });
        let mut list = DrawList::new();

        let stats = render_frame(&mut list, &mut timeline, &s, NOW).unwrap();

        assert_eq!(stats.clicks, 0);
    }

    // ── Degenerate layout ─────────────────────────────────────────────────────

    #[test]
    fn test_no_enabled_rows_still_draws_background_and_axis() {
        let mut s = settings();
        for row in Row::ALL {
            s.row_mut(row).enabled = false;
        }
        let mut timeline = Timeline::new();
        timeline.apply(TimelineEvent::KeyDown { row: Row::W, at_ms: 9_000 });
        let mut list = DrawList::new();

        let stats = render_frame(&mut list, &mut timeline, &s, NOW).unwrap();

        assert_eq!(stats.bars, 0);
        assert_eq!(list.rects()[0].h, TOP_PAD + BOTTOM_PAD);
        assert!(list
            .rects()
            .iter()
            .any(|r| r.y == 73.0 - 55.0 + 22.0 && r.h == AXIS_THICKNESS));
    }

    #[test]
    fn test_narrow_overlay_draws_no_negative_rects() {
        // Arrange: narrower than the label column plus right pad
        let mut s = settings();
        s.width = 16;
        let mut timeline = Timeline::new();
        timeline.apply(TimelineEvent::KeyDown { row: Row::W, at_ms: 8_000 });
        timeline.apply(TimelineEvent::Click { at_ms: 9_000 });
        let mut list = DrawList::new();

        // Act
        let stats = render_frame(&mut list, &mut timeline, &s, NOW).unwrap();

        // Assert
        let geo = FrameGeometry::new(&s);
        assert_eq!(geo.timeline_width, 0.0);
        assert_eq!((stats.bars, stats.clicks), (0, 0));
        assert!(list.rects().iter().all(|r| r.w >= 0.0 && r.h >= 0.0));
        assert_eq!(list.rects()[0].w, 16.0);
        assert!(list
            .rects()
            .iter()
            .any(|r| r.x == LEFT_PAD && r.y == geo.axis_y && r.w == 0.0));
        assert!(rects_with_color(&list, Rgba::GRID)
            .iter()
            .all(|r| r.y == geo.axis_y));
    }

    // ── Curation ──────────────────────────────────────────────────────────────

    #[test]
    fn test_render_curates_after_drawing() {
        let mut timeline = Timeline::new();
        timeline.apply(TimelineEvent::KeyDown { row: Row::W, at_ms: 0 });
        timeline.apply(TimelineEvent::KeyUp { row: Row::W, at_ms: 10 });
        timeline.apply(TimelineEvent::Click { at_ms: 20 });
        let mut list = DrawList::new();

        let stats = render_frame(&mut list, &mut timeline, &settings(), RETENTION_MS + 100).unwrap();

        assert_eq!(stats.segments_evicted, 1);
        assert_eq!(stats.clicks_evicted, 1);
        assert!(timeline.is_empty());
    }

    #[test]
    fn test_label_scale_shrinks_for_long_labels() {
        assert_eq!(label_scale("W"), 4.0 * 0.85);
        assert_eq!(label_scale("ELEVEN CHAR"), 3.0 * 0.85);
        assert_eq!(label_scale("SEVENTEEN CHARSXX"), 2.0 * 0.85);
    }
}
