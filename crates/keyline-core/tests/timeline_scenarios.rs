//! Integration tests for the timeline, window, and raw input decoder.
//!
//! These tests drive the public API the way the overlay does: raw payloads
//! are decoded, resolved to rows through the bindings, applied to the
//! timeline, and finally mapped into the moving window.

use keyline_core::{
    decode_raw_input,
    protocol::raw_input::{encode_raw_input, keyboard, mouse, RI_MOUSE_BUTTON_1_DOWN},
    Applied, Millis, MouseButton, RawInput, Row, RowBindings, Timeline, TimelineEvent, TimeWindow,
    RETENTION_MS, WINDOW_MS,
};

/// Decodes `bytes` and turns it into timeline events the way the capture
/// callback does.
fn normalize(bindings: &RowBindings, bytes: &[u8], at_ms: Millis) -> Vec<TimelineEvent> {
    match decode_raw_input(bytes).expect("payload must decode") {
        RawInput::Keyboard(k) => match bindings.row_for_key(k.vkey) {
            Some(row) if k.is_break() => vec![TimelineEvent::KeyUp { row, at_ms }],
            Some(row) => vec![TimelineEvent::KeyDown { row, at_ms }],
            None => Vec::new(),
        },
        RawInput::Mouse(m) => m
            .button_transitions()
            .filter(|&(button, pressed)| button == MouseButton::Primary && pressed)
            .map(|_| TimelineEvent::Click { at_ms })
            .collect(),
        RawInput::Hid => Vec::new(),
    }
}

#[test]
fn test_decoded_wsad_sequence_builds_expected_timeline() {
    let bindings = RowBindings::default();
    let mut timeline = Timeline::new();
    let script: Vec<(Vec<u8>, Millis)> = vec![
        (encode_raw_input(&keyboard(0x57, true)), 1_000),
        (encode_raw_input(&keyboard(0x57, true)), 1_030),
        (encode_raw_input(&keyboard(0x41, true)), 1_100),
        (encode_raw_input(&mouse(RI_MOUSE_BUTTON_1_DOWN, 0, 0)), 1_250),
        (encode_raw_input(&keyboard(0x57, false)), 1_400),
        (encode_raw_input(&keyboard(0x41, false)), 1_500),
    ];

    let outcomes: Vec<Applied> = script
        .iter()
        .flat_map(|(bytes, t)| normalize(&bindings, bytes, *t))
        .map(|event| timeline.apply(event))
        .collect();

    assert_eq!(outcomes[0], Applied::SegmentOpened);
    assert_eq!(outcomes[1], Applied::RepeatIgnored);
    assert_eq!(outcomes[2], Applied::SegmentOpened);
    match outcomes[3] {
        Applied::ClickRecorded(click) => {
            assert_eq!(click.row, Row::A);
            assert_eq!(click.delta_ms, 150);
        }
        other => panic!("expected click, got {other:?}"),
    }
    assert_eq!(outcomes[4], Applied::SegmentClosed);
    assert_eq!(outcomes[5], Applied::SegmentClosed);

    let spans: Vec<_> = timeline
        .segments()
        .map(|s| (s.row, s.start_ms, s.end_ms))
        .collect();
    assert_eq!(
        spans,
        vec![
            (Row::W, 1_000, Some(1_400)),
            (Row::A, 1_100, Some(1_500)),
        ]
    );
}

#[test]
fn test_unbound_keys_and_other_buttons_are_ignored() {
    let bindings = RowBindings::default();

    let q = normalize(&bindings, &encode_raw_input(&keyboard(0x51, true)), 0);
    let right = normalize(&bindings, &encode_raw_input(&mouse(0x0004, 3, 4)), 0);

    assert!(q.is_empty());
    assert!(right.is_empty());
}

#[test]
fn test_press_release_click_then_age_out() {
    // Arrange
    let mut timeline = Timeline::new();
    timeline.apply(TimelineEvent::KeyDown { row: Row::W, at_ms: 1_000 });
    timeline.apply(TimelineEvent::KeyUp { row: Row::W, at_ms: 1_200 });
    timeline.apply(TimelineEvent::Click { at_ms: 1_500 });

    // Act: a frame at 3 s sees everything; one at 40 s sees nothing
    let visible = TimeWindow::ending_at(3_000, WINDOW_MS, 0.0, 500.0);
    let bar_visible = timeline
        .segments()
        .any(|s| visible.overlaps(s.start_ms, s.effective_end(3_000)));
    timeline.curate(40_000);

    // Assert
    assert!(bar_visible);
    let click = timeline.clicks().next().copied();
    assert!(click.is_none());
    assert!(timeline.is_empty());
}

#[test]
fn test_held_key_survives_retention_and_spans_the_window() {
    let mut timeline = Timeline::new();
    timeline.apply(TimelineEvent::KeyDown { row: Row::D, at_ms: 0 });
    let now = RETENTION_MS * 3;

    timeline.curate(now);
    let segment = *timeline.open_segment(Row::D).expect("held key stays open");
    let window = TimeWindow::ending_at(now, WINDOW_MS, 100.0, 1_000.0);

    assert_eq!(timeline.segment_count(), 1);
    assert_eq!(window.x_of_clamped(segment.start_ms), 100.0);
    assert_eq!(window.x_of_clamped(segment.effective_end(now)), 1_100.0);
}
