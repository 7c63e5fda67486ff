//! Criterion benchmarks for the render pass.
//!
//! One frame is drawn per host tick, so `render_frame` has to stay well
//! inside a 16 ms budget even with a dense five-second window.
//!
//! Run with:
//! ```bash
//! cargo bench --package keyline-overlay --bench render_bench
//! ```

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use keyline_core::{Millis, OverlaySettings, Row, Timeline, TimelineEvent, WINDOW_MS};
use keyline_overlay::application::render_timeline::{render_frame, DrawList};

/// `n` segments and clicks packed into the visible window ending at `now`.
fn dense_timeline(n: usize, now: Millis) -> Timeline {
    let mut timeline = Timeline::new();
    let step = WINDOW_MS / n as Millis;
    for i in 0..n {
        let row = Row::ALL[i % Row::ALL.len()];
        let t = now - WINDOW_MS + i as Millis * step;
        timeline.apply(TimelineEvent::KeyDown { row, at_ms: t });
        timeline.apply(TimelineEvent::Click { at_ms: t + 1 });
        timeline.apply(TimelineEvent::KeyUp { row, at_ms: t + step / 2 });
    }
    timeline
}

fn bench_render_frame(c: &mut Criterion) {
    let mut group = c.benchmark_group("render_frame");
    let settings = OverlaySettings::default();
    let now: Millis = 100_000;

    for n in [1usize, 50, 500] {
        group.bench_with_input(BenchmarkId::new("events_in_window", n), &n, |b, &n| {
            let mut timeline = dense_timeline(n, now);
            let mut surface = DrawList::new();
            b.iter(|| {
                surface.clear();
                black_box(render_frame(&mut surface, &mut timeline, &settings, black_box(now)))
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_render_frame);
criterion_main!(benches);
