//! Keyline overlay preview entry point.
//!
//! Runs one overlay source headlessly: raw input is captured on its own
//! thread while a Tokio interval plays the host's render loop, drawing into
//! an in-memory [`DrawList`].  Frame statistics are logged periodically.
//!
//! # Architecture
//!
//! ```text
//! main()
//!  └─ load_config()          -- overlay settings + log level;
//!                               defaults are written on first run
//!  └─ OverlaySource          -- starts platform raw input capture
//!  └─ frame loop (~60 Hz)    -- drain events, render, curate
//!       └─ Ctrl-C            -- drop the source, stop capture
//! ```

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use keyline_core::{Clock, MonotonicClock};
use keyline_overlay::application::render_timeline::DrawList;
use keyline_overlay::infrastructure::host::{schema::source_name, OverlaySource};
use keyline_overlay::infrastructure::input_capture::platform_source;
use keyline_overlay::infrastructure::storage::config::{
    load_config, save_config_if_missing, AppConfig,
};

const FRAME_INTERVAL: Duration = Duration::from_millis(16);
const STATS_INTERVAL: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Config is loaded before logging so its level can seed the filter.
    let (config, config_error) = match load_config() {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // Level is overridden by `RUST_LOG`.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    match config_error {
        Some(e) => warn!("failed to load config, using defaults: {e}"),
        None => match save_config_if_missing(&config) {
            Ok(Some(path)) => info!("wrote default config to {}", path.display()),
            Ok(None) => {}
            Err(e) => warn!("failed to write default config: {e}"),
        },
    }

    let locale = config.overlay.locale;
    info!("{} starting", source_name(locale));

    let clock: Arc<dyn Clock> = Arc::new(MonotonicClock::new());
    let input = platform_source();
    let mut source = OverlaySource::with_settings(config.overlay, input.as_ref(), clock);

    if tracing::enabled!(tracing::Level::DEBUG) {
        match serde_json::to_string(&source.properties()) {
            Ok(json) => debug!(schema = %json, "settings schema"),
            Err(e) => warn!("failed to serialise settings schema: {e}"),
        }
    }

    info!(
        width = source.width(),
        height = source.height(),
        capturing = source.is_capturing(),
        "overlay ready.  Press Ctrl-C to exit."
    );

    let mut surface = DrawList::new();
    let mut frames = tokio::time::interval(FRAME_INTERVAL);
    let mut stats_tick = tokio::time::interval(STATS_INTERVAL);
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            _ = frames.tick() => {
                surface.clear();
                source.render(&mut surface);
            }
            _ = stats_tick.tick() => {
                info!(
                    frames = source.frames(),
                    segments = source.timeline().segment_count(),
                    clicks = source.timeline().click_count(),
                    rects = surface.rects().len(),
                    diagnostics = ?source.diagnostics(),
                    "overlay stats"
                );
            }
            result = &mut shutdown => {
                if let Err(e) = result {
                    warn!("failed to listen for Ctrl-C: {e}");
                }
                info!("shutdown signal received");
                break;
            }
        }
    }

    drop(source);
    info!("keyline overlay stopped");
    Ok(())
}
