//! Session walkthrough
//!
//! Simulates a host app: negotiates a layer configuration, opens the
//! session, animates at a few speeds, freezes, and closes. The platform
//! here is a logger; confirmations are driven inline where a real
//! compositor would deliver them asynchronously.
//!
//! Run with: cargo run --example session_walkthrough

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use stagedoor::{
    negotiate, ColorFormat, DepthFormat, LayerCapabilities, SessionEvent, SessionObserver,
    SessionPlatform, StageConfig, StageModel, ViewLayout,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

struct LoggingPlatform;

impl SessionPlatform for LoggingPlatform {
    fn on_open_requested(&self) {
        info!("platform: open requested");
    }
    fn on_close_requested(&self) {
        info!("platform: close requested");
    }
}

struct LoggingObserver;

impl SessionObserver for LoggingObserver {
    fn on_event(&self, event: SessionEvent) {
        info!(?event, "session event");
    }
}

fn main() -> Result<()> {
    let config = StageConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&config.log_level))
        .init();

    info!("stagedoor {} walkthrough", env!("CARGO_PKG_VERSION"));

    // What a foveation-capable headset typically offers.
    let offer = LayerCapabilities::new()
        .with_depth_format(DepthFormat::Depth16Unorm)
        .with_depth_format(DepthFormat::Depth32Float)
        .with_color_format(ColorFormat::Bgra8UnormSrgb)
        .with_color_format(ColorFormat::Rgba16Float)
        .with_foveation(true)
        .with_layout(ViewLayout::Dedicated)
        .with_foveated_layout(ViewLayout::Layered);
    let layer = negotiate(&offer)?;
    info!(?layer, "negotiated layer configuration");

    let model = StageModel::with_config(config, Arc::new(LoggingPlatform));
    model.session().set_observer(Arc::new(LoggingObserver));
    let control = model.control();

    control.toggle_session();
    model.session().on_opened()?;

    for speed in [1.0, 2.0, 0.0] {
        control.set_animation_speed(speed);
        for _ in 0..5 {
            thread::sleep(Duration::from_millis(30));
            let frame = model.begin_frame();
            if frame.should_render() {
                info!(elapsed = %frame.elapsed, speed = frame.speed, "frame");
            }
        }
    }

    control.toggle_session();
    model.session().on_closed()?;

    if let Some(activation) = model.session().activation() {
        info!(activation_id = %activation.id, "walkthrough complete");
    }
    Ok(())
}
