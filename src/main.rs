//! Lumen - headless scene runtime
//!
//! Builds the demo scene, plays it through a scene session for a fixed
//! number of frames and reports what happened.

mod demo;
mod settings;

use std::path::PathBuf;

use anyhow::{Context, Result};
use lumen_core::FrameClock;
use lumen_render::RecordingRenderer;
use lumen_scene::SceneSession;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use crate::settings::RuntimeSettings;

fn main() -> Result<()> {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy();
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;

    info!("Starting Lumen runtime...");

    let settings_path = std::env::args_os().nth(1).map(PathBuf::from);
    let settings = RuntimeSettings::load(settings_path.as_deref());

    let scene = demo::build_scene(settings.physics.clone());
    info!("Demo scene ready with {} entities", scene.entity_count());

    let mut session = SceneSession::new(scene);
    session.on_viewport_resize(settings.viewport.width, settings.viewport.height);

    let mut renderer = RecordingRenderer::new();
    let mut clock = FrameClock::new(settings.playback.clock_config());

    // One editor frame before entering play mode.
    session
        .on_update(clock.delta, &mut renderer)
        .context("Editor frame failed")?;

    session.play().context("Failed to start runtime")?;
    for _ in 0..settings.playback.frames {
        clock.update(settings.playback.frame_time);
        for _ in 0..clock.fixed_steps() {
            session
                .on_update(clock.fixed_timestep(), &mut renderer)
                .with_context(|| format!("Runtime frame {} failed", clock.frame_count))?;
        }
        renderer.clear();
    }

    let stats = renderer.stats();
    info!(
        "Simulated {:.2}s over {} frames: {} render passes, {} sprites, {} circles",
        clock.total_time, clock.frame_count, stats.scenes, stats.sprites, stats.circles
    );

    if let Some(runtime) = session.runtime_scene() {
        for (name, position) in demo::body_positions(runtime) {
            info!("{:>10} at ({:.3}, {:.3})", name, position.x, position.y);
        }
    }

    session.stop().context("Failed to stop runtime")?;
    info!("Lumen runtime finished");
    Ok(())
}
