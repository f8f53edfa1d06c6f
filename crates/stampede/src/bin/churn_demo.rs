//! # Churn Demo
//!
//! Headless run of the full pipeline: registers the configured texture
//! groups, spawns the initial bursts, then churns spawn/despawn for a
//! fixed number of frames while a recording adapter stands in for the
//! GPU backend. Prints the accumulated lifecycle summary at the end.
//!
//! Run with: `cargo run --bin churn_demo [-- path/to/config.toml]`

use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use stampede::{
    AnimationClip, FrameDriver, LoopMode, StampedeConfig,
};
use stampede_core::PoolError;
use stampede_render::{RecordingAdapter, SpriteAtlas, TextureId};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = match std::env::args().nth(1) {
        Some(path) => match StampedeConfig::load(std::path::Path::new(&path)) {
            Ok(config) => config,
            Err(err) => {
                error!(%err, path = path.as_str(), "could not load config");
                std::process::exit(1);
            }
        },
        None => StampedeConfig::default(),
    };

    let mut driver = FrameDriver::new(config.scheduler, config.seed);
    let mut adapter = RecordingAdapter::new();

    // A simple flipbook over the first atlas row for animated groups.
    let default_clip = driver.directory_mut().add_clip(AnimationClip::from_range(
        0,
        4,
        10.0,
        LoopMode::PingPong,
    ));

    let mut groups = Vec::with_capacity(config.groups.len());
    for spec in &config.groups {
        let atlas = SpriteAtlas::grid(TextureId(spec.texture), spec.cols, spec.rows);
        let group = match driver.register_group(atlas, spec.pool) {
            Ok(group) => group,
            Err(err) => {
                error!(%err, name = spec.name.as_str(), "could not register group");
                std::process::exit(1);
            }
        };
        info!(
            name = spec.name.as_str(),
            group = group.index(),
            capacity = spec.pool.initial_capacity,
            mortal = spec.pool.lifetime.is_some(),
            "registered group"
        );
        let clip = spec.animated.then_some(default_clip);
        driver.spawn_burst(group, spec.initial_burst, clip);
        groups.push((group, spec.clone(), clip));
    }

    for frame in 0..config.frames {
        for (group, spec, clip) in &groups {
            driver.spawn_burst(*group, spec.churn_per_frame, *clip);
        }
        // Despawn across all groups to hold the population roughly level.
        let churn_total: usize = groups.iter().map(|(_, spec, _)| spec.churn_per_frame).sum();
        driver.directory_mut().despawn_burst(churn_total);

        match driver.run_frame(config.dt, &mut adapter) {
            Ok(report) => {
                if frame % 60 == 0 {
                    info!(
                        frame,
                        live = report.live_after,
                        spawned = report.spawned,
                        despawned = report.despawned,
                        skipped = report.skipped(),
                        "frame"
                    );
                }
                // Keep the adapter's store from growing without bound.
                let _ = adapter.drain_submissions();
            }
            Err(err @ PoolError::AllocationFailure { .. }) => {
                error!(%err, frame, "stopping: instance storage exhausted");
                break;
            }
            Err(err) => {
                error!(%err, frame, "stopping: unexpected frame failure");
                break;
            }
        }
    }

    println!();
    driver.accumulator().print_summary();
    println!("frames presented: {}", adapter.frames_ended());
}
