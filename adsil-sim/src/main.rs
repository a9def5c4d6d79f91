//! `adsil-sim` — a thin external collaborator driving `adsil-core`
//! end-to-end: loads a scene configuration, streams frames through a
//! [`FrameBufferPlayer`], and logs solver output every tick. It never
//! reaches into the core's internals, only the public interfaces
//! (`config`, `player`, `solver`, `scene`).

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use adsil_core::config::{resource_dir, scene::SceneConfig};
use adsil_core::player::FrameBufferPlayer;
use adsil_core::solver;

#[derive(Parser, Debug)]
#[command(name = "adsil-sim", about = "ADSIL time-of-flight simulation driver")]
struct Args {
    /// Scene/vehicle configuration file, relative to the resource directory
    /// unless absolute.
    #[arg(long, default_value = "scene.json")]
    scene: PathBuf,

    /// Frame corpus directory, defaults to `<resource dir>/frames`.
    #[arg(long)]
    frames_dir: Option<PathBuf>,

    /// Frame file suffix.
    #[arg(long, default_value = ".json")]
    frame_suffix: String,

    /// Half-width of the frame window (the window holds `2*window + 1` frames).
    #[arg(long, default_value_t = 3)]
    window: usize,

    /// Playback rate in frames per second.
    #[arg(long, default_value_t = 10.0)]
    rate: f32,

    /// Shape mesh sampling quality passed to `Scene::merged_cloud`.
    #[arg(long, default_value_t = 9)]
    quality: u32,

    /// Number of foreground ticks to run before exiting.
    #[arg(long, default_value_t = 30)]
    ticks: usize,

    /// Simulated seconds advanced per tick.
    #[arg(long, default_value_t = 0.1)]
    tick_seconds: f32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "adsil_sim=info,adsil_core=info".into()),
        )
        .init();

    let args = Args::parse();
    let base = resource_dir();

    let scene_path = if args.scene.is_absolute() {
        args.scene.clone()
    } else {
        base.join(&args.scene)
    };
    let frames_dir = args.frames_dir.unwrap_or_else(|| base.join("frames"));

    info!(scene = %scene_path.display(), frames = %frames_dir.display(), "loading scene and frame corpus");

    let scene_json = std::fs::read_to_string(&scene_path)?;
    let mut scene = SceneConfig::parse(&scene_json)?.build()?;

    let mut player = FrameBufferPlayer::new(frames_dir, args.frame_suffix, args.window, args.rate)?;
    info!(total_frames = player.total_frames(), "frame corpus loaded");
    player.play();

    for tick in 0..args.ticks {
        player.update(args.tick_seconds)?;

        let frame = player.window().center().clone();
        if frame.is_empty() {
            tokio::time::sleep(Duration::from_secs_f32(args.tick_seconds)).await;
            continue;
        }

        scene.set_timestamp(frame.timestamp);
        scene.set_external_cloud(frame.cloud);

        match solver::solve(&mut scene, args.quality) {
            Ok(detections) => info!(
                tick,
                cursor = player.cursor(),
                detections = detections.len(),
                "solve complete"
            ),
            Err(e) => warn!(tick, error = %e, "solve failed"),
        }

        if !player.is_playing() {
            info!(tick, "playback reached end of corpus");
            break;
        }

        tokio::time::sleep(Duration::from_secs_f32(args.tick_seconds)).await;
    }

    Ok(())
}
