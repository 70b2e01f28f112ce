use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use clap::{Parser, ValueEnum};
use macroquad::prelude::*;

mod canvas;
mod color;
mod config;
mod driver;
mod ekg;
mod error;
mod events;
mod feed;
mod hud;
mod organism;
mod particles;
mod physics;
mod population;
mod render_backend;
mod renderer;
mod snapshot;
mod stats;
mod viewport;

use config::OrganismConfig;
use driver::{AnimationDriver, HostClock};
use ekg::Ekg;
use feed::{MetricsFeed, ReplayFeed, SimulatedFeed, StaticFeed};
use hud::HudState;
use organism::Organism;
use render_backend::MacroquadCanvas;
use stats::FrameStats;
use viewport::Viewport;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum FeedKind {
    /// Fallback snapshot, never changes.
    Static,
    /// Synthetic chain with regular blocks.
    Simulated,
    /// Snapshots recorded to a JSON file.
    Replay,
}

#[derive(Parser, Debug)]
#[command(name = "organism")]
#[command(about = "Decred network metrics as a living particle organism")]
struct Cli {
    /// JSON file overriding any of the tuned constants
    #[arg(long)]
    config: Option<PathBuf>,

    /// Where network snapshots come from
    #[arg(long, value_enum, default_value_t = FeedKind::Simulated)]
    feed: FeedKind,

    /// JSON array of snapshots for --feed replay
    #[arg(long)]
    replay: Option<PathBuf>,

    /// Seed for particle placement and the simulated feed
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Seconds between simulated blocks
    #[arg(long, default_value_t = config::DEFAULT_BLOCK_INTERVAL)]
    block_interval: f64,

    /// Seconds between feed polls
    #[arg(long, default_value_t = config::DEFAULT_POLL_INTERVAL)]
    poll_interval: f64,

    /// One update per displayed frame instead of fixed 60 Hz steps
    #[arg(long)]
    lockstep: bool,
}

fn window_conf() -> Conf {
    Conf {
        window_title: "Decred Pulse — Organism".to_string(),
        window_width: config::WINDOW_WIDTH,
        window_height: config::WINDOW_HEIGHT,
        window_resizable: true,
        high_dpi: true,
        ..Default::default()
    }
}

fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}

fn load_config(cli: &Cli) -> OrganismConfig {
    let Some(path) = &cli.config else {
        log::info!("config: built-in defaults");
        return OrganismConfig::default();
    };
    match OrganismConfig::load(path) {
        Ok(config) => {
            log::info!("config: {}", path.display());
            config
        }
        Err(e) => {
            log::warn!("{e}; using built-in defaults");
            OrganismConfig::default()
        }
    }
}

fn build_feed(cli: &Cli) -> Box<dyn MetricsFeed> {
    match cli.feed {
        FeedKind::Static => Box::new(StaticFeed::new(cli.poll_interval)),
        FeedKind::Simulated => Box::new(SimulatedFeed::new(
            cli.poll_interval,
            cli.block_interval,
            cli.seed,
        )),
        FeedKind::Replay => {
            let Some(path) = &cli.replay else {
                log::warn!("--feed replay needs --replay <path>; using static feed");
                return Box::new(StaticFeed::new(cli.poll_interval));
            };
            match ReplayFeed::load(path, cli.poll_interval) {
                Ok(feed) => Box::new(feed),
                Err(e) => {
                    log::warn!("{e}; using static feed");
                    Box::new(StaticFeed::new(cli.poll_interval))
                }
            }
        }
    }
}

fn current_viewport() -> Viewport {
    Viewport::new(screen_width(), screen_height(), screen_dpi_scale())
}

/// Cursor position, or the sentinel when it is outside the window.
fn pointer(viewport: &Viewport) -> (f32, f32) {
    let (x, y) = mouse_position();
    let inside = x >= 0.0 && y >= 0.0 && x <= viewport.width && y <= viewport.height;
    if inside {
        (x, y)
    } else {
        (config::POINTER_SENTINEL, config::POINTER_SENTINEL)
    }
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = load_config(&cli);
    let mut feed = build_feed(&cli);
    log::info!("feed: {}, seed {}", feed.describe(), cli.seed);

    let organism = Organism::new(config, current_viewport(), cli.seed);
    let mut driver = AnimationDriver::new(organism);
    let mut canvas = MacroquadCanvas::new();
    let mut clock = HostClock;
    let mut hud = HudState::default();
    let mut frame_stats = FrameStats::new(240);
    let mut ekg = Ekg::new(config::EKG_SAMPLES, cli.seed.wrapping_add(1));

    driver.start();

    loop {
        let viewport = current_viewport();
        if viewport.is_empty() {
            next_frame().await;
            continue;
        }
        driver.organism.resize(viewport);

        let (mx, my) = pointer(&viewport);
        driver.organism.set_mouse(mx, my);

        if is_key_pressed(KeyCode::Escape) {
            driver.stop();
            break;
        }
        if is_key_pressed(KeyCode::I) {
            hud.toggle();
        }

        let now = unix_now();
        match feed.poll(now) {
            Ok(Some(snapshot)) => {
                if driver.organism.set_data(snapshot) {
                    hud.notify_block(now);
                    ekg.trigger();
                }
            }
            Ok(None) => {}
            Err(e) => log::warn!("feed poll failed: {e}"),
        }

        if cli.lockstep {
            driver.tick(&mut canvas);
        } else {
            driver.pump(&mut clock, &mut canvas);
        }
        ekg.step(get_time());

        frame_stats.record(get_frame_time(), driver.organism.particles.len());
        hud::draw(&hud, &driver.organism, &frame_stats, &ekg, now);

        next_frame().await;
    }
}
