pub mod config;
pub mod control;
pub mod injection;
pub mod models;
pub mod pipeline;

use std::path::Path;
use std::sync::{Arc, Mutex};

use config::ConfigStore;
use control::{ControlSession, ReplaySource};
use injection::RdevInjector;

/// Replays a recorded landmark stream against the live pointer.
///
/// Usage: `palmcontrol <frames.jsonl>`. Camera trackers are separate
/// backends that implement `control::LandmarkSource`.
pub fn run() {
    env_logger::init();

    let Some(replay_path) = std::env::args().nth(1) else {
        eprintln!("usage: palmcontrol <frames.jsonl>");
        return;
    };

    let store = ConfigStore::at_default_location();
    let settings = store.load();
    log::info!("config loaded from {}", store.path().display());

    let (screen_width, screen_height) = match RdevInjector::screen_size() {
        Ok(size) => size,
        Err(err) => {
            log::error!("cannot resolve screen size: {err}");
            return;
        }
    };

    let source = match ReplaySource::open(Path::new(&replay_path)) {
        Ok(source) => source.with_frame_interval(settings.min_move_interval()),
        Err(err) => {
            log::error!("cannot open replay file {replay_path}: {err}");
            return;
        }
    };

    log::info!("replaying {replay_path} at {screen_width}x{screen_height}");
    let session = ControlSession::spawn(
        Box::new(source),
        Box::new(RdevInjector::new()),
        Arc::new(Mutex::new(settings)),
        screen_width,
        screen_height,
    );
    session.wait();
}
