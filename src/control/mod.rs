//! Control-session lifecycle: one capture-and-process thread per session.
//!
//! The pipeline's state is owned by the worker thread and is never touched
//! from anywhere else. Start, stop, and tracker swap all go through a full
//! teardown (signal, force-release, join) before anything is reconstructed.

mod replay;

pub use replay::ReplaySource;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Instant;

use uuid::Uuid;

use crate::config::{ConfigStore, Settings};
use crate::injection::PointerInjector;
use crate::models::landmarks::HandFrame;
use crate::pipeline::{GesturePipeline, TickError};

/// What a tracker backend produced for one camera frame.
#[derive(Debug, Clone, Copy)]
pub enum SourceFrame {
    /// A tracked hand with per-tick scalar signals.
    Hand(HandFrame),
    /// Frame captured but nothing to process (no hand, unreadable frame).
    Empty,
}

/// Capability interface for tracker backends: produce per-tick landmark
/// signals. Blocking on the camera inside `next_frame` is expected; the
/// stop flag is only checked between frames.
pub trait LandmarkSource: Send {
    /// Blocks until the next camera frame. `None` means the stream ended.
    fn next_frame(&mut self) -> Option<SourceFrame>;

    /// Releases tracker resources. Called once on session teardown.
    fn close(&mut self) {}
}

/// Shared, hot-reloadable settings snapshot read once per tick.
pub type SharedSettings = Arc<Mutex<Settings>>;

/// One active gesture-control session and its worker thread.
pub struct ControlSession {
    id: String,
    stop_flag: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl ControlSession {
    pub fn spawn(
        mut source: Box<dyn LandmarkSource>,
        mut injector: Box<dyn PointerInjector + Send>,
        settings: SharedSettings,
        screen_width: f64,
        screen_height: f64,
    ) -> Self {
        let id = Uuid::new_v4().to_string();
        let stop_flag = Arc::new(AtomicBool::new(false));
        let stop = stop_flag.clone();

        log::info!("control session {id} started ({screen_width}x{screen_height})");
        let worker = std::thread::Builder::new()
            .name("palm-control".to_string())
            .spawn(move || {
                let mut pipeline = GesturePipeline::new(screen_width, screen_height);

                while !stop.load(Ordering::Relaxed) {
                    let frame = match source.next_frame() {
                        None => break,
                        Some(SourceFrame::Empty) => continue,
                        Some(SourceFrame::Hand(frame)) => frame,
                    };

                    let snapshot = settings.lock().unwrap().clone();
                    match pipeline.update(&frame, Instant::now(), &snapshot) {
                        Ok(commands) => {
                            for command in &commands {
                                if let Err(err) = injector.inject(command) {
                                    log::warn!("input injection failed: {err}");
                                }
                            }
                        }
                        Err(TickError::MalformedFrame) => {
                            log::debug!("skipped malformed landmark frame");
                        }
                    }
                }

                // A stuck button must not outlive the session. Even if the
                // injected release fails, the pipeline state is already clean.
                if let Some(release) = pipeline.force_release() {
                    if let Err(err) = injector.inject(&release) {
                        log::warn!("release on teardown failed: {err}");
                    }
                }
                source.close();
            })
            .expect("failed to spawn control thread");

        Self {
            id,
            stop_flag,
            worker: Some(worker),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Cooperative stop: flips the flag and joins the worker.
    pub fn stop(mut self) {
        self.signal_and_join();
    }

    /// Blocks until the worker exits on its own (source ended). Used by the
    /// replay path; interactive callers use `stop`.
    pub fn wait(mut self) {
        self.join_worker();
    }

    fn signal_and_join(&mut self) {
        self.stop_flag.store(true, Ordering::Relaxed);
        self.join_worker();
    }

    fn join_worker(&mut self) {
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("control thread panicked");
            }
            log::info!("control session {} stopped", self.id);
        }
    }
}

impl Drop for ControlSession {
    fn drop(&mut self) {
        self.signal_and_join();
    }
}

/// Builds a tracker backend for the current settings. Returns `None` when
/// the backend cannot start (missing camera, unknown recognizer).
pub type SourceFactory = Box<dyn Fn(&Settings) -> Option<Box<dyn LandmarkSource>> + Send>;
/// Builds a fresh injector for each session.
pub type InjectorFactory = Box<dyn Fn() -> Box<dyn PointerInjector + Send> + Send>;

/// Application-level orchestration: owns the persisted settings and the
/// active session, and rebuilds the session on tracker or camera changes.
pub struct Controller {
    store: ConfigStore,
    settings: SharedSettings,
    session: Option<ControlSession>,
    make_source: SourceFactory,
    make_injector: InjectorFactory,
    screen_width: f64,
    screen_height: f64,
}

impl Controller {
    pub fn new(
        store: ConfigStore,
        make_source: SourceFactory,
        make_injector: InjectorFactory,
        screen_width: f64,
        screen_height: f64,
    ) -> Self {
        let settings = Arc::new(Mutex::new(store.load()));
        Self {
            store,
            settings,
            session: None,
            make_source,
            make_injector,
            screen_width,
            screen_height,
        }
    }

    pub fn is_active(&self) -> bool {
        self.session.is_some()
    }

    pub fn settings(&self) -> Settings {
        self.settings.lock().unwrap().clone()
    }

    /// Starts gesture control. Returns false when the tracker backend could
    /// not be created; an already-running session is left untouched.
    pub fn start_control(&mut self) -> bool {
        if self.session.is_some() {
            return true;
        }
        let snapshot = self.settings();
        let Some(source) = (self.make_source)(&snapshot) else {
            log::error!("cannot start control: tracker '{}' unavailable", snapshot.recognizer);
            return false;
        };
        let injector = (self.make_injector)();
        self.session = Some(ControlSession::spawn(
            source,
            injector,
            self.settings.clone(),
            self.screen_width,
            self.screen_height,
        ));
        true
    }

    /// Stops gesture control, joining the worker before returning.
    pub fn stop_control(&mut self) {
        if let Some(session) = self.session.take() {
            session.stop();
        }
    }

    pub fn toggle_control(&mut self) -> bool {
        if self.is_active() {
            self.stop_control();
            false
        } else {
            self.start_control()
        }
    }

    pub fn set_sensitivity(&mut self, value: f64) {
        self.update_settings(|settings| settings.set_sensitivity(value));
    }

    pub fn set_smoothing_factor(&mut self, value: f64) {
        self.update_settings(|settings| settings.set_smoothing_factor(value));
    }

    pub fn set_max_fps(&mut self, value: u32) {
        self.update_settings(|settings| settings.set_max_fps(value));
    }

    /// Persists the tracker choice; a running session is rebuilt to use it
    /// (teardown and join first, then reconstruct).
    pub fn set_recognizer(&mut self, name: &str) {
        self.update_settings(|settings| settings.recognizer = name.to_string());
        self.restart_if_active();
    }

    pub fn set_camera(&mut self, camera_id: u32) {
        self.update_settings(|settings| settings.camera_id = camera_id);
        self.restart_if_active();
    }

    fn restart_if_active(&mut self) {
        if self.is_active() {
            self.stop_control();
            self.start_control();
        }
    }

    /// Applies a mutation and writes the settings through to disk.
    fn update_settings(&mut self, apply: impl FnOnce(&mut Settings)) {
        let snapshot = {
            let mut guard = self.settings.lock().unwrap();
            apply(&mut guard);
            guard.clone()
        };
        if let Err(err) = self.store.save(&snapshot) {
            log::warn!("failed to persist settings: {err}");
        }
    }
}

impl Drop for Controller {
    fn drop(&mut self) {
        self.stop_control();
    }
}
