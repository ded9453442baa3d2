//! Headless metronome controller.
//!
//! Provides a unified API for parameter control, real-time playback,
//! and offline rendering that UIs and the CLI can share. Playback runs
//! on a dedicated timing thread that owns the audio output; the
//! controller talks to it through a shared parameter block and a
//! generation counter, so setters never block the render path.

mod settings;

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering};
use std::sync::{mpsc, Arc, Mutex, MutexGuard};
use std::thread::JoinHandle;

use takt_audio::{AudioError, AudioOutput, CpalOutput};
use takt_engine::{volume_to_gain, Bpm, ClickBank, Engine, EngineParams, GAIN_UNITY};

// Re-export common types so callers don't need takt-engine directly.
pub use settings::{Settings, SettingsError};
pub use takt_engine::{
    tempo_name, BeatKind, ClickSample, Frame, SoundEngine, MAX_BPM, MAX_METER, MIN_BPM, MIN_METER,
};
pub use takt_formats::FormatError;

/// Error type for playback control.
#[derive(Debug)]
pub enum EngineError {
    /// `start` was called while playback is already running.
    AlreadyRunning,
    /// No usable output device.
    DeviceUnavailable(String),
    /// The audio stream could not be created or driven.
    Stream(String),
}

impl std::fmt::Display for EngineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EngineError::AlreadyRunning => write!(f, "metronome is already running"),
            EngineError::DeviceUnavailable(msg) => write!(f, "audio device unavailable: {}", msg),
            EngineError::Stream(msg) => write!(f, "audio stream error: {}", msg),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<AudioError> for EngineError {
    fn from(e: AudioError) -> Self {
        match e {
            AudioError::NoDevice => EngineError::DeviceUnavailable("no output device".into()),
            AudioError::DeviceInit(msg) => EngineError::DeviceUnavailable(msg),
            AudioError::StreamCreate(msg) | AudioError::Playback(msg) => EngineError::Stream(msg),
        }
    }
}

/// Where playback currently stands, published by the timing thread.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BeatPosition {
    /// Total beats since start, 1-based.
    pub count: u64,
    /// Position within the measure, 1-based.
    pub beat_in_measure: u32,
}

/// Parameter block shared between the controller and the timing thread.
struct Shared {
    params: Mutex<EngineParams>,
    /// Bumped on every setter; the timing thread reloads when it changes.
    generation: AtomicU64,
}

struct PlaybackHandle {
    stop_signal: Arc<AtomicBool>,
    finished: Arc<AtomicBool>,
    beat_count: Arc<AtomicU64>,
    beat_in_measure: Arc<AtomicU32>,
    error: Arc<Mutex<Option<EngineError>>>,
    thread: Option<JoinHandle<()>>,
}

/// Headless metronome controller.
pub struct Metronome {
    shared: Arc<Shared>,
    clicks: Option<(ClickSample, ClickSample)>,
    playback: Option<PlaybackHandle>,
}

impl Metronome {
    pub fn new() -> Self {
        Self {
            shared: Arc::new(Shared {
                params: Mutex::new(EngineParams::default()),
                generation: AtomicU64::new(0),
            }),
            clicks: None,
            playback: None,
        }
    }

    /// Build a metronome pre-configured from persisted settings.
    pub fn with_settings(settings: &Settings) -> Self {
        let mut metronome = Self::new();
        settings.apply(&mut metronome);
        metronome
    }

    // --- Click sounds ---

    /// Install decoded tic/toc samples for the file sound engine.
    pub fn set_click_sounds(&mut self, tic: ClickSample, toc: ClickSample) {
        self.clicks = Some((tic, toc));
    }

    /// Load the tic/toc click files. A file that is missing or fails to
    /// decode is logged and the file engine falls back to the generated
    /// sine click. Returns whether both files loaded.
    pub fn load_click_files(&mut self, tic_path: &Path, toc_path: &Path) -> bool {
        match (read_click(tic_path), read_click(toc_path)) {
            (Some(tic), Some(toc)) => {
                self.clicks = Some((tic, toc));
                true
            }
            _ => {
                self.clicks = None;
                false
            }
        }
    }

    // --- Parameters ---

    /// Set the tempo; out-of-range values are clamped. Returns the
    /// committed BPM.
    pub fn set_speed(&self, bpm: i64) -> u16 {
        let bpm = Bpm::clamped(bpm);
        self.update(|p| p.bpm = bpm);
        bpm.get()
    }

    pub fn speed(&self) -> u16 {
        self.lock_params().bpm.get()
    }

    /// Classical tempo marking for the current speed.
    pub fn tempo_marking(&self) -> &'static str {
        tempo_name(self.speed())
    }

    /// Set the volume in [0.0, 1.0]; out-of-range values are clamped.
    /// Returns the committed volume.
    pub fn set_volume(&self, volume: f32) -> f32 {
        let gain = volume_to_gain(volume);
        self.update(|p| p.gain = gain);
        gain as f32 / GAIN_UNITY as f32
    }

    pub fn volume(&self) -> f32 {
        self.lock_params().gain as f32 / GAIN_UNITY as f32
    }

    /// Set the beats per measure; out-of-range values are clamped.
    /// Accents still in range are preserved. Returns the committed count.
    pub fn set_meter(&self, beats: i64) -> u32 {
        let mut params = self.lock_params();
        let committed = params.meter.resize(beats);
        drop(params);
        self.shared.generation.fetch_add(1, Ordering::Release);
        committed
    }

    pub fn meter(&self) -> u32 {
        self.lock_params().meter.beats()
    }

    /// Mark or clear the accent on a 1-based beat; out-of-range indices
    /// are clamped. Returns the committed index.
    pub fn set_accent(&self, beat: i64, accented: bool) -> u32 {
        let mut params = self.lock_params();
        let committed = params.meter.set_accent(beat, accented);
        drop(params);
        self.shared.generation.fetch_add(1, Ordering::Release);
        committed
    }

    pub fn accents(&self) -> Vec<bool> {
        self.lock_params().meter.accents().to_vec()
    }

    pub fn set_sound_engine(&self, engine: SoundEngine) {
        self.update(|p| p.engine = engine);
    }

    pub fn sound_engine(&self) -> SoundEngine {
        self.lock_params().engine
    }

    // --- Real-time playback ---

    /// Start playback on the default audio device.
    pub fn start(&mut self) -> Result<(), EngineError> {
        self.start_with(|| {
            CpalOutput::new().map(|out| Box::new(out) as Box<dyn AudioOutput>)
        })
    }

    /// Start playback with an output built by `factory` on the timing
    /// thread. Returns `AlreadyRunning` if playback is active, or the
    /// output's startup error if the device cannot be opened.
    pub fn start_with<F>(&mut self, factory: F) -> Result<(), EngineError>
    where
        F: FnOnce() -> Result<Box<dyn AudioOutput>, AudioError> + Send + 'static,
    {
        if self.is_running() {
            return Err(EngineError::AlreadyRunning);
        }
        // Reap a previous run that finished on its own
        self.stop();

        let shared = self.shared.clone();
        let clicks = self.clicks.clone();
        let stop_signal = Arc::new(AtomicBool::new(false));
        let finished = Arc::new(AtomicBool::new(false));
        let beat_count = Arc::new(AtomicU64::new(0));
        let beat_in_measure = Arc::new(AtomicU32::new(0));
        let error = Arc::new(Mutex::new(None));
        let (ready_tx, ready_rx) = mpsc::channel();

        let stop = stop_signal.clone();
        let done = finished.clone();
        let count = beat_count.clone();
        let in_measure = beat_in_measure.clone();
        let error_slot = error.clone();

        let thread = std::thread::spawn(move || {
            timing_thread(
                factory, shared, clicks, stop, count, in_measure, done, error_slot, ready_tx,
            );
        });

        // The output is opened on the timing thread; wait for the verdict
        // so device failures surface here instead of being lost.
        match ready_rx.recv() {
            Ok(Ok(())) => {
                self.playback = Some(PlaybackHandle {
                    stop_signal,
                    finished,
                    beat_count,
                    beat_in_measure,
                    error,
                    thread: Some(thread),
                });
                Ok(())
            }
            Ok(Err(e)) => {
                let _ = thread.join();
                Err(e)
            }
            Err(_) => {
                let _ = thread.join();
                Err(EngineError::Stream("audio thread exited during startup".into()))
            }
        }
    }

    /// Stop playback and wait for the timing thread to exit. Calling
    /// this while stopped is a no-op.
    pub fn stop(&mut self) {
        if let Some(mut pb) = self.playback.take() {
            pb.stop_signal.store(true, Ordering::Relaxed);
            if let Some(handle) = pb.thread.take() {
                let _ = handle.join();
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.playback
            .as_ref()
            .is_some_and(|p| !p.finished.load(Ordering::Relaxed))
    }

    /// Take the error from a run that failed mid-playback, if any.
    /// A failed timing thread stops playback and records exactly one
    /// error here.
    pub fn take_error(&self) -> Option<EngineError> {
        let pb = self.playback.as_ref()?;
        pb.error.lock().unwrap_or_else(|e| e.into_inner()).take()
    }

    /// Current beat position, or `None` when stopped or before the
    /// first beat has fired.
    pub fn current_beat(&self) -> Option<BeatPosition> {
        let pb = self.playback.as_ref()?;
        let count = pb.beat_count.load(Ordering::Relaxed);
        if count == 0 {
            return None;
        }
        Some(BeatPosition {
            count,
            beat_in_measure: pb.beat_in_measure.load(Ordering::Relaxed),
        })
    }

    // --- Offline rendering ---

    /// Render frames at the given rate using the current parameters.
    pub fn render_frames(&self, sample_rate: u32, max_frames: usize) -> Vec<Frame> {
        let params = self.lock_params().clone();
        let bank = ClickBank::new(sample_rate, self.clicks.clone());
        let mut engine = Engine::new(bank, params, sample_rate);
        engine.render_frames(max_frames)
    }

    /// Render playback to an in-memory WAV file.
    pub fn render_to_wav(&self, sample_rate: u32, max_seconds: u32) -> Vec<u8> {
        let max_frames = (sample_rate * max_seconds) as usize;
        let frames = self.render_frames(sample_rate, max_frames);
        takt_formats::frames_to_wav(&frames, sample_rate)
    }

    // --- Internal ---

    fn lock_params(&self) -> MutexGuard<'_, EngineParams> {
        // Recover from poisoning; params hold no invariants a panic can break
        self.shared
            .params
            .lock()
            .unwrap_or_else(|e| e.into_inner())
    }

    fn update(&self, f: impl FnOnce(&mut EngineParams)) {
        let mut params = self.lock_params();
        f(&mut params);
        drop(params);
        self.shared.generation.fetch_add(1, Ordering::Release);
    }
}

impl Default for Metronome {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for Metronome {
    fn drop(&mut self) {
        self.stop();
    }
}

fn read_click(path: &Path) -> Option<ClickSample> {
    let data = match std::fs::read(path) {
        Ok(data) => data,
        Err(e) => {
            log::warn!("cannot read click file {}: {}", path.display(), e);
            return None;
        }
    };
    match takt_formats::load_wav(&data) {
        Ok(sample) => Some(sample),
        Err(e) => {
            log::warn!("cannot decode click file {}: {}", path.display(), e);
            None
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn timing_thread<F>(
    factory: F,
    shared: Arc<Shared>,
    clicks: Option<(ClickSample, ClickSample)>,
    stop_signal: Arc<AtomicBool>,
    beat_count: Arc<AtomicU64>,
    beat_in_measure: Arc<AtomicU32>,
    finished: Arc<AtomicBool>,
    error: Arc<Mutex<Option<EngineError>>>,
    ready: mpsc::Sender<Result<(), EngineError>>,
) where
    F: FnOnce() -> Result<Box<dyn AudioOutput>, AudioError>,
{
    let mut output = match factory() {
        Ok(output) => output,
        Err(e) => {
            let _ = ready.send(Err(e.into()));
            finished.store(true, Ordering::Relaxed);
            return;
        }
    };
    if let Err(e) = output.open() {
        let _ = ready.send(Err(e.into()));
        finished.store(true, Ordering::Relaxed);
        return;
    }

    let sample_rate = output.sample_rate();
    let params = shared
        .params
        .lock()
        .unwrap_or_else(|e| e.into_inner())
        .clone();
    let mut seen_generation = shared.generation.load(Ordering::Acquire);
    let mut engine = Engine::new(ClickBank::new(sample_rate, clicks), params, sample_rate);

    let _ = ready.send(Ok(()));
    log::debug!("timing thread started at {} Hz", sample_rate);

    while !stop_signal.load(Ordering::Relaxed) {
        let generation = shared.generation.load(Ordering::Acquire);
        if generation != seen_generation {
            seen_generation = generation;
            let params = shared
                .params
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .clone();
            // The engine commits these at the next beat boundary
            engine.set_params(params);
        }

        if let Err(e) = output.enqueue(engine.render_frame()) {
            log::error!("playback stopped: {}", e);
            *error.lock().unwrap_or_else(|p| p.into_inner()) = Some(e.into());
            output.close();
            finished.store(true, Ordering::Relaxed);
            return;
        }
        if let Some(beat) = engine.take_beat() {
            beat_count.store(beat.count, Ordering::Relaxed);
            beat_in_measure.store(beat.beat_in_measure, Ordering::Relaxed);
        }
    }

    // Pad with silence so the tail of the last click plays out
    for _ in 0..(sample_rate / 20) {
        if output.enqueue(Frame::silence()).is_err() {
            break;
        }
    }
    output.close();
    finished.store(true, Ordering::Relaxed);
}
