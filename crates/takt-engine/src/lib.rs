//! Playback engine for the takt metronome.
//!
//! Renders drift-free beats on the sample clock: tempo math, meter and
//! accent patterns, click synthesis, and the beat-scheduling engine.
//! Pure and deterministic, with no I/O or threads; the audio device and the
//! control surface live in the `takt-audio` and `takt-master` crates.

mod click;
mod engine;
mod frame;
mod meter;
mod tempo;

pub use click::{ClickBank, ClickSample, ClickSet, SoundEngine, Waveform};
pub use engine::{BeatEvent, Engine, EngineParams};
pub use frame::{volume_to_gain, Frame, GAIN_UNITY};
pub use meter::{BeatKind, MeterPattern, MAX_METER, MIN_METER};
pub use tempo::{beat_frame, tempo_name, Bpm, MAX_BPM, MIN_BPM};
