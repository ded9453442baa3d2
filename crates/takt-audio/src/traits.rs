//! Audio output trait and error types.

use takt_engine::Frame;

/// Error type for audio operations.
#[derive(Debug)]
pub enum AudioError {
    /// Failed to initialize audio device
    DeviceInit(String),
    /// Failed to create audio stream
    StreamCreate(String),
    /// Playback error
    Playback(String),
    /// No audio device available
    NoDevice,
}

impl std::fmt::Display for AudioError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AudioError::DeviceInit(msg) => write!(f, "Device init error: {}", msg),
            AudioError::StreamCreate(msg) => write!(f, "Stream create error: {}", msg),
            AudioError::Playback(msg) => write!(f, "Playback error: {}", msg),
            AudioError::NoDevice => write!(f, "No audio device available"),
        }
    }
}

impl std::error::Error for AudioError {}

/// Trait for audio output backends.
///
/// Used exclusively by the timing thread: `open` once, `enqueue` per
/// frame, `close` on the way out. `enqueue` blocks when the device
/// buffer is full, which is what paces the thread.
pub trait AudioOutput {
    /// Get the output sample rate.
    fn sample_rate(&self) -> u32;

    /// Acquire the device stream and start playback.
    fn open(&mut self) -> Result<(), AudioError>;

    /// Write one frame to the output, parking until there is room.
    /// Fails if the stream died while waiting.
    fn enqueue(&mut self, frame: Frame) -> Result<(), AudioError>;

    /// Stop playback and release the stream.
    fn close(&mut self);
}
