//! No-op audio output for headless use and tests.

use takt_engine::Frame;

use crate::traits::{AudioError, AudioOutput};

/// Audio output that discards every frame.
pub struct NullOutput {
    rate: u32,
    frames_written: u64,
}

impl NullOutput {
    pub fn new(rate: u32) -> Self {
        Self {
            rate,
            frames_written: 0,
        }
    }

    /// Total number of frames enqueued so far.
    pub fn frames_written(&self) -> u64 {
        self.frames_written
    }
}

impl AudioOutput for NullOutput {
    fn sample_rate(&self) -> u32 {
        self.rate
    }

    fn open(&mut self) -> Result<(), AudioError> {
        Ok(())
    }

    fn enqueue(&mut self, _frame: Frame) -> Result<(), AudioError> {
        self.frames_written += 1;
        Ok(())
    }

    fn close(&mut self) {}
}
