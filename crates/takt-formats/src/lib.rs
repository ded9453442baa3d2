//! Sound-file parsing for the takt metronome.
//!
//! Decodes the tic/toc click WAVs into engine samples and encodes
//! rendered frames back to WAV for offline export.

mod wav;

pub use wav::{frames_to_wav, load_wav, write_wav};

/// Error type for format parsing.
#[derive(Debug)]
pub enum FormatError {
    /// Invalid file header or magic bytes
    InvalidHeader,
    /// Unexpected end of file
    UnexpectedEof,
    /// Unsupported sample format (bit depth, channel count, encoding)
    Unsupported,
}

impl std::fmt::Display for FormatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatError::InvalidHeader => write!(f, "invalid WAV header"),
            FormatError::UnexpectedEof => write!(f, "unexpected end of file"),
            FormatError::Unsupported => write!(f, "unsupported WAV sample format"),
        }
    }
}

impl std::error::Error for FormatError {}
