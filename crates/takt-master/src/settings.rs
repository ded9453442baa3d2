//! Persisted metronome settings.
//!
//! A small JSON file holding the user-facing parameters and the click
//! file paths, reloaded at startup so the metronome comes back the way
//! it was left.

use std::path::Path;

use serde::{Deserialize, Serialize};
use takt_engine::SoundEngine;

use crate::Metronome;

/// Error type for settings persistence.
#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "settings I/O error: {}", e),
            SettingsError::Parse(e) => write!(f, "settings parse error: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {}

impl From<std::io::Error> for SettingsError {
    fn from(e: std::io::Error) -> Self {
        SettingsError::Io(e)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(e: serde_json::Error) -> Self {
        SettingsError::Parse(e)
    }
}

/// The persisted parameter set.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub speed: u16,
    pub volume: f32,
    pub meter: u32,
    pub accents: Vec<bool>,
    pub engine: SoundEngine,
    /// Whether the UI shows the per-beat accent table.
    pub show_accent_table: bool,
    pub tic_path: String,
    pub toc_path: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            speed: 60,
            volume: 0.5,
            meter: 1,
            accents: vec![false],
            engine: SoundEngine::File,
            show_accent_table: false,
            tic_path: "audio/tic.wav".into(),
            toc_path: "audio/toc.wav".into(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text)?;
        Ok(())
    }

    /// Push these settings into a metronome; out-of-range values go
    /// through the same clamping as the live setters. Click files are
    /// loaded from the stored paths.
    pub fn apply(&self, metronome: &mut Metronome) {
        metronome.set_speed(self.speed as i64);
        metronome.set_volume(self.volume);
        let meter = metronome.set_meter(self.meter as i64);
        // A stale accent vector can outgrow the meter; entries past the
        // last beat would otherwise clamp onto it
        for (i, &accented) in self.accents.iter().take(meter as usize).enumerate() {
            metronome.set_accent(i as i64 + 1, accented);
        }
        metronome.set_sound_engine(self.engine);
        metronome.load_click_files(Path::new(&self.tic_path), Path::new(&self.toc_path));
    }

    /// Refresh the parameter fields from a metronome's current state.
    /// The click file paths are left as they are.
    pub fn update_from(&mut self, metronome: &Metronome) {
        self.speed = metronome.speed();
        self.volume = metronome.volume();
        self.meter = metronome.meter();
        self.accents = metronome.accents();
        self.engine = metronome.sound_engine();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_round_trip() {
        let mut settings = Settings::default();
        settings.speed = 142;
        settings.meter = 4;
        settings.accents = vec![true, false, false, false];
        settings.engine = SoundEngine::Triangle;

        let text = serde_json::to_string(&settings).unwrap();
        let back: Settings = serde_json::from_str(&text).unwrap();
        assert_eq!(back, settings);
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let parsed: Settings = serde_json::from_str(r#"{"speed": 90}"#).unwrap();
        assert_eq!(parsed.speed, 90);
        assert_eq!(parsed.volume, 0.5);
        assert_eq!(parsed.meter, 1);
        assert_eq!(parsed.engine, SoundEngine::File);
    }

    #[test]
    fn engine_serializes_lowercase() {
        let mut settings = Settings::default();
        settings.engine = SoundEngine::Sawtooth;
        let text = serde_json::to_string(&settings).unwrap();
        assert!(text.contains(r#""engine":"sawtooth""#));
    }

    #[test]
    fn apply_pushes_values_through_clamping() {
        let settings = Settings {
            speed: 400,
            volume: 1.5,
            meter: 3,
            accents: vec![true, false, true],
            engine: SoundEngine::Sine,
            ..Settings::default()
        };
        let mut m = Metronome::new();
        settings.apply(&mut m);
        assert_eq!(m.speed(), crate::MAX_BPM);
        assert_eq!(m.volume(), 1.0);
        assert_eq!(m.meter(), 3);
        assert_eq!(m.accents(), vec![true, false, true]);
        assert_eq!(m.sound_engine(), SoundEngine::Sine);
    }

    #[test]
    fn apply_ignores_accents_beyond_the_meter() {
        let settings = Settings {
            meter: 2,
            accents: vec![false, false, true, true],
            ..Settings::default()
        };
        let mut m = Metronome::new();
        settings.apply(&mut m);
        assert_eq!(m.meter(), 2);
        assert_eq!(m.accents(), vec![false, false]);
    }

    #[test]
    fn update_from_captures_live_state() {
        let m = Metronome::new();
        m.set_speed(88);
        m.set_volume(0.25);
        m.set_meter(5);
        m.set_accent(2, true);
        m.set_sound_engine(SoundEngine::Triangle);

        let mut settings = Settings::default();
        settings.update_from(&m);
        assert_eq!(settings.speed, 88);
        assert_eq!(settings.volume, 0.25);
        assert_eq!(settings.meter, 5);
        assert_eq!(settings.accents, vec![false, true, false, false, false]);
        assert_eq!(settings.engine, SoundEngine::Triangle);
        assert_eq!(settings.tic_path, "audio/tic.wav");
    }

    #[test]
    fn save_then_load_round_trips() {
        let mut settings = Settings::default();
        settings.speed = 72;
        settings.engine = SoundEngine::Sine;

        let path = std::env::temp_dir().join(format!("takt-settings-{}.json", std::process::id()));
        settings.save(&path).unwrap();
        let back = Settings::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);
        assert_eq!(back, settings);
    }
}
