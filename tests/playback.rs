//! End-to-end playback tests through the controller surface.

use std::time::Duration;

use takt_audio::{AudioOutput, NullOutput};
use takt_master::{Frame, Metronome, SoundEngine};

fn audible(frames: &[Frame]) -> bool {
    frames.iter().any(|f| *f != Frame::silence())
}

fn peak(frames: &[Frame]) -> u16 {
    frames.iter().map(|f| f.left.unsigned_abs()).max().unwrap_or(0)
}

#[test]
fn offline_clicks_follow_tempo() {
    let m = Metronome::new();
    m.set_speed(120);
    m.set_volume(1.0);
    m.set_sound_engine(SoundEngine::Sine);

    // 120 BPM at 44100 Hz puts a click every 22050 frames
    let frames = m.render_frames(44100, 22050 * 3 + 500);
    for onset in [0, 22050, 44100, 66150] {
        assert!(audible(&frames[onset..onset + 200]), "no click at {}", onset);
    }
    // A click lasts 20 ms (882 frames); in between is silence
    assert!(!audible(&frames[2000..22000]));
    assert!(!audible(&frames[24000..44000]));
}

#[test]
fn accented_first_beat_is_louder() {
    let m = Metronome::new();
    m.set_speed(60);
    m.set_volume(1.0);
    m.set_meter(4);
    m.set_accent(1, true);
    m.set_sound_engine(SoundEngine::Sine);

    let frames = m.render_frames(44100, 44100 + 1000);
    let accent = peak(&frames[0..1000]);
    let normal = peak(&frames[44100..45100]);
    assert!(accent > 0 && normal > 0);
    assert!(
        accent > normal,
        "accent peak {} not above normal {}",
        accent,
        normal
    );
}

#[test]
fn zero_volume_renders_silence() {
    let m = Metronome::new();
    m.set_volume(0.0);
    m.set_sound_engine(SoundEngine::Sine);
    let frames = m.render_frames(44100, 44100);
    assert!(!audible(&frames));
}

#[test]
fn wav_export_is_well_formed() {
    let m = Metronome::new();
    m.set_speed(240);
    let wav = m.render_to_wav(44100, 2);
    assert_eq!(&wav[0..4], b"RIFF");
    assert_eq!(&wav[8..12], b"WAVE");
    assert_eq!(wav.len(), 44 + 44100 * 2 * 4);
}

#[test]
fn live_playback_reaches_a_beat_and_stops() {
    let mut m = Metronome::new();
    m.set_speed(299);
    m.start_with(|| Ok(Box::new(NullOutput::new(44100)) as Box<dyn AudioOutput>))
        .expect("start with null output");

    let mut saw_beat = false;
    for _ in 0..200 {
        if m.current_beat().is_some() {
            saw_beat = true;
            break;
        }
        std::thread::sleep(Duration::from_millis(5));
    }
    assert!(saw_beat);

    m.stop();
    assert!(!m.is_running());
}
