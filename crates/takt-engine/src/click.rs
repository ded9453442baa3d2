//! Click sound sources.
//!
//! A click set holds two short mono buffers, one per audible beat kind,
//! rendered once up front. Generated sets synthesize an enveloped
//! waveform; the file set is built from decoded samples resampled to the
//! output rate. The bank holds every set so that switching sound engines
//! mid-run is an index change, never I/O.

use std::f32::consts::PI;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::meter::BeatKind;

/// Click duration in milliseconds.
const CLICK_MS: u32 = 20;

/// Normal-beat click pitch in Hz.
const NORMAL_HZ: f32 = 800.0;

/// Accented-beat click pitch in Hz.
const ACCENT_HZ: f32 = 1200.0;

const NORMAL_AMP: f32 = 0.5;
const ACCENT_AMP: f32 = 0.8;

/// Which sound source renders the beats.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SoundEngine {
    /// Two waveform files (tic/toc) loaded at startup.
    #[default]
    File,
    Sine,
    Triangle,
    Sawtooth,
    /// Reserved: MIDI output. Not implemented; falls back to a generated
    /// click when selected.
    Midi,
}

/// A generated waveform shape.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Waveform {
    Sine,
    Triangle,
    Sawtooth,
}

/// Raw mono PCM decoded from a sound file, at its native rate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ClickSample {
    pub rate: u32,
    pub data: Vec<i16>,
}

/// The rendered buffers for one sound engine.
#[derive(Clone, Debug)]
pub struct ClickSet {
    normal: Vec<i16>,
    accent: Vec<i16>,
}

impl ClickSet {
    /// Synthesize a set from a waveform shape at the output rate.
    pub fn generated(wave: Waveform, sample_rate: u32) -> Self {
        Self {
            normal: synth_click(wave, NORMAL_HZ, NORMAL_AMP, sample_rate),
            accent: synth_click(wave, ACCENT_HZ, ACCENT_AMP, sample_rate),
        }
    }

    /// Build a set from decoded file samples, resampled to the output rate.
    pub fn from_samples(tic: &ClickSample, toc: &ClickSample, sample_rate: u32) -> Self {
        Self {
            normal: resample(tic, sample_rate),
            accent: resample(toc, sample_rate),
        }
    }

    /// Buffer for a beat kind; `None` means render silence.
    pub fn buffer(&self, kind: BeatKind) -> Option<&[i16]> {
        match kind {
            BeatKind::Normal => Some(&self.normal),
            BeatKind::Accent => Some(&self.accent),
            BeatKind::Muted => None,
        }
    }
}

/// All click sets, one per selectable engine.
#[derive(Clone, Debug)]
pub struct ClickBank {
    file: ClickSet,
    sine: ClickSet,
    triangle: ClickSet,
    sawtooth: ClickSet,
}

impl ClickBank {
    /// Build every set at the output rate. `file_clicks` carries the
    /// decoded tic/toc samples when they loaded; `None` means the file
    /// engine falls back to the generated sine click.
    pub fn new(sample_rate: u32, file_clicks: Option<(ClickSample, ClickSample)>) -> Self {
        let sine = ClickSet::generated(Waveform::Sine, sample_rate);
        let file = match file_clicks {
            Some((tic, toc)) => ClickSet::from_samples(&tic, &toc, sample_rate),
            None => sine.clone(),
        };
        Self {
            file,
            sine,
            triangle: ClickSet::generated(Waveform::Triangle, sample_rate),
            sawtooth: ClickSet::generated(Waveform::Sawtooth, sample_rate),
        }
    }

    /// Select the set for an engine. The reserved MIDI engine substitutes
    /// the sine set.
    pub fn select(&self, engine: SoundEngine) -> &ClickSet {
        match engine {
            SoundEngine::File => &self.file,
            SoundEngine::Sine => &self.sine,
            SoundEngine::Triangle => &self.triangle,
            SoundEngine::Sawtooth => &self.sawtooth,
            SoundEngine::Midi => {
                log::warn!("MIDI sound engine not implemented, using sine click");
                &self.sine
            }
        }
    }
}

/// Render one enveloped click: `wave` at `freq`, exponential decay.
fn synth_click(wave: Waveform, freq: f32, amp: f32, sample_rate: u32) -> Vec<i16> {
    let num_samples = (sample_rate as u64 * CLICK_MS as u64 / 1000) as usize;
    let mut out = Vec::with_capacity(num_samples);
    for i in 0..num_samples {
        let t = i as f32 / num_samples as f32;
        let envelope = (-t * 8.0).exp();
        let phase = i as f32 * freq / sample_rate as f32;
        let value = waveform_value(wave, phase) * envelope * amp;
        out.push((value * i16::MAX as f32) as i16);
    }
    out
}

/// Waveform value at a phase measured in cycles.
fn waveform_value(wave: Waveform, phase: f32) -> f32 {
    let p = phase.fract();
    match wave {
        Waveform::Sine => (2.0 * PI * p).sin(),
        Waveform::Triangle => 4.0 * (p - 0.5).abs() - 1.0,
        Waveform::Sawtooth => 2.0 * p - 1.0,
    }
}

/// Resample to the output rate by stepping a 16.16 fixed-point position
/// through the source with linear interpolation.
fn resample(src: &ClickSample, sample_rate: u32) -> Vec<i16> {
    if src.data.is_empty() || src.rate == 0 || sample_rate == 0 {
        return Vec::new();
    }
    let increment = ((src.rate as u64) << 16) / sample_rate as u64;
    let out_len = ((src.data.len() as u64) << 16) / increment.max(1);

    let mut out = Vec::with_capacity(out_len as usize);
    let mut position: u64 = 0;
    while (position >> 16) + 1 < src.data.len() as u64 {
        let idx = (position >> 16) as usize;
        let frac = (position & 0xFFFF) as i64;
        let a = src.data[idx] as i64;
        let b = src.data[idx + 1] as i64;
        out.push((a + (((b - a) * frac) >> 16)) as i16);
        position += increment;
    }
    out
}
