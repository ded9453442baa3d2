//! Sample-clock beat scheduler and renderer.
//!
//! The engine renders one frame per call. Beat deadlines are absolute
//! frame numbers computed from a fixed anchor (see `tempo::beat_frame`),
//! so spacing error never accumulates. Parameter changes are staged with
//! `set_params` and committed only at a beat boundary, before that beat
//! is classified and triggered.

use crate::click::{ClickBank, SoundEngine};
use crate::frame::Frame;
use crate::meter::{BeatKind, MeterPattern};
use crate::tempo::{beat_frame, Bpm};

/// The committed parameter block the render path reads.
#[derive(Clone, Debug)]
pub struct EngineParams {
    pub bpm: Bpm,
    /// Integer gain, 0..=GAIN_UNITY.
    pub gain: u16,
    pub meter: MeterPattern,
    pub engine: SoundEngine,
}

impl Default for EngineParams {
    fn default() -> Self {
        Self {
            bpm: Bpm::default(),
            gain: crate::frame::GAIN_UNITY / 2,
            meter: MeterPattern::default(),
            engine: SoundEngine::default(),
        }
    }
}

/// One emitted beat, for the poll/UI surface and for tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BeatEvent {
    /// Absolute frame the beat fired on.
    pub frame: u64,
    /// Total beats since start, 1-based.
    pub count: u64,
    /// Position within the measure, 1-based.
    pub beat_in_measure: u32,
    pub kind: BeatKind,
}

/// Active click playback: which buffer, and how far into it.
#[derive(Clone, Copy, Debug)]
struct Playback {
    kind: BeatKind,
    position: usize,
}

/// The metronome playback engine.
pub struct Engine {
    sample_rate: u32,
    bank: ClickBank,
    params: EngineParams,
    /// Staged parameters, committed at the next beat boundary.
    pending: Option<EngineParams>,
    /// Frames rendered since start.
    frame: u64,
    /// Frame of the last re-anchor (start or tempo change).
    anchor_frame: u64,
    /// Beats emitted since the anchor.
    beats_since_anchor: u64,
    /// Absolute frame of the next beat.
    next_beat: u64,
    /// 1-based beat within the measure; 0 before the first beat.
    beat_in_measure: u32,
    beat_count: u64,
    click: Option<Playback>,
    last_beat: Option<BeatEvent>,
}

impl Engine {
    /// Create an engine. The first beat fires on the first rendered frame.
    pub fn new(bank: ClickBank, params: EngineParams, sample_rate: u32) -> Self {
        Self {
            sample_rate,
            bank,
            params,
            pending: None,
            frame: 0,
            anchor_frame: 0,
            beats_since_anchor: 0,
            next_beat: 0,
            beat_in_measure: 0,
            beat_count: 0,
            click: None,
            last_beat: None,
        }
    }

    /// Stage a new parameter block; it is committed at the next beat
    /// boundary, never mid-beat.
    pub fn set_params(&mut self, params: EngineParams) {
        self.pending = Some(params);
    }

    /// True when the next `render_frame` call lands on a beat boundary.
    pub fn at_beat_boundary(&self) -> bool {
        self.frame == self.next_beat
    }

    /// Generate one frame of audio.
    pub fn render_frame(&mut self) -> Frame {
        if self.frame == self.next_beat {
            self.start_beat();
        }

        let mut out = Frame::silence();
        if let Some(Playback { kind, position }) = self.click {
            let sample = self
                .bank
                .select(self.params.engine)
                .buffer(kind)
                .and_then(|buf| buf.get(position).copied());
            match sample {
                Some(value) => {
                    out = Frame::mono(value);
                    out.apply_gain(self.params.gain);
                    self.click = Some(Playback { kind, position: position + 1 });
                }
                None => self.click = None,
            }
        }

        self.frame += 1;
        out
    }

    /// Generate a block of frames (offline rendering and tests).
    pub fn render_frames(&mut self, count: usize) -> Vec<Frame> {
        (0..count).map(|_| self.render_frame()).collect()
    }

    /// Take the most recent beat event, if one fired since the last call.
    pub fn take_beat(&mut self) -> Option<BeatEvent> {
        self.last_beat.take()
    }

    /// Frames rendered since start.
    pub fn position(&self) -> u64 {
        self.frame
    }

    pub fn beat_count(&self) -> u64 {
        self.beat_count
    }

    /// 1-based beat within the measure (0 before the first beat).
    pub fn beat_in_measure(&self) -> u32 {
        self.beat_in_measure
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Commit pending parameters, classify and trigger the beat, and
    /// schedule the next deadline from the anchor.
    fn start_beat(&mut self) {
        if let Some(params) = self.pending.take() {
            if params.bpm != self.params.bpm {
                // New tempo starts its period at this boundary
                self.anchor_frame = self.frame;
                self.beats_since_anchor = 0;
            }
            self.params = params;
        }

        let meter = self.params.meter.beats();
        self.beat_in_measure = if self.beat_in_measure >= meter {
            1
        } else {
            self.beat_in_measure + 1
        };
        self.beat_count += 1;

        let kind = if self.params.gain == 0 {
            BeatKind::Muted
        } else {
            self.params.meter.classify(self.beat_in_measure)
        };

        // Restarting from sample 0 means a retrigger can never overlap
        self.click = Some(Playback { kind, position: 0 });
        self.last_beat = Some(BeatEvent {
            frame: self.frame,
            count: self.beat_count,
            beat_in_measure: self.beat_in_measure,
            kind,
        });

        self.beats_since_anchor += 1;
        self.next_beat = beat_frame(
            self.anchor_frame,
            self.beats_since_anchor,
            self.params.bpm,
            self.sample_rate,
        );
    }
}
