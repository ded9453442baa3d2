//! Tempo bounds and beat-deadline math.
//!
//! Beat deadlines are computed on the sample clock from a fixed anchor:
//! `anchor + n * 60 * sample_rate / bpm`, with the division done last, so
//! rounding error never accumulates beat-over-beat.

/// Lowest accepted tempo.
pub const MIN_BPM: u16 = 30;

/// Highest accepted tempo.
pub const MAX_BPM: u16 = 299;

/// A tempo in beats per minute, always within [MIN_BPM, MAX_BPM].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Bpm(u16);

impl Bpm {
    /// Build a tempo, clamping out-of-range input to the nearest bound.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(MIN_BPM as i64, MAX_BPM as i64) as u16)
    }

    pub fn get(self) -> u16 {
        self.0
    }
}

impl Default for Bpm {
    fn default() -> Self {
        Self(60)
    }
}

/// Absolute frame of the `n`-th beat after `anchor` at the given tempo.
///
/// Error is bounded by one frame regardless of `n` (truncating division
/// happens once, on the full product).
pub fn beat_frame(anchor: u64, n: u64, bpm: Bpm, sample_rate: u32) -> u64 {
    let num = n as u128 * 60 * sample_rate as u128;
    anchor + (num / bpm.0 as u128) as u64
}

struct TempoName {
    min: u16,
    max: u16,
    name: &'static str,
}

// Classical tempo markings keyed by BPM range, used for the speed label.
static TEMPO_NAMES: [TempoName; 10] = [
    TempoName { min: 10, max: 39, name: "Grave" },
    TempoName { min: 40, max: 59, name: "Largo" },
    TempoName { min: 60, max: 65, name: "Larghetto" },
    TempoName { min: 66, max: 75, name: "Lento/Adagio" },
    TempoName { min: 76, max: 107, name: "Andante" },
    TempoName { min: 108, max: 119, name: "Moderato" },
    TempoName { min: 120, max: 169, name: "Allegro" },
    TempoName { min: 170, max: 184, name: "Vivace" },
    TempoName { min: 185, max: 209, name: "Presto" },
    TempoName { min: 210, max: 500, name: "Prestissimo" },
];

/// Look up the classical tempo name for a BPM value.
pub fn tempo_name(bpm: u16) -> &'static str {
    for entry in &TEMPO_NAMES {
        if bpm >= entry.min && bpm <= entry.max {
            return entry.name;
        }
    }
    ""
}
