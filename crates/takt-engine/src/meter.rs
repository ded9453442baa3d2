//! Meter and accent pattern state.
//!
//! Pure data: no I/O, no timing. The accent pattern always has exactly
//! `beats` entries; resizing the meter preserves every accent still in
//! range and drops the rest.

/// Lowest accepted beats-per-measure.
pub const MIN_METER: u32 = 1;

/// Highest accepted beats-per-measure.
pub const MAX_METER: u32 = 100;

/// How a single beat should be rendered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BeatKind {
    /// Emphasized beat (louder, brighter click).
    Accent,
    /// Ordinary beat.
    Normal,
    /// Disabled beat: renders silence.
    Muted,
}

/// Beats-per-measure plus which beat indices are accented.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MeterPattern {
    beats: u32,
    /// accents[i] marks beat i+1 (beats are 1-based).
    accents: Vec<bool>,
}

impl MeterPattern {
    /// Create a pattern with the given beat count (clamped) and no accents.
    pub fn new(beats: i64) -> Self {
        let beats = clamp_meter(beats);
        Self {
            beats,
            accents: vec![false; beats as usize],
        }
    }

    pub fn beats(&self) -> u32 {
        self.beats
    }

    pub fn accents(&self) -> &[bool] {
        &self.accents
    }

    /// Change the beat count (clamped), keeping accents that remain in
    /// range. Growing adds unaccented beats. Returns the committed count.
    pub fn resize(&mut self, beats: i64) -> u32 {
        let beats = clamp_meter(beats);
        self.accents.resize(beats as usize, false);
        self.beats = beats;
        beats
    }

    /// Mark or clear the accent on a 1-based beat index. Out-of-range
    /// indices are clamped to the nearest valid beat, and the committed
    /// index is returned.
    pub fn set_accent(&mut self, beat: i64, accented: bool) -> u32 {
        let beat = beat.clamp(1, self.beats as i64) as u32;
        self.accents[(beat - 1) as usize] = accented;
        beat
    }

    /// True if the 1-based beat index is accented.
    pub fn is_accented(&self, beat: u32) -> bool {
        beat >= 1 && self.accents.get((beat - 1) as usize).copied().unwrap_or(false)
    }

    /// Classify a 1-based beat-in-measure index.
    pub fn classify(&self, beat: u32) -> BeatKind {
        if self.is_accented(beat) {
            BeatKind::Accent
        } else {
            BeatKind::Normal
        }
    }
}

impl Default for MeterPattern {
    fn default() -> Self {
        Self::new(1)
    }
}

fn clamp_meter(beats: i64) -> u32 {
    beats.clamp(MIN_METER as i64, MAX_METER as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_pattern_has_no_accents() {
        let p = MeterPattern::new(4);
        assert_eq!(p.beats(), 4);
        assert!(p.accents().iter().all(|&a| !a));
    }

    #[test]
    fn meter_clamps_to_bounds() {
        assert_eq!(MeterPattern::new(0).beats(), MIN_METER);
        assert_eq!(MeterPattern::new(-7).beats(), MIN_METER);
        assert_eq!(MeterPattern::new(1000).beats(), MAX_METER);
    }

    #[test]
    fn resize_reports_clamped_value() {
        let mut p = MeterPattern::new(4);
        assert_eq!(p.resize(101), MAX_METER);
        assert_eq!(p.resize(0), MIN_METER);
    }

    #[test]
    fn accents_only_within_meter() {
        let mut p = MeterPattern::new(4);
        p.set_accent(1, true);
        p.set_accent(4, true);
        for n in 1..=100 {
            p.resize(n);
            for (i, &a) in p.accents().iter().enumerate() {
                if a {
                    assert!(i < n as usize);
                }
            }
        }
    }

    #[test]
    fn shrink_preserves_in_range_accents_and_drops_rest() {
        let mut p = MeterPattern::new(6);
        p.set_accent(1, true);
        p.set_accent(3, true);
        p.set_accent(5, true);

        p.resize(4);
        assert!(p.is_accented(1));
        assert!(p.is_accented(3));
        assert!(!p.is_accented(4));
        // Beat 5 was dropped with the shrink
        assert_eq!(p.accents().len(), 4);
    }

    #[test]
    fn grow_preserves_accents_and_adds_none() {
        let mut p = MeterPattern::new(3);
        p.set_accent(2, true);

        p.resize(8);
        assert!(p.is_accented(2));
        for beat in [1, 3, 4, 5, 6, 7, 8] {
            assert!(!p.is_accented(beat), "beat {} unexpectedly accented", beat);
        }
    }

    #[test]
    fn shrink_then_regrow_does_not_resurrect_accents() {
        let mut p = MeterPattern::new(6);
        p.set_accent(6, true);
        p.resize(2);
        p.resize(6);
        assert!(!p.is_accented(6));
    }

    #[test]
    fn set_accent_clamps_index() {
        let mut p = MeterPattern::new(4);
        assert_eq!(p.set_accent(99, true), 4);
        assert!(p.is_accented(4));
        assert_eq!(p.set_accent(0, true), 1);
        assert!(p.is_accented(1));
    }

    #[test]
    fn classify_accented_and_normal() {
        let mut p = MeterPattern::new(4);
        p.set_accent(1, true);
        assert_eq!(p.classify(1), BeatKind::Accent);
        assert_eq!(p.classify(2), BeatKind::Normal);
        assert_eq!(p.classify(4), BeatKind::Normal);
    }

    #[test]
    fn out_of_range_beat_is_not_accented() {
        let p = MeterPattern::new(4);
        assert!(!p.is_accented(0));
        assert!(!p.is_accented(5));
    }
}
