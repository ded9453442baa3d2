//! Audio frame type.

/// Volume gain scale: `GAIN_UNITY` means "pass through unchanged".
///
/// Gains are applied with a shift, so the scale is a power of two. The
/// engine-facing volume is a normalized float; it is committed to this
/// integer scale before it reaches the render path.
pub const GAIN_UNITY: u16 = 1024;

/// A stereo audio frame (16-bit integer).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Frame {
    pub left: i16,
    pub right: i16,
}

impl Frame {
    /// Create a silent frame.
    pub const fn silence() -> Self {
        Self { left: 0, right: 0 }
    }

    /// Create a mono frame (same value for both channels).
    pub const fn mono(value: i16) -> Self {
        Self {
            left: value,
            right: value,
        }
    }

    /// Apply an integer gain (0..=GAIN_UNITY scale).
    pub fn apply_gain(&mut self, gain: u16) {
        self.left = ((self.left as i32 * gain as i32) >> 10) as i16;
        self.right = ((self.right as i32 * gain as i32) >> 10) as i16;
    }
}

/// Convert a normalized volume in [0.0, 1.0] to the integer gain scale.
pub fn volume_to_gain(volume: f32) -> u16 {
    (volume.clamp(0.0, 1.0) * GAIN_UNITY as f32).round() as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unity_gain_is_identity() {
        let mut f = Frame::mono(12345);
        f.apply_gain(GAIN_UNITY);
        assert_eq!(f, Frame::mono(12345));
    }

    #[test]
    fn zero_gain_silences() {
        let mut f = Frame::mono(-32768);
        f.apply_gain(0);
        assert_eq!(f, Frame::silence());
    }

    #[test]
    fn half_gain_halves() {
        let mut f = Frame::mono(10000);
        f.apply_gain(GAIN_UNITY / 2);
        assert_eq!(f, Frame::mono(5000));
    }

    #[test]
    fn volume_to_gain_endpoints() {
        assert_eq!(volume_to_gain(0.0), 0);
        assert_eq!(volume_to_gain(1.0), GAIN_UNITY);
        assert_eq!(volume_to_gain(0.5), GAIN_UNITY / 2);
    }

    #[test]
    fn volume_to_gain_clamps_out_of_range() {
        assert_eq!(volume_to_gain(-0.3), 0);
        assert_eq!(volume_to_gain(2.5), GAIN_UNITY);
    }
}
