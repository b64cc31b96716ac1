//! Per-band waveshaping and cabinet approximation
//!
//! Each crossover band gets its own transfer curve:
//!
//! - **Low**: pre-limited, then `tanh`, then boosted back up to make up for
//!   the headroom the clipping eats.
//! - **Mid**: a soft `x / (1 + k|x|)` knee into `tanh`. This band carries
//!   most of the perceived gain.
//! - **High**: clamped to a narrow window, rounded with `atan`, and mixed
//!   with the unshaped band to keep pick articulation without fizz.
//!
//! The drive each band sees is scaled by an adaptive compensation factor
//! computed from the full-band dry sample: `1 + 0.5 / (0.4 + |x|)`. Quiet
//! passages get proportionally more drive than loud ones.
//!
//! After recombination the cabinet stage scales the sum by the static
//! magnitude of a fixed low-pass/high-pass pair at one frequency, soft clips
//! it and mixes a little dry signal back in.

use super::filter::{static_magnitude_at, FilterKind};
use crate::error::{DistroarError, Result};
use serde::{Deserialize, Serialize};

/// Drive parameter (0..1) to internal drive amount
pub const DRIVE_SCALE: f32 = 5.5;

// Adaptive compensation: COMP_OFFSET + COMP_NUMERATOR / (COMP_GUARD + |x|)
const COMP_OFFSET: f32 = 1.0;
const COMP_NUMERATOR: f32 = 0.5;
const COMP_GUARD: f32 = 0.4;

// Pre-saturation softening of the dry sample
const SOFTEN_LINEAR: f32 = 0.85;
const SOFTEN_SINE: f32 = 0.15;
const SOFTEN_FREQ: f32 = 1.1;

const LOW_DRIVE: f32 = 0.75;
const LOW_KNEE: f32 = 0.4;
const LOW_SATURATION: f32 = 3.5;
const LOW_BOOST: f32 = 1.1;

const MID_DRIVE: f32 = 0.85;
const MID_KNEE: f32 = 0.45;
const MID_SATURATION: f32 = 3.0;
const MID_LEVEL: f32 = 1.05;

const HIGH_DRIVE: f32 = 0.65;
const HIGH_LIMIT: f32 = 0.3;
const HIGH_LINEAR: f32 = 0.75;
const HIGH_ROUNDING: f32 = 0.25;
const HIGH_ROUNDING_GAIN: f32 = 1.3;
const HIGH_SHAPED_MIX: f32 = 0.6;
const HIGH_DRY_MIX: f32 = 0.4;

/// Cabinet soft clip gain
const CABINET_SATURATION: f32 = 1.1;

/// Gentle sine-based rounding of the dry sample before it feeds the
/// compensation detector
#[inline]
pub fn soften(dry: f32) -> f32 {
    dry * SOFTEN_LINEAR + (dry * SOFTEN_FREQ).sin() * SOFTEN_SINE
}

/// Level-dependent drive multiplier, always > 1 and bounded by
/// `1 + 0.5 / 0.4`
#[inline]
pub fn drive_compensation(dry: f32) -> f32 {
    COMP_OFFSET + COMP_NUMERATOR / (COMP_GUARD + soften(dry).abs())
}

/// Low band: pre-limit, `tanh` saturation, level boost
#[inline]
pub fn shape_low(sample: f32, adaptive_drive: f32) -> f32 {
    let x = sample * (1.0 + adaptive_drive * LOW_DRIVE);
    let x = x / (1.0 + x.abs() * LOW_KNEE);
    (x * LOW_SATURATION).tanh() * LOW_BOOST
}

/// Mid band: soft knee into `tanh`
#[inline]
pub fn shape_mid(sample: f32, adaptive_drive: f32) -> f32 {
    let x = sample * (1.0 + adaptive_drive * MID_DRIVE);
    let x = x / (1.0 + x.abs() * MID_KNEE);
    (x * MID_SATURATION).tanh() * MID_LEVEL
}

/// High band: hard limit, `atan` rounding, blend with the unshaped band
#[inline]
pub fn shape_high(sample: f32, adaptive_drive: f32) -> f32 {
    let x = (sample * (1.0 + adaptive_drive * HIGH_DRIVE)).clamp(-HIGH_LIMIT, HIGH_LIMIT);
    let x = x * HIGH_LINEAR + (x * HIGH_ROUNDING_GAIN).atan() * HIGH_ROUNDING;
    x * HIGH_SHAPED_MIX + sample * HIGH_DRY_MIX
}

/// Applies the three band curves with adaptive drive
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandShaper {
    drive: f32,
}

impl BandShaper {
    pub fn new(drive: f32) -> Self {
        let mut shaper = Self { drive: 0.0 };
        shaper.set_drive(drive);
        shaper
    }

    /// Set the drive parameter (0..1, clamped)
    pub fn set_drive(&mut self, drive: f32) {
        self.drive = if drive.is_nan() { 0.0 } else { drive.clamp(0.0, 1.0) };
    }

    pub fn drive(&self) -> f32 {
        self.drive
    }

    /// Effective drive for one dry sample
    #[inline]
    pub fn adaptive_drive(&self, dry: f32) -> f32 {
        self.drive * DRIVE_SCALE * drive_compensation(dry)
    }

    /// Shape the band slices in place
    ///
    /// `dry` is the full-band signal the bands were split from; all slices
    /// share the same interleaved layout and length.
    pub fn process(&self, dry: &[f32], low: &mut [f32], mid: &mut [f32], high: &mut [f32]) {
        debug_assert!(low.len() == dry.len() && mid.len() == dry.len() && high.len() == dry.len());

        let bands = low.iter_mut().zip(mid.iter_mut()).zip(high.iter_mut());
        for (&dry, ((low, mid), high)) in dry.iter().zip(bands) {
            let drive = self.adaptive_drive(dry);
            *low = shape_low(*low, drive);
            *mid = shape_mid(*mid, drive);
            *high = shape_high(*high, drive);
        }
    }
}

impl Default for BandShaper {
    fn default() -> Self {
        Self::new(0.5)
    }
}

/// Cabinet approximation settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CabinetSettings {
    /// Speaker roll-off low-pass corner in Hz
    pub low_pass_hz: f32,
    /// Speaker low-end high-pass corner in Hz
    pub high_pass_hz: f32,
    /// Frequency the static response is evaluated at
    pub eval_hz: f32,
    /// Wet share of the cabinet output (the rest is dry signal)
    pub wet: f32,
}

impl Default for CabinetSettings {
    fn default() -> Self {
        Self {
            low_pass_hz: 3800.0,
            high_pass_hz: 80.0,
            eval_hz: 3800.0,
            wet: 0.97,
        }
    }
}

impl CabinetSettings {
    pub fn validate(&self) -> Result<()> {
        let invalid = |param: &str, value: f32, expected: &str| DistroarError::InvalidConfig {
            param: format!("cabinet.{}", param),
            value: value.to_string(),
            expected: expected.to_string(),
        };
        if !(20.0..=20000.0).contains(&self.low_pass_hz) {
            return Err(invalid("low_pass_hz", self.low_pass_hz, "20 to 20000 Hz"));
        }
        if !(10.0..=2000.0).contains(&self.high_pass_hz) {
            return Err(invalid("high_pass_hz", self.high_pass_hz, "10 to 2000 Hz"));
        }
        if !(20.0..=20000.0).contains(&self.eval_hz) {
            return Err(invalid("eval_hz", self.eval_hz, "20 to 20000 Hz"));
        }
        if !(0.5..=1.0).contains(&self.wet) {
            return Err(invalid("wet", self.wet, "0.5 to 1.0"));
        }
        Ok(())
    }
}

/// Static cabinet approximation
///
/// Holds a single scalar computed at prepare time; there is no filter
/// memory.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CabinetSim {
    settings: CabinetSettings,
    magnitude: f32,
}

impl CabinetSim {
    pub fn new(settings: CabinetSettings) -> Self {
        Self {
            settings,
            magnitude: 1.0,
        }
    }

    /// Evaluate the static response for `sample_rate`
    pub fn prepare(&mut self, sample_rate: f64) {
        let eval_hz = self.settings.eval_hz as f64;
        self.magnitude = static_magnitude_at(FilterKind::LowPass, self.settings.low_pass_hz as f64, sample_rate, eval_hz)
            * static_magnitude_at(FilterKind::HighPass, self.settings.high_pass_hz as f64, sample_rate, eval_hz);
    }

    /// Combined static magnitude applied to the recombined signal
    pub fn magnitude(&self) -> f32 {
        self.magnitude
    }

    /// Cabinet one sample given the recombined band sum and the dry sample
    #[inline]
    pub fn apply_sample(&self, sum: f32, dry: f32) -> f32 {
        let cab = (sum * self.magnitude * CABINET_SATURATION).tanh();
        cab * self.settings.wet + dry * (1.0 - self.settings.wet)
    }

    /// Cabinet the recombined signal in place against its dry reference
    pub fn process(&self, samples: &mut [f32], dry: &[f32]) {
        for (sample, &dry) in samples.iter_mut().zip(dry.iter()) {
            *sample = self.apply_sample(*sample, dry);
        }
    }
}

impl Default for CabinetSim {
    fn default() -> Self {
        Self::new(CabinetSettings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use test_case::test_case;

    #[test]
    fn test_compensation_favours_quiet_samples() {
        let quiet = drive_compensation(0.01);
        let loud = drive_compensation(0.9);
        assert!(quiet > loud);
        assert!(quiet <= 1.0 + 0.5 / 0.4);
        assert!(loud > 1.0);
    }

    #[test_case(0.0 ; "silence")]
    #[test_case(1.0e6 ; "huge positive")]
    #[test_case(-1.0e6 ; "huge negative")]
    fn test_curves_stay_finite(x: f32) {
        let shaper = BandShaper::new(1.0);
        let drive = shaper.adaptive_drive(x);
        assert!(drive.is_finite());
        assert!(shape_low(x, drive).is_finite());
        assert!(shape_mid(x, drive).is_finite());
        assert!(shape_high(x, drive).is_finite());
    }

    #[test]
    fn test_low_and_mid_are_bounded() {
        for i in -100..=100 {
            let x = i as f32 * 0.5;
            assert!(shape_low(x, 5.5).abs() <= LOW_BOOST + 1e-6);
            assert!(shape_mid(x, 5.5).abs() <= MID_LEVEL + 1e-6);
        }
    }

    #[test]
    fn test_curves_are_odd_symmetric() {
        for &x in &[0.01_f32, 0.1, 0.5, 2.0] {
            assert_relative_eq!(shape_low(-x, 2.0), -shape_low(x, 2.0), epsilon = 1e-6);
            assert_relative_eq!(shape_mid(-x, 2.0), -shape_mid(x, 2.0), epsilon = 1e-6);
            assert_relative_eq!(shape_high(-x, 2.0), -shape_high(x, 2.0), epsilon = 1e-6);
        }
    }

    #[test]
    fn test_high_band_keeps_unshaped_share() {
        // Far beyond the limiter the shaped part saturates; the dry share keeps growing.
        let a = shape_high(1.0, 0.0);
        let b = shape_high(2.0, 0.0);
        assert_relative_eq!(b - a, HIGH_DRY_MIX, epsilon = 1e-6);
    }

    #[test]
    fn test_zero_drive_still_shapes() {
        let shaper = BandShaper::new(0.0);
        assert_eq!(shaper.adaptive_drive(0.3), 0.0);
        let mut low = vec![0.1_f32];
        let mut mid = vec![0.1_f32];
        let mut high = vec![0.1_f32];
        shaper.process(&[0.3], &mut low, &mut mid, &mut high);
        assert!(low[0] > 0.1 && mid[0] > 0.1 && high[0] > 0.0);
    }

    #[test]
    fn test_more_drive_means_more_saturation() {
        let gentle = BandShaper::new(0.1);
        let hot = BandShaper::new(1.0);
        let x = 0.05;
        assert!(shape_mid(x, hot.adaptive_drive(x)) > shape_mid(x, gentle.adaptive_drive(x)));
    }

    #[test]
    fn test_drive_is_clamped() {
        assert_eq!(BandShaper::new(3.0).drive(), 1.0);
        assert_eq!(BandShaper::new(-1.0).drive(), 0.0);
        assert_eq!(BandShaper::new(f32::NAN).drive(), 0.0);
    }

    #[test]
    fn test_cabinet_magnitude_matches_closed_form() {
        let mut cab = CabinetSim::default();
        cab.prepare(44100.0);
        // Low-pass evaluated at its own corner is -3 dB; the 80 Hz high-pass is flat there.
        assert_relative_eq!(cab.magnitude(), std::f32::consts::FRAC_1_SQRT_2, epsilon = 1e-3);
    }

    #[test]
    fn test_cabinet_keeps_dry_share() {
        let mut cab = CabinetSim::default();
        cab.prepare(48000.0);
        assert_relative_eq!(cab.apply_sample(0.0, 1.0), 0.03, epsilon = 1e-6);
        let mut samples = vec![100.0_f32, -100.0];
        cab.process(&mut samples, &[0.0, 0.0]);
        assert_relative_eq!(samples[0], 0.97, epsilon = 1e-4);
        assert_relative_eq!(samples[1], -0.97, epsilon = 1e-4);
    }

    #[test]
    fn test_cabinet_settings_validation() {
        assert!(CabinetSettings::default().validate().is_ok());
        let bad = CabinetSettings {
            wet: 1.5,
            ..CabinetSettings::default()
        };
        assert!(bad.validate().is_err());
    }
}
