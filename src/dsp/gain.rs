//! Gain Effect
//!
//! Static gain stage with a dB-based interface. Used for the fixed input
//! boost ahead of the gate and for the output volume.

use super::{db_to_linear, linear_to_db, Effect, ProcessSpec};
use crate::audio::AudioBlock;

/// Minimum gain in dB (-96 dB = effectively silent)
const MIN_GAIN_DB: f32 = -96.0;

/// Maximum gain in dB (+24 dB)
const MAX_GAIN_DB: f32 = 24.0;

/// Simple gain adjustment
///
/// # Parameters
/// - `gain_db`: Gain in decibels (-96 to +24 dB)
///
/// # Example
/// ```
/// use distroar::audio::AudioBlock;
/// use distroar::dsp::{Effect, Gain};
///
/// let mut gain = Gain::new(-6.0);
/// let mut samples = vec![1.0_f32; 4];
/// gain.process(&mut AudioBlock::new(&mut samples, 2).unwrap());
/// assert!((samples[0] - 0.501).abs() < 1e-3);
/// ```
#[derive(Debug, Clone)]
pub struct Gain {
    gain_db: f32,
    gain_linear: f32,
}

impl Gain {
    /// Create a gain stage from dB, clamped to the valid range
    pub fn new(gain_db: f32) -> Self {
        let mut gain = Self {
            gain_db: 0.0,
            gain_linear: 1.0,
        };
        gain.set_gain_db(gain_db);
        gain
    }

    /// Create a gain stage from a linear multiplier (0 or more)
    pub fn from_linear(gain_linear: f32) -> Self {
        let mut gain = Self::new(0.0);
        gain.set_gain_linear(gain_linear);
        gain
    }

    pub fn set_gain_db(&mut self, db: f32) {
        let db = if db.is_nan() { 0.0 } else { db.clamp(MIN_GAIN_DB, MAX_GAIN_DB) };
        self.gain_db = db;
        self.gain_linear = db_to_linear(db);
    }

    /// Set a linear multiplier directly; negative or NaN values mute
    pub fn set_gain_linear(&mut self, gain_linear: f32) {
        let max_linear = db_to_linear(MAX_GAIN_DB);
        self.gain_linear = if gain_linear.is_nan() {
            0.0
        } else {
            gain_linear.clamp(0.0, max_linear)
        };
        self.gain_db = linear_to_db(self.gain_linear).max(MIN_GAIN_DB);
    }

    pub fn gain_db(&self) -> f32 {
        self.gain_db
    }

    pub fn gain_linear(&self) -> f32 {
        self.gain_linear
    }
}

impl Default for Gain {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Effect for Gain {
    fn prepare(&mut self, _spec: &ProcessSpec) {
        // Stateless
    }

    fn process(&mut self, block: &mut AudioBlock<'_>) {
        // Unity gain optimization
        if self.gain_linear == 1.0 {
            return;
        }
        block.apply_gain(self.gain_linear);
    }

    fn reset(&mut self) {}

    fn effect_type(&self) -> &'static str {
        "gain"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_gain_db_conversion() {
        let gain = Gain::new(0.0);
        assert_relative_eq!(gain.gain_linear(), 1.0, epsilon = 0.001);

        let gain = Gain::new(-6.0);
        assert_relative_eq!(gain.gain_linear(), 0.501, epsilon = 0.01);

        let gain = Gain::new(10.0);
        assert_relative_eq!(gain.gain_linear(), 3.162, epsilon = 0.01);
    }

    #[test]
    fn test_gain_clamping() {
        assert_eq!(Gain::new(-200.0).gain_db(), MIN_GAIN_DB);
        assert_eq!(Gain::new(100.0).gain_db(), MAX_GAIN_DB);
    }

    #[test]
    fn test_linear_gain() {
        let gain = Gain::from_linear(0.5);
        assert_relative_eq!(gain.gain_db(), -6.0206, epsilon = 1e-3);
        assert_eq!(Gain::from_linear(0.0).gain_db(), MIN_GAIN_DB);
        assert_eq!(Gain::from_linear(-1.0).gain_linear(), 0.0);
    }

    #[test]
    fn test_gain_processing() {
        let mut gain = Gain::new(-6.0);
        gain.prepare(&ProcessSpec::new(48000.0, 512, 2));

        let mut samples = vec![1.0_f32; 200];
        gain.process(&mut AudioBlock::new(&mut samples, 2).unwrap());

        assert!(samples.iter().all(|&s| (s - 0.501).abs() < 0.01));
    }

    #[test]
    fn test_unity_gain_is_bit_exact() {
        let mut gain = Gain::default();
        let mut samples = vec![0.1_f32, -0.3, 0.7, 1.0e-20];
        let original = samples.clone();
        gain.process(&mut AudioBlock::new(&mut samples, 1).unwrap());
        assert_eq!(samples, original);
    }
}
