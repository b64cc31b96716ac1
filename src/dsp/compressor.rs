//! Compressor effect
//!
//! Feed-forward compressor with a per-channel peak envelope. The chain runs
//! two instances: a gentle leveler ahead of the waveshapers and a heavy one
//! after them to tame the extra peak density.

use super::envelope::EnvelopeFollower;
use super::{db_to_linear, linear_to_db, Effect, ProcessSpec};
use crate::audio::AudioBlock;
use crate::error::{DistroarError, Result};
use serde::{Deserialize, Serialize};

/// Compressor settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CompressorSettings {
    /// Threshold level in dB (-60 to 0 dB)
    pub threshold_db: f32,
    /// Compression ratio (1.0 to 20.0, representing 1:1 to 20:1)
    pub ratio: f32,
    /// Attack time in milliseconds (0.1 to 100 ms)
    pub attack_ms: f32,
    /// Release time in milliseconds (10 to 1000 ms)
    pub release_ms: f32,
}

impl CompressorSettings {
    /// Mild leveling stage ahead of the waveshapers
    pub const PRE_DISTORTION: Self = Self {
        threshold_db: -20.0,
        ratio: 2.0,
        attack_ms: 10.0,
        release_ms: 100.0,
    };

    /// Heavy stage after the waveshapers
    pub const POST_DISTORTION: Self = Self {
        threshold_db: -10.0,
        ratio: 12.0,
        attack_ms: 10.0,
        release_ms: 80.0,
    };

    /// Validate settings against their ranges
    pub fn validate(&self, name: &str) -> Result<()> {
        check_range(name, "threshold_db", self.threshold_db, -60.0, 0.0, "-60 to 0 dB")?;
        check_range(name, "ratio", self.ratio, 1.0, 20.0, "1 to 20")?;
        check_range(name, "attack_ms", self.attack_ms, 0.1, 100.0, "0.1 to 100 ms")?;
        check_range(name, "release_ms", self.release_ms, 10.0, 1000.0, "10 to 1000 ms")?;
        Ok(())
    }
}

impl Default for CompressorSettings {
    fn default() -> Self {
        Self::PRE_DISTORTION
    }
}

fn check_range(name: &str, param: &str, value: f32, min: f32, max: f32, expected: &str) -> Result<()> {
    if !(min..=max).contains(&value) {
        return Err(DistroarError::InvalidConfig {
            param: format!("{}.{}", name, param),
            value: value.to_string(),
            expected: expected.to_string(),
        });
    }
    Ok(())
}

/// Feed-forward compressor dynamics processor
///
/// Each channel tracks its own peak envelope; gain is unity below the
/// threshold and `(env / threshold)^(1/ratio - 1)` above it. No look-ahead
/// and no makeup gain.
#[derive(Debug, Clone)]
pub struct Compressor {
    settings: CompressorSettings,
    threshold_linear: f32,
    /// Exponent applied to the over-threshold ratio: 1/ratio - 1
    gain_exponent: f32,
    /// Peak level detector per channel
    envelopes: Vec<EnvelopeFollower>,
    /// Last applied gain per channel (linear), for metering
    gain_reduction: Vec<f32>,
}

impl Compressor {
    pub fn new(settings: CompressorSettings) -> Self {
        Self {
            settings,
            threshold_linear: db_to_linear(settings.threshold_db),
            gain_exponent: 1.0 / settings.ratio.max(1.0) - 1.0,
            envelopes: Vec::new(),
            gain_reduction: Vec::new(),
        }
    }

    pub fn settings(&self) -> &CompressorSettings {
        &self.settings
    }

    /// Get the current gain reduction in dB for metering (0 or negative)
    pub fn gain_reduction_db(&self) -> f32 {
        // Report the channel with the most reduction
        let deepest = self.gain_reduction.iter().copied().fold(1.0_f32, f32::min);
        if deepest > 0.0 {
            linear_to_db(deepest)
        } else {
            -96.0
        }
    }

    /// Gain for a detected envelope level
    #[inline]
    fn gain_for(&self, envelope: f32) -> f32 {
        if envelope < self.threshold_linear {
            1.0
        } else {
            (envelope / self.threshold_linear).powf(self.gain_exponent)
        }
    }
}

impl Effect for Compressor {
    fn prepare(&mut self, spec: &ProcessSpec) {
        let mut envelope = EnvelopeFollower::new(self.settings.attack_ms, self.settings.release_ms, 0.0);
        envelope.prepare(spec.sample_rate);
        self.envelopes = vec![envelope; spec.num_channels];
        self.gain_reduction = vec![1.0; spec.num_channels];
    }

    fn process(&mut self, block: &mut AudioBlock<'_>) {
        let num_channels = block.num_channels().min(self.envelopes.len());

        for frame in block.frames_mut() {
            for (channel, sample) in frame.iter_mut().enumerate().take(num_channels) {
                let envelope = self.envelopes[channel].follow(sample.abs());
                let gain = self.gain_for(envelope);
                self.gain_reduction[channel] = gain;
                *sample *= gain;
            }
        }
    }

    fn reset(&mut self) {
        for envelope in &mut self.envelopes {
            envelope.reset();
        }
        for gr in &mut self.gain_reduction {
            *gr = 1.0;
        }
    }

    fn effect_type(&self) -> &'static str {
        "compressor"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn prepared(settings: CompressorSettings, channels: usize) -> Compressor {
        let mut comp = Compressor::new(settings);
        comp.prepare(&ProcessSpec::new(44100.0, 512, channels));
        comp
    }

    #[test]
    fn test_fixed_stage_settings() {
        let pre = CompressorSettings::PRE_DISTORTION;
        assert_eq!((pre.threshold_db, pre.ratio, pre.attack_ms, pre.release_ms), (-20.0, 2.0, 10.0, 100.0));
        let post = CompressorSettings::POST_DISTORTION;
        assert_eq!((post.threshold_db, post.ratio, post.attack_ms, post.release_ms), (-10.0, 12.0, 10.0, 80.0));
        assert!(pre.validate("pre").is_ok());
        assert!(post.validate("post").is_ok());
    }

    #[test]
    fn test_validation_names_the_parameter() {
        let settings = CompressorSettings {
            ratio: 0.5,
            ..CompressorSettings::PRE_DISTORTION
        };
        match settings.validate("pre_compressor") {
            Err(DistroarError::InvalidConfig { param, .. }) => assert_eq!(param, "pre_compressor.ratio"),
            other => panic!("expected InvalidConfig, got {:?}", other),
        }
    }

    #[test]
    fn test_below_threshold_is_untouched() {
        let mut comp = prepared(CompressorSettings::PRE_DISTORTION, 1);
        let mut data = vec![0.05_f32; 4410];
        let original = data.clone();
        comp.process(&mut AudioBlock::new(&mut data, 1).unwrap());
        assert_eq!(data, original);
        assert_eq!(comp.gain_reduction_db(), 0.0);
    }

    #[test]
    fn test_steady_state_follows_ratio() {
        // 0 dB in, -20 dB threshold, 2:1 -> -10 dB out once settled
        let mut comp = prepared(CompressorSettings::PRE_DISTORTION, 1);
        let mut data = vec![1.0_f32; 44100];
        comp.process(&mut AudioBlock::new(&mut data, 1).unwrap());
        assert_relative_eq!(*data.last().unwrap(), 10.0_f32.powf(-0.5), epsilon = 1e-3);
        assert_relative_eq!(comp.gain_reduction_db(), -10.0, epsilon = 0.05);
    }

    #[test]
    fn test_heavy_ratio_holds_output_near_threshold() {
        let mut comp = prepared(CompressorSettings::POST_DISTORTION, 1);
        let mut data = vec![1.0_f32; 44100];
        comp.process(&mut AudioBlock::new(&mut data, 1).unwrap());
        let out_db = linear_to_db(*data.last().unwrap());
        assert_relative_eq!(out_db, -10.0 + 10.0 / 12.0, epsilon = 0.05);
    }

    #[test]
    fn test_channels_are_independent() {
        let mut comp = prepared(CompressorSettings::PRE_DISTORTION, 2);
        let mut data: Vec<f32> = (0..2000).flat_map(|_| [1.0_f32, 0.01]).collect();
        comp.process(&mut AudioBlock::new(&mut data, 2).unwrap());
        assert!(data[data.len() - 2] < 0.9);
        assert_eq!(data[data.len() - 1], 0.01);
    }

    #[test]
    fn test_reset_clears_envelopes() {
        let mut comp = prepared(CompressorSettings::POST_DISTORTION, 1);
        let mut loud = vec![1.0_f32; 2000];
        comp.process(&mut AudioBlock::new(&mut loud, 1).unwrap());
        comp.reset();
        let mut first = vec![1.0_f32];
        comp.process(&mut AudioBlock::new(&mut first, 1).unwrap());

        let mut fresh = prepared(CompressorSettings::POST_DISTORTION, 1);
        let mut expected = vec![1.0_f32];
        fresh.process(&mut AudioBlock::new(&mut expected, 1).unwrap());
        assert_eq!(first, expected);
    }

    #[test]
    fn test_envelope_decays_to_zero_in_silence() {
        let mut comp = prepared(CompressorSettings::POST_DISTORTION, 1);
        let mut loud = vec![1.0_f32; 4410];
        comp.process(&mut AudioBlock::new(&mut loud, 1).unwrap());

        let mut silence = vec![0.0_f32; 44100 * 20];
        comp.process(&mut AudioBlock::new(&mut silence, 1).unwrap());
        assert_eq!(comp.gain_reduction_db(), 0.0);
        assert!(comp.envelopes.iter().all(|env| env.value() == 0.0));
    }

    #[test]
    fn test_output_is_finite_for_extreme_input() {
        let mut comp = prepared(CompressorSettings::POST_DISTORTION, 2);
        let mut data = vec![1.0e6_f32, -1.0e6, 0.0, 1.0e-30];
        comp.process(&mut AudioBlock::new(&mut data, 2).unwrap());
        assert!(data.iter().all(|s| s.is_finite()));
    }
}
