//! Noise Gate effect
//!
//! Attenuates the signal whenever its level falls below the threshold. The
//! chain runs one gate ahead of the waveshapers (keeps noise out of the
//! drive) and one after them (removes the raised noise floor). The two are
//! separate instances with their own envelopes.

use super::envelope::EnvelopeFollower;
use super::{db_to_linear, Effect, ProcessSpec};
use crate::audio::AudioBlock;
use crate::error::{DistroarError, Result};
use serde::{Deserialize, Serialize};

/// Lowest accepted threshold in dB
pub const MIN_THRESHOLD_DB: f32 = -90.0;

/// Highest accepted threshold in dB
pub const MAX_THRESHOLD_DB: f32 = 0.0;

/// Gate timing settings
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GateSettings {
    /// Opening time constant in ms (0.1 to 50)
    pub attack_ms: f32,
    /// Closing time constant in ms (10 to 500)
    pub release_ms: f32,
}

impl Default for GateSettings {
    fn default() -> Self {
        Self {
            attack_ms: 10.0,
            release_ms: 100.0,
        }
    }
}

impl GateSettings {
    /// Validate settings are within range
    pub fn validate(&self) -> Result<()> {
        if !(0.1..=50.0).contains(&self.attack_ms) {
            return Err(DistroarError::InvalidConfig {
                param: "gate.attack_ms".to_string(),
                value: self.attack_ms.to_string(),
                expected: "0.1 to 50 ms".to_string(),
            });
        }
        if !(10.0..=500.0).contains(&self.release_ms) {
            return Err(DistroarError::InvalidConfig {
                param: "gate.release_ms".to_string(),
                value: self.release_ms.to_string(),
                expected: "10 to 500 ms".to_string(),
            });
        }
        Ok(())
    }
}

/// Noise gate with linked stereo detection
///
/// For each frame the loudest channel is compared against the threshold;
/// the resulting gain envelope is applied to every channel of the frame.
/// The envelope starts closed.
#[derive(Debug, Clone)]
pub struct Gate {
    threshold_db: f32,
    threshold_linear: f32,
    envelope: EnvelopeFollower,
}

impl Gate {
    pub fn new(settings: GateSettings, threshold_db: f32) -> Self {
        let threshold_db = clamp_threshold(threshold_db);
        Self {
            threshold_db,
            threshold_linear: db_to_linear(threshold_db),
            envelope: EnvelopeFollower::new(settings.attack_ms, settings.release_ms, 0.0),
        }
    }

    pub fn threshold_db(&self) -> f32 {
        self.threshold_db
    }

    /// Set threshold in dB, clamped to -90..0
    pub fn set_threshold_db(&mut self, threshold_db: f32) {
        let threshold_db = clamp_threshold(threshold_db);
        if threshold_db != self.threshold_db {
            self.threshold_db = threshold_db;
            self.threshold_linear = db_to_linear(threshold_db);
        }
    }

    /// Current gain envelope (0 = closed, 1 = open)
    pub fn gain(&self) -> f32 {
        self.envelope.value()
    }
}

fn clamp_threshold(threshold_db: f32) -> f32 {
    if threshold_db.is_nan() {
        MIN_THRESHOLD_DB
    } else {
        threshold_db.clamp(MIN_THRESHOLD_DB, MAX_THRESHOLD_DB)
    }
}

impl Default for Gate {
    fn default() -> Self {
        Self::new(GateSettings::default(), -70.0)
    }
}

impl Effect for Gate {
    fn prepare(&mut self, spec: &ProcessSpec) {
        self.envelope.prepare(spec.sample_rate);
    }

    fn process(&mut self, block: &mut AudioBlock<'_>) {
        for frame in block.frames_mut() {
            let peak = frame.iter().fold(0.0_f32, |peak, s| peak.max(s.abs()));
            let gain = self.envelope.gate(peak > self.threshold_linear);
            for sample in frame.iter_mut() {
                *sample *= gain;
            }
        }
    }

    fn reset(&mut self) {
        self.envelope.reset();
    }

    fn effect_type(&self) -> &'static str {
        "gate"
    }
}
