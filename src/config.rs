//! Engine configuration
//!
//! The fixed tuning of the distortion chain: staging gain, crossover points,
//! dynamics and cabinet settings. None of these are user parameters; they
//! are loaded once (JSON) and applied at prepare time. Missing fields fall
//! back to the shipped tuning.

use crate::dsp::crossover::{DEFAULT_HIGH_CROSSOVER_HZ, DEFAULT_LOW_CROSSOVER_HZ};
use crate::dsp::{CabinetSettings, CompressorSettings, GateSettings};
use crate::error::{DistroarError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Static tuning applied when the engine is prepared
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Fixed boost ahead of the pre-gate, in dB
    pub input_gain_db: f32,
    /// Low/mid split in Hz
    pub low_crossover_hz: f32,
    /// Mid/high split in Hz
    pub high_crossover_hz: f32,
    /// Timing shared by the pre and post gates
    pub gate: GateSettings,
    pub pre_compressor: CompressorSettings,
    pub post_compressor: CompressorSettings,
    pub cabinet: CabinetSettings,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            input_gain_db: 10.0,
            low_crossover_hz: DEFAULT_LOW_CROSSOVER_HZ,
            high_crossover_hz: DEFAULT_HIGH_CROSSOVER_HZ,
            gate: GateSettings::default(),
            pre_compressor: CompressorSettings::PRE_DISTORTION,
            post_compressor: CompressorSettings::POST_DISTORTION,
            cabinet: CabinetSettings::default(),
        }
    }
}

impl EngineConfig {
    /// Check every field, reporting the first one out of range
    pub fn validate(&self) -> Result<()> {
        if !(-24.0..=24.0).contains(&self.input_gain_db) {
            return Err(invalid("input_gain_db", self.input_gain_db, "-24 to 24 dB"));
        }
        if !(20.0..=1000.0).contains(&self.low_crossover_hz) {
            return Err(invalid("low_crossover_hz", self.low_crossover_hz, "20 to 1000 Hz"));
        }
        if !(500.0..=16000.0).contains(&self.high_crossover_hz) {
            return Err(invalid("high_crossover_hz", self.high_crossover_hz, "500 to 16000 Hz"));
        }
        if self.high_crossover_hz <= self.low_crossover_hz {
            return Err(invalid(
                "high_crossover_hz",
                self.high_crossover_hz,
                "greater than low_crossover_hz",
            ));
        }
        self.gate.validate()?;
        self.pre_compressor.validate("pre_compressor")?;
        self.post_compressor.validate("post_compressor")?;
        self.cabinet.validate()?;
        Ok(())
    }

    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load and validate a JSON config file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }
}

fn invalid(param: &str, value: f32, expected: &str) -> DistroarError {
    DistroarError::InvalidConfig {
        param: param.to_string(),
        value: value.to_string(),
        expected: expected.to_string(),
    }
}
