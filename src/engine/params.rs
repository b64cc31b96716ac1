//! User-facing parameters
//!
//! Sampled once per block by the engine. Every field has a range and a
//! default; `clamped()` folds out-of-range values into the range and
//! replaces non-finite values with the default so the processing path never
//! sees a bad number.

use crate::dsp::gate::{MAX_THRESHOLD_DB, MIN_THRESHOLD_DB};
use crate::dsp::tone::{DEFAULT_TONE_HZ, MAX_TONE_HZ, MIN_TONE_HZ};
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One block's worth of control values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineParameters {
    /// Output level (0 to 1, linear)
    pub volume: f32,
    /// Wet share of the distorted signal (0 = clean reference, 1 = fully distorted)
    pub blend: f32,
    /// Distortion amount (0 to 1)
    pub drive: f32,
    /// Tone low-pass cutoff in Hz (600 to 20000)
    pub tone_cutoff_hz: f32,
    /// Gate threshold in dB (-90 to 0)
    pub gate_threshold_db: f32,
    /// When false the engine leaves blocks untouched
    pub enabled: bool,
}

impl Default for EngineParameters {
    fn default() -> Self {
        Self {
            volume: 0.5,
            blend: 0.5,
            drive: 0.5,
            tone_cutoff_hz: DEFAULT_TONE_HZ,
            gate_threshold_db: -70.0,
            enabled: true,
        }
    }
}

impl EngineParameters {
    /// Light breakup with most of the clean signal kept
    pub fn crunch() -> Self {
        Self {
            blend: 0.35,
            drive: 0.25,
            tone_cutoff_hz: 8000.0,
            ..Self::default()
        }
    }

    /// Fully wet, heavily driven, gated tighter
    pub fn high_gain() -> Self {
        Self {
            blend: 1.0,
            drive: 0.9,
            tone_cutoff_hz: 6500.0,
            gate_threshold_db: -55.0,
            ..Self::default()
        }
    }

    /// Look up a built-in preset by name
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "default" => Some(Self::default()),
            "crunch" => Some(Self::crunch()),
            "high-gain" | "high_gain" => Some(Self::high_gain()),
            _ => None,
        }
    }

    /// Copy with every value folded into its range
    pub fn clamped(&self) -> Self {
        let defaults = Self::default();
        Self {
            volume: clamp_or(self.volume, 0.0, 1.0, defaults.volume),
            blend: clamp_or(self.blend, 0.0, 1.0, defaults.blend),
            drive: clamp_or(self.drive, 0.0, 1.0, defaults.drive),
            tone_cutoff_hz: clamp_or(self.tone_cutoff_hz, MIN_TONE_HZ, MAX_TONE_HZ, defaults.tone_cutoff_hz),
            gate_threshold_db: clamp_or(
                self.gate_threshold_db,
                MIN_THRESHOLD_DB,
                MAX_THRESHOLD_DB,
                defaults.gate_threshold_db,
            ),
            enabled: self.enabled,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)?;
        Ok(params.clamped())
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a JSON preset file; values are clamped on load
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = std::fs::read_to_string(path.as_ref())?;
        Self::from_json(&json)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        Ok(())
    }
}

fn clamp_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}
