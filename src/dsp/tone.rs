//! Tone control
//!
//! A fourth-order Linkwitz-Riley low-pass after the blend stage. The cutoff
//! is clamped to the playable range and to below Nyquist; coefficients are
//! only redesigned when the clamped cutoff actually moves, and the filter
//! memory survives the change.

use super::filter::{clamp_cutoff, LinkwitzRiley};
use super::{Effect, ProcessSpec};
use crate::audio::AudioBlock;

/// Lowest tone cutoff in Hz
pub const MIN_TONE_HZ: f32 = 600.0;

/// Highest tone cutoff in Hz
pub const MAX_TONE_HZ: f32 = 20000.0;

/// Cutoff used when none is given
pub const DEFAULT_TONE_HZ: f32 = 10300.0;

#[derive(Debug, Clone)]
pub struct ToneFilter {
    filter: LinkwitzRiley,
    requested_hz: f32,
    sample_rate: f64,
}

impl ToneFilter {
    pub fn new(cutoff_hz: f32) -> Self {
        let requested_hz = clamp_tone(cutoff_hz);
        Self {
            filter: LinkwitzRiley::low_pass(requested_hz as f64),
            requested_hz,
            sample_rate: 0.0,
        }
    }

    /// Cutoff requested by the caller, after range clamping
    pub fn cutoff_hz(&self) -> f32 {
        self.requested_hz
    }

    /// Cutoff the filter is actually designed at
    pub fn effective_cutoff_hz(&self) -> f64 {
        self.filter.cutoff_hz()
    }

    pub fn set_cutoff_hz(&mut self, cutoff_hz: f32) {
        self.requested_hz = clamp_tone(cutoff_hz);
        let effective = self.effective_for(self.requested_hz);
        self.filter.set_cutoff_hz(effective);
    }

    /// Magnitude response at `frequency`, for inspection
    pub fn magnitude_at(&self, frequency: f64) -> f64 {
        self.filter.magnitude_at(frequency)
    }

    fn effective_for(&self, cutoff_hz: f32) -> f64 {
        if self.sample_rate > 0.0 {
            clamp_cutoff(cutoff_hz as f64, self.sample_rate)
        } else {
            cutoff_hz as f64
        }
    }
}

fn clamp_tone(cutoff_hz: f32) -> f32 {
    if cutoff_hz.is_nan() {
        DEFAULT_TONE_HZ
    } else {
        cutoff_hz.clamp(MIN_TONE_HZ, MAX_TONE_HZ)
    }
}

impl Default for ToneFilter {
    fn default() -> Self {
        Self::new(DEFAULT_TONE_HZ)
    }
}

impl Effect for ToneFilter {
    fn prepare(&mut self, spec: &ProcessSpec) {
        self.sample_rate = spec.sample_rate;
        let effective = self.effective_for(self.requested_hz);
        self.filter = LinkwitzRiley::low_pass(effective);
        self.filter.prepare(spec.sample_rate, spec.num_channels);
    }

    fn process(&mut self, block: &mut AudioBlock<'_>) {
        let num_channels = block.num_channels();
        self.filter.process_interleaved(block.samples_mut(), num_channels);
    }

    fn reset(&mut self) {
        self.filter.reset();
    }

    fn effect_type(&self) -> &'static str {
        "tone"
    }
}
