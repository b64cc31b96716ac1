use super::params::EngineParameters;
use crate::audio::{AudioBlock, AudioBuffer};
use crate::config::EngineConfig;
use crate::dsp::{
    mix, BandShaper, CabinetSim, Compressor, Crossover, Effect, Gain, Gate, ProcessSpec, ToneFilter,
};
use crate::error::{DistroarError, Result};
use log::{debug, info, warn};
use std::fmt;

/// Largest supported channel count (stereo)
pub const MAX_CHANNELS: usize = 2;

/// Lifecycle state of the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EngineState {
    /// No successful prepare yet (or the last one failed)
    #[default]
    Unprepared,
    /// Prepared, blocks pass through untouched
    Bypassed,
    /// Prepared, blocks run through the full chain
    Active,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineState::Unprepared => write!(f, "Unprepared"),
            EngineState::Bypassed => write!(f, "Bypassed"),
            EngineState::Active => write!(f, "Active"),
        }
    }
}

/// Multiband distortion processor
///
/// Signal flow for an active block:
///
/// ```text
/// input gain -> pre-gate -> pre-compressor -> (reference)
///   -> crossover -> band shaper -> recombine -> cabinet
///   -> blend with reference -> tone -> post-compressor -> post-gate -> volume
/// ```
///
/// `prepare` is the only call that allocates. `process` never fails: blocks
/// the engine cannot handle are left untouched.
pub struct DistortionEngine {
    config: EngineConfig,
    state: EngineState,
    spec: Option<ProcessSpec>,

    input_gain: Gain,
    pre_gate: Gate,
    pre_compressor: Compressor,
    crossover: Crossover,
    shaper: BandShaper,
    cabinet: CabinetSim,
    tone: ToneFilter,
    post_compressor: Compressor,
    post_gate: Gate,
    volume: Gain,

    // Scratch, sized max_block_size * channels at prepare
    low: Vec<f32>,
    mid: Vec<f32>,
    high: Vec<f32>,
    reference: Vec<f32>,
}

impl DistortionEngine {
    /// Create an engine with the shipped tuning
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an engine with a custom tuning (validated at prepare)
    pub fn with_config(config: EngineConfig) -> Self {
        let defaults = EngineParameters::default();
        Self {
            input_gain: Gain::new(config.input_gain_db),
            pre_gate: Gate::new(config.gate, defaults.gate_threshold_db),
            pre_compressor: Compressor::new(config.pre_compressor),
            crossover: Crossover::new(config.low_crossover_hz, config.high_crossover_hz),
            shaper: BandShaper::new(defaults.drive),
            cabinet: CabinetSim::new(config.cabinet),
            tone: ToneFilter::new(defaults.tone_cutoff_hz),
            post_compressor: Compressor::new(config.post_compressor),
            post_gate: Gate::new(config.gate, defaults.gate_threshold_db),
            volume: Gain::from_linear(defaults.volume),
            config,
            state: EngineState::Unprepared,
            spec: None,
            low: Vec::new(),
            mid: Vec::new(),
            high: Vec::new(),
            reference: Vec::new(),
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    pub fn is_prepared(&self) -> bool {
        self.state != EngineState::Unprepared
    }

    /// Context of the last successful prepare
    pub fn spec(&self) -> Option<&ProcessSpec> {
        self.spec.as_ref()
    }

    /// Gain reduction of the pre-distortion compressor in dB
    pub fn pre_compressor_reduction_db(&self) -> f32 {
        self.pre_compressor.gain_reduction_db()
    }

    /// Gain reduction of the post-distortion compressor in dB
    pub fn post_compressor_reduction_db(&self) -> f32 {
        self.post_compressor.gain_reduction_db()
    }

    /// Type names of the `Effect` stages in processing order
    pub fn effect_stages(&self) -> [&'static str; 7] {
        [
            self.input_gain.effect_type(),
            self.pre_gate.effect_type(),
            self.pre_compressor.effect_type(),
            self.tone.effect_type(),
            self.post_compressor.effect_type(),
            self.post_gate.effect_type(),
            self.volume.effect_type(),
        ]
    }

    /// Size and clear every stage for the given context
    ///
    /// On error the engine is left unprepared and `process` becomes a no-op.
    pub fn prepare(&mut self, sample_rate: f64, max_block_size: usize, num_channels: usize) -> Result<()> {
        if let Err(e) = self.check_prepare(sample_rate, max_block_size, num_channels) {
            warn!("Rejected engine configuration: {} ({})", e, e.recovery_hint());
            self.state = EngineState::Unprepared;
            self.spec = None;
            return Err(e);
        }

        let spec = ProcessSpec::new(sample_rate, max_block_size, num_channels);
        let config = self.config;
        let pre_threshold = self.pre_gate.threshold_db();
        let post_threshold = self.post_gate.threshold_db();

        self.input_gain = Gain::new(config.input_gain_db);
        self.pre_gate = Gate::new(config.gate, pre_threshold);
        self.pre_compressor = Compressor::new(config.pre_compressor);
        self.crossover = Crossover::new(config.low_crossover_hz, config.high_crossover_hz);
        self.cabinet = CabinetSim::new(config.cabinet);
        self.post_compressor = Compressor::new(config.post_compressor);
        self.post_gate = Gate::new(config.gate, post_threshold);

        self.input_gain.prepare(&spec);
        self.pre_gate.prepare(&spec);
        self.pre_compressor.prepare(&spec);
        self.crossover.prepare(sample_rate, num_channels);
        self.cabinet.prepare(sample_rate);
        self.tone.prepare(&spec);
        self.post_compressor.prepare(&spec);
        self.post_gate.prepare(&spec);
        self.volume.prepare(&spec);

        let capacity = max_block_size * num_channels;
        for scratch in [&mut self.low, &mut self.mid, &mut self.high, &mut self.reference] {
            scratch.clear();
            scratch.resize(capacity, 0.0);
        }

        self.spec = Some(spec);
        self.state = EngineState::Active;
        debug!("Prepared stages: {}", self.effect_stages().join(" -> "));
        info!(
            "Engine prepared: {} Hz, {} frames max, {} channel(s), cabinet magnitude {:.4}",
            sample_rate,
            max_block_size,
            num_channels,
            self.cabinet.magnitude()
        );
        Ok(())
    }

    fn check_prepare(&self, sample_rate: f64, max_block_size: usize, num_channels: usize) -> Result<()> {
        if !(sample_rate.is_finite() && sample_rate > 0.0) {
            return Err(DistroarError::InvalidSampleRate { sample_rate });
        }
        if max_block_size == 0 {
            return Err(DistroarError::InvalidBlockSize {
                block_size: max_block_size,
            });
        }
        if num_channels == 0 || num_channels > MAX_CHANNELS {
            return Err(DistroarError::UnsupportedChannelCount {
                channels: num_channels,
                max: MAX_CHANNELS,
            });
        }
        self.config.validate()
    }

    /// Clear all filter and envelope memory without reallocating
    pub fn reset(&mut self) {
        self.pre_gate.reset();
        self.pre_compressor.reset();
        self.crossover.reset();
        self.tone.reset();
        self.post_compressor.reset();
        self.post_gate.reset();
    }

    /// Process one block in place
    ///
    /// Parameters are sampled once for the whole block. The block is left
    /// untouched when the engine is unprepared or bypassed, when its
    /// channel count differs from the prepared one, or when it holds more
    /// frames than the prepared maximum.
    pub fn process(&mut self, block: &mut AudioBlock<'_>, params: &EngineParameters) {
        let Some(spec) = self.spec else {
            return;
        };
        if block.num_channels() != spec.num_channels || block.num_frames() > spec.max_block_size {
            debug!(
                "Skipping block of {} frames x {} channel(s); prepared for {} x {}",
                block.num_frames(),
                block.num_channels(),
                spec.max_block_size,
                spec.num_channels
            );
            return;
        }

        let params = params.clamped();
        self.update_state(params.enabled);
        if self.state != EngineState::Active || block.is_empty() {
            return;
        }

        let len = block.samples().len();
        let num_channels = spec.num_channels;

        self.input_gain.process(block);

        self.pre_gate.set_threshold_db(params.gate_threshold_db);
        self.pre_gate.process(block);
        self.pre_compressor.process(block);

        let reference = &mut self.reference[..len];
        reference.copy_from_slice(block.samples());

        let low = &mut self.low[..len];
        let mid = &mut self.mid[..len];
        let high = &mut self.high[..len];
        self.crossover.split(reference, low, mid, high, num_channels);

        self.shaper.set_drive(params.drive);
        self.shaper.process(reference, low, mid, high);

        let samples = block.samples_mut();
        mix::recombine(low, mid, high, samples);
        self.cabinet.process(samples, reference);
        mix::blend(samples, reference, params.blend);

        self.tone.set_cutoff_hz(params.tone_cutoff_hz);
        self.tone.process(block);
        self.post_compressor.process(block);

        self.post_gate.set_threshold_db(params.gate_threshold_db);
        self.post_gate.process(block);

        self.volume.set_gain_linear(params.volume);
        self.volume.process(block);
    }

    /// Process an owned buffer in chunks of the prepared block size
    pub fn process_buffer(&mut self, buffer: &mut AudioBuffer, params: &EngineParameters) -> Result<()> {
        let spec = self.spec.ok_or(DistroarError::NotPrepared)?;
        if buffer.num_channels() != spec.num_channels {
            return Err(DistroarError::ChannelMismatch {
                expected: spec.num_channels,
                actual: buffer.num_channels(),
            });
        }

        let chunk_len = spec.max_block_size * spec.num_channels;
        for chunk in buffer.samples_mut().chunks_mut(chunk_len) {
            let mut block = AudioBlock::from_aligned(chunk, spec.num_channels);
            self.process(&mut block, params);
        }
        Ok(())
    }

    fn update_state(&mut self, enabled: bool) {
        let next = if enabled {
            EngineState::Active
        } else {
            EngineState::Bypassed
        };
        if next != self.state {
            debug!("Engine state {} -> {}", self.state, next);
            self.state = next;
        }
    }
}

impl Default for DistortionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DistortionEngine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DistortionEngine")
            .field("state", &self.state)
            .field("spec", &self.spec)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stereo_sine(frames: usize) -> AudioBuffer {
        AudioBuffer::sine_wave(440.0, 0.5, frames as f32 / 44100.0, 2, 44100)
    }

    #[test]
    fn test_starts_unprepared() {
        let engine = DistortionEngine::new();
        assert_eq!(engine.state(), EngineState::Unprepared);
        assert!(engine.spec().is_none());
    }

    #[test]
    fn test_prepare_validation() {
        let mut engine = DistortionEngine::new();
        assert!(matches!(
            engine.prepare(0.0, 512, 2),
            Err(DistroarError::InvalidSampleRate { .. })
        ));
        assert!(matches!(
            engine.prepare(f64::NAN, 512, 2),
            Err(DistroarError::InvalidSampleRate { .. })
        ));
        assert!(matches!(
            engine.prepare(44100.0, 0, 2),
            Err(DistroarError::InvalidBlockSize { .. })
        ));
        assert!(matches!(
            engine.prepare(44100.0, 512, 6),
            Err(DistroarError::UnsupportedChannelCount { channels: 6, max: 2 })
        ));
        assert_eq!(engine.state(), EngineState::Unprepared);

        engine.prepare(44100.0, 512, 2).unwrap();
        assert_eq!(engine.state(), EngineState::Active);
    }

    #[test]
    fn test_failed_prepare_unprepares() {
        let mut engine = DistortionEngine::new();
        engine.prepare(48000.0, 256, 2).unwrap();
        assert!(engine.prepare(-1.0, 256, 2).is_err());
        assert!(!engine.is_prepared());

        let mut buffer = stereo_sine(256);
        let original = buffer.clone();
        engine.process(&mut buffer.as_block(), &EngineParameters::default());
        assert!(buffer.is_identical_to(&original));
    }

    #[test]
    fn test_invalid_config_rejected_at_prepare() {
        let config = EngineConfig {
            low_crossover_hz: 5.0,
            ..EngineConfig::default()
        };
        let mut engine = DistortionEngine::with_config(config);
        let err = engine.prepare(44100.0, 512, 2).unwrap_err();
        assert!(err.is_configuration_error());
        assert_eq!(engine.state(), EngineState::Unprepared);
    }

    #[test]
    fn test_bypass_transitions() {
        let mut engine = DistortionEngine::new();
        engine.prepare(44100.0, 512, 2).unwrap();
        let mut buffer = stereo_sine(512);

        let bypassed = EngineParameters {
            enabled: false,
            ..EngineParameters::default()
        };
        engine.process(&mut buffer.as_block(), &bypassed);
        assert_eq!(engine.state(), EngineState::Bypassed);

        engine.process(&mut buffer.as_block(), &EngineParameters::default());
        assert_eq!(engine.state(), EngineState::Active);
    }

    #[test]
    fn test_wrong_channel_count_is_skipped() {
        let mut engine = DistortionEngine::new();
        engine.prepare(44100.0, 512, 2).unwrap();
        let mut mono = AudioBuffer::sine_wave(440.0, 0.5, 0.01, 1, 44100);
        let original = mono.clone();
        engine.process(&mut mono.as_block(), &EngineParameters::default());
        assert!(mono.is_identical_to(&original));

        assert!(matches!(
            engine.process_buffer(&mut mono, &EngineParameters::default()),
            Err(DistroarError::ChannelMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn test_process_buffer_requires_prepare() {
        let mut engine = DistortionEngine::new();
        let mut buffer = stereo_sine(64);
        assert!(matches!(
            engine.process_buffer(&mut buffer, &EngineParameters::default()),
            Err(DistroarError::NotPrepared)
        ));
    }

    #[test]
    fn test_process_buffer_matches_block_walk() {
        let params = EngineParameters::default();
        let input = stereo_sine(1000);

        let mut chunked = DistortionEngine::new();
        chunked.prepare(44100.0, 128, 2).unwrap();
        let mut a = input.clone();
        chunked.process_buffer(&mut a, &params).unwrap();

        let mut manual = DistortionEngine::new();
        manual.prepare(44100.0, 128, 2).unwrap();
        let mut b = input.clone();
        for chunk in b.samples_mut().chunks_mut(256) {
            manual.process(&mut AudioBlock::new(chunk, 2).unwrap(), &params);
        }
        assert!(a.is_identical_to(&b));
    }

    #[test]
    fn test_mono_is_supported() {
        let mut engine = DistortionEngine::new();
        engine.prepare(48000.0, 256, 1).unwrap();
        let mut buffer = AudioBuffer::sine_wave(220.0, 0.5, 0.05, 1, 48000);
        engine.process_buffer(&mut buffer, &EngineParameters::default()).unwrap();
        assert!(buffer.is_valid());
        assert!(buffer.samples().iter().any(|&s| s != 0.0));
    }

    #[test]
    fn test_effect_stages_follow_chain_order() {
        let engine = DistortionEngine::new();
        assert_eq!(
            engine.effect_stages(),
            ["gain", "gate", "compressor", "tone", "compressor", "gate", "gain"]
        );
    }

    #[test]
    fn test_compressors_report_reduction() {
        let mut engine = DistortionEngine::new();
        engine.prepare(44100.0, 512, 2).unwrap();
        let mut buffer = stereo_sine(4410);
        engine.process_buffer(&mut buffer, &EngineParameters::default()).unwrap();
        assert!(engine.pre_compressor_reduction_db() < -1.0);
        assert!(engine.post_compressor_reduction_db() <= 0.0);
    }
}
