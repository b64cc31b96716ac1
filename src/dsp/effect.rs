//! Effect trait definition
//!
//! Shared lifecycle for every in-place stage of the distortion chain.

use crate::audio::AudioBlock;

/// Processing context handed to every stage at prepare time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSpec {
    /// Sample rate in Hz (validated > 0 by the engine)
    pub sample_rate: f64,
    /// Largest block, in frames, that will be passed to `process`
    pub max_block_size: usize,
    /// Interleaved channel count of every block
    pub num_channels: usize,
}

impl ProcessSpec {
    pub fn new(sample_rate: f64, max_block_size: usize, num_channels: usize) -> Self {
        Self {
            sample_rate,
            max_block_size,
            num_channels,
        }
    }
}

/// Base trait for in-place DSP stages
///
/// `prepare` is the only call allowed to allocate. `process` must be
/// bounded by the block length and must not allocate or block.
pub trait Effect: Send {
    /// Size internal state for the given context and clear it
    fn prepare(&mut self, spec: &ProcessSpec);

    /// Process the block in place
    fn process(&mut self, block: &mut AudioBlock<'_>);

    /// Clear filter/envelope memory without reallocating
    fn reset(&mut self);

    /// Get the effect type identifier
    fn effect_type(&self) -> &'static str;
}
