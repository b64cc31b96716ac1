//! Borrowed interleaved audio block
//!
//! The host owns the samples for the duration of one call; the engine only
//! ever sees them through this view, so nothing on the processing path
//! allocates.

use crate::error::{DistroarError, Result};

/// Mutable view over one block of interleaved samples: [L0, R0, L1, R1, ...]
#[derive(Debug)]
pub struct AudioBlock<'a> {
    samples: &'a mut [f32],
    num_channels: usize,
}

impl<'a> AudioBlock<'a> {
    /// Wrap an interleaved slice
    pub fn new(samples: &'a mut [f32], num_channels: usize) -> Result<Self> {
        if num_channels == 0 || samples.len() % num_channels != 0 {
            return Err(DistroarError::MisalignedBuffer {
                samples: samples.len(),
                channels: num_channels,
            });
        }
        Ok(Self {
            samples,
            num_channels,
        })
    }

    /// Wrap a slice already known to be aligned to `num_channels`
    pub(crate) fn from_aligned(samples: &'a mut [f32], num_channels: usize) -> Self {
        debug_assert!(num_channels > 0 && samples.len() % num_channels == 0);
        Self {
            samples,
            num_channels,
        }
    }

    /// Number of interleaved channels
    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Number of frames (samples per channel)
    pub fn num_frames(&self) -> usize {
        self.samples.len() / self.num_channels
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// All interleaved samples
    pub fn samples(&self) -> &[f32] {
        &*self.samples
    }

    /// All interleaved samples, mutably
    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut *self.samples
    }

    /// Iterate frames, each frame holding one sample per channel
    pub fn frames_mut(&mut self) -> std::slice::ChunksExactMut<'_, f32> {
        self.samples.chunks_exact_mut(self.num_channels)
    }

    /// Get a sample at the given frame and channel
    pub fn get(&self, frame: usize, channel: usize) -> Option<f32> {
        if channel < self.num_channels {
            self.samples.get(frame * self.num_channels + channel).copied()
        } else {
            None
        }
    }

    /// Set a sample at the given frame and channel (out of range is ignored)
    pub fn set(&mut self, frame: usize, channel: usize, value: f32) {
        if channel < self.num_channels {
            if let Some(sample) = self.samples.get_mut(frame * self.num_channels + channel) {
                *sample = value;
            }
        }
    }

    /// Multiply every sample by a linear gain
    pub fn apply_gain(&mut self, gain: f32) {
        for sample in self.samples.iter_mut() {
            *sample *= gain;
        }
    }
}
