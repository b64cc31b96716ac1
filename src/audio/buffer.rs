//! Audio buffer implementation
//!
//! AudioBuffer is the owned container used for offline renders and tests.

use super::AudioBlock;
use crate::error::{DistroarError, Result};

/// Interleaved audio samples with metadata
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    /// Interleaved audio samples, nominally -1.0..1.0
    samples: Vec<f32>,
    /// Number of audio channels (1 = mono, 2 = stereo)
    num_channels: usize,
    /// Sample rate in Hz
    sample_rate: u32,
}

impl AudioBuffer {
    /// Create a silent buffer with the given number of frames
    pub fn new(num_channels: usize, num_frames: usize, sample_rate: u32) -> Self {
        let num_channels = num_channels.max(1);
        Self {
            samples: vec![0.0; num_channels * num_frames],
            num_channels,
            sample_rate,
        }
    }

    /// Create a buffer from existing interleaved samples
    pub fn from_interleaved(samples: Vec<f32>, num_channels: usize, sample_rate: u32) -> Result<Self> {
        if samples.is_empty() {
            return Err(DistroarError::EmptyBuffer);
        }
        if num_channels == 0 || samples.len() % num_channels != 0 {
            return Err(DistroarError::MisalignedBuffer {
                samples: samples.len(),
                channels: num_channels,
            });
        }
        Ok(Self {
            samples,
            num_channels,
            sample_rate,
        })
    }

    /// Create a sine test tone, identical on every channel
    pub fn sine_wave(
        frequency: f32,
        amplitude: f32,
        duration_secs: f32,
        num_channels: usize,
        sample_rate: u32,
    ) -> Self {
        let num_frames = (duration_secs * sample_rate as f32) as usize;
        let mut buffer = Self::new(num_channels, num_frames, sample_rate);
        let channels = buffer.num_channels;

        for (i, frame) in buffer.samples.chunks_exact_mut(channels).enumerate() {
            let t = i as f64 / sample_rate as f64;
            let value = amplitude * (2.0 * std::f64::consts::PI * frequency as f64 * t).sin() as f32;
            frame.fill(value);
        }

        buffer
    }

    /// Create a constant (DC) buffer
    pub fn constant(value: f32, num_frames: usize, num_channels: usize, sample_rate: u32) -> Self {
        let mut buffer = Self::new(num_channels, num_frames, sample_rate);
        buffer.samples.fill(value);
        buffer
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Number of frames (samples per channel)
    pub fn num_frames(&self) -> usize {
        self.samples.len() / self.num_channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Duration in seconds
    pub fn duration(&self) -> f64 {
        self.num_frames() as f64 / self.sample_rate as f64
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    /// Borrow the whole buffer as a processing block
    pub fn as_block(&mut self) -> AudioBlock<'_> {
        AudioBlock::from_aligned(&mut self.samples, self.num_channels)
    }

    /// Get a sample at the given frame and channel
    pub fn get(&self, frame: usize, channel: usize) -> Option<f32> {
        if frame < self.num_frames() && channel < self.num_channels {
            Some(self.samples[frame * self.num_channels + channel])
        } else {
            None
        }
    }

    /// Set a sample at the given frame and channel
    pub fn set(&mut self, frame: usize, channel: usize, value: f32) {
        if frame < self.num_frames() && channel < self.num_channels {
            self.samples[frame * self.num_channels + channel] = value;
        }
    }

    /// Get samples for a specific channel (0-indexed)
    pub fn channel_samples(&self, channel: usize) -> Vec<f32> {
        if channel >= self.num_channels {
            return Vec::new();
        }
        self.samples
            .iter()
            .skip(channel)
            .step_by(self.num_channels)
            .copied()
            .collect()
    }

    /// Interleaved samples from `start_frame` to the end
    pub fn tail_from(&self, start_frame: usize) -> &[f32] {
        let start = (start_frame * self.num_channels).min(self.samples.len());
        &self.samples[start..]
    }

    /// Check that every sample is finite
    pub fn is_valid(&self) -> bool {
        self.samples.iter().all(|s| s.is_finite())
    }

    /// Check if buffers are identical (bit-perfect comparison)
    pub fn is_identical_to(&self, other: &AudioBuffer) -> bool {
        self.num_channels == other.num_channels
            && self.sample_rate == other.sample_rate
            && self.samples.len() == other.samples.len()
            && self
                .samples
                .iter()
                .zip(other.samples.iter())
                .all(|(a, b)| a.to_bits() == b.to_bits())
    }

    /// Check if buffers are approximately equal within tolerance
    pub fn is_approx_equal(&self, other: &AudioBuffer, tolerance: f32) -> bool {
        if self.num_channels != other.num_channels || self.samples.len() != other.samples.len() {
            return false;
        }
        self.samples
            .iter()
            .zip(other.samples.iter())
            .all(|(a, b)| (a - b).abs() <= tolerance)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_buffer() {
        let buf = AudioBuffer::new(2, 1000, 44100);
        assert_eq!(buf.num_channels(), 2);
        assert_eq!(buf.num_frames(), 1000);
        assert_eq!(buf.sample_rate(), 44100);
        assert!(buf.samples().iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_sine_wave_generation() {
        let buffer = AudioBuffer::sine_wave(440.0, 0.5, 1.0, 2, 44100);
        assert_eq!(buffer.num_frames(), 44100);
        assert!((buffer.duration() - 1.0).abs() < 0.001);
        assert_eq!(buffer.channel_samples(0), buffer.channel_samples(1));
        let peak = buffer.samples().iter().fold(0.0_f32, |m, s| m.max(s.abs()));
        assert!((peak - 0.5).abs() < 1e-3);
    }

    #[test]
    fn test_channel_extraction() {
        let samples = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let buffer = AudioBuffer::from_interleaved(samples, 2, 44100).unwrap();
        assert_eq!(buffer.channel_samples(0), vec![1.0, 3.0, 5.0]);
        assert_eq!(buffer.channel_samples(1), vec![2.0, 4.0, 6.0]);
        assert_eq!(buffer.tail_from(2), &[5.0, 6.0]);
    }

    #[test]
    fn test_empty_buffer_error() {
        let result = AudioBuffer::from_interleaved(vec![], 1, 44100);
        assert!(matches!(result, Err(DistroarError::EmptyBuffer)));
    }

    #[test]
    fn test_is_valid() {
        let mut buf = AudioBuffer::new(1, 100, 44100);
        assert!(buf.is_valid());
        buf.set(50, 0, f32::NAN);
        assert!(!buf.is_valid());
    }

    #[test]
    fn test_identical_is_bitwise() {
        let a = AudioBuffer::constant(0.0, 4, 1, 44100);
        let b = AudioBuffer::constant(-0.0, 4, 1, 44100);
        assert!(a.is_approx_equal(&b, 0.0));
        assert!(!a.is_identical_to(&b));
    }
}
