//! Three-band crossover
//!
//! Low and high bands come from LR4 low-pass and high-pass filters. The
//! mid band is whatever is left: `mid = full - low - high`. The split is a
//! linear decomposition, so the three bands always sum back to the input.

use super::filter::LinkwitzRiley;

/// Default low/mid split in Hz
pub const DEFAULT_LOW_CROSSOVER_HZ: f32 = 200.0;

/// Default mid/high split in Hz
pub const DEFAULT_HIGH_CROSSOVER_HZ: f32 = 2000.0;

/// Splits interleaved blocks into low, mid and high bands
#[derive(Debug, Clone)]
pub struct Crossover {
    low_pass: LinkwitzRiley,
    high_pass: LinkwitzRiley,
}

impl Crossover {
    pub fn new(low_crossover_hz: f32, high_crossover_hz: f32) -> Self {
        Self {
            low_pass: LinkwitzRiley::low_pass(low_crossover_hz as f64),
            high_pass: LinkwitzRiley::high_pass(high_crossover_hz as f64),
        }
    }

    /// Design both filters and clear their memory
    pub fn prepare(&mut self, sample_rate: f64, num_channels: usize) {
        self.low_pass.prepare(sample_rate, num_channels);
        self.high_pass.prepare(sample_rate, num_channels);
    }

    pub fn reset(&mut self) {
        self.low_pass.reset();
        self.high_pass.reset();
    }

    pub fn low_crossover_hz(&self) -> f64 {
        self.low_pass.cutoff_hz()
    }

    pub fn high_crossover_hz(&self) -> f64 {
        self.high_pass.cutoff_hz()
    }

    /// Split `input` into the three band slices
    ///
    /// All slices are interleaved with `num_channels` channels and must have
    /// the same length.
    pub fn split(
        &mut self,
        input: &[f32],
        low: &mut [f32],
        mid: &mut [f32],
        high: &mut [f32],
        num_channels: usize,
    ) {
        debug_assert!(low.len() == input.len() && mid.len() == input.len() && high.len() == input.len());

        let bands = low.iter_mut().zip(mid.iter_mut()).zip(high.iter_mut());
        for (i, (&full, ((low, mid), high))) in input.iter().zip(bands).enumerate() {
            let channel = i % num_channels;
            *low = self.low_pass.process_sample(channel, full);
            *high = self.high_pass.process_sample(channel, full);
            *mid = full - *low - *high;
        }
    }
}

impl Default for Crossover {
    fn default() -> Self {
        Self::new(DEFAULT_LOW_CROSSOVER_HZ, DEFAULT_HIGH_CROSSOVER_HZ)
    }
}
