//! Biquad and Linkwitz-Riley filters
//!
//! Second-order sections designed with the Audio EQ Cookbook formulas.
//! A Linkwitz-Riley (LR4) filter is two identical Butterworth sections in
//! cascade, which gives -6 dB at the cutoff and flat summed magnitude
//! across a crossover.
//!
//! Also provides `static_magnitude_at`, the closed-form magnitude response
//! used by the cabinet approximation. It never builds filter state.

use std::f64::consts::{FRAC_1_SQRT_2, PI};

/// Butterworth Q for a single second-order section
pub const BUTTERWORTH_Q: f64 = FRAC_1_SQRT_2;

/// Lowest cutoff any filter will be designed at
const MIN_CUTOFF_HZ: f64 = 10.0;

/// Cutoffs are kept below this fraction of the sample rate
const MAX_CUTOFF_RATIO: f64 = 0.49;

/// Feedback memory below this is flushed to zero
const FLUSH_THRESHOLD: f64 = 1.0e-30;

/// Response type of a filter section
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    /// Remove above frequency
    LowPass,
    /// Remove below frequency
    HighPass,
}

/// Biquad filter coefficients
/// Transfer function: H(z) = (b0 + b1*z^-1 + b2*z^-2) / (1 + a1*z^-1 + a2*z^-2)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BiquadCoeffs {
    pub b0: f64,
    pub b1: f64,
    pub b2: f64,
    pub a1: f64,
    pub a2: f64,
}

impl Default for BiquadCoeffs {
    fn default() -> Self {
        // Unity gain (no filtering)
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
        }
    }
}

impl BiquadCoeffs {
    /// Calculate coefficients for a low- or high-pass section
    ///
    /// The cutoff is clamped into `[10 Hz, 0.49 * sample_rate]`. A
    /// non-positive sample rate returns unity coefficients.
    pub fn design(kind: FilterKind, sample_rate: f64, frequency: f64, q: f64) -> Self {
        if sample_rate <= 0.0 {
            return Self::default();
        }
        let freq = clamp_cutoff(frequency, sample_rate);
        let q = q.max(0.1);

        let w0 = 2.0 * PI * freq / sample_rate;
        let cos_w0 = w0.cos();
        let alpha = w0.sin() / (2.0 * q);

        let (b0, b1, b2) = match kind {
            FilterKind::LowPass => ((1.0 - cos_w0) / 2.0, 1.0 - cos_w0, (1.0 - cos_w0) / 2.0),
            FilterKind::HighPass => ((1.0 + cos_w0) / 2.0, -(1.0 + cos_w0), (1.0 + cos_w0) / 2.0),
        };
        let a0 = 1.0 + alpha;
        let a1 = -2.0 * cos_w0;
        let a2 = 1.0 - alpha;

        // Normalize by a0
        Self {
            b0: b0 / a0,
            b1: b1 / a0,
            b2: b2 / a0,
            a1: a1 / a0,
            a2: a2 / a0,
        }
    }

    /// Magnitude of the frequency response at `frequency`
    pub fn magnitude_at(&self, frequency: f64, sample_rate: f64) -> f64 {
        if sample_rate <= 0.0 {
            return 1.0;
        }
        let w = 2.0 * PI * frequency / sample_rate;
        let (cos_w, sin_w) = (w.cos(), w.sin());
        let (cos_2w, sin_2w) = ((2.0 * w).cos(), (2.0 * w).sin());

        let num_re = self.b0 + self.b1 * cos_w + self.b2 * cos_2w;
        let num_im = -(self.b1 * sin_w + self.b2 * sin_2w);
        let den_re = 1.0 + self.a1 * cos_w + self.a2 * cos_2w;
        let den_im = -(self.a1 * sin_w + self.a2 * sin_2w);

        let den = (den_re * den_re + den_im * den_im).sqrt();
        if den > 0.0 {
            (num_re * num_re + num_im * num_im).sqrt() / den
        } else {
            0.0
        }
    }
}

/// Clamp a cutoff into the designable range for `sample_rate`
pub fn clamp_cutoff(frequency: f64, sample_rate: f64) -> f64 {
    let upper = (sample_rate * MAX_CUTOFF_RATIO).max(MIN_CUTOFF_HZ);
    if frequency.is_finite() {
        frequency.clamp(MIN_CUTOFF_HZ, upper)
    } else {
        upper
    }
}

/// Magnitude of a single Butterworth section, designed at `cutoff_hz`,
/// evaluated at `eval_hz`
///
/// A pure scalar: used where a fixed filter shape is approximated by its
/// gain at one representative frequency.
pub fn static_magnitude_at(kind: FilterKind, cutoff_hz: f64, sample_rate: f64, eval_hz: f64) -> f32 {
    BiquadCoeffs::design(kind, sample_rate, cutoff_hz, BUTTERWORTH_Q).magnitude_at(eval_hz, sample_rate)
        as f32
}

/// Biquad filter state for one channel
#[derive(Debug, Clone, Copy, Default)]
struct BiquadState {
    x1: f64, // x[n-1]
    x2: f64, // x[n-2]
    y1: f64, // y[n-1]
    y2: f64, // y[n-2]
}

impl BiquadState {
    /// Direct Form I
    #[inline]
    fn process(&mut self, input: f64, coeffs: &BiquadCoeffs) -> f64 {
        let output = coeffs.b0 * input + coeffs.b1 * self.x1 + coeffs.b2 * self.x2
            - coeffs.a1 * self.y1
            - coeffs.a2 * self.y2;
        let output = if output.abs() < FLUSH_THRESHOLD { 0.0 } else { output };

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = output;

        output
    }
}

/// Fourth-order Linkwitz-Riley filter with per-channel memory
#[derive(Debug, Clone)]
pub struct LinkwitzRiley {
    kind: FilterKind,
    cutoff_hz: f64,
    sample_rate: f64,
    coeffs: BiquadCoeffs,
    /// Two cascaded sections per channel
    states: Vec<[BiquadState; 2]>,
}

impl LinkwitzRiley {
    pub fn new(kind: FilterKind, cutoff_hz: f64) -> Self {
        Self {
            kind,
            cutoff_hz,
            sample_rate: 0.0,
            coeffs: BiquadCoeffs::default(),
            states: Vec::new(),
        }
    }

    pub fn low_pass(cutoff_hz: f64) -> Self {
        Self::new(FilterKind::LowPass, cutoff_hz)
    }

    pub fn high_pass(cutoff_hz: f64) -> Self {
        Self::new(FilterKind::HighPass, cutoff_hz)
    }

    /// Design coefficients and allocate cleared memory for `num_channels`
    pub fn prepare(&mut self, sample_rate: f64, num_channels: usize) {
        self.sample_rate = sample_rate;
        self.coeffs = BiquadCoeffs::design(self.kind, sample_rate, self.cutoff_hz, BUTTERWORTH_Q);
        self.states.clear();
        self.states.resize(num_channels, [BiquadState::default(); 2]);
    }

    pub fn reset(&mut self) {
        for state in &mut self.states {
            *state = [BiquadState::default(); 2];
        }
    }

    pub fn kind(&self) -> FilterKind {
        self.kind
    }

    pub fn cutoff_hz(&self) -> f64 {
        self.cutoff_hz
    }

    pub fn coeffs(&self) -> &BiquadCoeffs {
        &self.coeffs
    }

    /// Move the cutoff, keeping filter memory intact
    pub fn set_cutoff_hz(&mut self, cutoff_hz: f64) {
        if cutoff_hz == self.cutoff_hz {
            return;
        }
        self.cutoff_hz = cutoff_hz;
        if self.sample_rate > 0.0 {
            self.coeffs = BiquadCoeffs::design(self.kind, self.sample_rate, cutoff_hz, BUTTERWORTH_Q);
        }
    }

    /// Filter one sample of `channel` (unprepared channels pass through)
    #[inline]
    pub fn process_sample(&mut self, channel: usize, input: f32) -> f32 {
        match self.states.get_mut(channel) {
            Some([first, second]) => {
                let stage = first.process(input as f64, &self.coeffs);
                second.process(stage, &self.coeffs) as f32
            }
            None => input,
        }
    }

    /// Filter an interleaved slice in place
    pub fn process_interleaved(&mut self, samples: &mut [f32], num_channels: usize) {
        for frame in samples.chunks_exact_mut(num_channels) {
            for (channel, sample) in frame.iter_mut().enumerate() {
                *sample = self.process_sample(channel, *sample);
            }
        }
    }

    /// Magnitude response of the full cascade at `frequency`
    pub fn magnitude_at(&self, frequency: f64) -> f64 {
        let section = self.coeffs.magnitude_at(frequency, self.sample_rate);
        section * section
    }
}
