//! Audio verification utilities
//!
//! Objective level measurements used by the tests and by the CLI render
//! summary.

/// Convert linear amplitude to decibels
pub fn linear_to_db(linear: f32) -> f32 {
    if linear <= 0.0 {
        f32::NEG_INFINITY
    } else {
        20.0 * linear.log10()
    }
}

/// Convert decibels to linear amplitude
pub fn db_to_linear(db: f32) -> f32 {
    10.0_f32.powf(db / 20.0)
}

/// Calculate RMS (Root Mean Square) of samples
pub fn calculate_rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_squares: f64 = samples.iter().map(|&s| (s as f64) * (s as f64)).sum();
    (sum_squares / samples.len() as f64).sqrt() as f32
}

/// Calculate RMS in decibels
pub fn calculate_rms_db(samples: &[f32]) -> f32 {
    linear_to_db(calculate_rms(samples))
}

/// Calculate peak (maximum absolute value) of samples
pub fn calculate_peak(samples: &[f32]) -> f32 {
    samples.iter().map(|s| s.abs()).fold(0.0_f32, f32::max)
}

/// Calculate DC offset (mean of all samples)
pub fn calculate_dc_offset(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum: f64 = samples.iter().map(|&s| s as f64).sum();
    (sum / samples.len() as f64) as f32
}

/// Level summary of a rendered signal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelReport {
    pub rms_db: f32,
    pub peak_db: f32,
    pub dc_offset: f32,
}

impl LevelReport {
    pub fn measure(samples: &[f32]) -> Self {
        Self {
            rms_db: calculate_rms_db(samples),
            peak_db: linear_to_db(calculate_peak(samples)),
            dc_offset: calculate_dc_offset(samples),
        }
    }
}
