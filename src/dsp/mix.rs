//! Band recombination and dry/wet blending

/// Sum the three bands into `out`
pub fn recombine(low: &[f32], mid: &[f32], high: &[f32], out: &mut [f32]) {
    let bands = low.iter().zip(mid.iter()).zip(high.iter());
    for (sample, ((&low, &mid), &high)) in out.iter_mut().zip(bands) {
        *sample = low + mid + high;
    }
}

/// Crossfade `out` against `reference` in place
///
/// `amount` is the wet share: 0 keeps only the reference, 1 keeps only the
/// processed signal. Values outside 0..1 are clamped.
pub fn blend(out: &mut [f32], reference: &[f32], amount: f32) {
    let wet = if amount.is_nan() { 0.0 } else { amount.clamp(0.0, 1.0) };
    let dry = 1.0 - wet;
    for (sample, &reference) in out.iter_mut().zip(reference.iter()) {
        *sample = dry * reference + wet * *sample;
    }
}
