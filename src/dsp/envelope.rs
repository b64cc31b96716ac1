//! One-pole attack/release envelope follower
//!
//! Shared smoothing primitive for the noise gates (gain envelope) and the
//! compressors (peak level detector).

/// One-pole smoothing coefficient for a time constant
///
/// `coeff = exp(-1 / (tau * sample_rate))`. A non-positive time constant or
/// sample rate gives 0, i.e. the follower jumps straight to its target.
pub fn time_constant_coeff(time_ms: f32, sample_rate: f64) -> f32 {
    let samples = (time_ms as f64 / 1000.0) * sample_rate;
    if samples > 0.0 {
        (-1.0 / samples).exp() as f32
    } else {
        0.0
    }
}

/// Values below this are flushed to zero so decays never go subnormal
const FLUSH_THRESHOLD: f32 = 1.0e-15;

/// Attack/release envelope follower
///
/// `state = coeff * state + (1 - coeff) * target`, using the attack
/// coefficient while the target is above the current state and the release
/// coefficient otherwise.
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    attack_ms: f32,
    release_ms: f32,
    attack_coeff: f32,
    release_coeff: f32,
    /// Value restored by `reset`
    initial: f32,
    value: f32,
}

impl EnvelopeFollower {
    /// Create a follower starting at `initial`
    ///
    /// Coefficients stay at zero until `prepare` supplies a sample rate.
    pub fn new(attack_ms: f32, release_ms: f32, initial: f32) -> Self {
        Self {
            attack_ms,
            release_ms,
            attack_coeff: 0.0,
            release_coeff: 0.0,
            initial,
            value: initial,
        }
    }

    /// Derive coefficients from the sample rate and reset the state
    pub fn prepare(&mut self, sample_rate: f64) {
        self.attack_coeff = time_constant_coeff(self.attack_ms, sample_rate);
        self.release_coeff = time_constant_coeff(self.release_ms, sample_rate);
        self.reset();
    }

    pub fn reset(&mut self) {
        self.value = self.initial;
    }

    /// Current smoothed value
    pub fn value(&self) -> f32 {
        self.value
    }

    pub fn attack_coeff(&self) -> f32 {
        self.attack_coeff
    }

    pub fn release_coeff(&self) -> f32 {
        self.release_coeff
    }

    /// Advance one sample toward `target`
    #[inline]
    pub fn follow(&mut self, target: f32) -> f32 {
        let coeff = if target > self.value {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        let value = coeff * self.value + (1.0 - coeff) * target;
        self.value = if value.abs() < FLUSH_THRESHOLD { 0.0 } else { value };
        self.value
    }

    /// Advance one sample of a gate envelope: open (1) above threshold,
    /// closed (0) below
    #[inline]
    pub fn gate(&mut self, above_threshold: bool) -> f32 {
        self.follow(if above_threshold { 1.0 } else { 0.0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_coefficient_formula() {
        let coeff = time_constant_coeff(10.0, 44100.0);
        assert_relative_eq!(coeff, (-1.0f64 / 441.0).exp() as f32, epsilon = 1e-7);
        assert_eq!(time_constant_coeff(0.0, 44100.0), 0.0);
        assert_eq!(time_constant_coeff(10.0, 0.0), 0.0);
    }

    #[test]
    fn test_attack_reaches_63_percent_after_one_time_constant() {
        let mut env = EnvelopeFollower::new(10.0, 100.0, 0.0);
        env.prepare(44100.0);
        for _ in 0..441 {
            env.gate(true);
        }
        assert_relative_eq!(env.value(), 1.0 - (-1.0f32).exp(), epsilon = 1e-3);
    }

    #[test]
    fn test_release_is_slower_than_attack() {
        let mut env = EnvelopeFollower::new(10.0, 100.0, 1.0);
        env.prepare(44100.0);
        for _ in 0..441 {
            env.gate(false);
        }
        // One attack time constant is a tenth of the release constant.
        assert!(env.value() > 0.9);
        assert!(env.attack_coeff() < env.release_coeff());
    }

    #[test]
    fn test_reset_restores_initial_value() {
        let mut env = EnvelopeFollower::new(1.0, 1.0, 0.25);
        env.prepare(48000.0);
        env.follow(1.0);
        assert!(env.value() > 0.25);
        env.reset();
        assert_eq!(env.value(), 0.25);
    }

    #[test]
    fn test_release_settles_to_exact_zero() {
        let mut env = EnvelopeFollower::new(10.0, 100.0, 1.0);
        env.prepare(48000.0);
        for _ in 0..48000 * 20 {
            env.follow(0.0);
        }
        assert_eq!(env.value(), 0.0);
    }

    #[test]
    fn test_zero_rate_jumps_to_target() {
        let mut env = EnvelopeFollower::new(10.0, 100.0, 0.0);
        env.prepare(0.0);
        assert_eq!(env.follow(0.7), 0.7);
        assert_eq!(env.follow(0.2), 0.2);
    }

    #[test]
    fn test_never_leaves_unit_range_for_gate_targets() {
        let mut env = EnvelopeFollower::new(0.1, 0.1, 0.0);
        env.prepare(96000.0);
        for i in 0..10_000 {
            let v = env.gate(i % 7 < 3);
            assert!((0.0..=1.0).contains(&v));
        }
    }
}
