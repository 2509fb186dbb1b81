//! First-order IIR low-pass filter.
//!
//! One prior output sample per axis is retained as state and blended with
//! each new input: `y[n] = y[n-1] + alpha * (x[n] - y[n-1])`. State persists
//! across acquisitions and is never reset by the pipeline.

/// Blend factor applied to every axis of both signals.
pub const IIR_ALPHA: f32 = 0.2;

/// Single-channel low-pass filter state.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct LowPass {
    state: f32,
    alpha: f32,
}

impl LowPass {
    /// Creates a filter with the given blend factor and zeroed state.
    #[must_use]
    pub const fn new(alpha: f32) -> Self {
        Self { state: 0.0, alpha }
    }

    /// Feeds one input sample and returns the new filtered output.
    pub fn update(&mut self, input: f32) -> f32 {
        self.state += self.alpha * (input - self.state);
        self.state
    }

    /// Returns the most recent filtered output.
    #[must_use]
    pub const fn value(&self) -> f32 {
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_response_follows_closed_form() {
        // From zero state with constant input X, n updates yield
        // X * (1 - (1 - alpha)^n).
        let mut filter = LowPass::new(IIR_ALPHA);
        let input = 1.5_f32;

        let mut expected_decay = 1.0_f32;
        for _ in 0..8 {
            let output = filter.update(input);
            expected_decay *= 1.0 - IIR_ALPHA;
            let expected = input * (1.0 - expected_decay);
            assert!((output - expected).abs() < 1e-6);
        }
    }

    #[test]
    fn converges_towards_constant_input() {
        let mut filter = LowPass::new(IIR_ALPHA);
        for _ in 0..64 {
            filter.update(-0.25);
        }
        assert!((filter.value() - -0.25).abs() < 1e-5);
    }

    #[test]
    fn state_survives_between_updates() {
        let mut filter = LowPass::new(IIR_ALPHA);
        filter.update(10.0);
        let first = filter.value();
        filter.update(10.0);
        assert!(filter.value() > first);
    }
}
