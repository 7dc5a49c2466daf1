//! Two-endpoint log-linear indel error interpolator
//!
//! Models an error-rate curve over repeat counts as a straight line in
//! (repeat count, log rate) space between a low anchor at repeat count 2
//! and a high anchor at the switch point, with a constant plateau beyond.
//! Repeat count 1 (the non-repeat state) is handled by a constant elsewhere
//! and is outside this curve's domain.

/// Log-space rate parameters at one anchor of the curve.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LogRateParams {
    /// Natural log of the indel error rate.
    pub log_error_rate: f64,
    /// Natural log of the noisy-locus rate.
    pub log_noisy_locus_rate: f64,
}

impl LogRateParams {
    /// Anchor with the given log error rate and no noisy-locus signal.
    pub fn from_log_error_rate(log_error_rate: f64) -> Self {
        Self {
            log_error_rate,
            log_noisy_locus_rate: f64::NEG_INFINITY,
        }
    }
}

/// Interpolation is anchored at repeat count 2; count 1 is the non-repeat
/// state and never evaluated through the curve.
const LOW_REPEAT_COUNT: u32 = 2;

/// Piecewise log-linear error model for one repeating pattern size.
#[derive(Debug, Clone, Copy)]
pub struct AdaptiveIndelErrorModel {
    repeat_pattern_size: u32,
    high_repeat_count: u32,
    low_log_params: LogRateParams,
    high_log_params: LogRateParams,
}

impl AdaptiveIndelErrorModel {
    /// Create a curve for one pattern size.
    ///
    /// `high_repeat_count` is the repeat count at which the rate reaches its
    /// plateau; it must exceed the fixed low anchor at 2.
    pub fn new(
        repeat_pattern_size: u32,
        high_repeat_count: u32,
        low_log_params: LogRateParams,
        high_log_params: LogRateParams,
    ) -> Self {
        assert!(
            high_repeat_count > LOW_REPEAT_COUNT,
            "high repeat count must exceed the low anchor at {}",
            LOW_REPEAT_COUNT
        );
        Self {
            repeat_pattern_size,
            high_repeat_count,
            low_log_params,
            high_log_params,
        }
    }

    /// Pattern size this curve applies to.
    pub fn repeat_pattern_size(&self) -> u32 {
        self.repeat_pattern_size
    }

    /// Repeat count at which the plateau begins.
    pub fn high_repeat_count(&self) -> u32 {
        self.high_repeat_count
    }

    /// Indel error rate at the given repeat count.
    ///
    /// `repeat_count` must be greater than 1.
    pub fn error_rate(&self, repeat_count: u32) -> f64 {
        assert!(repeat_count > 1, "repeat count 1 is outside the curve");
        if repeat_count >= self.high_repeat_count {
            return self.high_log_params.log_error_rate.exp();
        }
        linear_fit(
            f64::from(repeat_count),
            f64::from(LOW_REPEAT_COUNT),
            self.low_log_params.log_error_rate,
            f64::from(self.high_repeat_count),
            self.high_log_params.log_error_rate,
        )
        .exp()
    }

    /// Noisy-locus rate at the given repeat count.
    ///
    /// `repeat_count` must be greater than 1.
    pub fn noisy_locus_rate(&self, repeat_count: u32) -> f64 {
        assert!(repeat_count > 1, "repeat count 1 is outside the curve");
        if repeat_count >= self.high_repeat_count {
            return self.high_log_params.log_noisy_locus_rate.exp();
        }
        linear_fit(
            f64::from(repeat_count),
            f64::from(LOW_REPEAT_COUNT),
            self.low_log_params.log_noisy_locus_rate,
            f64::from(self.high_repeat_count),
            self.high_log_params.log_noisy_locus_rate,
        )
        .exp()
    }
}

/// Evaluate the line through (x1, y1) and (x2, y2) at x.
fn linear_fit(x: f64, x1: f64, y1: f64, x2: f64, y2: f64) -> f64 {
    assert!(x1 != x2, "interpolation endpoints must be distinct");
    ((y2 - y1) * x + (x2 * y1 - x1 * y2)) / (x2 - x1)
}
