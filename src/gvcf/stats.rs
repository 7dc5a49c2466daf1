//! Streaming statistics accumulator
//!
//! Tracks count, mean, variance, min and max of a value stream in O(1)
//! space, so block summaries can be read without replaying site history.
//! The variance update uses Welford's online recurrence, which stays stable
//! over long blocks where a naive sum-of-squares would cancel
//! catastrophically.

/// Online accumulator for one per-site statistic.
#[derive(Debug, Clone, Copy, Default)]
pub struct StreamStat {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl StreamStat {
    /// Create an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the accumulator to its empty state.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Add one observation.
    pub fn add(&mut self, value: f64) {
        if self.count == 0 {
            self.min = value;
            self.max = value;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);
        }
        self.count += 1;
        let delta = value - self.mean;
        self.mean += delta / self.count as f64;
        self.m2 += delta * (value - self.mean);
    }

    /// Number of observations.
    pub fn size(&self) -> u64 {
        self.count
    }

    /// Mean of the observations. Empty accumulators have no mean.
    pub fn mean(&self) -> f64 {
        assert!(self.count > 0, "mean of an empty accumulator");
        self.mean
    }

    /// Sample standard deviation; zero with fewer than two observations.
    pub fn stddev(&self) -> f64 {
        assert!(self.count > 0, "stddev of an empty accumulator");
        if self.count < 2 {
            return 0.0;
        }
        (self.m2 / (self.count - 1) as f64).sqrt()
    }

    /// Smallest observation. Empty accumulators have no minimum.
    pub fn min(&self) -> f64 {
        assert!(self.count > 0, "min of an empty accumulator");
        self.min
    }

    /// Largest observation. Empty accumulators have no maximum.
    pub fn max(&self) -> f64 {
        assert!(self.count > 0, "max of an empty accumulator");
        self.max
    }
}
