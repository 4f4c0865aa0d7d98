//! Tracking-error time series: the only telemetry-derived data retained
//! across ticks.
//!
//! Fixed-capacity FIFO of the most recent samples. The session time origin
//! is fixed at the first valid sample ever received and is never recomputed,
//! even after that sample is evicted, so plotted relative times stay stable.

use serde::Serialize;
use std::collections::VecDeque;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ErrorSample {
    /// Seconds since the session time origin.
    pub t_rel: f64,
    pub error_x: f64,
    pub error_y: f64,
}

#[derive(Debug, Clone)]
pub struct ErrorSeries {
    capacity: usize,
    origin: Option<f64>,
    samples: VecDeque<ErrorSample>,
}

impl ErrorSeries {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            origin: None,
            samples: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a sample taken at absolute time `t_abs` (epoch seconds).
    ///
    /// A non-finite timestamp drops the sample without touching the origin.
    /// On overflow the oldest sample is evicted first. Returns whether the
    /// sample was appended.
    pub fn push(&mut self, t_abs: f64, error_x: f64, error_y: f64) -> bool {
        if !t_abs.is_finite() {
            return false;
        }
        let origin = *self.origin.get_or_insert(t_abs);
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(ErrorSample {
            t_rel: t_abs - origin,
            error_x,
            error_y,
        });
        true
    }

    /// Session time origin (epoch seconds of the first valid sample).
    pub fn origin(&self) -> Option<f64> {
        self.origin
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ErrorSample> {
        self.samples.iter()
    }

    /// Owned copy for view snapshots.
    pub fn to_vec(&self) -> Vec<ErrorSample> {
        self.samples.iter().copied().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_beyond_capacity_and_keeps_origin() {
        let mut s = ErrorSeries::new(200);
        for i in 0..250 {
            assert!(s.push(1000.0 + i as f64, i as f64, -(i as f64)));
        }
        assert_eq!(s.len(), 200);
        // Origin stays at the very first sample even though it was evicted.
        assert_eq!(s.origin(), Some(1000.0));
        let first = s.iter().next().unwrap();
        assert_eq!(first.t_rel, 50.0);
        assert_eq!(first.error_x, 50.0);
        let last = s.iter().last().unwrap();
        assert_eq!(last.t_rel, 249.0);
    }

    #[test]
    fn non_finite_timestamp_drops_sample_and_origin_untouched() {
        let mut s = ErrorSeries::new(10);
        assert!(!s.push(f64::NAN, 1.0, 1.0));
        assert!(s.is_empty());
        assert_eq!(s.origin(), None);

        assert!(s.push(5.0, 1.0, 2.0));
        assert!(!s.push(f64::INFINITY, 9.0, 9.0));
        assert_eq!(s.len(), 1);
        assert_eq!(s.origin(), Some(5.0));
    }

    #[test]
    fn first_sample_has_zero_relative_time() {
        let mut s = ErrorSeries::new(10);
        s.push(123.25, 0.5, -0.5);
        assert_eq!(s.iter().next().unwrap().t_rel, 0.0);
    }

    #[test]
    fn zero_capacity_is_clamped_to_one() {
        let mut s = ErrorSeries::new(0);
        s.push(1.0, 0.0, 0.0);
        s.push(2.0, 1.0, 1.0);
        assert_eq!(s.len(), 1);
        assert_eq!(s.iter().next().unwrap().t_rel, 1.0);
    }
}
