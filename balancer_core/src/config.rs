//! Runtime configuration for the session core.
//!
//! Separate from the TOML-deserialized schema in `balancer_config`; see
//! `conversions` for the mapping.

use crate::error::BuildError;

/// Knobs for the reconciliation core.
#[derive(Debug, Clone)]
pub struct SessionCfg {
    /// Trajectory tick period in milliseconds (fixed wall-clock period).
    pub tick_ms: u64,
    /// Substituted when the operator enters a non-finite or negative
    /// trajectory frequency.
    pub default_frequency_hz: f64,
    /// Safety margin subtracted from the horizontal half-extent when
    /// capping the trajectory radius.
    pub radius_margin: f64,
    /// Arrow-pad nudge distance per press.
    pub target_step: f64,
    /// Error time-series capacity (samples).
    pub series_capacity: usize,
}

impl Default for SessionCfg {
    fn default() -> Self {
        Self {
            tick_ms: 50,
            default_frequency_hz: 0.5,
            radius_margin: 5.0,
            target_step: 5.0,
            series_capacity: 200,
        }
    }
}

impl SessionCfg {
    pub fn validate(&self) -> Result<(), BuildError> {
        if self.tick_ms == 0 {
            return Err(BuildError::InvalidConfig("tick_ms must be > 0"));
        }
        if !(self.default_frequency_hz.is_finite() && self.default_frequency_hz > 0.0) {
            return Err(BuildError::InvalidConfig(
                "default_frequency_hz must be finite and > 0",
            ));
        }
        if !(self.radius_margin.is_finite() && self.radius_margin >= 0.0) {
            return Err(BuildError::InvalidConfig(
                "radius_margin must be finite and >= 0",
            ));
        }
        if !(self.target_step.is_finite() && self.target_step > 0.0) {
            return Err(BuildError::InvalidConfig(
                "target_step must be finite and > 0",
            ));
        }
        if self.series_capacity == 0 {
            return Err(BuildError::InvalidConfig("series_capacity must be > 0"));
        }
        Ok(())
    }

    /// Tick period in (fractional) seconds, for phase advancement.
    #[inline]
    pub fn tick_period_secs(&self) -> f64 {
        self.tick_ms as f64 / crate::util::MILLIS_PER_SEC as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn default_cfg_is_valid() {
        SessionCfg::default().validate().unwrap();
    }

    #[rstest]
    #[case(SessionCfg { tick_ms: 0, ..Default::default() })]
    #[case(SessionCfg { default_frequency_hz: f64::NAN, ..Default::default() })]
    #[case(SessionCfg { default_frequency_hz: -1.0, ..Default::default() })]
    #[case(SessionCfg { radius_margin: -0.1, ..Default::default() })]
    #[case(SessionCfg { target_step: 0.0, ..Default::default() })]
    #[case(SessionCfg { series_capacity: 0, ..Default::default() })]
    fn rejects_bad_knobs(#[case] cfg: SessionCfg) {
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn tick_period_in_seconds() {
        let cfg = SessionCfg {
            tick_ms: 50,
            ..Default::default()
        };
        assert_eq!(cfg.tick_period_secs(), 0.05);
    }
}
