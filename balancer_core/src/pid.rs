//! PID gain snapshots.
//!
//! Two snapshots live in the session and are deliberately never auto-merged:
//! the *edited* snapshot (operator slider positions) and the
//! *last-known-device* snapshot (most recent value the device reported).
//! Only an explicit reset copies device over edited.

use crate::util::de_lenient_f64;
use serde::{Deserialize, Serialize};

/// Six independent controller gains, one P/I/D triple per axis.
/// Gains are non-negative by contract; see `PidGainsPatch::apply_to`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PidGains {
    pub kp_x: f64,
    pub ki_x: f64,
    pub kd_x: f64,
    pub kp_y: f64,
    pub ki_y: f64,
    pub kd_y: f64,
}

/// Partial gain update as it arrives on the wire or from a single slider.
///
/// Every field decodes leniently (absent, non-numeric or non-finite values
/// become `None`), so a malformed payload degrades per-field instead of
/// rejecting the whole snapshot.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct PidGainsPatch {
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub kp_x: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub ki_x: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub kd_x: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub kp_y: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub ki_y: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub kd_y: Option<f64>,
}

impl PidGainsPatch {
    pub fn is_empty(&self) -> bool {
        self.kp_x.is_none()
            && self.ki_x.is_none()
            && self.kd_x.is_none()
            && self.kp_y.is_none()
            && self.ki_y.is_none()
            && self.kd_y.is_none()
    }

    /// Overlay present fields onto `gains`; missing fields leave the
    /// corresponding gain untouched. Negative values clamp to zero.
    pub fn apply_to(&self, gains: &mut PidGains) {
        let slots = [
            (self.kp_x, &mut gains.kp_x),
            (self.ki_x, &mut gains.ki_x),
            (self.kd_x, &mut gains.kd_x),
            (self.kp_y, &mut gains.kp_y),
            (self.ki_y, &mut gains.ki_y),
            (self.kd_y, &mut gains.kd_y),
        ];
        for (src, dst) in slots {
            if let Some(v) = src {
                *dst = v.max(0.0);
            }
        }
    }
}

impl From<PidGains> for PidGainsPatch {
    fn from(g: PidGains) -> Self {
        Self {
            kp_x: Some(g.kp_x),
            ki_x: Some(g.ki_x),
            kd_x: Some(g.kd_x),
            kp_y: Some(g.kp_y),
            ki_y: Some(g.ki_y),
            kd_y: Some(g.kd_y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_patch_leaves_other_gains_untouched() {
        let mut gains = PidGains {
            kp_x: 1.0,
            ki_x: 0.1,
            kd_x: 0.5,
            kp_y: 2.0,
            ki_y: 0.2,
            kd_y: 0.6,
        };
        let patch = PidGainsPatch {
            kp_x: Some(3.0),
            kd_y: Some(0.9),
            ..Default::default()
        };
        patch.apply_to(&mut gains);
        assert_eq!(gains.kp_x, 3.0);
        assert_eq!(gains.kd_y, 0.9);
        assert_eq!(gains.ki_x, 0.1);
        assert_eq!(gains.kp_y, 2.0);
    }

    #[test]
    fn negative_gains_clamp_to_zero() {
        let mut gains = PidGains::default();
        let patch = PidGainsPatch {
            ki_y: Some(-4.0),
            ..Default::default()
        };
        patch.apply_to(&mut gains);
        assert_eq!(gains.ki_y, 0.0);
    }

    #[test]
    fn lenient_decode_drops_garbage_fields() {
        let patch: PidGainsPatch = serde_json::from_str(
            r#"{"kp_x": 1.5, "ki_x": "oops", "kd_x": null, "kp_y": "2.25"}"#,
        )
        .unwrap();
        assert_eq!(patch.kp_x, Some(1.5));
        assert_eq!(patch.ki_x, None);
        assert_eq!(patch.kd_x, None);
        // Numeric strings are accepted.
        assert_eq!(patch.kp_y, Some(2.25));
        assert!(patch.kd_y.is_none());
    }

    #[test]
    fn empty_patch_reports_empty() {
        assert!(PidGainsPatch::default().is_empty());
        let patch: PidGainsPatch = serde_json::from_str("{}").unwrap();
        assert!(patch.is_empty());
    }
}
