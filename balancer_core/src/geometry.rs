//! Field geometry: poses, the device-reported field rectangle, and the pure
//! clamp/normalize rules every consumer shares.
//!
//! Coordinates are centered: `(0, 0)` is the middle of the field, x grows to
//! the right, y grows away from the viewer. The unit is whatever physical
//! unit the device reports its field size in (millimeters in practice).

use serde::{Deserialize, Serialize};

/// A position on (or commanded onto) the field plane.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
}

impl Pose {
    pub const ORIGIN: Self = Self { x: 0.0, y: 0.0 };

    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Validated field extents. Construction rejects non-positive or non-finite
/// dimensions, so downstream math can divide by width/height freely.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldSize {
    width: f64,
    height: f64,
}

impl FieldSize {
    pub fn new(width: f64, height: f64) -> Option<Self> {
        if width.is_finite() && height.is_finite() && width > 0.0 && height > 0.0 {
            Some(Self { width, height })
        } else {
            None
        }
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }
}

/// Holder for the field size learned from the device handshake.
///
/// Unset until the first handshake provides usable dimensions; a repeated
/// handshake overwrites (last-write-wins). Consumers branch on `is_ready()`
/// and degrade to identity/no-op behavior while unset.
#[derive(Debug, Clone, Copy, Default)]
pub struct FieldModel {
    size: Option<FieldSize>,
}

impl FieldModel {
    /// Accept reported dimensions; returns false (and leaves the model
    /// untouched) when they are not positive finite numbers.
    pub fn set(&mut self, width: f64, height: f64) -> bool {
        match FieldSize::new(width, height) {
            Some(size) => {
                self.size = Some(size);
                true
            }
            None => false,
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        self.size.is_some()
    }

    #[inline]
    pub fn size(&self) -> Option<FieldSize> {
        self.size
    }
}

/// Clamp a pose into the field rectangle, each axis independently to
/// `[-extent/2, extent/2]`. Identity when the field is unknown.
pub fn clamp(pose: Pose, field: Option<FieldSize>) -> Pose {
    let Some(f) = field else { return pose };
    let half_w = f.width() / 2.0;
    let half_h = f.height() / 2.0;
    Pose {
        x: pose.x.clamp(-half_w, half_w),
        y: pose.y.clamp(-half_h, half_h),
    }
}

/// Map a pose into the unit square: `nx = x/width + 0.5`,
/// `ny = -y/height + 0.5` (y inverted to match the top-down convention).
/// Callers must hold a ready field; in-bounds poses land in [0,1]×[0,1].
pub fn normalize(pose: Pose, field: FieldSize) -> (f64, f64) {
    (
        pose.x / field.width() + 0.5,
        -pose.y / field.height() + 0.5,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rstest::rstest;

    fn field(w: f64, h: f64) -> FieldSize {
        FieldSize::new(w, h).unwrap()
    }

    #[rstest]
    #[case(150.0, 0.0, 100.0, 0.0)]
    #[case(0.0, -80.0, 0.0, -50.0)]
    #[case(-500.0, 500.0, -100.0, 50.0)]
    #[case(30.0, -20.0, 30.0, -20.0)]
    fn clamps_into_half_extents(
        #[case] x: f64,
        #[case] y: f64,
        #[case] want_x: f64,
        #[case] want_y: f64,
    ) {
        let f = field(200.0, 100.0);
        let got = clamp(Pose::new(x, y), Some(f));
        assert_eq!(got, Pose::new(want_x, want_y));
    }

    #[test]
    fn clamp_without_field_is_identity() {
        let p = Pose::new(1e9, -1e9);
        assert_eq!(clamp(p, None), p);
    }

    #[test]
    fn normalize_matches_top_down_convention() {
        let f = field(200.0, 100.0);
        assert_eq!(normalize(Pose::ORIGIN, f), (0.5, 0.5));
        // +y is "away", which renders toward the top (smaller ny).
        assert_eq!(normalize(Pose::new(100.0, 50.0), f), (1.0, 0.0));
        assert_eq!(normalize(Pose::new(-100.0, -50.0), f), (0.0, 1.0));
    }

    #[test]
    fn field_model_rejects_bad_dimensions() {
        let mut m = FieldModel::default();
        assert!(!m.set(0.0, 100.0));
        assert!(!m.set(100.0, -1.0));
        assert!(!m.set(f64::NAN, 100.0));
        assert!(!m.is_ready());
        assert!(m.set(200.0, 100.0));
        assert!(m.is_ready());
        // Repeated handshake overwrites.
        assert!(m.set(80.0, 80.0));
        assert_eq!(m.size().unwrap().width(), 80.0);
    }

    proptest! {
        #[test]
        fn clamp_is_idempotent(
            x in -1e6f64..1e6,
            y in -1e6f64..1e6,
            w in 1e-3f64..1e4,
            h in 1e-3f64..1e4,
        ) {
            let f = Some(field(w, h));
            let once = clamp(Pose::new(x, y), f);
            prop_assert_eq!(clamp(once, f), once);
        }

        #[test]
        fn clamped_pose_is_contained(
            x in -1e6f64..1e6,
            y in -1e6f64..1e6,
            w in 1e-3f64..1e4,
            h in 1e-3f64..1e4,
        ) {
            let p = clamp(Pose::new(x, y), Some(field(w, h)));
            prop_assert!(p.x.abs() <= w / 2.0);
            prop_assert!(p.y.abs() <= h / 2.0);
        }

        #[test]
        fn normalized_in_bounds_pose_lands_in_unit_square(
            x in -1e6f64..1e6,
            y in -1e6f64..1e6,
            w in 1e-3f64..1e4,
            h in 1e-3f64..1e4,
        ) {
            let f = field(w, h);
            let (nx, ny) = normalize(clamp(Pose::new(x, y), Some(f)), f);
            prop_assert!((0.0..=1.0).contains(&nx));
            prop_assert!((0.0..=1.0).contains(&ny));
        }
    }
}
