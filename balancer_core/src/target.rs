//! The operator's commanded target position: single source of truth read by
//! both the render path and the outbound command path.

use crate::geometry::{self, FieldSize, Pose};

/// Last commanded target. Unset until the first write; readers treat unset
/// as the field center.
#[derive(Debug, Clone, Copy, Default)]
pub struct TargetState {
    pose: Option<Pose>,
}

impl TargetState {
    /// Store an absolute target, clamped against the field when known.
    /// Non-finite components are invalid operator input and become 0.
    /// Returns the stored value.
    pub fn set_absolute(&mut self, pose: Pose, field: Option<FieldSize>) -> Pose {
        let sane = Pose::new(
            if pose.x.is_finite() { pose.x } else { 0.0 },
            if pose.y.is_finite() { pose.y } else { 0.0 },
        );
        let clamped = geometry::clamp(sane, field);
        self.pose = Some(clamped);
        clamped
    }

    /// Move the target by a delta, treating an unset target as the origin,
    /// then clamp and store as `set_absolute` does.
    pub fn adjust_relative(&mut self, dx: f64, dy: f64, field: Option<FieldSize>) -> Pose {
        let base = self.current();
        self.set_absolute(Pose::new(base.x + dx, base.y + dy), field)
    }

    /// Last stored value, or the origin when nothing was stored yet.
    #[inline]
    pub fn current(&self) -> Pose {
        self.pose.unwrap_or(Pose::ORIGIN)
    }

    #[inline]
    pub fn is_set(&self) -> bool {
        self.pose.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::FieldSize;

    fn field() -> Option<FieldSize> {
        FieldSize::new(200.0, 100.0)
    }

    #[test]
    fn set_absolute_clamps_against_field() {
        let mut t = TargetState::default();
        let stored = t.set_absolute(Pose::new(150.0, -80.0), field());
        assert_eq!(stored, Pose::new(100.0, -50.0));
        assert_eq!(t.current(), stored);
    }

    #[test]
    fn set_absolute_unclamped_without_field() {
        let mut t = TargetState::default();
        let stored = t.set_absolute(Pose::new(1e4, -1e4), None);
        assert_eq!(stored, Pose::new(1e4, -1e4));
    }

    #[test]
    fn adjust_from_unset_starts_at_origin() {
        let mut t = TargetState::default();
        assert!(!t.is_set());
        let stored = t.adjust_relative(5.0, -5.0, field());
        assert_eq!(stored, Pose::new(5.0, -5.0));
        assert!(t.is_set());
    }

    #[test]
    fn adjust_accumulates_and_clamps() {
        let mut t = TargetState::default();
        t.set_absolute(Pose::new(95.0, 0.0), field());
        let stored = t.adjust_relative(20.0, 0.0, field());
        assert_eq!(stored, Pose::new(100.0, 0.0));
    }

    #[test]
    fn non_finite_input_becomes_zero() {
        let mut t = TargetState::default();
        t.set_absolute(Pose::new(40.0, 10.0), field());
        let stored = t.set_absolute(Pose::new(f64::NAN, 20.0), field());
        assert_eq!(stored, Pose::new(0.0, 20.0));
    }
}
