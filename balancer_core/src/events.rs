//! Event types at the session boundary.
//!
//! Inbound payloads (`DeviceHello`, `StatusUpdate`) decode leniently: a
//! missing or garbage field degrades that field only, never the whole
//! snapshot. Everything that can reach the session funnels through
//! `SessionEvent`, so handlers are plain reducers that can be unit-tested
//! without a live transport.

use crate::geometry::Pose;
use crate::pid::{PidGains, PidGainsPatch};
use crate::util::{de_lenient_f64, de_or_default};
use serde::{Deserialize, Serialize};

/// A reported `{x, y}` vector; either component may be absent or garbage.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ReportedXy {
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub x: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub y: Option<f64>,
}

/// Reported platform tilt.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ReportedAttitude {
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub roll: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub pitch: Option<f64>,
}

/// Reported field extents from the handshake.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct ReportedFieldSize {
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub width: Option<f64>,
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub height: Option<f64>,
}

/// One-time device greeting relayed at session start.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DeviceHello {
    #[serde(default)]
    pub device_id: Option<String>,
    #[serde(default)]
    pub firmware: Option<String>,
    #[serde(default, deserialize_with = "de_or_default")]
    pub pid_const: PidGainsPatch,
    #[serde(default, deserialize_with = "de_or_default")]
    pub platform_pose: ReportedAttitude,
    #[serde(default, deserialize_with = "de_or_default")]
    pub field_size: ReportedFieldSize,
}

/// Recurring telemetry snapshot relayed from the device. Ephemeral: not
/// retained beyond deriving the next view state.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusUpdate {
    #[serde(default, deserialize_with = "de_or_default")]
    pub platform_pose: ReportedAttitude,
    #[serde(default, deserialize_with = "de_or_default")]
    pub joystick_val: ReportedXy,
    #[serde(default, deserialize_with = "de_or_default")]
    pub real_pose: ReportedXy,
    /// Advisory target; `None` when the payload omits it entirely.
    #[serde(default, deserialize_with = "de_or_default")]
    pub target_pose: Option<ReportedXy>,
    #[serde(default, deserialize_with = "de_or_default")]
    pub error: ReportedXy,
    #[serde(default, deserialize_with = "de_or_default")]
    pub pid_const: Option<PidGainsPatch>,
    /// Device-side capture time in epoch seconds, when provided.
    #[serde(default, deserialize_with = "de_lenient_f64")]
    pub time: Option<f64>,
}

/// Tag distinguishing locally-generated commands from relayed ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ControlMode {
    /// Locally generated (trajectory ticks).
    Manual,
    /// Operator push relayed over the broker path (PID apply).
    Mqtt,
}

/// Outbound `set-command` payload. Fire-and-forget; `time_ms` is epoch
/// milliseconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetCommand {
    #[serde(rename = "time")]
    pub time_ms: u64,
    pub ctr_mode: ControlMode,
    pub target_pose: Pose,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pid_const: Option<PidGains>,
}

/// Outbound delivery seam. Implementations hand the command to the
/// transport; a failed send is not observable to the session (no ack, no
/// retry), so the signature is infallible.
pub trait CommandSink {
    fn send(&self, cmd: &SetCommand);
}

/// Operator-action entry points, one variant per control.
#[derive(Debug, Clone)]
pub enum UiAction {
    /// Absolute target placement (the coordinate inputs).
    SetTarget { x: f64, y: f64 },
    /// Arrow-pad nudge by a delta.
    AdjustTarget { dx: f64, dy: f64 },
    /// Return the target to the field center.
    CenterTarget,
    /// Slider movement; partial by design.
    EditGains(PidGainsPatch),
    /// Push the edited gains (and current target) upstream.
    ApplyGains,
    /// Discard edits, restoring the last-known-device snapshot.
    ResetGains,
    StartTrajectory { radius: f64, frequency_hz: f64 },
    StopTrajectory,
}

/// Everything the session mailbox can carry. Each event is processed
/// atomically, run-to-completion.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Hello(DeviceHello),
    Status(StatusUpdate),
    Ui(UiAction),
    /// Fixed-period pulse from the trajectory ticker.
    TrajectoryTick,
    /// Breaks the event loop; used for orderly teardown.
    Shutdown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_decodes_full_payload() {
        let s: StatusUpdate = serde_json::from_str(
            r#"{
                "platform_pose": {"roll": 1.5, "pitch": -0.5},
                "joystick_val": {"x": 0.25, "y": -1.0},
                "real_pose": {"x": 10.0, "y": 20.0},
                "target_pose": {"x": 5.0, "y": 6.0},
                "error": {"x": -5.0, "y": -14.0},
                "pid_const": {"kp_x": 2.0},
                "time": 1700000000.5
            }"#,
        )
        .unwrap();
        assert_eq!(s.platform_pose.roll, Some(1.5));
        assert_eq!(s.joystick_val.y, Some(-1.0));
        assert_eq!(s.target_pose.unwrap().x, Some(5.0));
        assert_eq!(s.pid_const.unwrap().kp_x, Some(2.0));
        assert_eq!(s.time, Some(1700000000.5));
    }

    #[test]
    fn status_tolerates_missing_and_garbage_fields() {
        let s: StatusUpdate = serde_json::from_str(
            r#"{
                "platform_pose": "not an object",
                "real_pose": {"x": "abc", "y": 3.0},
                "time": "soon"
            }"#,
        )
        .unwrap();
        assert!(s.platform_pose.roll.is_none());
        assert!(s.real_pose.x.is_none());
        assert_eq!(s.real_pose.y, Some(3.0));
        assert!(s.target_pose.is_none());
        assert!(s.time.is_none());
    }

    #[test]
    fn omitted_target_is_distinguishable_from_garbage_target() {
        let omitted: StatusUpdate = serde_json::from_str("{}").unwrap();
        assert!(omitted.target_pose.is_none());

        let garbage: StatusUpdate =
            serde_json::from_str(r#"{"target_pose": {"x": "nope"}}"#).unwrap();
        let t = garbage.target_pose.unwrap();
        assert!(t.x.is_none() && t.y.is_none());
    }

    #[test]
    fn hello_decodes_partial_payload() {
        let h: DeviceHello = serde_json::from_str(
            r#"{"device_id": "esp-01", "field_size": {"width": 200, "height": 150}}"#,
        )
        .unwrap();
        assert_eq!(h.device_id.as_deref(), Some("esp-01"));
        assert!(h.firmware.is_none());
        assert_eq!(h.field_size.width, Some(200.0));
        assert!(h.pid_const.is_empty());
    }

    #[test]
    fn set_command_serializes_wire_shape() {
        let cmd = SetCommand {
            time_ms: 1_700_000_000_123,
            ctr_mode: ControlMode::Manual,
            target_pose: Pose::new(3.0, -4.0),
            pid_const: None,
        };
        let v: serde_json::Value = serde_json::to_value(&cmd).unwrap();
        assert_eq!(v["time"], 1_700_000_000_123u64);
        assert_eq!(v["ctr_mode"], "manual");
        assert_eq!(v["target_pose"]["y"], -4.0);
        assert!(v.get("pid_const").is_none());
    }
}
