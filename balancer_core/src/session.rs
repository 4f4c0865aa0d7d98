//! The session context: one explicit object owning every piece of
//! client-side state, mutated only by `handle` (run-to-completion, one
//! event at a time) and read through `view` snapshots.
//!
//! Precedence rule for the rendered target (the canonical resolution of
//! what used to be implicit last-write-wins): while the trajectory
//! generator runs, the locally-held target wins and device-reported targets
//! are ignored; otherwise a numeric reported target is adopted, and a
//! missing or garbage one falls back to the local value.

use crate::config::SessionCfg;
use crate::error::Result;
use crate::events::{
    CommandSink, ControlMode, DeviceHello, SessionEvent, SetCommand, StatusUpdate, UiAction,
};
use crate::geometry::{FieldModel, FieldSize, Pose};
use crate::pid::PidGains;
use crate::series::{ErrorSample, ErrorSeries};
use crate::target::TargetState;
use crate::trajectory::{Ticker, TrajectoryState};
use crate::util::{epoch_ms, epoch_secs, finite_or};
use balancer_traits::MonotonicClock;
use crossbeam_channel as xch;
use serde::Serialize;
use std::time::Duration;

/// Platform tilt as last reported.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Attitude {
    pub roll: f64,
    pub pitch: f64,
}

/// Pure snapshot handed to rendering adapters. Adapters have no write
/// access back into the session except through `UiAction`.
#[derive(Debug, Clone, Serialize)]
pub struct ViewModel {
    pub field_ready: bool,
    pub field_size: Option<FieldSize>,
    pub device_label: Option<String>,
    pub target_pose: Pose,
    pub ball_pose: Pose,
    pub joystick: Pose,
    pub attitude: Attitude,
    pub error_series: Vec<ErrorSample>,
    pub pid_edited: PidGains,
    pub pid_last_known: Option<PidGains>,
    pub trajectory_enabled: bool,
    pub trajectory_radius: f64,
}

pub struct Session<S: CommandSink> {
    cfg: SessionCfg,
    sink: S,
    /// Sender side of the session mailbox; cloned into spawned tickers.
    mailbox: xch::Sender<SessionEvent>,

    field: FieldModel,
    target: TargetState,
    trajectory: TrajectoryState,
    ticker: Option<Ticker>,

    pid_edited: PidGains,
    pid_device: Option<PidGains>,

    attitude: Attitude,
    joystick: Pose,
    ball: Pose,
    series: ErrorSeries,
    device_label: Option<String>,
}

impl<S: CommandSink> Session<S> {
    /// Build a session around a validated config, an outbound sink, and the
    /// sender half of the mailbox the runner drains.
    pub fn new(cfg: SessionCfg, sink: S, mailbox: xch::Sender<SessionEvent>) -> Result<Self> {
        cfg.validate()?;
        let series = ErrorSeries::new(cfg.series_capacity);
        Ok(Self {
            cfg,
            sink,
            mailbox,
            field: FieldModel::default(),
            target: TargetState::default(),
            trajectory: TrajectoryState::default(),
            ticker: None,
            pid_edited: PidGains::default(),
            pid_device: None,
            attitude: Attitude::default(),
            joystick: Pose::ORIGIN,
            ball: Pose::ORIGIN,
            series,
            device_label: None,
        })
    }

    pub fn cfg(&self) -> &SessionCfg {
        &self.cfg
    }

    /// Dispatch one event, run-to-completion.
    pub fn handle(&mut self, event: SessionEvent) {
        match event {
            SessionEvent::Hello(hello) => self.on_hello(hello),
            SessionEvent::Status(status) => self.on_status(status),
            SessionEvent::Ui(action) => self.on_ui(action),
            SessionEvent::TrajectoryTick => self.on_tick(),
            // The runner breaks on Shutdown before dispatch; reaching here
            // (e.g. when driving the session directly) is a no-op.
            SessionEvent::Shutdown => {}
        }
    }

    fn on_hello(&mut self, hello: DeviceHello) {
        if !hello.pid_const.is_empty() {
            hello.pid_const.apply_to(&mut self.pid_edited);
            let mut device = self.pid_device.unwrap_or_default();
            hello.pid_const.apply_to(&mut device);
            self.pid_device = Some(device);
        }

        self.attitude = Attitude {
            roll: finite_or(hello.platform_pose.roll, 0.0),
            pitch: finite_or(hello.platform_pose.pitch, 0.0),
        };

        if let (Some(w), Some(h)) = (hello.field_size.width, hello.field_size.height) {
            if self.field.set(w, h) {
                tracing::info!(width = w, height = h, "field size learned from handshake");
                // Re-clamp anything placed before the extents were known.
                if self.target.is_set() {
                    let current = self.target.current();
                    self.target.set_absolute(current, self.field.size());
                }
            } else {
                tracing::warn!(width = w, height = h, "ignoring non-positive field size");
            }
        }

        if let Some(id) = hello.device_id {
            self.device_label = Some(match hello.firmware {
                Some(fw) => format!("{id} (fw {fw})"),
                None => id,
            });
        }
        tracing::info!(
            device = self.device_label.as_deref().unwrap_or("unknown"),
            field_ready = self.field.is_ready(),
            "device handshake"
        );
    }

    fn on_status(&mut self, status: StatusUpdate) {
        // Pure projections first, unconditionally.
        self.attitude = Attitude {
            roll: finite_or(status.platform_pose.roll, 0.0),
            pitch: finite_or(status.platform_pose.pitch, 0.0),
        };
        self.joystick = Pose::new(
            finite_or(status.joystick_val.x, 0.0),
            finite_or(status.joystick_val.y, 0.0),
        );
        self.ball = Pose::new(
            finite_or(status.real_pose.x, 0.0),
            finite_or(status.real_pose.y, 0.0),
        );

        // Target precedence: generator wins while running; otherwise adopt a
        // numeric reported target; otherwise keep the local value.
        if !self.trajectory.enabled() {
            if let Some(reported) = status.target_pose {
                if let (Some(x), Some(y)) = (reported.x, reported.y) {
                    self.target.set_absolute(Pose::new(x, y), self.field.size());
                }
            }
        }

        let t_abs = match status.time {
            Some(t) if t.is_finite() => t,
            _ => epoch_secs(),
        };
        let appended = self.series.push(
            t_abs,
            finite_or(status.error.x, 0.0),
            finite_or(status.error.y, 0.0),
        );
        if !appended {
            tracing::warn!("dropped error sample with non-finite timestamp");
        }

        // Remember the device's gains for an explicit reset; never touch the
        // edited snapshot here.
        if let Some(patch) = status.pid_const {
            let mut device = self.pid_device.unwrap_or_default();
            patch.apply_to(&mut device);
            self.pid_device = Some(device);
        }
    }

    fn on_ui(&mut self, action: UiAction) {
        match action {
            UiAction::SetTarget { x, y } => {
                self.target.set_absolute(Pose::new(x, y), self.field.size());
            }
            UiAction::AdjustTarget { dx, dy } => {
                self.target.adjust_relative(dx, dy, self.field.size());
            }
            UiAction::CenterTarget => {
                self.target.set_absolute(Pose::ORIGIN, self.field.size());
            }
            UiAction::EditGains(patch) => {
                patch.apply_to(&mut self.pid_edited);
            }
            UiAction::ApplyGains => {
                let cmd = SetCommand {
                    time_ms: epoch_ms(),
                    ctr_mode: ControlMode::Mqtt,
                    target_pose: self.target.current(),
                    pid_const: Some(self.pid_edited),
                };
                tracing::info!(
                    target_x = cmd.target_pose.x,
                    target_y = cmd.target_pose.y,
                    "applying gains upstream"
                );
                self.sink.send(&cmd);
            }
            UiAction::ResetGains => match self.pid_device {
                Some(device) => self.pid_edited = device,
                None => tracing::warn!("no device PID snapshot received yet; reset ignored"),
            },
            UiAction::StartTrajectory {
                radius,
                frequency_hz,
            } => self.start_trajectory(radius, frequency_hz),
            UiAction::StopTrajectory => self.stop_trajectory(),
        }
    }

    fn start_trajectory(&mut self, radius: f64, frequency_hz: f64) {
        // Cancel-then-install: joining the old ticker first guarantees no
        // two schedules ever run concurrently.
        self.ticker = None;
        self.trajectory
            .start(radius, frequency_hz, self.field.size(), &self.cfg);
        self.ticker = Some(Ticker::spawn(
            self.mailbox.clone(),
            Duration::from_millis(self.cfg.tick_ms),
            MonotonicClock::new(),
        ));
        tracing::info!(
            radius = self.trajectory.radius(),
            frequency_hz = self.trajectory.angular_velocity_hz(),
            tick_ms = self.cfg.tick_ms,
            "trajectory started"
        );
    }

    fn stop_trajectory(&mut self) {
        self.ticker = None;
        self.trajectory.stop();
        tracing::info!("trajectory stopped");
    }

    fn on_tick(&mut self) {
        if !self.trajectory.enabled() {
            // A tick can race a stop through the mailbox; ignore it.
            return;
        }
        let setpoint = self.trajectory.advance(self.cfg.tick_period_secs());
        self.target.set_absolute(setpoint, self.field.size());
        self.sink.send(&SetCommand {
            time_ms: epoch_ms(),
            ctr_mode: ControlMode::Manual,
            target_pose: setpoint,
            pid_const: None,
        });
    }

    /// Snapshot for rendering adapters.
    pub fn view(&self) -> ViewModel {
        ViewModel {
            field_ready: self.field.is_ready(),
            field_size: self.field.size(),
            device_label: self.device_label.clone(),
            target_pose: self.target.current(),
            ball_pose: self.ball,
            joystick: self.joystick,
            attitude: self.attitude,
            error_series: self.series.to_vec(),
            pid_edited: self.pid_edited,
            pid_last_known: self.pid_device,
            trajectory_enabled: self.trajectory.enabled(),
            trajectory_radius: self.trajectory.radius(),
        }
    }
}
