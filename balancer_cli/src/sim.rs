//! Built-in simulated device: a scripted handshake followed by periodic
//! telemetry where the ball relaxes exponentially toward the commanded
//! target. Commands loop back through `SimSink`, so the whole
//! reconcile-and-command path is exercised without a broker.

use balancer_core::events::{
    CommandSink, DeviceHello, ReportedAttitude, ReportedFieldSize, ReportedXy, SessionEvent,
    SetCommand, StatusUpdate,
};
use balancer_core::geometry::Pose;
use balancer_core::pid::PidGains;
use balancer_traits::{Clock, MonotonicClock};
use crossbeam_channel as xch;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const SIM_FIELD_WIDTH: f64 = 200.0;
pub const SIM_FIELD_HEIGHT: f64 = 150.0;

/// Fraction of the remaining distance the ball covers per telemetry period.
const RELAX_PER_TICK: f64 = 0.15;

/// Shared command target: written by `SimSink`, tracked by the device
/// thread.
pub type SharedTarget = Arc<Mutex<Pose>>;

/// Sink standing in for the transport: logs the wire payload and hands the
/// commanded target to the simulated device.
#[derive(Debug, Clone)]
pub struct SimSink {
    target: SharedTarget,
}

impl SimSink {
    pub fn new(target: SharedTarget) -> Self {
        Self { target }
    }
}

impl CommandSink for SimSink {
    fn send(&self, cmd: &SetCommand) {
        match serde_json::to_string(cmd) {
            Ok(payload) => tracing::debug!(%payload, "command published"),
            Err(e) => tracing::warn!(error = %e, "command serialization failed"),
        }
        if let Ok(mut target) = self.target.lock() {
            *target = cmd.target_pose;
        }
    }
}

/// Handle to the device thread; signals shutdown and joins on drop.
pub struct SimDevice {
    shutdown: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl SimDevice {
    /// Spawn the device: one hello, then status updates at `status_hz`.
    pub fn spawn(tx: xch::Sender<SessionEvent>, target: SharedTarget, status_hz: u32) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();
        let period = Duration::from_millis(1_000 / u64::from(status_hz.max(1)));

        let join_handle = std::thread::spawn(move || {
            let clock = MonotonicClock::new();
            if tx.send(SessionEvent::Hello(scripted_hello())).is_err() {
                return;
            }

            let mut ball = Pose::new(SIM_FIELD_WIDTH / 4.0, -SIM_FIELD_HEIGHT / 4.0);
            loop {
                if shutdown_clone.load(Ordering::Relaxed) {
                    break;
                }
                let commanded = target.lock().map(|t| *t).unwrap_or(Pose::ORIGIN);
                ball.x += (commanded.x - ball.x) * RELAX_PER_TICK;
                ball.y += (commanded.y - ball.y) * RELAX_PER_TICK;

                let status = synth_status(ball, commanded);
                if tx.send(SessionEvent::Status(status)).is_err() {
                    tracing::debug!("sim device mailbox disconnected, exiting thread");
                    break;
                }
                clock.sleep(period);
            }
            tracing::trace!("sim device thread exiting cleanly");
        });

        Self {
            shutdown,
            join_handle: Some(join_handle),
        }
    }
}

impl Drop for SimDevice {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.join_handle.take() {
            if let Err(e) = handle.join() {
                tracing::warn!(?e, "sim device thread panicked during shutdown");
            }
        }
    }
}

pub fn scripted_hello() -> DeviceHello {
    let gains = PidGains {
        kp_x: 1.2,
        ki_x: 0.05,
        kd_x: 0.4,
        kp_y: 1.2,
        ki_y: 0.05,
        kd_y: 0.4,
    };
    DeviceHello {
        device_id: Some("sim-device".to_string()),
        firmware: Some("0.0.0-sim".to_string()),
        pid_const: gains.into(),
        platform_pose: ReportedAttitude {
            roll: Some(0.0),
            pitch: Some(0.0),
        },
        field_size: ReportedFieldSize {
            width: Some(SIM_FIELD_WIDTH),
            height: Some(SIM_FIELD_HEIGHT),
        },
    }
}

fn synth_status(ball: Pose, commanded: Pose) -> StatusUpdate {
    let error_x = commanded.x - ball.x;
    let error_y = commanded.y - ball.y;
    StatusUpdate {
        platform_pose: ReportedAttitude {
            // Tilt proportional to the tracking error, capped to a plausible range.
            roll: Some((error_y * 0.05).clamp(-0.3, 0.3)),
            pitch: Some((error_x * 0.05).clamp(-0.3, 0.3)),
        },
        joystick_val: ReportedXy {
            x: Some(0.0),
            y: Some(0.0),
        },
        real_pose: ReportedXy {
            x: Some(ball.x),
            y: Some(ball.y),
        },
        target_pose: Some(ReportedXy {
            x: Some(commanded.x),
            y: Some(commanded.y),
        }),
        error: ReportedXy {
            x: Some(error_x),
            y: Some(error_y),
        },
        pid_const: None,
        time: Some(balancer_core::util::epoch_secs()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn device_emits_hello_then_status_and_stops_on_drop() {
        let (tx, rx) = xch::unbounded();
        let target = SharedTarget::default();
        let device = SimDevice::spawn(tx, target.clone(), 200);

        let first = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(matches!(first, SessionEvent::Hello(_)));
        let second = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(matches!(second, SessionEvent::Status(_)));

        drop(device);
        while rx.try_recv().is_ok() {}
        assert!(rx.recv_timeout(Duration::from_millis(200)).is_err());
    }

    #[test]
    fn sink_updates_shared_target() {
        let target = SharedTarget::default();
        let sink = SimSink::new(target.clone());
        sink.send(&SetCommand {
            time_ms: 1,
            ctr_mode: balancer_core::events::ControlMode::Manual,
            target_pose: Pose::new(12.0, -8.0),
            pid_const: None,
        });
        assert_eq!(*target.lock().unwrap(), Pose::new(12.0, -8.0));
    }
}
