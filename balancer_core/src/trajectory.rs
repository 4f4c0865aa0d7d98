//! Autonomous circular-trajectory generation.
//!
//! `TrajectoryState` is the Idle/Running state machine plus the pure phase
//! math; `Ticker` is the cancellable fixed-period schedule that posts
//! `TrajectoryTick` events into the session mailbox. Splitting the two keeps
//! the math deterministic under test (no wall clock involved) while the
//! ticker owns exactly one thread that is joined on drop.

use crate::config::SessionCfg;
use crate::events::SessionEvent;
use crate::geometry::{FieldSize, Pose};
use balancer_traits::Clock;
use crossbeam_channel as xch;
use std::f64::consts::TAU;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

/// Circular-setpoint generator state. `angular_phase` advances monotonically
/// while running; wrapping is a rendering concern, not done here.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrajectoryState {
    enabled: bool,
    radius: f64,
    angular_phase: f64,
    angular_velocity_hz: f64,
}

impl TrajectoryState {
    /// Idle → Running. Sanitizes operator input: non-finite/negative radius
    /// becomes 0, non-finite/negative frequency falls back to the default,
    /// and the radius is capped at `width/2 - margin` once the field is
    /// known so the circle stays inside the horizontal half-extent.
    /// Resets the phase; calling while already running restarts cleanly.
    pub fn start(
        &mut self,
        radius: f64,
        frequency_hz: f64,
        field: Option<FieldSize>,
        cfg: &SessionCfg,
    ) {
        let mut radius = if radius.is_finite() && radius >= 0.0 {
            radius
        } else {
            0.0
        };
        if let Some(f) = field {
            let max_radius = (f.width() / 2.0 - cfg.radius_margin).max(0.0);
            radius = radius.min(max_radius);
        }
        let frequency_hz = if frequency_hz.is_finite() && frequency_hz >= 0.0 {
            frequency_hz
        } else {
            cfg.default_frequency_hz
        };

        self.enabled = true;
        self.radius = radius;
        self.angular_phase = 0.0;
        self.angular_velocity_hz = frequency_hz;
    }

    /// Running → Idle. Zeroes the radius so any overlay derived from the
    /// view disappears immediately. Safe to call when already idle.
    pub fn stop(&mut self) {
        self.enabled = false;
        self.radius = 0.0;
    }

    /// Advance one tick and return the next setpoint on the circle.
    pub fn advance(&mut self, tick_period_secs: f64) -> Pose {
        self.angular_phase += TAU * self.angular_velocity_hz * tick_period_secs;
        Pose::new(
            self.radius * self.angular_phase.cos(),
            self.radius * self.angular_phase.sin(),
        )
    }

    #[inline]
    pub fn enabled(&self) -> bool {
        self.enabled
    }

    #[inline]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[inline]
    pub fn angular_phase(&self) -> f64 {
        self.angular_phase
    }

    #[inline]
    pub fn angular_velocity_hz(&self) -> f64 {
        self.angular_velocity_hz
    }
}

/// Cancellable fixed-period tick source.
///
/// Owns exactly one thread posting `SessionEvent::TrajectoryTick` into the
/// mailbox at a fixed wall-clock period (independent of any frame rate).
/// Dropping the handle signals shutdown and joins the thread, so replacing
/// the session's handle can never leave two concurrent tickers behind.
pub struct Ticker {
    shutdown: Arc<AtomicBool>,
    join_handle: Option<std::thread::JoinHandle<()>>,
}

impl Ticker {
    pub fn spawn<C: Clock + Send + Sync + 'static>(
        tx: xch::Sender<SessionEvent>,
        period: Duration,
        clock: C,
    ) -> Self {
        let shutdown = Arc::new(AtomicBool::new(false));
        let shutdown_clone = shutdown.clone();

        let join_handle = std::thread::spawn(move || {
            loop {
                if shutdown_clone.load(Ordering::Relaxed) {
                    break;
                }
                if tx.send(SessionEvent::TrajectoryTick).is_err() {
                    tracing::debug!("ticker mailbox disconnected, exiting thread");
                    break;
                }
                if shutdown_clone.load(Ordering::Relaxed) {
                    break;
                }
                clock.sleep(period);
            }
            tracing::trace!("ticker thread exiting cleanly");
        });

        Self {
            shutdown,
            join_handle: Some(join_handle),
        }
    }
}

impl Drop for Ticker {
    fn drop(&mut self) {
        self.shutdown.store(true, Ordering::Relaxed);
        if let Some(handle) = self.join_handle.take() {
            match handle.join() {
                Ok(()) => tracing::trace!("ticker thread joined"),
                Err(e) => tracing::warn!(?e, "ticker thread panicked during shutdown"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::FieldSize;

    fn cfg() -> SessionCfg {
        SessionCfg::default()
    }

    #[test]
    fn phase_advances_deterministically() {
        let mut t = TrajectoryState::default();
        t.start(50.0, 1.0, None, &cfg());
        let period = 0.05;
        let mut last = Pose::ORIGIN;
        for _ in 0..7 {
            last = t.advance(period);
        }
        let want_phase = TAU * 7.0 * period;
        assert!((t.angular_phase() - want_phase).abs() < 1e-9);
        assert!((last.x - 50.0 * want_phase.cos()).abs() < 1e-9);
        assert!((last.y - 50.0 * want_phase.sin()).abs() < 1e-9);
    }

    #[test]
    fn radius_caps_at_half_width_minus_margin() {
        let mut t = TrajectoryState::default();
        let field = FieldSize::new(80.0, 200.0);
        t.start(60.0, 1.0, field, &cfg());
        assert!(t.radius() <= 35.0);
        assert_eq!(t.radius(), 35.0);
    }

    #[test]
    fn invalid_operator_input_is_substituted() {
        let mut t = TrajectoryState::default();
        t.start(f64::NAN, f64::INFINITY, None, &cfg());
        assert!(t.enabled());
        assert_eq!(t.radius(), 0.0);
        assert_eq!(t.angular_velocity_hz(), cfg().default_frequency_hz);

        t.start(-10.0, -2.0, None, &cfg());
        assert_eq!(t.radius(), 0.0);
        assert_eq!(t.angular_velocity_hz(), cfg().default_frequency_hz);
    }

    #[test]
    fn restart_resets_phase() {
        let mut t = TrajectoryState::default();
        t.start(10.0, 1.0, None, &cfg());
        t.advance(0.05);
        assert!(t.angular_phase() > 0.0);
        t.start(10.0, 1.0, None, &cfg());
        assert_eq!(t.angular_phase(), 0.0);
    }

    #[test]
    fn stop_zeroes_radius_and_is_idempotent() {
        let mut t = TrajectoryState::default();
        t.start(25.0, 1.0, None, &cfg());
        t.stop();
        assert!(!t.enabled());
        assert_eq!(t.radius(), 0.0);
        t.stop();
        assert!(!t.enabled());
    }

    #[test]
    fn tiny_field_caps_radius_at_zero() {
        let mut t = TrajectoryState::default();
        let field = FieldSize::new(6.0, 6.0);
        t.start(20.0, 1.0, field, &cfg());
        assert_eq!(t.radius(), 0.0);
    }

    #[test]
    fn ticker_posts_ticks_and_stops_on_drop() {
        use balancer_traits::clock::test_clock::TestClock;

        let (tx, rx) = xch::unbounded();
        let ticker = Ticker::spawn(tx, Duration::from_millis(50), TestClock::new());
        // TestClock::sleep advances virtual time without blocking, so ticks
        // arrive as fast as the thread can loop.
        let first = rx.recv_timeout(Duration::from_secs(1)).unwrap();
        assert!(matches!(first, SessionEvent::TrajectoryTick));
        drop(ticker);
        // Drain whatever was queued before shutdown; the channel must then
        // disconnect because the thread (the only sender) is gone.
        while let Ok(_tick) = rx.try_recv() {}
        assert!(matches!(rx.recv(), Err(xch::RecvError)));
    }
}
