#![cfg_attr(all(not(debug_assertions), not(test)), deny(warnings))]
#![cfg_attr(
    all(not(debug_assertions), not(test)),
    deny(clippy::all, clippy::pedantic, clippy::nursery)
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]
#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]
//! Client-side state reconciliation for a tele-operated ball balancer.
//!
//! Two asynchronously-arriving inbound streams (a one-time device handshake
//! and recurring telemetry) merge with locally-held operator state into a
//! single coherent view model, and operator actions derive outbound
//! commands. Transport and rendering stay outside: events come in through a
//! crossbeam mailbox, commands go out through `CommandSink`, and adapters
//! read `Session::view()` snapshots.
//!
//! ## Architecture
//!
//! - **Geometry**: field rectangle, clamp/normalize rules (`geometry`)
//! - **Target**: the operator's commanded setpoint (`target`)
//! - **Trajectory**: circular setpoint generator + cancellable ticker
//!   (`trajectory`)
//! - **Reconciliation**: telemetry/handshake reducers and the precedence
//!   rule for the rendered target (`session`)
//! - **Event loop**: single-actor, run-to-completion (`runner`)

// Module declarations
pub mod config;
pub mod conversions;
pub mod error;
pub mod events;
pub mod geometry;
pub mod mocks;
pub mod pid;
pub mod runner;
pub mod series;
pub mod session;
pub mod target;
pub mod trajectory;
pub mod util;

pub use config::SessionCfg;
pub use error::{BuildError, Result};
pub use events::{
    CommandSink, ControlMode, DeviceHello, SessionEvent, SetCommand, StatusUpdate, UiAction,
};
pub use geometry::{FieldModel, FieldSize, Pose, clamp, normalize};
pub use pid::{PidGains, PidGainsPatch};
pub use series::{ErrorSample, ErrorSeries};
pub use session::{Attitude, Session, ViewModel};
pub use target::TargetState;
pub use trajectory::{Ticker, TrajectoryState};
