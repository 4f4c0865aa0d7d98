//! Operator console binary: wires config, logging, the session event loop
//! and the built-in simulated device together.

mod cli;
mod sim;

use crate::cli::{Cli, Commands, FILE_GUARD};
use crate::sim::{SimDevice, SimSink};
use balancer_core::config::SessionCfg;
use balancer_core::events::{SessionEvent, UiAction};
use balancer_core::runner;
use balancer_core::session::Session;
use clap::Parser;
use crossbeam_channel as xch;
use eyre::{Result, WrapErr};
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Cli::parse();

    let (config, from_file) = load_config(&args.config)?;
    init_logging(&args, &config.logging)?;
    if from_file {
        tracing::info!(path = %args.config.display(), "config loaded");
    } else {
        tracing::info!(path = %args.config.display(), "config file absent, using defaults");
    }

    match args.cmd {
        Commands::Run {
            duration_ms,
            status_hz,
            snapshot_every,
            circle_radius,
            circle_hz,
        } => run(
            &config,
            duration_ms,
            status_hz,
            snapshot_every,
            circle_radius,
            circle_hz,
        ),
        Commands::SelfCheck => self_check(),
    }
}

/// Load and validate the TOML config; absent file means defaults.
fn load_config(path: &Path) -> Result<(balancer_config::Config, bool)> {
    if !path.exists() {
        return Ok((balancer_config::Config::default(), false));
    }
    let content = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;
    let config = balancer_config::load_toml(&content)
        .wrap_err_with(|| format!("failed to parse config file {}", path.display()))?;
    config.validate()?;
    Ok((config, true))
}

fn init_logging(args: &Cli, logging: &balancer_config::Logging) -> Result<()> {
    let level = logging.level.as_deref().unwrap_or(&args.log_level);
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()));

    if let Some(file) = logging.file.as_deref() {
        let path = Path::new(file);
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty());
        let name = path.file_name().unwrap_or(path.as_os_str());
        let appender = match logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir.unwrap_or(Path::new(".")), name),
            Some("hourly") => {
                tracing_appender::rolling::hourly(dir.unwrap_or(Path::new(".")), name)
            }
            _ => tracing_appender::rolling::never(dir.unwrap_or(Path::new(".")), name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_writer(writer)
            .init();
    } else if args.json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
    Ok(())
}

fn run(
    config: &balancer_config::Config,
    duration_ms: Option<u64>,
    status_hz: u32,
    snapshot_every: u64,
    circle_radius: Option<f64>,
    circle_hz: f64,
) -> Result<()> {
    let session_cfg = SessionCfg::from(config);
    let (tx, rx) = xch::unbounded();
    let target = sim::SharedTarget::default();
    let sink = SimSink::new(target.clone());
    let mut session = Session::new(session_cfg, sink, tx.clone())?;

    let _device = SimDevice::spawn(tx.clone(), target, status_hz);

    if let Some(radius) = circle_radius {
        tx.send(SessionEvent::Ui(UiAction::StartTrajectory {
            radius,
            frequency_hz: circle_hz,
        }))
        .wrap_err("mailbox closed before start")?;
    }

    let ctrlc_tx = tx.clone();
    ctrlc::set_handler(move || {
        let _ = ctrlc_tx.send(SessionEvent::Shutdown);
    })
    .wrap_err("failed to install Ctrl-C handler")?;

    let _timer = duration_ms.map(|ms| {
        let timer_tx = tx.clone();
        std::thread::spawn(move || {
            std::thread::sleep(std::time::Duration::from_millis(ms));
            let _ = timer_tx.send(SessionEvent::Shutdown);
        })
    });

    let mut since_snapshot = 0u64;
    let processed = runner::run(&mut session, &rx, |s| {
        since_snapshot += 1;
        if snapshot_every > 0 && since_snapshot >= snapshot_every {
            since_snapshot = 0;
            print_snapshot(s);
        }
    });

    print_snapshot(&session);
    tracing::info!(processed, "run finished");
    Ok(())
}

fn print_snapshot<S: balancer_core::events::CommandSink>(session: &Session<S>) {
    match serde_json::to_string(&session.view()) {
        Ok(line) => println!("{line}"),
        Err(e) => tracing::warn!(error = %e, "snapshot serialization failed"),
    }
}

/// One scripted handshake/telemetry/command round through the real session.
fn self_check() -> Result<()> {
    use balancer_core::mocks::RecordingSink;

    let (tx, _rx) = xch::unbounded();
    let sink = RecordingSink::new();
    let mut session = Session::new(SessionCfg::default(), sink.clone(), tx)?;

    session.handle(SessionEvent::Hello(sim::scripted_hello()));
    let status: balancer_core::events::StatusUpdate = serde_json::from_str(
        r#"{"real_pose": {"x": 10.0, "y": -10.0},
            "target_pose": {"x": 0.0, "y": 0.0},
            "error": {"x": -10.0, "y": 10.0},
            "time": 1.0}"#,
    )
    .wrap_err("scripted status should decode")?;
    session.handle(SessionEvent::Status(status));
    let step = session.cfg().target_step;
    session.handle(SessionEvent::Ui(UiAction::AdjustTarget { dx: step, dy: 0.0 }));
    session.handle(SessionEvent::Ui(UiAction::ApplyGains));

    let view = session.view();
    eyre::ensure!(view.field_ready, "field size was not seeded by handshake");
    eyre::ensure!(
        view.target_pose.x == step,
        "nudge did not move the target by one step"
    );
    eyre::ensure!(
        view.error_series.len() == 1,
        "telemetry did not reach the error series"
    );
    eyre::ensure!(
        sink.commands().len() == 1,
        "apply did not emit a command"
    );
    println!("self-check ok");
    Ok(())
}
