#![no_main]
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Inbound telemetry is lenient by design: any JSON document must decode
    // into a StatusUpdate (garbage fields degrade to defaults) or fail the
    // parse cleanly. Neither path may panic.
    if let Ok(status) = serde_json::from_slice::<balancer_core::events::StatusUpdate>(data) {
        // Exercise the reducer with the decoded snapshot; the session must
        // stay total on arbitrary inputs.
        let (tx, _rx) = crossbeam_channel::unbounded();
        if let Ok(mut session) = balancer_core::session::Session::new(
            balancer_core::config::SessionCfg::default(),
            balancer_core::mocks::NullSink,
            tx,
        ) {
            session.handle(balancer_core::events::SessionEvent::Status(status));
            let _ = session.view();
        }
    }
});
