//! Single-actor event loop.
//!
//! Drains the session mailbox and feeds events to the session one at a
//! time, run-to-completion. All mutation of session state happens on the
//! calling thread; other event sources (transport, ticker, UI adapters)
//! only ever hold a `Sender`.

use crate::events::{CommandSink, SessionEvent};
use crate::session::Session;
use crossbeam_channel as xch;

/// Run until a `Shutdown` event arrives or every sender is dropped.
/// `observer` is called after each processed event with the updated session
/// (used by adapters that re-render per event). Returns the number of
/// events processed.
pub fn run<S, F>(
    session: &mut Session<S>,
    events: &xch::Receiver<SessionEvent>,
    mut observer: F,
) -> u64
where
    S: CommandSink,
    F: FnMut(&Session<S>),
{
    tracing::info!("session loop started");
    let mut processed = 0u64;
    for event in events.iter() {
        if matches!(event, SessionEvent::Shutdown) {
            tracing::info!(processed, "session loop shutting down");
            break;
        }
        session.handle(event);
        processed += 1;
        observer(session);
    }
    tracing::info!(processed, "session loop finished");
    processed
}
