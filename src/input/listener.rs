//! Global key listener

use log::error;
use tokio::sync::mpsc;

use crate::error::{AgentError, AgentResult};

/// Start the global key hook on its own thread. Every physical key press
/// is pushed onto the channel; the consumer decides what the key means.
/// The hook runs for the life of the process.
pub fn spawn_key_listener(
    tx: mpsc::UnboundedSender<rdev::Key>,
) -> AgentResult<std::thread::JoinHandle<()>> {
    std::thread::Builder::new()
        .name("key-listener".to_string())
        .spawn(move || {
            let result = rdev::listen(move |event| {
                if let rdev::EventType::KeyPress(key) = event.event_type {
                    // Receiver gone means the agent is shutting down
                    let _ = tx.send(key);
                }
            });
            if let Err(e) = result {
                error!("❌ global key listener terminated: {e:?}");
            }
        })
        .map_err(|source| AgentError::ThreadSpawnFailed {
            name: "key-listener",
            source,
        })
}
