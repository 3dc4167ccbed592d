//! Queued input dispatch
//!
//! Decouples key simulation (which includes fixed delays) from the
//! detection loop: the loop enqueues, a single dedicated worker executes.

use std::thread;

use log::{debug, error, warn};
use tokio::sync::mpsc;

use super::sink::InputSink;
use crate::error::{AgentError, AgentResult};
use crate::game_automation::Side;

/// Cloneable producing half of the action queue.
#[derive(Clone)]
pub struct ActionSender {
    tx: mpsc::UnboundedSender<Side>,
}

impl ActionSender {
    /// Queue one double-press. Never blocks the caller.
    pub fn enqueue(&self, side: Side) {
        if self.tx.send(side).is_err() {
            warn!("input dispatch worker is gone, dropping {side:?} action");
        }
    }
}

/// Unbounded FIFO of pending double-presses with one dedicated worker
/// thread, spawned once for the agent's lifetime. Actions execute strictly
/// in enqueue order and never concurrently. The worker blocks on the
/// dequeue; the channel closing (every sender dropped) is its shutdown
/// signal.
pub struct ActionQueue {
    tx: mpsc::UnboundedSender<Side>,
    worker: thread::JoinHandle<()>,
}

impl ActionQueue {
    /// Spawn the worker thread. The sink is constructed on the worker so
    /// its OS handles stay thread-confined; a sink that fails to construct
    /// fails the spawn.
    pub fn spawn<S, F>(make_sink: F) -> AgentResult<Self>
    where
        S: InputSink,
        F: FnOnce() -> AgentResult<S> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<Side>();
        let (ready_tx, ready_rx) = std::sync::mpsc::channel();

        let worker = thread::Builder::new()
            .name("input-dispatch".to_string())
            .spawn(move || {
                let mut sink = match make_sink() {
                    Ok(sink) => {
                        let _ = ready_tx.send(Ok(()));
                        sink
                    }
                    Err(error) => {
                        let _ = ready_tx.send(Err(error));
                        return;
                    }
                };

                while let Some(side) = rx.blocking_recv() {
                    if let Err(error) = sink.double_press(side) {
                        // A missed press cannot be replayed; report and move on
                        warn!("⚠️ double press {side:?} failed: {error}");
                    }
                }
                debug!("input dispatch worker exited");
            })
            .map_err(|source| AgentError::ThreadSpawnFailed {
                name: "input-dispatch",
                source,
            })?;

        match ready_rx.recv() {
            Ok(Ok(())) => Ok(Self { tx, worker }),
            Ok(Err(error)) => {
                let _ = worker.join();
                Err(error)
            }
            Err(_) => Err(AgentError::InputUnavailable {
                description: "input dispatch worker died during startup".to_string(),
            }),
        }
    }

    pub fn sender(&self) -> ActionSender {
        ActionSender {
            tx: self.tx.clone(),
        }
    }

    /// Close the queue and wait for the worker to drain. Outstanding
    /// `ActionSender` clones keep the queue open until they are dropped.
    pub fn shutdown(self) {
        let Self { tx, worker } = self;
        drop(tx);
        if worker.join().is_err() {
            error!("input dispatch worker panicked");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    struct RecordingSink {
        log: Arc<Mutex<Vec<Side>>>,
        fail_first: bool,
        executed: usize,
    }

    impl InputSink for RecordingSink {
        fn double_press(&mut self, side: Side) -> AgentResult<()> {
            self.executed += 1;
            if self.fail_first && self.executed == 1 {
                return Err(AgentError::InputFailed {
                    description: "synthetic failure".to_string(),
                });
            }
            self.log.lock().unwrap().push(side);
            Ok(())
        }
    }

    #[test]
    fn test_actions_execute_in_fifo_order() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let queue = {
            let log = Arc::clone(&log);
            ActionQueue::spawn(move || {
                Ok(RecordingSink {
                    log,
                    fail_first: false,
                    executed: 0,
                })
            })
            .unwrap()
        };

        let sender = queue.sender();
        let expected = vec![
            Side::Left,
            Side::Right,
            Side::Left,
            Side::Left,
            Side::Right,
        ];
        for side in &expected {
            sender.enqueue(*side);
        }

        drop(sender);
        queue.shutdown();
        assert_eq!(*log.lock().unwrap(), expected);
    }

    #[test]
    fn test_failed_action_does_not_stall_the_queue() {
        let log = Arc::new(Mutex::new(Vec::new()));
        let queue = {
            let log = Arc::clone(&log);
            ActionQueue::spawn(move || {
                Ok(RecordingSink {
                    log,
                    fail_first: true,
                    executed: 0,
                })
            })
            .unwrap()
        };

        let sender = queue.sender();
        sender.enqueue(Side::Left); // this one fails inside the sink
        sender.enqueue(Side::Right);
        sender.enqueue(Side::Left);

        drop(sender);
        queue.shutdown();
        assert_eq!(*log.lock().unwrap(), vec![Side::Right, Side::Left]);
    }

    #[test]
    fn test_sink_construction_failure_fails_the_spawn() {
        let result = ActionQueue::spawn(|| {
            Err::<RecordingSink, _>(AgentError::InputUnavailable {
                description: "no display server".to_string(),
            })
        });
        assert!(matches!(
            result,
            Err(AgentError::InputUnavailable { .. })
        ));
    }
}
