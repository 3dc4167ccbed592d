//! Key-event handling and lifecycle commands
//!
//! The external listener pushes raw key presses onto a channel; the
//! controller drains it and translates presses into automation commands or
//! manual queue actions. No callback re-entrancy, no shared state with the
//! decision loop beyond the channels.

use log::{info, warn};
use tokio::sync::mpsc;

use crate::game_automation::{AutomationCommand, Side};
use crate::input::ActionSender;

/// Key assignments for the agent's hotkeys.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBindings {
    pub stop: rdev::Key,
    pub start: rdev::Key,
    pub manual_left: rdev::Key,
    pub manual_right: rdev::Key,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            stop: rdev::Key::Escape,
            start: rdev::Key::UpArrow,
            manual_left: rdev::Key::KeyJ,
            manual_right: rdev::Key::KeyL,
        }
    }
}

impl KeyBindings {
    /// Default bindings with the manual double-press keys rebound to two
    /// letter keys. Returns `None` for anything outside a-z.
    pub fn with_manual_chars(left: char, right: char) -> Option<Self> {
        Some(Self {
            manual_left: letter_key(left)?,
            manual_right: letter_key(right)?,
            ..Self::default()
        })
    }
}

fn letter_key(c: char) -> Option<rdev::Key> {
    use rdev::Key;

    let key = match c.to_ascii_lowercase() {
        'a' => Key::KeyA,
        'b' => Key::KeyB,
        'c' => Key::KeyC,
        'd' => Key::KeyD,
        'e' => Key::KeyE,
        'f' => Key::KeyF,
        'g' => Key::KeyG,
        'h' => Key::KeyH,
        'i' => Key::KeyI,
        'j' => Key::KeyJ,
        'k' => Key::KeyK,
        'l' => Key::KeyL,
        'm' => Key::KeyM,
        'n' => Key::KeyN,
        'o' => Key::KeyO,
        'p' => Key::KeyP,
        'q' => Key::KeyQ,
        'r' => Key::KeyR,
        's' => Key::KeyS,
        't' => Key::KeyT,
        'u' => Key::KeyU,
        'v' => Key::KeyV,
        'w' => Key::KeyW,
        'x' => Key::KeyX,
        'y' => Key::KeyY,
        'z' => Key::KeyZ,
        _ => return None,
    };
    Some(key)
}

/// External-facing coordinator: maps key events onto the automation loop's
/// command channel and the action queue.
pub struct Controller {
    commands: mpsc::Sender<AutomationCommand>,
    actions: ActionSender,
    bindings: KeyBindings,
}

impl Controller {
    pub fn new(
        commands: mpsc::Sender<AutomationCommand>,
        actions: ActionSender,
        bindings: KeyBindings,
    ) -> Self {
        Self {
            commands,
            actions,
            bindings,
        }
    }

    /// Drain the key-event channel until it closes.
    pub async fn run(self, mut keys: mpsc::UnboundedReceiver<rdev::Key>) {
        while let Some(key) = keys.recv().await {
            self.handle_key(key).await;
        }
    }

    /// Map one physical key press to its meaning.
    pub async fn handle_key(&self, key: rdev::Key) {
        if key == self.bindings.stop {
            info!("⏹️ stop requested");
            self.stop().await;
        } else if key == self.bindings.start {
            info!("🌲 start requested");
            self.start().await;
        } else if key == self.bindings.manual_left {
            self.manual_left();
        } else if key == self.bindings.manual_right {
            self.manual_right();
        }
    }

    /// Start a run. The automation loop ignores this while already
    /// Running, so repeated starts are a no-op.
    pub async fn start(&self) {
        self.send(AutomationCommand::Start).await;
    }

    /// Stop the active run at its next iteration boundary.
    pub async fn stop(&self) {
        self.send(AutomationCommand::Stop).await;
    }

    /// Queue a manual left double-press, independent of run state.
    pub fn manual_left(&self) {
        self.actions.enqueue(Side::Left);
    }

    /// Queue a manual right double-press, independent of run state.
    pub fn manual_right(&self) {
        self.actions.enqueue(Side::Right);
    }

    async fn send(&self, command: AutomationCommand) {
        if self.commands.send(command).await.is_err() {
            warn!("automation loop is gone, dropping command");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AgentResult;
    use crate::input::{ActionQueue, InputSink};
    use std::sync::{Arc, Mutex};

    struct RecordingSink {
        log: Arc<Mutex<Vec<Side>>>,
    }

    impl InputSink for RecordingSink {
        fn double_press(&mut self, side: Side) -> AgentResult<()> {
            self.log.lock().unwrap().push(side);
            Ok(())
        }
    }

    fn recording_queue() -> (ActionQueue, Arc<Mutex<Vec<Side>>>) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let queue = {
            let log = Arc::clone(&log);
            ActionQueue::spawn(move || Ok(RecordingSink { log })).unwrap()
        };
        (queue, log)
    }

    #[test]
    fn test_with_manual_chars() {
        let bindings = KeyBindings::with_manual_chars('a', 'D').unwrap();
        assert_eq!(bindings.manual_left, rdev::Key::KeyA);
        assert_eq!(bindings.manual_right, rdev::Key::KeyD);
        // stop/start keep their defaults
        assert_eq!(bindings.stop, rdev::Key::Escape);

        assert!(KeyBindings::with_manual_chars('1', 'l').is_none());
    }

    #[tokio::test]
    async fn test_stop_and_start_keys_map_to_commands() {
        let (cmd_tx, mut cmd_rx) = mpsc::channel(32);
        let (queue, _log) = recording_queue();
        let controller = Controller::new(cmd_tx, queue.sender(), KeyBindings::default());

        controller.handle_key(rdev::Key::Escape).await;
        assert!(matches!(
            cmd_rx.recv().await,
            Some(AutomationCommand::Stop)
        ));

        controller.handle_key(rdev::Key::UpArrow).await;
        assert!(matches!(
            cmd_rx.recv().await,
            Some(AutomationCommand::Start)
        ));

        // Unbound keys do nothing
        controller.handle_key(rdev::Key::KeyZ).await;
        assert!(cmd_rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_manual_keys_enqueue_actions() {
        let (cmd_tx, mut cmd_rx) = mpsc::channel(32);
        let (queue, log) = recording_queue();
        let controller = Controller::new(cmd_tx, queue.sender(), KeyBindings::default());

        controller.handle_key(rdev::Key::KeyJ).await;
        controller.handle_key(rdev::Key::KeyL).await;
        controller.handle_key(rdev::Key::KeyJ).await;

        // Manual actions bypass the command channel entirely
        assert!(cmd_rx.try_recv().is_err());

        drop(controller);
        queue.shutdown();
        assert_eq!(
            *log.lock().unwrap(),
            vec![Side::Left, Side::Right, Side::Left]
        );
    }
}
