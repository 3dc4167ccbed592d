//! Simulated keyboard output

use std::thread;
use std::time::Duration;

use enigo::{Enigo, Key, Keyboard, Settings};

use crate::error::{AgentError, AgentResult};
use crate::game_automation::Side;

/// Pause between the two taps of a double-press.
const DOUBLE_PRESS_GAP: Duration = Duration::from_millis(10);

/// Executes one queued action. Implementations are driven only by the
/// dispatch worker thread, so they may hold thread-confined OS handles.
pub trait InputSink {
    /// Double key-press for the given direction: press, release, short
    /// pause, press, release.
    fn double_press(&mut self, side: Side) -> AgentResult<()>;
}

/// Drives the OS keyboard through enigo.
pub struct KeyboardSink {
    enigo: Enigo,
}

impl KeyboardSink {
    pub fn new() -> AgentResult<Self> {
        let enigo = Enigo::new(&Settings::default()).map_err(|e| AgentError::InputUnavailable {
            description: e.to_string(),
        })?;
        Ok(Self { enigo })
    }

    fn tap(&mut self, key: Key) -> AgentResult<()> {
        self.enigo
            .key(key, enigo::Direction::Press)
            .and_then(|_| self.enigo.key(key, enigo::Direction::Release))
            .map_err(|e| AgentError::InputFailed {
                description: e.to_string(),
            })
    }
}

impl InputSink for KeyboardSink {
    fn double_press(&mut self, side: Side) -> AgentResult<()> {
        let key = match side {
            Side::Left => Key::LeftArrow,
            Side::Right => Key::RightArrow,
        };

        self.tap(key)?;
        thread::sleep(DOUBLE_PRESS_GAP);
        self.tap(key)
    }
}
