// Types and enums for the automation loop
use serde::{Deserialize, Serialize};

/// Lifecycle of one agent run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RunState {
    Idle,
    Running,
    Stopped,
}

/// Which lane the loop currently treats as active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn opposite(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

#[derive(Debug, Clone)]
pub enum AutomationCommand {
    Start,
    Stop,
    Shutdown,
}

#[derive(Debug, Clone)]
pub enum AutomationEvent {
    StateChanged(RunState),
    SideCalibrated(Side),
    GameOver,
    Error(String),
}
