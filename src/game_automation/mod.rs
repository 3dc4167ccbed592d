// Game automation module
// This module provides the finite state machine that drives the reflex
// minigame: capture a frame, match it against the reference templates,
// queue the key press the score demands.

pub mod channels;
pub mod decision;
pub mod fsm;
pub mod types;


// Re-export the main types and functions for easy access
pub use channels::create_automation_channels;
pub use decision::{Decision, decide};
pub use fsm::ChopAutomation;
pub use types::{AutomationCommand, AutomationEvent, RunState, Side};
