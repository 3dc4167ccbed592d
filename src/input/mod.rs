//! Input side of the agent
//!
//! A global listener feeds key presses to the controller, and a queued
//! dispatch worker performs the simulated double-presses. The two never
//! share state; the queue is the only path to the keyboard.

pub mod listener;
pub mod queue;
pub mod sink;

pub use listener::spawn_key_listener;
pub use queue::{ActionQueue, ActionSender};
pub use sink::{InputSink, KeyboardSink};
