pub mod capture;
pub mod config;
pub mod controller;
pub mod error;
pub mod game_automation;
pub mod input;
pub mod matching;

pub use config::AgentConfig;
pub use controller::{Controller, KeyBindings};
pub use error::{AgentError, AgentResult};
pub use game_automation::ChopAutomation;
