//! Runtime configuration for the decision loop

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Confidence above which a twig on the active side is confirmed (0.0 to 1.0)
    pub twig_confidence: f32,
    /// Twig score below which the end-of-game check is attempted
    pub end_gate: f32,
    /// Confidence above which the end-of-game screen is confirmed
    pub end_confidence: f32,
    /// Confidence above which the calibration frame counts as "left lane empty"
    pub calibration_confidence: f32,
    /// Delay between iterations; outlasts the game's obstacle-transition animation
    pub cycle_interval: Duration,
    /// Backoff after a failed iteration before the loop retries
    pub error_backoff: Duration,
    /// Consecutive iteration failures tolerated before the run is aborted
    pub max_consecutive_errors: u32,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            twig_confidence: 0.7,
            end_gate: 0.6,
            end_confidence: 0.9,
            calibration_confidence: 0.9,
            cycle_interval: Duration::from_millis(110),
            error_backoff: Duration::from_millis(100),
            max_consecutive_errors: 20,
        }
    }
}
