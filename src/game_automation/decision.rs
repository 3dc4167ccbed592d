//! Per-iteration decision logic

use crate::config::AgentConfig;
use crate::error::AgentResult;

/// What one iteration decided to do with its frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Obstacle confirmed on the active side: press the opposite direction
    /// and flip the active side.
    Dodge,
    /// No obstacle confirmed: keep pressing the active side.
    Advance,
    /// End-of-game screen detected: stop the run, press nothing.
    GameOver,
}

/// The three-way split over one frame's scores.
///
/// The end-of-game screen and "no obstacle" frames both score low against
/// the twig template, so the end template is only evaluated when the twig
/// score is already below the gate; `end_score` stays lazy for that reason.
pub fn decide<F>(config: &AgentConfig, twig_score: f32, end_score: F) -> AgentResult<Decision>
where
    F: FnOnce() -> AgentResult<f32>,
{
    if twig_score < config.end_gate && end_score()? > config.end_confidence {
        return Ok(Decision::GameOver);
    }

    if twig_score > config.twig_confidence {
        Ok(Decision::Dodge)
    } else {
        Ok(Decision::Advance)
    }
}
