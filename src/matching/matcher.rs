//! Normalized cross-correlation scoring

use image::GrayImage;
use imageproc::template_matching::{MatchTemplateMethod, match_template};

use crate::error::{AgentError, AgentResult};

/// Score how strongly `template` resembles any region of `frame`.
///
/// Pure function of its inputs: runs normalized cross-correlation across
/// every valid alignment and returns the maximum, clamped to [0.0, 1.0].
/// Fails with `TemplateDimensions` when the template does not fit inside
/// the frame — `match_template` would panic on such input, so the check
/// must happen here.
pub fn score(frame: &GrayImage, template: &GrayImage) -> AgentResult<f32> {
    let (frame_width, frame_height) = frame.dimensions();
    let (template_width, template_height) = template.dimensions();

    if template_width == 0
        || template_height == 0
        || template_width > frame_width
        || template_height > frame_height
    {
        return Err(AgentError::TemplateDimensions {
            template_width,
            template_height,
            frame_width,
            frame_height,
        });
    }

    let correlation = match_template(
        frame,
        template,
        MatchTemplateMethod::CrossCorrelationNormalized,
    );

    // CrossCorrelationNormalized yields f32 cells; all-zero windows divide
    // by zero and produce NaN, which `>` skips.
    let mut best = 0.0f32;
    for (_x, _y, pixel) in correlation.enumerate_pixels() {
        let value = pixel[0];
        if value > best {
            best = value;
        }
    }

    Ok(best.clamp(0.0, 1.0))
}
