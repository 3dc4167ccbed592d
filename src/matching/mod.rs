/// Template matching for frame classification
///
/// Scores captured frames against the reference templates with normalized
/// cross-correlation. The decision loop only ever consumes the best score,
/// never match positions.
pub mod matcher;
pub mod templates;

pub use matcher::score;
pub use templates::TemplateSet;
