//! Reference template loading

use std::path::{Path, PathBuf};

use image::GrayImage;

use crate::capture::CaptureRegion;
use crate::error::{AgentError, AgentResult};

/// The four reference images the decision loop matches against. Loaded once
/// at startup, grayscale, never mutated; shared read-only across threads.
pub struct TemplateSet {
    /// Empty left lane, used for the one-shot side calibration
    pub left_empty: GrayImage,
    /// Obstacle on the left lane
    pub left_twig: GrayImage,
    /// Obstacle on the right lane
    pub right_twig: GrayImage,
    /// End-of-game screen
    pub end: GrayImage,
}

impl TemplateSet {
    /// Load `left_empty.png`, `left_twig.png`, `right_twig.png` and
    /// `end.png` from a directory.
    pub fn load_from_dir(dir: impl AsRef<Path>) -> AgentResult<Self> {
        let dir = dir.as_ref();
        Ok(Self {
            left_empty: load_template(dir.join("left_empty.png"))?,
            left_twig: load_template(dir.join("left_twig.png"))?,
            right_twig: load_template(dir.join("right_twig.png"))?,
            end: load_template(dir.join("end.png"))?,
        })
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &GrayImage)> {
        [
            ("left_empty", &self.left_empty),
            ("left_twig", &self.left_twig),
            ("right_twig", &self.right_twig),
            ("end", &self.end),
        ]
        .into_iter()
    }

    /// Reject templates that could never fit inside a region-sized frame.
    /// Asset misconfiguration surfaces here at startup instead of as a
    /// per-iteration matching error.
    pub fn validate_for_region(&self, region: &CaptureRegion) -> AgentResult<()> {
        for (_name, template) in self.iter() {
            let (width, height) = template.dimensions();
            if width == 0 || height == 0 || width > region.width || height > region.height {
                return Err(AgentError::TemplateDimensions {
                    template_width: width,
                    template_height: height,
                    frame_width: region.width,
                    frame_height: region.height,
                });
            }
        }
        Ok(())
    }
}

fn load_template(path: PathBuf) -> AgentResult<GrayImage> {
    let img =
        image::open(&path).map_err(|source| AgentError::TemplateLoadFailed { path, source })?;
    Ok(img.to_luma8())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_template(dir: &Path, name: &str, width: u32, height: u32, fill: u8) {
        let img = GrayImage::from_pixel(width, height, image::Luma([fill]));
        img.save(dir.join(name)).unwrap();
    }

    fn write_full_set(dir: &Path, width: u32, height: u32) {
        write_template(dir, "left_empty.png", width, height, 40);
        write_template(dir, "left_twig.png", width, height, 90);
        write_template(dir, "right_twig.png", width, height, 140);
        write_template(dir, "end.png", width, height, 220);
    }

    #[test]
    fn test_load_from_dir() {
        let dir = tempfile::tempdir().unwrap();
        write_full_set(dir.path(), 12, 10);

        let set = TemplateSet::load_from_dir(dir.path()).unwrap();
        assert_eq!(set.left_empty.dimensions(), (12, 10));
        assert_eq!(set.end.get_pixel(0, 0)[0], 220);
        assert_eq!(set.iter().count(), 4);
    }

    #[test]
    fn test_missing_template_fails_with_path() {
        let dir = tempfile::tempdir().unwrap();
        write_template(dir.path(), "left_empty.png", 8, 8, 10);
        // left_twig.png and the rest are absent

        let err = TemplateSet::load_from_dir(dir.path())
            .err()
            .expect("load should fail");
        match err {
            AgentError::TemplateLoadFailed { path, .. } => {
                assert!(path.ends_with("left_twig.png"));
            }
            other => panic!("expected TemplateLoadFailed, got {other}"),
        }
    }

    #[test]
    fn test_validate_for_region() {
        let dir = tempfile::tempdir().unwrap();
        write_full_set(dir.path(), 12, 10);
        let set = TemplateSet::load_from_dir(dir.path()).unwrap();

        assert!(
            set.validate_for_region(&CaptureRegion::new(0, 0, 100, 100))
                .is_ok()
        );
        assert!(matches!(
            set.validate_for_region(&CaptureRegion::new(0, 0, 11, 100)),
            Err(AgentError::TemplateDimensions { .. })
        ));
    }
}
