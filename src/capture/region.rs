//! Capture region geometry

use serde::{Deserialize, Serialize};

use crate::error::AgentResult;

/// Fixed screen rectangle sampled on every capture. Immutable after creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptureRegion {
    pub top: i32,
    pub left: i32,
    pub width: u32,
    pub height: u32,
}

impl CaptureRegion {
    pub fn new(top: i32, left: i32, width: u32, height: u32) -> Self {
        Self {
            top,
            left,
            width,
            height,
        }
    }

    /// The center quarter of a display: offset by a quarter of the display
    /// size on each axis, half the display size in each dimension.
    pub fn center_quarter(
        display_left: i32,
        display_top: i32,
        display_width: u32,
        display_height: u32,
    ) -> Self {
        Self {
            top: display_top + (display_height / 4) as i32,
            left: display_left + (display_width / 4) as i32,
            width: display_width / 2,
            height: display_height / 2,
        }
    }

    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Compute the capture region from the primary display's geometry.
pub fn primary_display_region() -> AgentResult<CaptureRegion> {
    let monitor = super::backend::primary_monitor()?;
    Ok(CaptureRegion::center_quarter(
        monitor.x()?,
        monitor.y()?,
        monitor.width()?,
        monitor.height()?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_center_quarter_at_origin() {
        let region = CaptureRegion::center_quarter(0, 0, 1920, 1080);

        assert_eq!(region.left, 480);
        assert_eq!(region.top, 270);
        assert_eq!(region.width, 960);
        assert_eq!(region.height, 540);
    }

    #[test]
    fn test_center_quarter_with_display_offset() {
        // Secondary-left layouts give the primary display a negative origin
        let region = CaptureRegion::center_quarter(-1920, 100, 1920, 1080);

        assert_eq!(region.left, -1920 + 480);
        assert_eq!(region.top, 100 + 270);
        assert_eq!(region.size(), (960, 540));
    }

    #[test]
    fn test_zero_sized_region_is_invalid() {
        assert!(!CaptureRegion::new(0, 0, 0, 100).is_valid());
        assert!(!CaptureRegion::new(0, 0, 100, 0).is_valid());
        assert!(CaptureRegion::new(0, 0, 1, 1).is_valid());
    }
}
