//! Acquisition backends for `FrameSource`

use image::{DynamicImage, GrayImage};
use xcap::Monitor;

use super::region::CaptureRegion;
use crate::error::{AgentError, AgentResult};

/// One capture handle. Handles are thread-confined by `FrameSource`, which
/// opens one per calling thread through the backend factory and serializes
/// all `capture` calls behind a single lock.
pub trait CaptureBackend: Send {
    /// Produce a grayscale frame exactly the size of `region`. Must never
    /// return a partially written frame.
    fn capture(&mut self, region: &CaptureRegion) -> AgentResult<GrayImage>;
}

/// Locate the primary monitor.
pub fn primary_monitor() -> AgentResult<Monitor> {
    let monitors = Monitor::all()?;
    for monitor in monitors {
        if monitor.is_primary()? {
            return Ok(monitor);
        }
    }
    Err(AgentError::NoPrimaryMonitor)
}

/// Captures the primary display via xcap and crops to the region.
pub struct XcapBackend {
    monitor: Monitor,
    origin: (i32, i32),
}

impl XcapBackend {
    pub fn open() -> AgentResult<Self> {
        let monitor = primary_monitor()?;
        let origin = (monitor.x()?, monitor.y()?);
        Ok(Self { monitor, origin })
    }
}

impl CaptureBackend for XcapBackend {
    fn capture(&mut self, region: &CaptureRegion) -> AgentResult<GrayImage> {
        let shot = self.monitor.capture_image()?;

        // Region coordinates are absolute screen coordinates; the captured
        // image starts at the monitor origin.
        let x = (region.left - self.origin.0).max(0) as u32;
        let y = (region.top - self.origin.1).max(0) as u32;

        // Clamp to the captured bounds
        let x = x.min(shot.width().saturating_sub(1));
        let y = y.min(shot.height().saturating_sub(1));
        let width = region.width.min(shot.width() - x);
        let height = region.height.min(shot.height() - y);

        let cropped = image::imageops::crop_imm(&shot, x, y, width, height).to_image();
        Ok(DynamicImage::ImageRgba8(cropped).to_luma8())
    }
}
