//! Screen acquisition for the detection loop
//!
//! The capture path is split into:
//! - a fixed `CaptureRegion` computed once from the primary display,
//! - a `CaptureBackend` seam in front of the actual acquisition,
//! - a `FrameSource` that hands out grayscale frames while serializing
//!   every capture behind one lock,
//! - an optional `FrameDump` collaborator that persists frames for
//!   offline inspection.

pub mod backend;
pub mod dump;
pub mod region;
pub mod source;

pub use backend::{CaptureBackend, XcapBackend};
pub use dump::FrameDump;
pub use region::{CaptureRegion, primary_display_region};
pub use source::FrameSource;
