use std::path::PathBuf;
use thiserror::Error;

/// A specialized `Result` type for agent operations.
pub type AgentResult<T> = Result<T, AgentError>;

/// The error type for all agent operations.
#[derive(Debug, Error)]
pub enum AgentError {
    #[error("Screen capture failed: {source}")]
    CaptureFailed {
        #[from]
        source: xcap::XCapError,
    },

    #[error("Capture backend unavailable: {description}")]
    CaptureUnavailable { description: String },

    #[error("No primary monitor found. A primary display is required to compute the capture region.")]
    NoPrimaryMonitor,

    #[error(
        "Template ({template_width}x{template_height}) does not fit inside the frame ({frame_width}x{frame_height})"
    )]
    TemplateDimensions {
        template_width: u32,
        template_height: u32,
        frame_width: u32,
        frame_height: u32,
    },

    #[error("Failed to load template image {path:?}: {source}")]
    TemplateLoadFailed {
        path: PathBuf,
        source: image::ImageError,
    },

    #[error("Input simulation unavailable: {description}")]
    InputUnavailable { description: String },

    #[error("Input dispatch failed: {description}")]
    InputFailed { description: String },

    #[error("Failed to persist frame to {path:?}: {source}")]
    FrameDumpFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to encode frame: {source}")]
    FrameEncodeFailed { source: image::ImageError },

    #[error("Failed to spawn {name} thread: {source}")]
    ThreadSpawnFailed {
        name: &'static str,
        source: std::io::Error,
    },

    #[error("Task failed to complete: {source}")]
    JoinError {
        #[from]
        source: tokio::task::JoinError,
    },
}
