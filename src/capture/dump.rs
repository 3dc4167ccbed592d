//! Debug frame persistence

use std::io::Cursor;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use image::{GrayImage, ImageFormat};

use crate::error::{AgentError, AgentResult};

/// Persists captured frames as PNG files keyed by a nanosecond timestamp.
/// Purely observational; the core never reads the files back.
pub struct FrameDump {
    dir: PathBuf,
}

impl FrameDump {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Create the dump directory if it does not exist yet.
    pub async fn prepare(&self) -> AgentResult<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|source| AgentError::FrameDumpFailed {
                path: self.dir.clone(),
                source,
            })
    }

    /// Write one frame; returns the path it was saved under.
    pub async fn save(&self, frame: &GrayImage) -> AgentResult<PathBuf> {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_nanos())
            .unwrap_or(0);
        let path = self.dir.join(format!("{nanos}.png"));

        let mut bytes = Vec::new();
        frame
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .map_err(|source| AgentError::FrameEncodeFailed { source })?;

        tokio::fs::write(&path, bytes)
            .await
            .map_err(|source| AgentError::FrameDumpFailed {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}
