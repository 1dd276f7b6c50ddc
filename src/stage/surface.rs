use std::sync::{Arc, Mutex, MutexGuard};

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;
use uuid::Uuid;

use super::ViewState;

/// One presented sample of a running transaction
///
/// `transaction` ties the frame back to its history record; overlapping
/// transactions interleave their frames on the same surface.
#[derive(Debug, Clone, Serialize)]
pub struct Frame {
    pub transaction: Uuid,
    pub tag: String,
    pub elapsed_secs: f32,
    pub progress: f32,
    pub view: ViewState,
}

/// Where interpolated frames go
///
/// The animator drives exactly one surface; implementations decide what
/// presenting means (drawing, recording, discarding).
#[async_trait]
pub trait Surface: Send {
    /// Surface name for logs
    fn name(&self) -> &str;

    /// Present one interpolated frame
    async fn present(&mut self, frame: &Frame) -> Result<()>;

    /// Called once per transaction after its final frame
    async fn finish(&mut self, _tag: &str) -> Result<()> {
        Ok(())
    }
}

pub type SurfaceBox = Box<dyn Surface>;

/// Discards every frame, useful for headless runs
#[derive(Debug, Default)]
pub struct NullSurface;

#[async_trait]
impl Surface for NullSurface {
    fn name(&self) -> &str {
        "null"
    }

    async fn present(&mut self, _frame: &Frame) -> Result<()> {
        Ok(())
    }
}

/// Shared handle to the frames a `RecordingSurface` captured
pub type FrameLog = Arc<Mutex<Vec<Frame>>>;

/// Captures every presented frame for inspection
///
/// Clone the log handle with `frames()` before handing the surface to
/// an animator, then read it after `idle()`.
#[derive(Debug, Default)]
pub struct RecordingSurface {
    frames: FrameLog,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frames(&self) -> FrameLog {
        Arc::clone(&self.frames)
    }
}

pub(crate) fn lock_frames(log: &FrameLog) -> MutexGuard<'_, Vec<Frame>> {
    log.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[async_trait]
impl Surface for RecordingSurface {
    fn name(&self) -> &str {
        "recording"
    }

    async fn present(&mut self, frame: &Frame) -> Result<()> {
        lock_frames(&self.frames).push(frame.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_frame(progress: f32) -> Frame {
        Frame {
            transaction: Uuid::new_v4(),
            tag: "First".to_string(),
            elapsed_secs: progress,
            progress,
            view: ViewState::default(),
        }
    }

    #[tokio::test]
    async fn test_recording_surface_captures_frames() {
        let mut surface = RecordingSurface::new();
        let log = surface.frames();

        surface.present(&sample_frame(0.0)).await.unwrap();
        surface.present(&sample_frame(1.0)).await.unwrap();
        surface.finish("First").await.unwrap();

        let frames = lock_frames(&log);
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].progress, 0.0);
        assert_eq!(frames[1].progress, 1.0);
    }

    #[tokio::test]
    async fn test_null_surface_accepts_frames() {
        let mut surface = NullSurface;
        assert!(surface.present(&sample_frame(0.5)).await.is_ok());
    }
}
