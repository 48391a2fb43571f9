use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast;

mod synthetic;
pub use synthetic::SyntheticCamera;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameraOptions {
    pub width: u32,
    pub height: u32,
}

impl Default for CameraOptions {
    fn default() -> Self {
        Self {
            width: 640,
            height: 480,
        }
    }
}

/// One preview frame, tightly packed RGBA rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

/// An open device stream. The session exclusively owns the underlying
/// device while open; `close` must release it and must be idempotent.
#[async_trait]
pub trait CameraSession: Send + Sync {
    /// Most recent preview frame, as the user currently sees it.
    async fn latest_frame(&self) -> anyhow::Result<CameraFrame>;
    fn subscribe_frames(&self) -> broadcast::Receiver<CameraFrame>;
    /// Stop the preview and release the device.
    async fn close(&self);
    fn is_open(&self) -> bool;
}

#[async_trait]
pub trait CameraConnector: Send + Sync {
    async fn open(&self, options: CameraOptions) -> anyhow::Result<Arc<dyn CameraSession>>;
}

pub struct MissingCamera;

#[async_trait]
impl CameraConnector for MissingCamera {
    async fn open(&self, _options: CameraOptions) -> anyhow::Result<Arc<dyn CameraSession>> {
        Err(anyhow::anyhow!("no camera device is wired into this build"))
    }
}
