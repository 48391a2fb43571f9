//! In-tree camera device: renders a moving test pattern on a fixed cadence.
//! Used by the desktop app when no hardware integration is wired in, and by
//! tests that need a device with a real open/stream/close lifecycle.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use tokio::{sync::broadcast, task::JoinHandle};

use crate::{CameraConnector, CameraFrame, CameraOptions, CameraSession};

const FRAME_INTERVAL: Duration = Duration::from_millis(66);
const FRAME_CHANNEL_CAPACITY: usize = 8;

pub struct SyntheticCamera {
    available: bool,
}

impl SyntheticCamera {
    pub fn new() -> Self {
        Self { available: true }
    }

    /// A connector that refuses to open, for exercising the
    /// device-unavailable path.
    pub fn unavailable() -> Self {
        Self { available: false }
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CameraConnector for SyntheticCamera {
    async fn open(&self, options: CameraOptions) -> Result<Arc<dyn CameraSession>> {
        if !self.available {
            return Err(anyhow!("camera access denied"));
        }
        Ok(SyntheticSession::start(options))
    }
}

struct SyntheticSession {
    latest: Arc<Mutex<CameraFrame>>,
    frames: broadcast::Sender<CameraFrame>,
    generator: Mutex<Option<JoinHandle<()>>>,
    open: Arc<AtomicBool>,
}

impl SyntheticSession {
    fn start(options: CameraOptions) -> Arc<dyn CameraSession> {
        let (frames, _) = broadcast::channel(FRAME_CHANNEL_CAPACITY);
        let latest = Arc::new(Mutex::new(render_pattern(
            options.width,
            options.height,
            0,
        )));
        let open = Arc::new(AtomicBool::new(true));

        let generator = {
            let latest = Arc::clone(&latest);
            let frames = frames.clone();
            let open = Arc::clone(&open);
            tokio::spawn(async move {
                let mut ticker = tokio::time::interval(FRAME_INTERVAL);
                let mut tick: u32 = 0;
                while open.load(Ordering::SeqCst) {
                    ticker.tick().await;
                    tick = tick.wrapping_add(1);
                    let frame = render_pattern(options.width, options.height, tick);
                    if let Ok(mut slot) = latest.lock() {
                        *slot = frame.clone();
                    }
                    let _ = frames.send(frame);
                }
            })
        };

        Arc::new(Self {
            latest,
            frames,
            generator: Mutex::new(Some(generator)),
            open,
        })
    }

    fn release(&self) {
        self.open.store(false, Ordering::SeqCst);
        if let Ok(mut guard) = self.generator.lock() {
            if let Some(task) = guard.take() {
                task.abort();
            }
        }
    }
}

#[async_trait]
impl CameraSession for SyntheticSession {
    async fn latest_frame(&self) -> Result<CameraFrame> {
        if !self.is_open() {
            return Err(anyhow!("camera session is closed"));
        }
        self.latest
            .lock()
            .map(|frame| frame.clone())
            .map_err(|_| anyhow!("camera frame buffer poisoned"))
    }

    fn subscribe_frames(&self) -> broadcast::Receiver<CameraFrame> {
        self.frames.subscribe()
    }

    async fn close(&self) {
        self.release();
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}

// Covers teardown paths that never reach an explicit close.
impl Drop for SyntheticSession {
    fn drop(&mut self) {
        self.release();
    }
}

fn render_pattern(width: u32, height: u32, tick: u32) -> CameraFrame {
    let mut rgba = Vec::with_capacity((width * height * 4) as usize);
    for y in 0..height {
        for x in 0..width {
            let shifted = x.wrapping_add(tick * 3);
            rgba.push((shifted % 256) as u8);
            rgba.push(((y * 255) / height.max(1)) as u8);
            rgba.push(((x ^ y) & 0xff) as u8);
            rgba.push(0xff);
        }
    }
    CameraFrame {
        width,
        height,
        rgba,
    }
}
