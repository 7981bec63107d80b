use std::sync::Arc;

use bytes::Bytes;
use tokio::{
    io::AsyncReadExt,
    sync::{Mutex, broadcast, watch},
    task::JoinHandle,
};
use tracing::{info, warn};

use crate::core::errors::CameraError;

use super::{
    assemble::FrameAssembler,
    still::{self, CapturedFrame},
    traits::CameraBackend,
};

const PUMP_BUFFER_BYTES: usize = 16 * 1024;
const PREVIEW_CHANNEL_CAPACITY: usize = 16;

/// Everything tied to one open device stream. Held iff the camera is active;
/// dropping it (via `close`) releases the device.
struct PreviewSession {
    cancel_tx: watch::Sender<bool>,
    pump: JoinHandle<()>,
    chunks: broadcast::Sender<Bytes>,
    latest_frame: Arc<Mutex<Option<Vec<u8>>>>,
}

/// Owns the camera device stream lifecycle and still-frame extraction.
pub struct FrameCapture<B: CameraBackend> {
    backend: B,
    preview: Option<PreviewSession>,
}

impl<B: CameraBackend> FrameCapture<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            preview: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.preview.is_some()
    }

    /// Acquire the camera and start pumping its preview stream. A no-op when
    /// already active.
    pub async fn open(&mut self) -> Result<(), CameraError> {
        if self.preview.is_some() {
            return Ok(());
        }

        let mut child = self.backend.spawn_preview().await?;
        let mut stdout = match child.stdout.take() {
            Some(stdout) => stdout,
            None => {
                let _ = child.kill().await;
                return Err(CameraError::DeviceUnavailable(
                    "preview process has no stdout pipe".to_owned(),
                ));
            }
        };

        let (cancel_tx, mut cancel_rx) = watch::channel(false);
        let (chunks_tx, _) = broadcast::channel(PREVIEW_CHANNEL_CAPACITY);
        let latest_frame = Arc::new(Mutex::new(None));

        let task_chunks = chunks_tx.clone();
        let task_frame = latest_frame.clone();
        let pump = tokio::spawn(async move {
            let mut buffer = vec![0_u8; PUMP_BUFFER_BYTES];
            let mut assembler = FrameAssembler::new();
            loop {
                tokio::select! {
                    changed = cancel_rx.changed() => {
                        if changed.is_ok() && *cancel_rx.borrow() {
                            info!("preview pump cancelled by close request");
                        }
                        break;
                    }
                    read = stdout.read(&mut buffer) => {
                        match read {
                            Ok(0) => {
                                warn!("preview stream ended unexpectedly");
                                break;
                            }
                            Ok(n) => {
                                if let Some(frame) = assembler.feed(&buffer[..n]) {
                                    *task_frame.lock().await = Some(frame);
                                }
                                let _ = task_chunks.send(Bytes::copy_from_slice(&buffer[..n]));
                            }
                            Err(err) => {
                                warn!("preview stream read failed: {err}");
                                break;
                            }
                        }
                    }
                }
            }

            if let Err(err) = child.kill().await {
                warn!("failed to kill preview process: {err}");
            }
            if let Err(err) = child.wait().await {
                warn!("failed to reap preview process: {err}");
            }
            task_frame.lock().await.take();
        });

        self.preview = Some(PreviewSession {
            cancel_tx,
            pump,
            chunks: chunks_tx,
            latest_frame,
        });
        Ok(())
    }

    /// Release the camera. Waits until the preview process is gone so the
    /// device is free when this returns. A no-op when already inactive.
    pub async fn close(&mut self) {
        let Some(session) = self.preview.take() else {
            return;
        };

        let _ = session.cancel_tx.send(true);
        if let Err(err) = session.pump.await {
            warn!("preview pump task failed: {err}");
        }
    }

    /// Extract the current preview frame as an 800x450 JPEG still.
    pub async fn snapshot(&self) -> Result<CapturedFrame, CameraError> {
        let session = self
            .preview
            .as_ref()
            .ok_or_else(|| CameraError::CaptureUnavailable("no active camera session".to_owned()))?;

        let frame = session.latest_frame.lock().await.clone().ok_or_else(|| {
            CameraError::CaptureUnavailable("no preview frame received yet".to_owned())
        })?;

        still::encode_still(&frame)
    }

    /// Subscribe to the raw preview byte stream while the camera is active.
    pub fn preview_chunks(&self) -> Option<broadcast::Receiver<Bytes>> {
        self.preview
            .as_ref()
            .map(|session| session.chunks.subscribe())
    }
}
