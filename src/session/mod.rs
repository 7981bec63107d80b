use anyhow::{Result, bail};
use bytes::Bytes;
use tokio::sync::broadcast;
use tracing::{debug, info};

use crate::{
    camera::{capture::FrameCapture, still::CapturedFrame, traits::CameraBackend},
    core::{
        errors::CameraError,
        state::{SessionState, SessionStatus},
    },
    scan::ScanResult,
};

/// Single source of truth for the capture-and-scan workflow. Serializes
/// user-triggered transitions and enforces the single-pending-scan rule.
pub struct ScanSession<B: CameraBackend> {
    capture: FrameCapture<B>,
    pending: Option<u64>,
    next_ticket: u64,
    result: Option<ScanResult>,
}

impl<B: CameraBackend> ScanSession<B> {
    pub fn new(capture: FrameCapture<B>) -> Self {
        Self {
            capture,
            pending: None,
            next_ticket: 0,
            result: None,
        }
    }

    pub fn state(&self) -> SessionState {
        if !self.capture.is_active() {
            SessionState::Idle
        } else if self.pending.is_some() {
            SessionState::Scanning
        } else {
            SessionState::Previewing
        }
    }

    pub fn status(&self) -> SessionStatus {
        SessionStatus {
            camera_active: self.capture.is_active(),
            scan_pending: self.pending.is_some(),
            state: self.state(),
            display_text: self
                .result
                .as_ref()
                .map(|result| result.display_text.clone())
                .unwrap_or_default(),
        }
    }

    /// Open the camera when idle, close it otherwise. Closing while a scan
    /// is pending invalidates that scan: the flag clears immediately and the
    /// late result is discarded on arrival.
    pub async fn toggle_camera(&mut self) -> Result<(), CameraError> {
        if self.capture.is_active() {
            if self.pending.take().is_some() {
                debug!("camera closed mid-scan; its result will be discarded");
            }
            self.capture.close().await;
            info!("camera session closed");
            Ok(())
        } else {
            self.capture.open().await?;
            info!("camera session opened");
            Ok(())
        }
    }

    /// Admission control for scans: camera must be on and no scan pending.
    /// The pending ticket is issued only once the snapshot has succeeded, so
    /// no failure path can strand the session in a pending state.
    pub async fn begin_scan(&mut self) -> Result<(CapturedFrame, u64)> {
        if !self.capture.is_active() {
            bail!("camera is not active");
        }
        if self.pending.is_some() {
            bail!("a scan is already in progress");
        }

        let frame = self.capture.snapshot().await?;
        self.next_ticket += 1;
        let ticket = self.next_ticket;
        self.pending = Some(ticket);
        Ok((frame, ticket))
    }

    /// Record the resolution of a scan. Results for invalidated tickets
    /// (camera toggled off in the meantime) are dropped.
    pub fn finish_scan(&mut self, ticket: u64, result: ScanResult) {
        if self.pending == Some(ticket) {
            self.pending = None;
            self.result = Some(result);
            info!("scan resolved");
        } else {
            debug!("discarding stale scan result for ticket {ticket}");
        }
    }

    pub fn preview_chunks(&self) -> Option<broadcast::Receiver<Bytes>> {
        self.capture.preview_chunks()
    }
}
