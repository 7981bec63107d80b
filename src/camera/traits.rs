use async_trait::async_trait;
use tokio::process::Child;

use crate::core::errors::CameraError;

/// Platform process that owns the camera device and writes an MJPEG byte
/// stream to its stdout. Killing the child releases the device.
#[async_trait]
pub trait CameraBackend: Send + Sync {
    async fn spawn_preview(&self) -> Result<Child, CameraError>;
}
