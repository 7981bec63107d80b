use std::{io::ErrorKind, path::Path, process::Stdio};

use async_trait::async_trait;
use tokio::process::{Child, Command};

use crate::core::errors::CameraError;

use super::{PREVIEW_BOUNDARY, traits::CameraBackend};

#[derive(Debug, Clone)]
pub struct FfmpegBackend {
    device: String,
    input_format: String,
}

impl FfmpegBackend {
    pub fn new(device: String, input_format: String) -> Self {
        Self {
            device,
            input_format,
        }
    }
}

#[async_trait]
impl CameraBackend for FfmpegBackend {
    async fn spawn_preview(&self) -> Result<Child, CameraError> {
        if !Path::new(&self.device).exists() {
            return Err(CameraError::DeviceUnavailable(format!(
                "device not found: {}",
                self.device
            )));
        }

        Command::new("ffmpeg")
            .args([
                "-hide_banner",
                "-loglevel",
                "error",
                "-f",
                "v4l2",
                "-input_format",
                &self.input_format,
                "-i",
                &self.device,
                "-f",
                "mpjpeg",
                "-boundary_tag",
                PREVIEW_BOUNDARY,
                "pipe:1",
            ])
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|err| match err.kind() {
                ErrorKind::PermissionDenied => CameraError::PermissionDenied(err.to_string()),
                _ => CameraError::DeviceUnavailable(format!(
                    "failed to spawn ffmpeg preview process: {err}"
                )),
            })
    }
}
