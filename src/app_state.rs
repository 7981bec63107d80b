use tokio::sync::Mutex;

use crate::{
    camera::ffmpeg_backend::FfmpegBackend, config::AppConfig, scan::ScanClient,
    session::ScanSession,
};

pub struct AppState {
    pub config: AppConfig,
    pub session: Mutex<ScanSession<FfmpegBackend>>,
    pub scanner: ScanClient,
}

impl AppState {
    pub fn new(
        config: AppConfig,
        session: ScanSession<FfmpegBackend>,
        scanner: ScanClient,
    ) -> Self {
        Self {
            config,
            session: Mutex::new(session),
            scanner,
        }
    }
}
