mod app_state;
mod camera;
mod config;
mod core;
mod scan;
mod session;
mod web;

use std::sync::Arc;

use app_state::AppState;
use camera::{capture::FrameCapture, ffmpeg_backend::FfmpegBackend};
use config::AppConfig;
use scan::ScanClient;
use session::ScanSession;
use tracing::info;
use tracing_appender::rolling;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tokio::fs::create_dir_all("logs").await?;
    let file_appender = rolling::daily("logs", "framescan.log");
    let (non_blocking, _log_guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_ansi(false)
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::INFO)
        .init();

    let config = AppConfig::from_env()?;

    let backend = FfmpegBackend::new(
        config.camera_device.clone(),
        config.camera_input_format.clone(),
    );
    let session = ScanSession::new(FrameCapture::new(backend));
    let scanner = ScanClient::new(config.scan_endpoint.clone(), config.scan_timeout);

    let state = Arc::new(AppState::new(config.clone(), session, scanner));
    let app = web::routes::build_router(state);

    info!(
        "{} listening on {} (camera: {}, scan endpoint: {})",
        config.app_name, config.bind_addr, config.camera_device, config.scan_endpoint
    );
    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
