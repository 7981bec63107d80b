use std::{convert::Infallible, sync::Arc};

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{CACHE_CONTROL, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tokio_stream::{StreamExt, wrappers::BroadcastStream};
use tracing::{info, warn};

use crate::{
    app_state::AppState,
    camera::PREVIEW_CONTENT_TYPE,
    core::{errors::AppError, state::SessionStatus},
};

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}

pub async fn status(State(state): State<Arc<AppState>>) -> Json<SessionStatus> {
    let session = state.session.lock().await;
    Json(session.status())
}

/// Toggle the camera. An open failure keeps the session idle and is logged
/// only; the caller always receives the resulting state.
pub async fn camera_toggle(State(state): State<Arc<AppState>>) -> Json<SessionStatus> {
    let mut session = state.session.lock().await;
    if let Err(err) = session.toggle_camera().await {
        warn!("camera toggle failed: {err}");
    }
    Json(session.status())
}

/// Trigger a scan. The snapshot happens under the session lock; the network
/// round trip runs in its own task so it outlives the request connection and
/// other user actions can interleave with it.
pub async fn scan(
    State(state): State<Arc<AppState>>,
) -> Result<(StatusCode, Json<SessionStatus>), AppError> {
    let (frame, ticket) = {
        let mut session = state.session.lock().await;
        session
            .begin_scan()
            .await
            .map_err(|err| AppError::conflict(err.to_string()))?
    };

    info!("scan admitted");
    let task_state = state.clone();
    tokio::spawn(async move {
        let result = task_state.scanner.submit(frame).await;
        let mut session = task_state.session.lock().await;
        session.finish_scan(ticket, result);
    });

    let session = state.session.lock().await;
    Ok((StatusCode::ACCEPTED, Json(session.status())))
}

/// Live preview stream for the presentation layer.
pub async fn preview(State(state): State<Arc<AppState>>) -> Result<Response, AppError> {
    let receiver = {
        let session = state.session.lock().await;
        session.preview_chunks()
    };
    let receiver = receiver.ok_or_else(|| AppError::conflict("camera is not active"))?;

    let stream =
        BroadcastStream::new(receiver).filter_map(|chunk| chunk.ok().map(Ok::<_, Infallible>));

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static(PREVIEW_CONTENT_TYPE));
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store"));

    Ok((StatusCode::OK, headers, Body::from_stream(stream)).into_response())
}
