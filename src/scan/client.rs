use std::time::Duration;

use anyhow::Context;
use reqwest::{
    Client,
    multipart::{Form, Part},
};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::camera::still::CapturedFrame;

pub const SCAN_FAILED_TEXT: &str = "Scan failed, try again.";

const IMAGE_FIELD: &str = "image";
const IMAGE_FILE_NAME: &str = "frame.jpg";
const IMAGE_CONTENT_TYPE: &str = "image/jpeg";

/// Outcome of one scan round trip, normalized for display. `raw` carries
/// whatever structured data the endpoint returned, when parseable.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScanResult {
    pub raw: Option<Value>,
    pub display_text: String,
}

impl ScanResult {
    fn failed() -> Self {
        Self {
            raw: None,
            display_text: SCAN_FAILED_TEXT.to_owned(),
        }
    }
}

/// Transports captured frames to the analysis endpoint. Stateless apart from
/// the shared connection pool; never touches camera state.
pub struct ScanClient {
    client: Client,
    endpoint: String,
    timeout: Duration,
}

impl ScanClient {
    pub fn new(endpoint: String, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            timeout,
        }
    }

    /// Submit a captured frame. Single-shot: no retries. Every failure mode
    /// resolves to a result carrying the fixed failure message.
    pub async fn submit(&self, frame: CapturedFrame) -> ScanResult {
        match self.post_frame(frame).await {
            Ok(result) => result,
            Err(err) => {
                warn!("scan request failed: {err:#}");
                ScanResult::failed()
            }
        }
    }

    async fn post_frame(&self, frame: CapturedFrame) -> anyhow::Result<ScanResult> {
        debug!(
            "submitting {}x{} frame ({} bytes)",
            frame.width,
            frame.height,
            frame.data.len()
        );
        let part = Part::bytes(frame.data)
            .file_name(IMAGE_FILE_NAME)
            .mime_str(IMAGE_CONTENT_TYPE)
            .context("image part could not be built")?;
        let form = Form::new().part(IMAGE_FIELD, part);

        let response = self
            .client
            .post(&self.endpoint)
            .timeout(self.timeout)
            .multipart(form)
            .send()
            .await
            .context("scan request could not complete")?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .context("scan response body could not be read")?;
        let raw = serde_json::from_slice::<Value>(&body).ok();

        if !status.is_success() {
            // The failure message is fixed, but a parseable body is still
            // surfaced so callers can inspect what the endpoint reported.
            warn!("scan endpoint answered {status}");
            return Ok(ScanResult {
                raw,
                display_text: SCAN_FAILED_TEXT.to_owned(),
            });
        }

        let raw = raw.context("scan response was not valid JSON")?;
        let display_text = serde_json::to_string_pretty(&raw)
            .context("scan response could not be serialized for display")?;
        Ok(ScanResult {
            raw: Some(raw),
            display_text,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{net::SocketAddr, time::Duration};

    use axum::{Json, Router, extract::Multipart, http::StatusCode, routing::post};
    use serde_json::{Value, json};

    use crate::camera::still::CapturedFrame;

    use super::{SCAN_FAILED_TEXT, ScanClient};

    async fn serve(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("stub listener should bind");
        let addr = listener.local_addr().expect("stub addr should resolve");
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        addr
    }

    fn client_for(addr: SocketAddr) -> ScanClient {
        ScanClient::new(format!("http://{addr}/scan"), Duration::from_secs(5))
    }

    fn test_frame() -> CapturedFrame {
        CapturedFrame {
            width: 800,
            height: 450,
            data: vec![0xFF, 0xD8, 0x01, 0x02, 0x03, 0xFF, 0xD9],
        }
    }

    #[tokio::test]
    async fn successful_scan_pretty_prints_the_response() {
        let router =
            Router::new().route("/scan", post(|| async { Json(json!({"text": "hello"})) }));
        let addr = serve(router).await;

        let result = client_for(addr).submit(test_frame()).await;

        assert_eq!(result.raw, Some(json!({"text": "hello"})));
        let expected = serde_json::to_string_pretty(&json!({"text": "hello"}))
            .expect("expected text should serialize");
        assert_eq!(result.display_text, expected);
    }

    #[tokio::test]
    async fn refused_connection_yields_the_fixed_failure_message() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("listener should bind");
        let addr = listener.local_addr().expect("addr should resolve");
        drop(listener);

        let result = client_for(addr).submit(test_frame()).await;

        assert_eq!(result.display_text, SCAN_FAILED_TEXT);
        assert_eq!(result.raw, None);
    }

    #[tokio::test]
    async fn server_error_keeps_failure_message_but_surfaces_the_body() {
        let router = Router::new().route(
            "/scan",
            post(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "bad image"})),
                )
            }),
        );
        let addr = serve(router).await;

        let result = client_for(addr).submit(test_frame()).await;

        assert_eq!(result.display_text, SCAN_FAILED_TEXT);
        assert_eq!(result.raw, Some(json!({"error": "bad image"})));
    }

    #[tokio::test]
    async fn successful_status_with_non_json_body_is_a_failure() {
        let router = Router::new().route("/scan", post(|| async { "not json" }));
        let addr = serve(router).await;

        let result = client_for(addr).submit(test_frame()).await;

        assert_eq!(result.display_text, SCAN_FAILED_TEXT);
        assert_eq!(result.raw, None);
    }

    async fn describe_upload(mut multipart: Multipart) -> Json<Value> {
        let field = multipart
            .next_field()
            .await
            .expect("multipart should parse")
            .expect("exactly one part expected");
        let name = field.name().unwrap_or_default().to_owned();
        let file_name = field.file_name().unwrap_or_default().to_owned();
        let content_type = field.content_type().unwrap_or_default().to_owned();
        let bytes = field.bytes().await.expect("part bytes should read");

        Json(json!({
            "field": name,
            "file_name": file_name,
            "content_type": content_type,
            "len": bytes.len(),
        }))
    }

    #[tokio::test]
    async fn upload_matches_the_endpoint_contract() {
        let router = Router::new().route("/scan", post(describe_upload));
        let addr = serve(router).await;

        let frame = test_frame();
        let frame_len = frame.data.len();
        let result = client_for(addr).submit(frame).await;

        let raw = result.raw.expect("stub response should parse");
        assert_eq!(raw["field"], "image");
        assert_eq!(raw["file_name"], "frame.jpg");
        assert_eq!(raw["content_type"], "image/jpeg");
        assert_eq!(raw["len"], frame_len);
    }
}
