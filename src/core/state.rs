use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Idle,
    Previewing,
    Scanning,
}

/// Consolidated view of the scan session, polled by the presentation layer.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStatus {
    pub camera_active: bool,
    pub scan_pending: bool,
    pub state: SessionState,
    pub display_text: String,
}
