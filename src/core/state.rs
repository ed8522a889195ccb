use serde::Serialize;

/// How the camera section is being fed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedMode {
    Mjpeg,
    SnapshotPolling,
    FallbackPolling,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultKind {
    Success,
    Error,
    Info,
    Loading,
}

impl ResultKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
            Self::Loading => "loading",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ServerStatus {
    Checking,
    Ready,
    Starting,
}

impl ServerStatus {
    pub fn label(self) -> &'static str {
        match self {
            Self::Checking => "⏳ Checking server...",
            Self::Ready => "✅ Server ready!",
            Self::Starting => "⚠️ Server starting...",
        }
    }
}
