use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::Mutex;

use crate::{
    api::models::CrowdAnalysis,
    core::state::{FeedMode, ResultKind, ServerStatus},
};

pub type SharedView = Arc<Mutex<PageView>>;

pub const OPEN_LABEL: &str = "📹 Open Camera";
pub const OPENING_LABEL: &str = "⏳ Opening...";
pub const CAPTURE_LABEL: &str = "📸 Capture Snapshot";
pub const CAPTURING_LABEL: &str = "⏳ Capturing...";
pub const ANALYZE_LABEL: &str = "🔍 Analyze Crowd";
pub const ANALYZING_LABEL: &str = "⏳ Analyzing...";

pub const IMAGE_LOAD_FAILED: &str = "❌ Failed to load image — check camera URL or CORS.";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonState {
    pub enabled: bool,
    pub label: &'static str,
}

impl ButtonState {
    fn ready(label: &'static str) -> Self {
        Self {
            enabled: true,
            label,
        }
    }

    /// Disables the control, or returns false when it already was.
    pub fn begin(&mut self, busy_label: &'static str) -> bool {
        if !self.enabled {
            return false;
        }
        self.enabled = false;
        self.label = busy_label;
        true
    }

    pub fn finish(&mut self, label: &'static str) {
        self.enabled = true;
        self.label = label;
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultBanner {
    pub message: String,
    pub kind: ResultKind,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisView {
    Empty,
    Pending,
    Report {
        message: String,
        analysis: CrowdAnalysis,
    },
    Failed(String),
}

/// Everything the camera page shows.
#[derive(Debug, Clone)]
pub struct PageView {
    pub server_status: ServerStatus,
    pub result: Option<ResultBanner>,
    pub form_visible: bool,
    pub camera_visible: bool,
    pub submit: ButtonState,
    pub capture: ButtonState,
    pub analyze: ButtonState,
    pub feed_mode: Option<FeedMode>,
    pub stream_source: Option<String>,
    pub stream_alt: String,
    pub camera_label: String,
    pub camera_status: String,
    pub probe_debug: Option<String>,
    pub frame: Option<Bytes>,
    pub frames_loaded: u64,
    pub analysis: AnalysisView,
}

impl PageView {
    pub fn new() -> Self {
        Self {
            server_status: ServerStatus::Checking,
            result: None,
            form_visible: true,
            camera_visible: false,
            submit: ButtonState::ready(OPEN_LABEL),
            capture: ButtonState::ready(CAPTURE_LABEL),
            analyze: ButtonState::ready(ANALYZE_LABEL),
            feed_mode: None,
            stream_source: None,
            stream_alt: String::new(),
            camera_label: "-".to_string(),
            camera_status: "Not connected".to_string(),
            probe_debug: None,
            frame: None,
            frames_loaded: 0,
            analysis: AnalysisView::Empty,
        }
    }

    pub fn shared() -> SharedView {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn show_result(&mut self, message: impl Into<String>, kind: ResultKind) {
        self.result = Some(ResultBanner {
            message: message.into(),
            kind,
        });
    }

    pub fn set_stream_source(&mut self, source: String) {
        self.stream_source = Some(source);
    }

    /// Swaps in the next source of a running feed. Returns false once another
    /// feed (or stop) has replaced `previous`.
    pub fn advance_stream_source(&mut self, previous: &str, next: String) -> bool {
        if self.stream_source.as_deref() != Some(previous) {
            return false;
        }
        self.stream_source = Some(next);
        true
    }

    pub fn show_camera(&mut self) {
        self.form_visible = false;
        self.camera_visible = true;
    }

    /// Image `load` event. Ignored unless `source` is still the displayed one.
    pub fn frame_loaded(&mut self, source: &str, frame: Bytes) -> bool {
        if self.stream_source.as_deref() != Some(source) {
            return false;
        }
        self.probe_debug = None;
        self.frame = Some(frame);
        self.frames_loaded += 1;
        self.camera_status = "Connected".to_string();
        self.show_result("📺 Live feed connected", ResultKind::Success);
        true
    }

    /// Image `error` event. Ignored unless `source` is still the displayed one.
    pub fn frame_failed(&mut self, source: &str) -> bool {
        if self.stream_source.as_deref() != Some(source) {
            return false;
        }
        self.probe_debug = Some(IMAGE_LOAD_FAILED.to_string());
        self.camera_status = "Error loading image".to_string();
        self.show_result("❌ Live image load failed", ResultKind::Error);
        true
    }

    /// Back to the camera form, as after pressing stop.
    pub fn reset_camera(&mut self) {
        self.feed_mode = None;
        self.stream_source = None;
        self.stream_alt.clear();
        self.frame = None;
        self.camera_visible = false;
        self.camera_label = "-".to_string();
        self.camera_status = "Not connected".to_string();
        self.form_visible = true;
        self.analysis = AnalysisView::Empty;
    }
}

impl Default for PageView {
    fn default() -> Self {
        Self::new()
    }
}
