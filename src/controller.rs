use std::{path::PathBuf, sync::Arc};

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    api::{
        models::{CrowdAnalysis, ProbeResult},
        paths::now_millis,
        traits::ViewerBackend,
    },
    config::ViewerConfig,
    core::{
        errors::ViewerError,
        state::{FeedMode, ResultKind, ServerStatus},
    },
    download,
    feed::task::FeedTask,
    page::{
        render,
        view::{
            ANALYZE_LABEL, ANALYZING_LABEL, AnalysisView, CAPTURE_LABEL, CAPTURING_LABEL,
            OPEN_LABEL, OPENING_LABEL, PageView, SharedView,
        },
    },
    session::Session,
};

const GENERIC_ANALYSIS_FAILURE: &str = "Analysis failed";

/// Drives the camera page: every user action is one async handler here.
pub struct PageController<B: ViewerBackend> {
    config: ViewerConfig,
    backend: Arc<B>,
    view: SharedView,
    session: Mutex<Session>,
}

impl<B: ViewerBackend> PageController<B> {
    pub fn new(config: ViewerConfig, backend: B) -> Self {
        Self {
            config,
            backend: Arc::new(backend),
            view: PageView::shared(),
            session: Mutex::new(Session::new()),
        }
    }

    pub async fn view(&self) -> PageView {
        self.view.lock().await.clone()
    }

    pub async fn render_text(&self) -> String {
        render::render_text(&*self.view.lock().await)
    }

    pub async fn current_camera_url(&self) -> String {
        self.session.lock().await.current_camera_url().to_owned()
    }

    pub async fn feed_running(&self) -> bool {
        self.session
            .lock()
            .await
            .feed()
            .is_some_and(|feed| feed.is_running())
    }

    pub async fn test_server_connection(&self) -> ServerStatus {
        let status = match self.backend.health().await {
            Ok(()) => ServerStatus::Ready,
            Err(err) => {
                warn!("health check failed: {err}");
                ServerStatus::Starting
            }
        };
        self.view.lock().await.server_status = status;
        status
    }

    pub async fn open_camera(&self, input: &str) -> Result<FeedMode, ViewerError> {
        if !self.view.lock().await.submit.enabled {
            return Err(ViewerError::Busy("open camera"));
        }

        let camera_url = input.trim().to_owned();
        self.session
            .lock()
            .await
            .set_camera_url(camera_url.clone());
        {
            let mut view = self.view.lock().await;
            if camera_url.is_empty() {
                view.show_result("Please provide a camera URL", ResultKind::Error);
                return Err(ViewerError::MissingCameraUrl);
            }
            if !view.submit.begin(OPENING_LABEL) {
                return Err(ViewerError::Busy("open camera"));
            }
            view.show_result("📡 Probing camera...", ResultKind::Loading);
            view.camera_status = "Probing...".to_string();
        }

        let outcome = match self.backend.probe(&camera_url).await {
            Ok(probe) => Ok(self.show_feed(&camera_url, &probe).await),
            Err(err) => {
                error!("failed to open camera {camera_url}: {err}");
                self.view
                    .lock()
                    .await
                    .show_result("❌ Failed to open camera", ResultKind::Error);
                Err(err)
            }
        };

        self.view.lock().await.submit.finish(OPEN_LABEL);
        outcome
    }

    async fn show_feed(&self, camera_url: &str, probe: &ProbeResult) -> FeedMode {
        let resolved = probe.resolved_or(camera_url).to_owned();
        let mode = if probe.is_mjpeg {
            FeedMode::Mjpeg
        } else if probe.is_image {
            FeedMode::SnapshotPolling
        } else {
            FeedMode::FallbackPolling
        };

        // Labels go up before the feed starts so its first load/error event lands on top.
        {
            let probe_json = probe.body().to_string();
            let mut view = self.view.lock().await;
            view.probe_debug = Some(format!("Probe: {probe_json}"));
            view.camera_label = resolved.clone();
            match mode {
                FeedMode::Mjpeg => {
                    view.stream_alt = "MJPEG Stream".to_string();
                    view.camera_status = "Streaming (MJPEG)".to_string();
                    view.show_result("📹 MJPEG stream opened!", ResultKind::Success);
                }
                FeedMode::SnapshotPolling => {
                    view.stream_alt = "Polling snapshots".to_string();
                    view.camera_status = "Polling snapshots".to_string();
                    view.show_result(
                        "📹 Snapshot polling started (approx. 1s)",
                        ResultKind::Success,
                    );
                }
                FeedMode::FallbackPolling => {
                    view.camera_status = "Polling (fallback)".to_string();
                    view.show_result("📹 Started snapshot polling (fallback)", ResultKind::Info);
                }
            }
            view.show_camera();
        }

        match mode {
            FeedMode::Mjpeg => self.start_stream(&resolved).await,
            FeedMode::SnapshotPolling | FeedMode::FallbackPolling => {
                self.start_polling_as(&resolved, mode).await
            }
        }
        info!("camera {resolved} opened as {mode:?}");
        mode
    }

    async fn start_stream(&self, camera_url: &str) {
        let mut session = self.session.lock().await;
        session.stop_feed();
        let feed = FeedTask::start_stream(
            self.backend.clone(),
            self.view.clone(),
            camera_url.to_owned(),
        )
        .await;
        session.replace_feed(feed);
    }

    /// Starts polling `camera_url` (or the current camera when empty), replacing any feed.
    pub async fn start_snapshot_polling(&self, camera_url: &str) {
        self.start_polling_as(camera_url, FeedMode::SnapshotPolling)
            .await;
    }

    async fn start_polling_as(&self, camera_url: &str, mode: FeedMode) {
        let mut session = self.session.lock().await;
        let url = if camera_url.is_empty() {
            session.current_camera_url().to_owned()
        } else {
            camera_url.to_owned()
        };
        session.stop_feed();
        let feed = FeedTask::start_polling(
            self.backend.clone(),
            self.view.clone(),
            url,
            self.config.poll_interval,
            mode,
        )
        .await;
        session.replace_feed(feed);
    }

    pub async fn stop_snapshot_polling(&self) -> bool {
        self.session.lock().await.stop_feed()
    }

    pub async fn capture_snapshot(&self) -> Result<PathBuf, ViewerError> {
        if !self.view.lock().await.capture.begin(CAPTURING_LABEL) {
            return Err(ViewerError::Busy("capture"));
        }

        let camera_url = self.current_camera_url().await;
        let outcome = self.download_snapshot(&camera_url).await;

        let mut view = self.view.lock().await;
        match &outcome {
            Ok(path) => {
                info!("snapshot saved to {}", path.display());
                view.show_result("📸 Snapshot captured and downloaded!", ResultKind::Success);
            }
            Err(err) if err.is_rejected() => {
                warn!("snapshot rejected: {err}");
                view.show_result("❌ Failed to capture snapshot", ResultKind::Error);
            }
            Err(err) => {
                error!("snapshot capture failed: {err}");
                view.show_result("❌ Capture failed", ResultKind::Error);
            }
        }
        view.capture.finish(CAPTURE_LABEL);
        outcome
    }

    async fn download_snapshot(&self, camera_url: &str) -> Result<PathBuf, ViewerError> {
        let snapshot = self.backend.snapshot(camera_url, now_millis()).await?;
        debug!(
            "captured {} bytes of {}",
            snapshot.bytes.len(),
            snapshot.content_type
        );
        let path =
            download::save_snapshot(&self.config.download_dir, &snapshot.bytes, now_millis())
                .await?;
        Ok(path)
    }

    pub async fn analyze_crowd(&self) -> Result<CrowdAnalysis, ViewerError> {
        {
            let mut view = self.view.lock().await;
            if !view.analyze.begin(ANALYZING_LABEL) {
                return Err(ViewerError::Busy("analysis"));
            }
            view.analysis = AnalysisView::Pending;
        }

        let camera_url = self.current_camera_url().await;
        let outcome = match self.backend.analyze(&camera_url).await {
            Ok(result) => match (result.success, result.data) {
                (true, Some(analysis)) => {
                    let message = result
                        .message
                        .unwrap_or_else(|| analysis.status.clone());
                    info!(
                        "crowd analysis: {} people, {}% density, {} (annotated frame: {})",
                        analysis.count,
                        analysis.density,
                        analysis.status,
                        result.frame.is_some()
                    );
                    Ok((message, analysis))
                }
                (_, _) => {
                    let reason = result
                        .error
                        .filter(|error| !error.is_empty())
                        .unwrap_or_else(|| GENERIC_ANALYSIS_FAILURE.to_owned());
                    warn!("crowd analysis refused: {reason}");
                    Err(ViewerError::Server(reason))
                }
            },
            Err(err) => {
                error!("crowd analysis request failed: {err}");
                Err(err)
            }
        };

        let mut view = self.view.lock().await;
        let outcome = match outcome {
            Ok((message, analysis)) => {
                view.analysis = AnalysisView::Report {
                    message,
                    analysis: analysis.clone(),
                };
                Ok(analysis)
            }
            Err(ViewerError::Server(reason)) => {
                view.analysis = AnalysisView::Failed(reason.clone());
                Err(ViewerError::Server(reason))
            }
            Err(err) => {
                view.analysis = AnalysisView::Failed(GENERIC_ANALYSIS_FAILURE.to_owned());
                Err(err)
            }
        };
        view.analyze.finish(ANALYZE_LABEL);
        outcome
    }

    pub async fn close_camera(&self) {
        let stopped = {
            let mut session = self.session.lock().await;
            let mode = session.feed().map(|feed| feed.mode());
            session.stop_feed();
            mode
        };
        let mut view = self.view.lock().await;
        view.reset_camera();
        view.show_result("Camera closed", ResultKind::Info);
        info!("camera closed (stopped feed: {stopped:?})");
    }
}
