//! In-memory crowd server used by the controller and feed tests.

use std::{
    sync::{
        Mutex,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use bytes::Bytes;
use futures::StreamExt;

use crate::{
    api::{
        models::{AnalysisResult, CrowdAnalysis, ProbeResult, Snapshot},
        traits::{FrameStream, ViewerBackend},
    },
    core::errors::ViewerError,
};

pub const FAKE_JPEG: [u8; 6] = [0xFF, 0xD8, 0x10, 0x20, 0xFF, 0xD9];

pub struct MockBackend {
    pub healthy: bool,
    /// `None` makes the probe body undecodable.
    pub probe: Option<ProbeResult>,
    /// `Some(status)` rejects snapshot requests with that status.
    pub snapshot_status: Option<u16>,
    /// `Some(reason)` fails snapshot requests before any response arrives.
    pub snapshot_error: Option<String>,
    /// Holds every snapshot request this long before answering.
    pub snapshot_delay: Option<Duration>,
    /// `None` makes opening the stream fail.
    pub stream_chunks: Option<Vec<Bytes>>,
    /// `None` makes the analyze request fail outright.
    pub analysis: Option<AnalysisResult>,
    pub probe_calls: AtomicUsize,
    snapshot_urls: Mutex<Vec<String>>,
    analyzed_urls: Mutex<Vec<String>>,
}

impl MockBackend {
    pub fn new() -> Self {
        Self {
            healthy: true,
            probe: Some(ProbeResult::default()),
            snapshot_status: None,
            snapshot_error: None,
            snapshot_delay: None,
            stream_chunks: Some(vec![
                Bytes::from_static(b"--frame\r\n\r\n"),
                Bytes::from_static(&FAKE_JPEG),
            ]),
            analysis: None,
            probe_calls: AtomicUsize::new(0),
            snapshot_urls: Mutex::new(Vec::new()),
            analyzed_urls: Mutex::new(Vec::new()),
        }
    }

    pub fn with_probe(mut self, probe: Option<ProbeResult>) -> Self {
        self.probe = probe;
        self
    }

    pub fn with_analysis(mut self, analysis: Option<AnalysisResult>) -> Self {
        self.analysis = analysis;
        self
    }

    pub fn mjpeg_probe(resolved_url: &str) -> ProbeResult {
        ProbeResult {
            resolved_url: Some(resolved_url.to_string()),
            content_type: Some("multipart/x-mixed-replace; boundary=frame".to_string()),
            is_mjpeg: true,
            ..Default::default()
        }
    }

    pub fn image_probe(resolved_url: &str) -> ProbeResult {
        ProbeResult {
            resolved_url: Some(resolved_url.to_string()),
            content_type: Some("image/jpeg".to_string()),
            is_image: true,
            ..Default::default()
        }
    }

    pub fn report(status: &str) -> AnalysisResult {
        AnalysisResult {
            success: true,
            data: Some(CrowdAnalysis {
                count: 5,
                density: 40.0,
                free_space: 60.0,
                status: status.to_string(),
            }),
            message: Some("OK".to_string()),
            error: None,
            frame: None,
        }
    }

    pub fn snapshot_count(&self, camera_url: &str) -> usize {
        self.snapshot_urls
            .lock()
            .map(|urls| urls.iter().filter(|url| *url == camera_url).count())
            .unwrap_or_default()
    }

    pub fn total_snapshots(&self) -> usize {
        self.snapshot_urls.lock().map(|urls| urls.len()).unwrap_or_default()
    }

    pub fn analyzed_urls(&self) -> Vec<String> {
        self.analyzed_urls
            .lock()
            .map(|urls| urls.clone())
            .unwrap_or_default()
    }

    pub fn network_calls(&self) -> usize {
        self.probe_calls.load(Ordering::SeqCst)
            + self.total_snapshots()
            + self.analyzed_urls().len()
    }
}

#[async_trait]
impl ViewerBackend for MockBackend {
    async fn health(&self) -> Result<(), ViewerError> {
        if self.healthy {
            Ok(())
        } else {
            Err(ViewerError::Status {
                path: "/health".to_string(),
                status: 503,
            })
        }
    }

    async fn probe(&self, _camera_url: &str) -> Result<ProbeResult, ViewerError> {
        self.probe_calls.fetch_add(1, Ordering::SeqCst);
        self.probe
            .clone()
            .ok_or_else(|| ViewerError::decode("/probe", "expected value at line 1 column 1"))
    }

    async fn snapshot(&self, camera_url: &str, _cache_bust: i64) -> Result<Snapshot, ViewerError> {
        if let Ok(mut urls) = self.snapshot_urls.lock() {
            urls.push(camera_url.to_string());
        }
        if let Some(delay) = self.snapshot_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(reason) = &self.snapshot_error {
            return Err(ViewerError::decode("/snapshot", reason.clone()));
        }
        if let Some(status) = self.snapshot_status {
            return Err(ViewerError::Status {
                path: "/snapshot".to_string(),
                status,
            });
        }
        Ok(Snapshot {
            bytes: Bytes::from_static(&FAKE_JPEG),
            content_type: "image/jpeg".to_string(),
        })
    }

    async fn open_stream(&self, _camera_url: &str) -> Result<FrameStream, ViewerError> {
        let Some(chunks) = self.stream_chunks.clone() else {
            return Err(ViewerError::Status {
                path: "/video".to_string(),
                status: 400,
            });
        };
        // Stays open after the scripted chunks, like a live camera.
        let stream = futures::stream::iter(chunks.into_iter().map(Ok))
            .chain(futures::stream::pending())
            .boxed();
        Ok(stream)
    }

    async fn analyze(&self, camera_url: &str) -> Result<AnalysisResult, ViewerError> {
        if let Ok(mut urls) = self.analyzed_urls.lock() {
            urls.push(camera_url.to_string());
        }
        self.analysis
            .clone()
            .ok_or_else(|| ViewerError::decode("/api/analyze", "connection reset"))
    }
}
