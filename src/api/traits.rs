use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::BoxStream;

use crate::core::errors::ViewerError;

use super::models::{AnalysisResult, ProbeResult, Snapshot};

pub type FrameStream = BoxStream<'static, Result<Bytes, ViewerError>>;

/// The crowd server as seen from the viewer.
#[async_trait]
pub trait ViewerBackend: Send + Sync + 'static {
    async fn health(&self) -> Result<(), ViewerError>;
    async fn probe(&self, camera_url: &str) -> Result<ProbeResult, ViewerError>;
    async fn snapshot(&self, camera_url: &str, cache_bust: i64) -> Result<Snapshot, ViewerError>;
    async fn open_stream(&self, camera_url: &str) -> Result<FrameStream, ViewerError>;
    async fn analyze(&self, camera_url: &str) -> Result<AnalysisResult, ViewerError>;
}
