use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::{Client, Response, header::CONTENT_TYPE};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::{config::ViewerConfig, core::errors::ViewerError};

use super::{
    models::{AnalysisResult, AnalyzeRequest, ProbeResult, Snapshot},
    paths::{self, ANALYZE_PATH, HEALTH_PATH},
    traits::{FrameStream, ViewerBackend},
};

#[derive(Clone)]
pub struct HttpBackend {
    base_url: String,
    timeout: Duration,
    client: Client,
}

impl HttpBackend {
    pub fn from_config(config: &ViewerConfig) -> anyhow::Result<Self> {
        Self::new(config.server_url.as_str(), config.request_timeout)
    }

    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        // No client-wide timeout: it would also cut off the long-lived /video stream.
        let client = Client::builder()
            .build()
            .context("failed to build http client")?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            timeout,
            client,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn get(&self, path: &str) -> Result<Response, ViewerError> {
        self.client
            .get(self.url(path))
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|err| ViewerError::request(path, err))
    }

    async fn json_body<T: DeserializeOwned>(
        path: &str,
        response: Response,
    ) -> Result<T, ViewerError> {
        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|err| ViewerError::request(path, err))?;
        if !status.is_success() {
            warn!("{path} answered {status}, reading body anyway");
        }
        serde_json::from_slice(&body).map_err(|err| ViewerError::decode(path, err.to_string()))
    }
}

fn ensure_success(path: &str, response: &Response) -> Result<(), ViewerError> {
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    Err(ViewerError::Status {
        path: path.to_owned(),
        status: status.as_u16(),
    })
}

#[async_trait]
impl ViewerBackend for HttpBackend {
    async fn health(&self) -> Result<(), ViewerError> {
        let response = self.get(HEALTH_PATH).await?;
        ensure_success(HEALTH_PATH, &response)
    }

    async fn probe(&self, camera_url: &str) -> Result<ProbeResult, ViewerError> {
        let path = paths::probe_path(camera_url);
        let response = self.get(&path).await?;
        // A failed probe still carries `error` and `tried` in its JSON body.
        let body: serde_json::Value = Self::json_body(&path, response).await?;
        ProbeResult::from_body(body).map_err(|err| ViewerError::decode(&path, err.to_string()))
    }

    async fn snapshot(&self, camera_url: &str, cache_bust: i64) -> Result<Snapshot, ViewerError> {
        let path = paths::snapshot_source(camera_url, cache_bust);
        let response = self.get(&path).await?;
        ensure_success(&path, &response)?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_owned();
        let bytes = response
            .bytes()
            .await
            .map_err(|err| ViewerError::request(&path, err))?;
        Ok(Snapshot {
            bytes,
            content_type,
        })
    }

    async fn open_stream(&self, camera_url: &str) -> Result<FrameStream, ViewerError> {
        let path = paths::video_source(camera_url);
        let response = self
            .client
            .get(self.url(&path))
            .send()
            .await
            .map_err(|err| ViewerError::request(&path, err))?;
        ensure_success(&path, &response)?;

        let stream = response
            .bytes_stream()
            .map(move |chunk| chunk.map_err(|err| ViewerError::stream(&path, err.to_string())))
            .boxed();
        Ok(stream)
    }

    async fn analyze(&self, camera_url: &str) -> Result<AnalysisResult, ViewerError> {
        let response = self
            .client
            .post(self.url(ANALYZE_PATH))
            .timeout(self.timeout)
            .json(&AnalyzeRequest { camera_url })
            .send()
            .await
            .map_err(|err| ViewerError::request(ANALYZE_PATH, err))?;
        Self::json_body(ANALYZE_PATH, response).await
    }
}
