use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status value the server uses for an overcrowded scene.
pub const HIGH_CROWD_STATUS: &str = "HIGH CROWD";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeAttempt {
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default)]
    pub is_mjpeg: bool,
    #[serde(default)]
    pub is_image: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tried: Vec<ProbeAttempt>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The body as the server sent it, including fields not modelled above.
    #[serde(skip)]
    pub raw: Option<Value>,
}

impl ProbeResult {
    pub fn from_body(body: Value) -> Result<Self, serde_json::Error> {
        let mut probe: Self = serde_json::from_value(body.clone())?;
        probe.raw = Some(body);
        Ok(probe)
    }

    /// JSON shown to the user: the server's own body when known.
    pub fn body(&self) -> Value {
        match &self.raw {
            Some(raw) => raw.clone(),
            None => serde_json::to_value(self).unwrap_or(Value::Null),
        }
    }

    /// The URL the feed should use: the resolved one when the probe found it.
    pub fn resolved_or<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.resolved_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(fallback)
    }
}

#[derive(Debug, Serialize)]
pub struct AnalyzeRequest<'a> {
    pub camera_url: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrowdAnalysis {
    pub count: u64,
    pub density: f64,
    pub free_space: f64,
    pub status: String,
}

impl CrowdAnalysis {
    pub fn is_high_crowd(&self) -> bool {
        self.status == HIGH_CROWD_STATUS
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AnalysisResult {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<CrowdAnalysis>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub frame: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Snapshot {
    pub bytes: Bytes,
    pub content_type: String,
}
