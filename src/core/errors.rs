use thiserror::Error;

#[derive(Debug, Error)]
pub enum ViewerError {
    #[error("camera url is required")]
    MissingCameraUrl,
    #[error("{0} already in progress")]
    Busy(&'static str),
    #[error("request to {path} failed: {source}")]
    Request {
        path: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{path} returned status {status}")]
    Status { path: String, status: u16 },
    #[error("invalid response from {path}: {message}")]
    Decode { path: String, message: String },
    #[error("stream {path} broke: {message}")]
    Stream { path: String, message: String },
    #[error("server reported failure: {0}")]
    Server(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl ViewerError {
    pub fn request(path: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Request {
            path: path.into(),
            source,
        }
    }

    pub fn decode(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            message: message.into(),
        }
    }

    pub fn stream(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Stream {
            path: path.into(),
            message: message.into(),
        }
    }

    /// True when the server answered but refused the request.
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Status { .. })
    }
}
