use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

pub const HEALTH_PATH: &str = "/health";
pub const ANALYZE_PATH: &str = "/api/analyze";

// Same unreserved set as JavaScript's encodeURIComponent.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

pub fn encode_component(value: &str) -> String {
    utf8_percent_encode(value, URI_COMPONENT).to_string()
}

pub fn probe_path(camera_url: &str) -> String {
    format!("/probe?url={}", encode_component(camera_url))
}

pub fn video_source(camera_url: &str) -> String {
    format!("/video?url={}", encode_component(camera_url))
}

pub fn snapshot_source(camera_url: &str, cache_bust: i64) -> String {
    format!(
        "/snapshot?url={}&t={cache_bust}",
        encode_component(camera_url)
    )
}

/// Millisecond timestamp used both as cache-bust value and download name.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::{encode_component, snapshot_source, video_source};

    #[test]
    fn encodes_like_encode_uri_component() {
        assert_eq!(
            encode_component("http://10.0.0.5:8080/shot.jpg?a=1&b=two words"),
            "http%3A%2F%2F10.0.0.5%3A8080%2Fshot.jpg%3Fa%3D1%26b%3Dtwo%20words"
        );
        assert_eq!(encode_component("it's-(ok)!~*_."), "it's-(ok)!~*_.");
    }

    #[test]
    fn builds_stream_and_snapshot_sources() {
        assert_eq!(
            video_source("http://cam/video"),
            "/video?url=http%3A%2F%2Fcam%2Fvideo"
        );
        assert_eq!(
            snapshot_source("http://cam/shot.jpg", 1700000000123),
            "/snapshot?url=http%3A%2F%2Fcam%2Fshot.jpg&t=1700000000123"
        );
    }
}
