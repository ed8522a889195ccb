use std::{env, path::PathBuf, time::Duration};

use anyhow::Context;

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:5000";
const DEFAULT_POLL_MS: u64 = 1000;
const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ViewerConfig {
    pub server_url: reqwest::Url,
    pub poll_interval: Duration,
    pub download_dir: PathBuf,
    pub request_timeout: Duration,
    pub log_dir: PathBuf,
}

impl ViewerConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let server_url = env::var("VIEWER_SERVER_URL")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_SERVER_URL.to_owned());
        let server_url = reqwest::Url::parse(server_url.trim())
            .with_context(|| format!("invalid VIEWER_SERVER_URL: {server_url}"))?;

        let poll_ms = env::var("SNAPSHOT_POLL_MS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_POLL_MS);
        let timeout_seconds = env::var("REQUEST_TIMEOUT_SECONDS")
            .ok()
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECONDS);

        let download_dir = env::var("DOWNLOAD_DIR").unwrap_or_else(|_| "downloads".to_owned());
        let log_dir = env::var("LOG_DIR").unwrap_or_else(|_| "logs".to_owned());

        Ok(Self {
            server_url,
            poll_interval: Duration::from_millis(poll_ms),
            download_dir: PathBuf::from(download_dir),
            request_timeout: Duration::from_secs(timeout_seconds),
            log_dir: PathBuf::from(log_dir),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{
        fs,
        path::PathBuf,
        sync::{Mutex, OnceLock},
        time::{Duration, SystemTime, UNIX_EPOCH},
    };

    use super::ViewerConfig;

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn set_env(key: &str, value: &str) {
        unsafe { std::env::set_var(key, value) }
    }

    fn remove_env(key: &str) {
        unsafe { std::env::remove_var(key) }
    }

    #[test]
    fn from_env_uses_defaults_when_unset() {
        let _guard = lock_env();
        remove_env("VIEWER_SERVER_URL");
        remove_env("SNAPSHOT_POLL_MS");
        remove_env("REQUEST_TIMEOUT_SECONDS");

        let config = ViewerConfig::from_env().expect("config should parse");
        assert_eq!(config.server_url.as_str(), "http://127.0.0.1:5000/");
        assert_eq!(config.poll_interval, Duration::from_millis(1000));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
    }

    #[test]
    fn from_env_ignores_zero_poll_interval() {
        let _guard = lock_env();
        remove_env("VIEWER_SERVER_URL");
        set_env("SNAPSHOT_POLL_MS", "0");

        let config = ViewerConfig::from_env().expect("config should parse");
        assert_eq!(config.poll_interval, Duration::from_millis(1000));

        set_env("SNAPSHOT_POLL_MS", "250");
        let config = ViewerConfig::from_env().expect("config should parse");
        assert_eq!(config.poll_interval, Duration::from_millis(250));
        remove_env("SNAPSHOT_POLL_MS");
    }

    #[test]
    fn from_env_rejects_unparseable_server_url() {
        let _guard = lock_env();
        set_env("VIEWER_SERVER_URL", "not a url");

        let err = ViewerConfig::from_env().expect_err("config should fail");
        assert!(err.to_string().contains("VIEWER_SERVER_URL"));
        remove_env("VIEWER_SERVER_URL");
    }

    #[test]
    fn from_env_reads_server_url_from_dotenv_file() {
        let _guard = lock_env();
        remove_env("VIEWER_SERVER_URL");

        let suffix = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should be monotonic")
            .as_nanos();
        let path: PathBuf = std::env::temp_dir().join(format!("crowdcam-dotenv-{suffix}.env"));
        fs::write(&path, "VIEWER_SERVER_URL=http://crowd.local:8000\n")
            .expect("should write temporary dotenv file");

        dotenvy::from_path_override(&path).expect("dotenv file should load");
        let config = ViewerConfig::from_env().expect("config should parse");
        assert_eq!(config.server_url.host_str(), Some("crowd.local"));
        assert_eq!(config.server_url.port(), Some(8000));

        remove_env("VIEWER_SERVER_URL");
        let _ = fs::remove_file(path);
    }
}
