use crate::feed::task::FeedTask;

/// Per-page state: the camera the user asked for and the feed showing it.
#[derive(Default)]
pub struct Session {
    current_camera_url: String,
    feed: Option<FeedTask>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current_camera_url(&self) -> &str {
        &self.current_camera_url
    }

    pub fn set_camera_url(&mut self, camera_url: String) {
        self.current_camera_url = camera_url;
    }

    pub fn feed(&self) -> Option<&FeedTask> {
        self.feed.as_ref()
    }

    /// Installs `feed`, cancelling whatever feed ran before it.
    pub fn replace_feed(&mut self, feed: FeedTask) {
        if let Some(previous) = self.feed.replace(feed) {
            previous.stop();
        }
    }

    /// Returns true if a feed was running.
    pub fn stop_feed(&mut self) -> bool {
        match self.feed.take() {
            Some(feed) => {
                feed.stop();
                true
            }
            None => false,
        }
    }
}
