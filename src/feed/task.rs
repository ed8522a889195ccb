use std::{sync::Arc, time::Duration};

use futures::StreamExt;
use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::{
    api::{
        paths::{now_millis, snapshot_source, video_source},
        traits::ViewerBackend,
    },
    core::state::FeedMode,
    page::view::SharedView,
};

use super::jpeg::JpegFrameExtractor;

/// A running feed that keeps the page's stream source and frame current.
///
/// Dropping the task cancels it.
pub struct FeedTask {
    mode: FeedMode,
    camera_url: String,
    cancel_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl FeedTask {
    /// Sets the first snapshot source right away, then reloads it every `interval`.
    pub async fn start_polling<B: ViewerBackend>(
        backend: Arc<B>,
        view: SharedView,
        camera_url: String,
        interval: Duration,
        mode: FeedMode,
    ) -> Self {
        let cache_bust = now_millis();
        {
            let mut view = view.lock().await;
            view.set_stream_source(snapshot_source(&camera_url, cache_bust));
            view.feed_mode = Some(mode);
        }

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let handle = tokio::spawn(poll_snapshots(
            backend,
            view,
            camera_url.clone(),
            cache_bust,
            interval,
            cancel_rx,
        ));
        info!("snapshot polling started for {camera_url} every {interval:?}");

        Self {
            mode,
            camera_url,
            cancel_tx,
            handle,
        }
    }

    pub async fn start_stream<B: ViewerBackend>(
        backend: Arc<B>,
        view: SharedView,
        camera_url: String,
    ) -> Self {
        let source = video_source(&camera_url);
        {
            let mut view = view.lock().await;
            view.set_stream_source(source.clone());
            view.feed_mode = Some(FeedMode::Mjpeg);
        }

        let (cancel_tx, cancel_rx) = watch::channel(false);
        let handle = tokio::spawn(read_stream(
            backend,
            view,
            camera_url.clone(),
            source,
            cancel_rx,
        ));
        info!("mjpeg stream started for {camera_url}");

        Self {
            mode: FeedMode::Mjpeg,
            camera_url,
            cancel_tx,
            handle,
        }
    }

    pub fn mode(&self) -> FeedMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        !self.handle.is_finished()
    }

    pub fn stop(self) {
        info!("{:?} feed stopped for {}", self.mode, self.camera_url);
    }
}

impl Drop for FeedTask {
    fn drop(&mut self) {
        let _ = self.cancel_tx.send(true);
        self.handle.abort();
    }
}

async fn poll_snapshots<B: ViewerBackend>(
    backend: Arc<B>,
    view: SharedView,
    camera_url: String,
    first_cache_bust: i64,
    interval: Duration,
    mut cancel_rx: watch::Receiver<bool>,
) {
    let mut ticker = time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut first = Some(first_cache_bust);
    let mut source = snapshot_source(&camera_url, first_cache_bust);

    loop {
        tokio::select! {
            biased;
            _ = cancel_rx.changed() => break,
            _ = ticker.tick() => {}
        }

        // The first source was already put on the page when polling started.
        let cache_bust = match first.take() {
            Some(first) => first,
            None => {
                let next = now_millis();
                let next_source = snapshot_source(&camera_url, next);
                if !view
                    .lock()
                    .await
                    .advance_stream_source(&source, next_source.clone())
                {
                    break;
                }
                source = next_source;
                next
            }
        };

        // A slow snapshot never holds back the next source swap.
        let result = tokio::select! {
            biased;
            _ = cancel_rx.changed() => break,
            result = time::timeout(interval, backend.snapshot(&camera_url, cache_bust)) => result,
        };
        let Ok(result) = result else {
            debug!("snapshot for {camera_url} still loading after {interval:?}, moving on");
            continue;
        };

        let mut page = view.lock().await;
        match result {
            Ok(snapshot) => {
                page.frame_loaded(&source, snapshot.bytes);
            }
            Err(err) => {
                debug!("snapshot poll failed: {err}");
                page.frame_failed(&source);
            }
        }
    }
    debug!("snapshot polling loop exited for {camera_url}");
}

async fn read_stream<B: ViewerBackend>(
    backend: Arc<B>,
    view: SharedView,
    camera_url: String,
    source: String,
    mut cancel_rx: watch::Receiver<bool>,
) {
    let opened = tokio::select! {
        biased;
        _ = cancel_rx.changed() => return,
        opened = backend.open_stream(&camera_url) => opened,
    };
    let mut stream = match opened {
        Ok(stream) => stream,
        Err(err) => {
            warn!("failed to open mjpeg stream: {err}");
            view.lock().await.frame_failed(&source);
            return;
        }
    };

    let mut extractor = JpegFrameExtractor::new();
    loop {
        let next = tokio::select! {
            biased;
            _ = cancel_rx.changed() => break,
            next = stream.next() => next,
        };

        match next {
            Some(Ok(chunk)) => {
                if let Some(frame) = extractor.push(&chunk) {
                    view.lock().await.frame_loaded(&source, frame);
                }
            }
            Some(Err(err)) => {
                warn!("mjpeg stream error: {err}");
                if extractor.frames_seen() == 0 {
                    view.lock().await.frame_failed(&source);
                }
                break;
            }
            None => {
                info!(
                    "mjpeg stream ended after {} frames",
                    extractor.frames_seen()
                );
                if extractor.frames_seen() == 0 {
                    view.lock().await.frame_failed(&source);
                }
                break;
            }
        }
    }
}
