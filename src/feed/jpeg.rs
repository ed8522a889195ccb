use bytes::Bytes;

const SOI: [u8; 2] = [0xFF, 0xD8];
const EOI: [u8; 2] = [0xFF, 0xD9];
pub const DEFAULT_LIMIT_BYTES: usize = 4 * 1024 * 1024;

/// Pulls complete JPEG images out of an MJPEG byte stream.
///
/// Multipart boundaries and part headers are skipped implicitly: only the
/// bytes between a start-of-image and the next end-of-image marker are kept.
pub struct JpegFrameExtractor {
    pending: Vec<u8>,
    limit: usize,
    frames_seen: u64,
}

impl JpegFrameExtractor {
    pub fn new() -> Self {
        Self::with_limit(DEFAULT_LIMIT_BYTES)
    }

    pub fn with_limit(limit: usize) -> Self {
        Self {
            pending: Vec::new(),
            limit,
            frames_seen: 0,
        }
    }

    /// Feeds one chunk and returns the newest frame it completed, if any.
    pub fn push(&mut self, chunk: &[u8]) -> Option<Bytes> {
        self.pending.extend_from_slice(chunk);
        if self.pending.len() > self.limit {
            let excess = self.pending.len() - self.limit;
            self.pending.drain(..excess);
        }

        let mut newest = None;
        while let Some(start) = find(&self.pending, &SOI) {
            let body = start + SOI.len();
            let Some(end) = find(&self.pending[body..], &EOI).map(|pos| body + pos + EOI.len())
            else {
                self.pending.drain(..start);
                return newest;
            };

            newest = Some(Bytes::copy_from_slice(&self.pending[start..end]));
            self.frames_seen += 1;
            self.pending.drain(..end);
        }

        // No start marker left; keep a trailing 0xFF that may begin the next one.
        let keep_from = match self.pending.last() {
            Some(0xFF) => self.pending.len() - 1,
            _ => self.pending.len(),
        };
        self.pending.drain(..keep_from);
        newest
    }

    pub fn frames_seen(&self) -> u64 {
        self.frames_seen
    }
}

impl Default for JpegFrameExtractor {
    fn default() -> Self {
        Self::new()
    }
}

fn find(haystack: &[u8], marker: &[u8; 2]) -> Option<usize> {
    haystack.windows(2).position(|pair| pair == marker)
}
