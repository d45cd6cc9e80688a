use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::shared::detection::Detection;

#[derive(Error, Debug)]
pub enum DetectionSourceError {
    #[error("failed to read detection feed: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed detection record on line {line}: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid timestamp {value} on line {line}")]
    InvalidTimestamp { line: usize, value: f64 },
}

/// One frame's worth of detector/tracker output.
#[derive(Clone, Debug, PartialEq)]
pub struct DetectionFrame {
    /// Position in the feed, starting at 0.
    pub index: usize,
    pub timestamp: Duration,
    pub detections: Vec<Detection>,
    /// Captured camera image for this frame, if the feed provides one.
    pub image: Option<PathBuf>,
}

/// Domain interface for the external detection/tracking feed.
///
/// Yields frames in capture order; `Ok(None)` means the feed is exhausted.
pub trait DetectionSource: Send {
    fn next_frame(&mut self) -> Result<Option<DetectionFrame>, DetectionSourceError>;
}
