use std::time::Duration;

use crate::DecodedFrame;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Frame(DecodedFrame),
    /// A frame arrived but could not be decoded; the stream continues.
    FrameSkipped { reason: String },
    StreamEnded {
        result: Result<StreamSummary, SourceError>,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamSummary {
    pub frames: usize,
    pub skipped: usize,
    pub cancelled: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SourceError {
    #[error("invalid stream url {url}: {message}")]
    InvalidUrl { url: String, message: String },
    #[error("connect failed: {0}")]
    Connect(String),
    #[error("connect timed out after {0:?}")]
    ConnectTimeout(Duration),
    #[error("no frames received for {0:?}")]
    IdleTimeout(Duration),
    #[error("send failed: {0}")]
    Send(String),
    #[error("receive failed: {0}")]
    Receive(String),
    #[error("io error: {0}")]
    Io(String),
}
