use std::path::PathBuf;
use std::sync::mpsc;
use std::time::Duration;

use campaign_core::{CampaignId, ChannelError, StreamEvent};
use engine_logging::{engine_debug, engine_info, engine_warn};
use futures_util::{SinkExt, Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;

use crate::{
    decode_frame, select_campaign_frame, DecodedFrame, EngineEvent, SourceError, StreamSummary,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamSettings {
    pub connect_timeout_secs: u64,
    /// Give up on a stream that stays silent this long. `None` waits forever.
    pub idle_timeout_secs: Option<u64>,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            connect_timeout_secs: 10,
            idle_timeout_secs: Some(300),
        }
    }
}

impl StreamSettings {
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }

    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_secs.map(Duration::from_secs)
    }
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: EngineEvent);
}

pub struct ChannelEventSink {
    tx: mpsc::Sender<EngineEvent>,
}

impl ChannelEventSink {
    pub fn new(tx: mpsc::Sender<EngineEvent>) -> Self {
        Self { tx }
    }
}

impl EventSink for ChannelEventSink {
    fn emit(&self, event: EngineEvent) {
        let _ = self.tx.send(event);
    }
}

/// Something that produces streamed campaign events until it ends or is cancelled.
#[async_trait::async_trait]
pub trait EventSource: Send + Sync {
    async fn run(
        &self,
        sink: &dyn EventSink,
        cancel: CancellationToken,
    ) -> Result<StreamSummary, SourceError>;
}

fn forward_frame(text: &str, sink: &dyn EventSink, summary: &mut StreamSummary) {
    match decode_frame(text) {
        Ok(frame) => {
            summary.frames += 1;
            sink.emit(EngineEvent::Frame(frame));
        }
        Err(err) => {
            summary.skipped += 1;
            engine_warn!("Skipping undecodable frame: {}", err);
            sink.emit(EngineEvent::FrameSkipped {
                reason: err.to_string(),
            });
        }
    }
}

/// Replays newline-delimited JSON frames from a file.
#[derive(Debug, Clone)]
pub struct ReplayEventSource {
    path: PathBuf,
}

impl ReplayEventSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl EventSource for ReplayEventSource {
    async fn run(
        &self,
        sink: &dyn EventSink,
        cancel: CancellationToken,
    ) -> Result<StreamSummary, SourceError> {
        let io_error =
            |err: std::io::Error| SourceError::Io(format!("{}: {}", self.path.display(), err));
        let file = tokio::fs::File::open(&self.path).await.map_err(io_error)?;
        engine_info!("Replaying frames from {:?}", self.path);

        let mut lines = BufReader::new(file).lines();
        let mut summary = StreamSummary::default();
        loop {
            let line = tokio::select! {
                _ = cancel.cancelled() => {
                    summary.cancelled = true;
                    break;
                }
                line = lines.next_line() => line.map_err(io_error)?,
            };
            let Some(line) = line else { break };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            forward_frame(line, sink, &mut summary);
        }

        engine_debug!(
            "Replay of {:?} ended: frames={} skipped={}",
            self.path,
            summary.frames,
            summary.skipped
        );
        Ok(summary)
    }
}

/// Subscribes to one campaign over a WebSocket and forwards its frames.
#[derive(Debug, Clone)]
pub struct WsEventSource {
    url: String,
    campaign_id: CampaignId,
    settings: StreamSettings,
}

impl WsEventSource {
    pub fn new(url: impl Into<String>, campaign_id: CampaignId, settings: StreamSettings) -> Self {
        Self {
            url: url.into(),
            campaign_id,
            settings,
        }
    }

    fn validated_url(&self) -> Result<url::Url, SourceError> {
        let invalid = |message: String| SourceError::InvalidUrl {
            url: self.url.clone(),
            message,
        };
        let parsed = url::Url::parse(&self.url).map_err(|err| invalid(err.to_string()))?;
        match parsed.scheme() {
            "ws" | "wss" => Ok(parsed),
            other => Err(invalid(format!("unsupported scheme {other}"))),
        }
    }
}

#[async_trait::async_trait]
impl EventSource for WsEventSource {
    async fn run(
        &self,
        sink: &dyn EventSink,
        cancel: CancellationToken,
    ) -> Result<StreamSummary, SourceError> {
        let url = self.validated_url()?;
        let connect_timeout = self.settings.connect_timeout();
        let (ws_stream, _) = tokio::time::timeout(connect_timeout, connect_async(url.as_str()))
            .await
            .map_err(|_| SourceError::ConnectTimeout(connect_timeout))?
            .map_err(|err| SourceError::Connect(err.to_string()))?;
        engine_info!("Connected to {} for campaign {}", url, self.campaign_id);

        let (mut ws_writer, mut ws_reader) = ws_stream.split();
        ws_writer
            .send(Message::Text(select_campaign_frame(self.campaign_id)))
            .await
            .map_err(|err| SourceError::Send(err.to_string()))?;

        let idle_timeout = self.settings.idle_timeout();
        let mut summary = StreamSummary::default();
        loop {
            let next = tokio::select! {
                _ = cancel.cancelled() => {
                    summary.cancelled = true;
                    let _ = ws_writer.send(Message::Close(None)).await;
                    break;
                }
                next = next_with_timeout(&mut ws_reader, idle_timeout) => next,
            };
            let msg = match next {
                Err(()) => {
                    // idle_timeout is Some whenever the timer fired.
                    return Err(SourceError::IdleTimeout(idle_timeout.unwrap_or_default()));
                }
                Ok(None) => break,
                Ok(Some(msg)) => msg,
            };
            match msg {
                Ok(Message::Text(text)) => forward_frame(&text, sink, &mut summary),
                Ok(Message::Close(_)) => break,
                Ok(_) => {}
                Err(err) => {
                    let message = format!("websocket receive failed: {err}");
                    sink.emit(EngineEvent::Frame(DecodedFrame {
                        seq: None,
                        event: StreamEvent::Error(ChannelError::new(message.clone())),
                    }));
                    return Err(SourceError::Receive(message));
                }
            }
        }

        engine_info!(
            "Stream for campaign {} ended: frames={} skipped={} cancelled={}",
            self.campaign_id,
            summary.frames,
            summary.skipped,
            summary.cancelled
        );
        Ok(summary)
    }
}

async fn next_with_timeout<S>(
    reader: &mut S,
    idle_timeout: Option<Duration>,
) -> Result<Option<S::Item>, ()>
where
    S: Stream + Unpin,
{
    match idle_timeout {
        Some(limit) => tokio::time::timeout(limit, reader.next())
            .await
            .map_err(|_| ()),
        None => Ok(reader.next().await),
    }
}
