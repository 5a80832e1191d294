use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use campaign_core::{CampaignStatus, StreamEvent};
use campaign_engine::{
    EngineEvent, EngineHandle, EventSink, EventSource, ReplayEventSource, SourceError,
    StreamSettings, StreamSummary, WsEventSource,
};
use futures_util::{SinkExt, StreamExt};
use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;
use tokio::net::TcpListener;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tokio_util::sync::CancellationToken;

#[derive(Default)]
struct TestSink {
    events: Arc<Mutex<Vec<EngineEvent>>>,
}

impl TestSink {
    fn take(&self) -> Vec<EngineEvent> {
        self.events.lock().unwrap().drain(..).collect()
    }
}

impl EventSink for TestSink {
    fn emit(&self, event: EngineEvent) {
        self.events.lock().unwrap().push(event);
    }
}

fn frame_events(events: Vec<EngineEvent>) -> Vec<StreamEvent> {
    events
        .into_iter()
        .filter_map(|event| match event {
            EngineEvent::Frame(frame) => Some(frame.event),
            _ => None,
        })
        .collect()
}

const FRAMES: &str = r#"{"type":"totals","data":{"count":2,"online":2}}

{"type":"result","data":{"node":{"display_name":"mac-1"},"rows":[{"col":"a"}]}}
{"type":"bogus","data":null}
{"type":"status","data":"finished"}
"#;

fn replay_file() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(FRAMES.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

#[tokio::test]
async fn replay_forwards_frames_in_order_and_skips_bad_ones() {
    let file = replay_file();
    let sink = TestSink::default();

    let summary = ReplayEventSource::new(file.path())
        .run(&sink, CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        summary,
        StreamSummary {
            frames: 3,
            skipped: 1,
            cancelled: false,
        }
    );
    let events = sink.take();
    assert!(matches!(events[2], EngineEvent::FrameSkipped { .. }));
    let kinds: Vec<&str> = frame_events(events)
        .iter()
        .map(|event| match event {
            StreamEvent::Totals(_) => "totals",
            StreamEvent::Result(_) => "result",
            StreamEvent::Status(_) => "status",
            StreamEvent::Error(_) => "error",
        })
        .collect();
    assert_eq!(kinds, vec!["totals", "result", "status"]);
}

#[tokio::test]
async fn replay_of_missing_file_is_io_error() {
    let sink = TestSink::default();
    let err = ReplayEventSource::new("/definitely/not/here.jsonl")
        .run(&sink, CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::Io(_)));
}

#[tokio::test]
async fn ws_source_subscribes_and_forwards_frames() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        let subscribe = match ws.next().await {
            Some(Ok(Message::Text(text))) => text,
            other => panic!("expected subscribe frame, got {other:?}"),
        };
        for frame in [
            r#"{"type":"status","seq":1,"data":"running"}"#,
            r#"{"type":"result","seq":2,"data":{"node":{"display_name":"mac-1"},"rows":[]}}"#,
            r#"{"type":"status","seq":3,"data":"finished"}"#,
        ] {
            ws.send(Message::Text(frame.to_string())).await.unwrap();
        }
        ws.close(None).await.unwrap();
        subscribe
    });

    let sink = TestSink::default();
    let source = WsEventSource::new(format!("ws://{addr}"), 42, StreamSettings::default());
    let summary = source.run(&sink, CancellationToken::new()).await.unwrap();

    let subscribe: serde_json::Value = serde_json::from_str(&server.await.unwrap()).unwrap();
    assert_eq!(subscribe["data"]["campaign_id"], 42);
    assert_eq!(summary.frames, 3);
    let events = frame_events(sink.take());
    assert_eq!(events.len(), 3);
    assert_eq!(
        events[2],
        StreamEvent::Status(CampaignStatus::finished())
    );
}

#[tokio::test]
async fn ws_source_rejects_http_scheme() {
    let sink = TestSink::default();
    let err = WsEventSource::new("http://localhost:1", 1, StreamSettings::default())
        .run(&sink, CancellationToken::new())
        .await
        .unwrap_err();
    assert!(matches!(err, SourceError::InvalidUrl { .. }));
}

#[tokio::test]
async fn ws_source_times_out_when_idle() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let mut ws = accept_async(stream).await.unwrap();
        // Read the subscription, then go silent.
        let _ = ws.next().await;
        tokio::time::sleep(Duration::from_secs(5)).await;
    });

    let settings = StreamSettings {
        idle_timeout_secs: Some(1),
        ..StreamSettings::default()
    };
    let sink = TestSink::default();
    let err = WsEventSource::new(format!("ws://{addr}"), 1, settings)
        .run(&sink, CancellationToken::new())
        .await
        .unwrap_err();
    assert_eq!(err, SourceError::IdleTimeout(Duration::from_secs(1)));
}

#[test]
fn engine_handle_runs_replay_to_completion() {
    let file = replay_file();
    let engine = EngineHandle::new();
    engine.start(ReplayEventSource::new(file.path()));

    let mut frames = 0;
    let summary = loop {
        match engine.recv_timeout(Duration::from_secs(5)) {
            Some(EngineEvent::Frame(_)) => frames += 1,
            Some(EngineEvent::FrameSkipped { .. }) => {}
            Some(EngineEvent::StreamEnded { result }) => break result.unwrap(),
            None => panic!("engine produced no events"),
        }
    };

    assert_eq!(frames, 3);
    assert_eq!(summary.frames, 3);
}
