use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{engine_debug, engine_error, engine_info};
use tokio_util::sync::CancellationToken;

use crate::source::{ChannelEventSink, EventSource};
use crate::{EngineEvent, SourceError};

enum EngineCommand {
    Start { source: Arc<dyn EventSource> },
    Stop,
}

/// Runs event sources on a background tokio runtime. Events are pulled by the
/// caller, one at a time, so the reducer stays on the caller's thread.
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new() -> Self {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Runtime::new() {
                Ok(runtime) => runtime,
                Err(err) => {
                    engine_error!("Failed to start engine runtime: {}", err);
                    let _ = event_tx.send(EngineEvent::StreamEnded {
                        result: Err(SourceError::Io(err.to_string())),
                    });
                    return;
                }
            };

            let mut active: Option<CancellationToken> = None;
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::Start { source } => {
                        if let Some(previous) = active.take() {
                            engine_debug!("Cancelling previous stream before starting a new one");
                            previous.cancel();
                        }
                        let cancel = CancellationToken::new();
                        active = Some(cancel.clone());
                        let event_tx = event_tx.clone();
                        runtime.spawn(async move {
                            let sink = ChannelEventSink::new(event_tx.clone());
                            let result = source.run(&sink, cancel).await;
                            let _ = event_tx.send(EngineEvent::StreamEnded { result });
                        });
                    }
                    EngineCommand::Stop => {
                        if let Some(cancel) = active.take() {
                            engine_info!("Stopping active stream");
                            cancel.cancel();
                        }
                    }
                }
            }
            if let Some(cancel) = active.take() {
                cancel.cancel();
            }
            runtime.shutdown_timeout(Duration::from_secs(1));
        });

        Self { cmd_tx, event_rx }
    }

    /// Start streaming from `source`, cancelling any stream already running.
    pub fn start(&self, source: impl EventSource + 'static) {
        let _ = self.cmd_tx.send(EngineCommand::Start {
            source: Arc::new(source),
        });
    }

    pub fn stop(&self) {
        let _ = self.cmd_tx.send(EngineCommand::Stop);
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

impl Default for EngineHandle {
    fn default() -> Self {
        Self::new()
    }
}
