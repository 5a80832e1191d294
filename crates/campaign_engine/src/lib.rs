//! Campaign engine: wire decoding, event sources and result export.
mod decode;
mod engine;
mod export;
mod persist;
mod source;
mod types;

pub use decode::{
    decode_frame, parse_channel_error, select_campaign_frame, DecodeError, DecodedFrame,
    TRANSPORT_FAILURE_MARKER,
};
pub use engine::EngineHandle;
pub use export::{export_campaign, ExportError, ExportOptions, ExportSummary};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use source::{
    ChannelEventSink, EventSink, EventSource, ReplayEventSource, StreamSettings, WsEventSource,
};
pub use types::{EngineEvent, SourceError, StreamSummary};
