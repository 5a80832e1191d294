use campaign_core::{CampaignId, CampaignStatus, ChannelError, ResultPayload, StreamEvent, Totals};
use serde::Deserialize;
use serde_json::Value;

/// Text the backend embeds in an error frame when a campaign's result stream
/// dies. The campaign id follows the first `=`.
pub const TRANSPORT_FAILURE_MARKER: &str = "unexpected exit in receiveLoop";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedFrame {
    pub seq: Option<u64>,
    pub event: StreamEvent,
}

#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("unknown frame type {0:?}")]
    UnknownType(String),
    #[error("invalid {kind} payload: {source}")]
    InvalidPayload {
        kind: &'static str,
        source: serde_json::Error,
    },
}

#[derive(Deserialize)]
struct RawFrame {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    data: Value,
    #[serde(default)]
    seq: Option<u64>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StatusData {
    Plain(CampaignStatus),
    Wrapped { status: CampaignStatus },
}

#[derive(Deserialize)]
#[serde(untagged)]
enum ErrorData {
    Text(String),
    Structured(ChannelError),
}

/// Decode one `{"type": ..., "data": ..., "seq"?: ...}` text frame.
pub fn decode_frame(text: &str) -> Result<DecodedFrame, DecodeError> {
    let raw: RawFrame = serde_json::from_str(text)?;
    let event = match raw.kind.as_str() {
        "result" => StreamEvent::Result(payload::<ResultPayload>("result", raw.data)?),
        "status" => StreamEvent::Status(match payload::<StatusData>("status", raw.data)? {
            StatusData::Plain(status) | StatusData::Wrapped { status } => status,
        }),
        "totals" => StreamEvent::Totals(payload::<Totals>("totals", raw.data)?),
        "error" => StreamEvent::Error(match payload::<ErrorData>("error", raw.data)? {
            ErrorData::Text(text) => parse_channel_error(&text),
            ErrorData::Structured(error) => error,
        }),
        other => return Err(DecodeError::UnknownType(other.to_string())),
    };
    Ok(DecodedFrame {
        seq: raw.seq,
        event,
    })
}

fn payload<T: serde::de::DeserializeOwned>(
    kind: &'static str,
    data: Value,
) -> Result<T, DecodeError> {
    serde_json::from_value(data).map_err(|source| DecodeError::InvalidPayload { kind, source })
}

/// Turn a free-text channel error into a typed one, extracting the campaign
/// id when the text carries the transport failure marker.
pub fn parse_channel_error(text: &str) -> ChannelError {
    if !text.contains(TRANSPORT_FAILURE_MARKER) {
        return ChannelError::new(text);
    }
    match text.split_once('=').and_then(|(_, rest)| leading_id(rest)) {
        Some(campaign_id) => ChannelError::transport_failure(campaign_id, text),
        None => ChannelError::new(text),
    }
}

fn leading_id(rest: &str) -> Option<CampaignId> {
    let rest = rest.trim_start();
    let end = rest
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}

/// Frame asking the server to stream results for a campaign.
pub fn select_campaign_frame(campaign_id: CampaignId) -> String {
    serde_json::json!({
        "type": "select_campaign",
        "data": { "campaign_id": campaign_id },
    })
    .to_string()
}
