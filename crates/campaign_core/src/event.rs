use serde::{Deserialize, Serialize};

use crate::{CampaignId, CampaignStatus, Node, Row, Totals};

/// One message delivered over the live-query channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// A single node's query outcome.
    Result(ResultPayload),
    /// Stage transition of the campaign.
    Status(CampaignStatus),
    /// Updated online/offline/total counts for the targeted nodes.
    Totals(Totals),
    /// Channel-level failure, not tied to any node.
    Error(ChannelError),
}

/// A node's outcome. `error: None` means success; `Some("")` is a failure
/// that arrived without text.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ResultPayload {
    #[serde(alias = "host")]
    pub node: Node,
    #[serde(default)]
    pub rows: Vec<Row>,
    #[serde(default)]
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChannelError {
    /// Present when the transport identified the failure as the result
    /// stream for this campaign terminating unexpectedly.
    #[serde(default)]
    pub campaign_id: Option<CampaignId>,
    pub message: String,
}

impl ChannelError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            campaign_id: None,
            message: message.into(),
        }
    }

    pub fn transport_failure(campaign_id: CampaignId, message: impl Into<String>) -> Self {
        Self {
            campaign_id: Some(campaign_id),
            message: message.into(),
        }
    }

    pub fn is_transport_failure(&self) -> bool {
        self.campaign_id.is_some()
    }
}
