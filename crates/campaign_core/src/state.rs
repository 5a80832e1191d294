use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::event::ResultPayload;
use crate::view_model::{progress_percent, CampaignViewModel};

pub type CampaignId = u64;

/// One result row: column name to value.
pub type Row = BTreeMap<String, String>;

/// Shown in place of an empty per-node error. Older clients report failures
/// without any error text.
pub const DEFAULT_ERROR_MESSAGE: &str =
    "Error details require osquery 4.4.0+ (Launcher does not provide error details)";

/// Execution stage of a campaign. Only `finished` has meaning to the reducer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CampaignStatus(String);

impl CampaignStatus {
    pub const PENDING: &'static str = "pending";
    pub const FINISHED: &'static str = "finished";

    pub fn new(status: impl Into<String>) -> Self {
        Self(status.into())
    }

    pub fn finished() -> Self {
        Self::new(Self::FINISHED)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_finished(&self) -> bool {
        self.0 == Self::FINISHED
    }
}

impl Default for CampaignStatus {
    fn default() -> Self {
        Self::new(Self::PENDING)
    }
}

impl From<&str> for CampaignStatus {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// An enrolled device as reported alongside its query outcome.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Node {
    #[serde(default)]
    pub id: u64,
    #[serde(default)]
    pub hostname: String,
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub osquery_version: String,
}

/// A node merged with the rows it returned.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodeResult {
    #[serde(flatten)]
    pub node: Node,
    pub query_results: Vec<Row>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct NodesCount {
    pub total: u64,
    pub successful: u64,
    pub failed: u64,
}

/// Aggregate fleet totals targeted by the campaign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Totals {
    #[serde(default)]
    pub count: u64,
    #[serde(default)]
    pub online: u64,
    #[serde(default)]
    pub offline: u64,
    #[serde(default)]
    pub missing_in_action: u64,
}

/// Snapshot of one node's failed query.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CampaignErrorEntry {
    pub node_display_name: String,
    pub osquery_version: String,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Campaign {
    pub id: CampaignId,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub status: CampaignStatus,
    #[serde(default)]
    pub nodes: Vec<NodeResult>,
    #[serde(default)]
    pub query_results: Vec<Row>,
    #[serde(default)]
    pub errors: Vec<CampaignErrorEntry>,
    #[serde(default)]
    pub nodes_count: NodesCount,
    #[serde(default)]
    pub totals: Totals,
}

impl Campaign {
    pub fn new(id: CampaignId) -> Self {
        Self {
            id,
            ..Self::default()
        }
    }
}

/// Value threaded through [`crate::update`].
///
/// `query_is_running` sits beside the campaign rather than inside it: it
/// drives spinners and polling and is not part of the campaign record.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CampaignState {
    campaign: Campaign,
    query_is_running: bool,
    last_seq: Option<u64>,
    dirty: bool,
}

impl CampaignState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fresh state for a campaign that was just dispatched.
    pub fn for_campaign(campaign: Campaign) -> Self {
        let query_is_running = !campaign.status.is_finished();
        Self {
            campaign,
            query_is_running,
            last_seq: None,
            dirty: true,
        }
    }

    pub fn campaign(&self) -> &Campaign {
        &self.campaign
    }

    pub fn into_campaign(self) -> Campaign {
        self.campaign
    }

    pub fn query_is_running(&self) -> bool {
        self.query_is_running
    }

    /// Highest sequence number applied so far, if events carried any.
    pub fn last_seq(&self) -> Option<u64> {
        self.last_seq
    }

    pub fn view(&self) -> CampaignViewModel {
        let campaign = &self.campaign;
        CampaignViewModel {
            campaign_id: campaign.id,
            status: campaign.status.clone(),
            query_is_running: self.query_is_running,
            nodes_count: campaign.nodes_count,
            totals: campaign.totals,
            progress_percent: progress_percent(campaign.nodes_count, campaign.totals),
            node_count: campaign.nodes.len(),
            row_count: campaign.query_results.len(),
            error_count: campaign.errors.len(),
            dirty: self.dirty,
        }
    }

    /// Returns whether anything changed since the last call, and clears the flag.
    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub(crate) fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Advances the sequence watermark. Returns `false` for a stale or
    /// repeated sequence number; unsequenced events are always accepted.
    pub(crate) fn accept_seq(&mut self, seq: Option<u64>) -> bool {
        match (seq, self.last_seq) {
            (None, _) => true,
            (Some(seq), Some(last)) if seq <= last => false,
            (Some(seq), _) => {
                self.last_seq = Some(seq);
                true
            }
        }
    }

    pub(crate) fn replace_totals(&mut self, totals: Totals) {
        self.campaign.totals = totals;
        self.mark_dirty();
    }

    pub(crate) fn set_status(&mut self, status: CampaignStatus) {
        self.query_is_running = !status.is_finished();
        self.campaign.status = status;
        self.mark_dirty();
    }

    pub(crate) fn apply_result(&mut self, payload: ResultPayload) {
        let ResultPayload { node, rows, error } = payload;
        let campaign = &mut self.campaign;
        let counts = &mut campaign.nodes_count;

        match error {
            Some(error) => {
                counts.failed += 1;
                counts.total = counts.successful + counts.failed;
                let error = if error.is_empty() {
                    DEFAULT_ERROR_MESSAGE.to_string()
                } else {
                    error
                };
                campaign.errors.push(CampaignErrorEntry {
                    node_display_name: node.display_name,
                    osquery_version: node.osquery_version,
                    error,
                });
            }
            None => {
                counts.successful += 1;
                counts.total = counts.failed + counts.successful;
                campaign.query_results.extend(rows.iter().cloned());
                campaign.nodes.push(NodeResult {
                    node,
                    query_results: rows,
                });
            }
        }

        debug_assert_eq!(
            campaign.nodes_count.total,
            campaign.nodes_count.successful + campaign.nodes_count.failed
        );
        self.mark_dirty();
    }
}
