use crate::{CampaignId, CampaignStatus, NodesCount, Totals};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CampaignViewModel {
    pub campaign_id: CampaignId,
    pub status: CampaignStatus,
    pub query_is_running: bool,
    pub nodes_count: NodesCount,
    pub totals: Totals,
    /// Responded nodes relative to the online nodes, 0..=100.
    pub progress_percent: u8,
    pub node_count: usize,
    pub row_count: usize,
    pub error_count: usize,
    pub dirty: bool,
}

// Online nodes are the ones expected to answer; before totals arrive, or when
// nothing is online, fall back to the full target count.
pub(crate) fn progress_percent(nodes_count: NodesCount, totals: Totals) -> u8 {
    let expected = if totals.online > 0 {
        totals.online
    } else {
        totals.count
    };
    if expected == 0 {
        return 0;
    }
    let responded = nodes_count.total.min(expected);
    (responded * 100 / expected) as u8
}
