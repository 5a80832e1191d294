use campaign_core::{Campaign, CampaignViewModel};

const BAR_WIDTH: usize = 20;

/// One-line progress summary for the terminal.
pub fn progress_line(view: &CampaignViewModel) -> String {
    let filled = usize::from(view.progress_percent) * BAR_WIDTH / 100;
    let state = if view.query_is_running {
        "running"
    } else {
        "stopped"
    };
    format!(
        "campaign {} [{}{}] {:>3}% status={} ({}) responded={} ok={} failed={} online={} rows={}",
        view.campaign_id,
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        view.progress_percent,
        view.status,
        state,
        view.nodes_count.total,
        view.nodes_count.successful,
        view.nodes_count.failed,
        view.totals.online,
        view.row_count,
    )
}

/// Final report: counts plus the error table.
pub fn summary(campaign: &Campaign) -> String {
    let mut out = format!(
        "campaign {} {}: {} nodes responded, {} succeeded, {} failed, {} rows\n",
        campaign.id,
        campaign.status,
        campaign.nodes_count.total,
        campaign.nodes_count.successful,
        campaign.nodes_count.failed,
        campaign.query_results.len(),
    );
    if !campaign.errors.is_empty() {
        out.push_str("errors:\n");
        for entry in &campaign.errors {
            out.push_str(&format!(
                "  {} (osquery {}): {}\n",
                entry.node_display_name, entry.osquery_version, entry.error
            ));
        }
    }
    out
}
