use std::fs;

use campaign_core::{
    update, Campaign, CampaignErrorEntry, CampaignState, Msg, Node, ResultPayload, StreamEvent,
};
use campaign_engine::{export_campaign, ExportError, ExportOptions};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn sample_campaign() -> Campaign {
    let results = [
        ResultPayload {
            node: Node {
                id: 1,
                display_name: "mac-1".to_string(),
                osquery_version: "5.0.0".to_string(),
                ..Node::default()
            },
            rows: vec![[("col".to_string(), "a".to_string())].into_iter().collect()],
            error: None,
        },
        ResultPayload {
            node: Node {
                id: 2,
                display_name: "win-1".to_string(),
                osquery_version: "4.3.0".to_string(),
                ..Node::default()
            },
            rows: Vec::new(),
            error: Some("timeout".to_string()),
        },
    ];
    let state = results
        .into_iter()
        .fold(CampaignState::for_campaign(Campaign::new(8)), |state, payload| {
            update(
                state,
                Msg::Stream {
                    seq: None,
                    event: StreamEvent::Result(payload),
                },
            )
            .0
        });
    state.into_campaign()
}

#[test]
fn writes_results_and_errors() {
    let temp = TempDir::new().unwrap();
    let campaign = sample_campaign();

    let summary = export_campaign(temp.path(), &campaign, &ExportOptions::default()).unwrap();
    assert_eq!(summary.node_count, 1);
    assert_eq!(summary.row_count, 1);
    assert_eq!(summary.error_count, 1);

    let results: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&summary.results_path).unwrap()).unwrap();
    assert_eq!(results["campaign_id"], 8);
    assert_eq!(results["nodes_count"]["total"], 2);
    assert_eq!(results["nodes"][0]["display_name"], "mac-1");
    assert_eq!(results["nodes"][0]["query_results"][0]["col"], "a");

    let errors: Vec<CampaignErrorEntry> =
        serde_json::from_str(&fs::read_to_string(&summary.errors_path).unwrap()).unwrap();
    assert_eq!(errors, campaign.errors);
}

#[test]
fn rejects_identical_filenames() {
    let temp = TempDir::new().unwrap();
    let options = ExportOptions {
        results_filename: "out.json".to_string(),
        errors_filename: "out.json".to_string(),
    };

    let err = export_campaign(temp.path(), &sample_campaign(), &options).unwrap_err();
    assert!(matches!(err, ExportError::FilenameClash(name) if name == "out.json"));
    assert!(!temp.path().join("out.json").exists());
}
