use crate::{CampaignId, CampaignState, ChannelError, Effect, Msg, Notification, StreamEvent};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: CampaignState, msg: Msg) -> (CampaignState, Vec<Effect>) {
    let effects = match msg {
        Msg::CampaignCreated(campaign) => {
            state = CampaignState::for_campaign(campaign);
            Vec::new()
        }
        Msg::Stream { seq, event } => {
            if !state.accept_seq(seq) {
                return (state, Vec::new());
            }
            apply_event(&mut state, event)
        }
        Msg::Discard => {
            state = CampaignState::new();
            state.mark_dirty();
            Vec::new()
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}

fn apply_event(state: &mut CampaignState, event: StreamEvent) -> Vec<Effect> {
    match event {
        StreamEvent::Totals(totals) => {
            state.replace_totals(totals);
            Vec::new()
        }
        StreamEvent::Status(status) => {
            let was_running = state.query_is_running();
            state.set_status(status);
            if was_running && !state.query_is_running() {
                vec![Effect::QueryFinished {
                    campaign_id: state.campaign().id,
                }]
            } else {
                Vec::new()
            }
        }
        StreamEvent::Result(payload) => {
            state.apply_result(payload);
            Vec::new()
        }
        StreamEvent::Error(error) => channel_error_effects(&error),
    }
}

// Channel errors never touch the campaign. Only recognized transport
// failures are worth interrupting the user for.
fn channel_error_effects(error: &ChannelError) -> Vec<Effect> {
    match error.campaign_id {
        Some(campaign_id) => vec![Effect::Notify(Notification::error(
            transport_failure_message(campaign_id),
        ))],
        None => Vec::new(),
    }
}

pub fn transport_failure_message(campaign_id: CampaignId) -> String {
    format!(
        "The connection to the live query result store failed (campaign ID {campaign_id}). \
         If this issue persists, please contact your administrator."
    )
}
