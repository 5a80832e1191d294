use campaign_core::{
    transport_failure_message, update, Campaign, CampaignState, ChannelError, Effect, Msg,
    NoticeLevel, Notification, StreamEvent,
};

fn channel_error(error: ChannelError) -> Msg {
    Msg::Stream {
        seq: None,
        event: StreamEvent::Error(error),
    }
}

#[test]
fn transport_failure_notifies_with_campaign_id() {
    let mut state = CampaignState::for_campaign(Campaign::new(42));
    state.consume_dirty();
    let before = state.clone();

    let (mut after, effects) = update(
        state,
        channel_error(ChannelError::transport_failure(
            42,
            "unexpected exit in receiveLoop, campaignID=42",
        )),
    );

    assert_eq!(after.campaign(), before.campaign());
    assert!(!after.consume_dirty());
    assert_eq!(
        effects,
        vec![Effect::Notify(Notification {
            level: NoticeLevel::Error,
            message: transport_failure_message(42),
        })]
    );
    assert!(transport_failure_message(42).contains("campaign ID 42"));
}

#[test]
fn unrecognized_channel_error_is_ignored() {
    let state = CampaignState::for_campaign(Campaign::new(42));
    let before = state.clone();

    let (after, effects) = update(state, channel_error(ChannelError::new("socket hiccup")));

    assert_eq!(after, before);
    assert!(effects.is_empty());
}
