#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// A live query was dispatched; start tracking this campaign.
    CampaignCreated(crate::Campaign),
    /// One streamed event, optionally stamped with a transport sequence number.
    Stream {
        seq: Option<u64>,
        event: crate::StreamEvent,
    },
    /// The owning view went away; drop everything.
    Discard,
    /// Fallback for placeholder wiring.
    NoOp,
}
