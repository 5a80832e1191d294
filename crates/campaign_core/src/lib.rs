//! Campaign core: pure live-query reducer and view-model helpers.
mod effect;
mod event;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::{Effect, NoticeLevel, Notification};
pub use event::{ChannelError, ResultPayload, StreamEvent};
pub use msg::Msg;
pub use state::{
    Campaign, CampaignErrorEntry, CampaignId, CampaignState, CampaignStatus, Node, NodeResult,
    NodesCount, Row, Totals, DEFAULT_ERROR_MESSAGE,
};
pub use update::{transport_failure_message, update};
pub use view_model::CampaignViewModel;
