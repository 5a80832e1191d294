use crate::CampaignId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Show a one-shot message to the user.
    Notify(Notification),
    /// The campaign reached its terminal status while a query was running.
    QueryFinished { campaign_id: CampaignId },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notification {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }
}
